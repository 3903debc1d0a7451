use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::{TempDir, tempdir};

const CONFIG: &str = r#"
[classify]
provider = "local"

[log]
sections = ["Decisions:", "Signals:"]
unclassified = "_unfiled"

[[project]]
name = "Harbor"
aliases = ["harbor"]
"#;

fn workspace() -> (TempDir, std::path::PathBuf) {
    let tmp = tempdir().expect("tempdir");
    let config_path = tmp.path().join("memolog.toml");
    fs::write(&config_path, CONFIG).expect("write config");
    fs::create_dir_all(tmp.path().join("projects")).expect("mkdir");
    (tmp, config_path)
}

fn memolog(home: &Path, config_path: &Path) -> Command {
    let mut cmd = Command::cargo_bin("memolog").expect("binary");
    cmd.env("MEMOLOG_HOME", home)
        .env("MEMOLOG_CONFIG_PATH", config_path)
        .env_remove("MEMOLOG_CLASSIFY_PROVIDER")
        .env_remove("MEMOLOG_SECTIONS")
        .env_remove("MEMOLOG_UNCLASSIFIED")
        .env_remove("MEMOLOG_PROJECTS_DIR");
    cmd
}

#[test]
fn verify_passes_on_well_formed_logs() {
    let (tmp, config_path) = workspace();
    fs::write(
        tmp.path().join("projects/Harbor.md"),
        "## 2026-01-05\n\nDecisions:\n- A\n\n## 2026-01-06\n\nSignals:\n- B\n",
    )
    .expect("write log");

    memolog(tmp.path(), &config_path)
        .arg("verify")
        .assert()
        .success()
        .stdout(predicate::str::contains("logs checked: 1"));
}

#[test]
fn strict_verify_fails_on_a_duplicate_date_block() {
    let (tmp, config_path) = workspace();
    fs::write(
        tmp.path().join("projects/Harbor.md"),
        "## 2026-01-05\n\nDecisions:\n- A\n\n## 2026-01-05\n\nDecisions:\n- B\n",
    )
    .expect("write log");

    memolog(tmp.path(), &config_path)
        .args(["verify", "--strict"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("duplicate date block 2026-01-05"));
}

#[test]
fn lenient_verify_reports_findings_without_failing() {
    let (tmp, config_path) = workspace();
    fs::write(
        tmp.path().join("projects/Harbor.md"),
        "## not-a-date\n\nDecisions:\n- A\n",
    )
    .expect("write log");

    memolog(tmp.path(), &config_path)
        .arg("verify")
        .assert()
        .success()
        .stdout(predicate::str::contains("not a date"));
}

#[test]
fn status_lists_catalog_and_pending_inbox_work() {
    let (tmp, config_path) = workspace();
    fs::create_dir_all(tmp.path().join("input/inbox")).expect("mkdir");
    fs::write(tmp.path().join("input/inbox/2026-02-01.txt"), "x").expect("write memo");

    memolog(tmp.path(), &config_path)
        .arg("status")
        .assert()
        .success()
        .stdout(
            predicate::str::contains("catalog: 1 project(s)")
                .and(predicate::str::contains("Harbor (aliases: harbor)"))
                .and(predicate::str::contains("inbox: 1 memo(s) pending"))
                .and(predicate::str::contains("2026-02-01: 1")),
        );
}

#[test]
fn catalog_add_alias_persists_to_the_config_file() {
    let (tmp, config_path) = workspace();

    memolog(tmp.path(), &config_path)
        .args(["catalog", "add-alias", "Harbor", "quay wall"])
        .assert()
        .success()
        .stdout(predicate::str::contains("aliases now [harbor, quay wall]"));

    let written = fs::read_to_string(&config_path).expect("config");
    assert!(written.contains("quay wall"));

    memolog(tmp.path(), &config_path)
        .args(["catalog", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Harbor (aliases: harbor, quay wall)"));
}

#[test]
fn catalog_add_alias_rejects_an_unknown_project() {
    let (tmp, config_path) = workspace();

    memolog(tmp.path(), &config_path)
        .args(["catalog", "add-alias", "Nope", "x"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown project"));
}
