//! The `run` command: collect inbox memos, classify them per project, merge
//! each day's entries into the project logs, and archive the sources.

use crate::classify::{self, ClassifyRequest};
use crate::commands::CommandReport;
use crate::memolog::audit;
use crate::memolog::batch::{self, PendingEntry};
use crate::memolog::config::{MemologConfig, load_config};
use crate::memolog::inbox::{self, MemoKind};
use crate::memolog::paths::{self, MemologPaths};
use crate::memolog::store::LogStore;
use crate::memolog::warn::{self, WarnEvent};
use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

pub struct RunOptions {
    pub dry_run: bool,
}

pub fn run(opts: &RunOptions) -> Result<CommandReport> {
    let mut report = CommandReport::new("run");
    let paths = paths::resolve_paths()?;
    let cfg = load_config()?;

    if cfg.catalog().is_empty() {
        warn::emit(WarnEvent {
            code: "CATALOG_EMPTY",
            stage: "run",
            action: "load-config",
            file: "",
            project: "",
            date: "",
            reason: "everything-will-be-unclassified",
            err: "",
        });
        report.detail("catalog is empty; all content goes to the unclassified log");
    }

    paths::ensure_dirs(&paths)?;

    let files = inbox::collect_inbox_files(&paths.inbox_dir)?;
    if files.is_empty() {
        report.detail(format!("inbox {} is empty", paths.inbox_dir.display()));
        return Ok(report);
    }

    // Lexicographic filename order within a date is arrival order; the
    // date-keyed map gives chronological day processing.
    let mut by_date: BTreeMap<String, Vec<PathBuf>> = BTreeMap::new();
    for file in files {
        match inbox::extract_date(&file) {
            Ok(date) => by_date.entry(date).or_default().push(file),
            Err(err) => {
                report.issue(format!("{}: no date could be derived: {err:#}", file.display()));
            }
        }
    }

    if opts.dry_run {
        for (date, files) in &by_date {
            report.detail(format!("{date}: {} memo(s) pending", files.len()));
            for file in files {
                report.detail(format!("  would process {}", file.display()));
            }
        }
        return Ok(report);
    }

    for (date, files) in &by_date {
        process_day(&mut report, &paths, &cfg, date, files);
    }
    Ok(report)
}

fn process_day(
    report: &mut CommandReport,
    paths: &MemologPaths,
    cfg: &MemologConfig,
    date: &str,
    files: &[PathBuf],
) {
    let catalog = cfg.catalog();
    let mut pending: Vec<PendingEntry> = Vec::new();
    let mut done: Vec<PathBuf> = Vec::new();

    for file in files {
        let text = match read_memo(file) {
            Ok(text) => text,
            Err(err) => {
                // The file stays in the inbox for the next run.
                report.issue(format!("{}: {err:#}", file.display()));
                continue;
            }
        };

        if text.trim().is_empty() {
            warn::emit(WarnEvent {
                code: "MEMO_EMPTY",
                stage: "run",
                action: "read-memo",
                file: &file.display().to_string(),
                project: "",
                date,
                reason: "archived-without-merge",
                err: "",
            });
            done.push(file.clone());
            continue;
        }

        let text = match inbox::extract_time_label(file) {
            Some(label) => format!("[memo {label}] {text}"),
            None => text,
        };

        let req = ClassifyRequest {
            memo_text: &text,
            catalog: &catalog,
            sections: &cfg.log.sections,
            unclassified: &cfg.log.unclassified,
        };
        let (provider, entries) = classify::classify_memo(&req, &cfg.classify);
        report.detail(format!(
            "{}: {} entr(ies) via {provider}",
            file.display(),
            entries.len()
        ));
        pending.extend(entries.into_iter().map(|entry| PendingEntry {
            project: entry.project,
            text: entry.entry,
        }));
        done.push(file.clone());
    }

    let store = LogStore::new(&paths.projects_dir);
    let outcome = batch::merge_day_entries(&store, &cfg.log.sections, date, &pending);
    for project in &outcome.merged {
        report.detail(format!("{date}: merged into {project}"));
        log_audit(report, paths, "merge", "ok", &format!("{date} {project}"));
    }
    for project in &outcome.failed {
        report.issue(format!("{date}: merge failed for {project}"));
        log_audit(report, paths, "merge", "failed", &format!("{date} {project}"));
    }

    // Sources are archived only after the day's merges ran, so a crash
    // before this point leaves them in the inbox for a retry.
    for file in &done {
        match inbox::move_to_processed(&paths.processed_dir, file, date) {
            Ok(dest) => report.detail(format!("archived {}", dest.display())),
            Err(err) => report.issue(format!("{}: archive failed: {err:#}", file.display())),
        }
    }
}

// The audit trail is best-effort. Once a merge is persisted the source
// files must still be archived, or the next run would merge them again.
fn log_audit(
    report: &mut CommandReport,
    paths: &MemologPaths,
    phase: &str,
    status: &str,
    message: &str,
) {
    if let Err(err) = audit::append_event(paths, phase, status, message) {
        warn::emit(WarnEvent {
            code: "AUDIT_APPEND_FAILED",
            stage: "run",
            action: "append-audit-event",
            file: "",
            project: "",
            date: "",
            reason: "continuing-without-audit-record",
            err: &format!("{err:#}"),
        });
        report.issue(format!("audit append failed: {err:#}"));
    }
}

fn read_memo(file: &Path) -> Result<String> {
    match inbox::memo_kind(file) {
        Some(MemoKind::Text) => {
            fs::read_to_string(file).with_context(|| format!("failed to read {}", file.display()))
        }
        Some(MemoKind::Audio) => classify::transcribe::transcribe(file),
        None => anyhow::bail!("unsupported memo type"),
    }
}
