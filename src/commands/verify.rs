//! The `verify` command: structural checks over every project log.

use crate::commands::CommandReport;
use crate::memolog::paths::resolve_paths;
use anyhow::{Context, Result};
use chrono::NaiveDate;
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

pub struct VerifyOptions {
    pub strict: bool,
}

pub fn run(opts: &VerifyOptions) -> Result<CommandReport> {
    let mut report = CommandReport::new("verify");
    let paths = resolve_paths()?;

    let mut checked = 0usize;
    let mut findings: Vec<String> = Vec::new();

    if paths.projects_dir.is_dir() {
        let mut logs: Vec<_> = fs::read_dir(&paths.projects_dir)
            .with_context(|| format!("failed to read {}", paths.projects_dir.display()))?
            .flatten()
            .map(|entry| entry.path())
            .filter(|path| {
                path.is_file()
                    && path
                        .extension()
                        .is_some_and(|ext| ext.eq_ignore_ascii_case("md"))
            })
            .collect();
        logs.sort();

        for path in logs {
            let text = fs::read_to_string(&path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            check_log(&path, &text, &mut findings);
            checked += 1;
        }
    }

    report.detail(format!("logs checked: {checked}"));
    for finding in findings {
        if opts.strict {
            report.issue(finding);
        } else {
            report.detail(format!("finding: {finding}"));
        }
    }
    Ok(report)
}

fn check_log(path: &Path, text: &str, findings: &mut Vec<String>) {
    let name = path.display();
    let mut seen_dates: BTreeSet<String> = BTreeSet::new();
    let lines: Vec<&str> = text.split('\n').collect();

    for (idx, line) in lines.iter().enumerate() {
        if let Some(rest) = line.strip_prefix("## ") {
            let date = rest.trim();
            if NaiveDate::parse_from_str(date, "%Y-%m-%d").is_err() {
                findings.push(format!("{name}:{}: header `{date}` is not a date", idx + 1));
            } else if !seen_dates.insert(date.to_string()) {
                findings.push(format!("{name}:{}: duplicate date block {date}", idx + 1));
            }
            continue;
        }

        // A subsection header must be followed by at least one bullet
        // before the next header or the end of the block.
        let trimmed = line.trim();
        if !trimmed.is_empty() && trimmed.ends_with(':') && !trimmed.starts_with("- ") {
            let has_bullet = lines[idx + 1..]
                .iter()
                .map(|l| l.trim())
                .take_while(|l| !(l.ends_with(':') && !l.starts_with("- ")) && !l.starts_with("## "))
                .any(|l| l.starts_with("- "));
            if !has_bullet {
                findings.push(format!("{name}:{}: `{trimmed}` has no bullets", idx + 1));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::check_log;
    use std::path::Path;

    fn findings(text: &str) -> Vec<String> {
        let mut out = Vec::new();
        check_log(Path::new("Harbor.md"), text, &mut out);
        out
    }

    #[test]
    fn well_formed_log_passes() {
        let text = "## 2026-01-05\n\nDecisions:\n- A\n\n## 2026-01-06\n\nSignals:\n- B\n";
        assert!(findings(text).is_empty());
    }

    #[test]
    fn duplicate_date_block_is_reported() {
        let text = "## 2026-01-05\n\nDecisions:\n- A\n\n## 2026-01-05\n\nDecisions:\n- B\n";
        let got = findings(text);
        assert_eq!(got.len(), 1);
        assert!(got[0].contains("duplicate date block 2026-01-05"));
    }

    #[test]
    fn non_date_header_is_reported() {
        let got = findings("## notes\n\nDecisions:\n- A\n");
        assert_eq!(got.len(), 1);
        assert!(got[0].contains("not a date"));
    }

    #[test]
    fn bullet_text_ending_with_a_colon_is_still_a_bullet() {
        let text = "## 2026-01-05\n\nDecisions:\n- agreed the following:\n- order piles\n";
        assert!(findings(text).is_empty());
    }

    #[test]
    fn empty_subsection_is_reported() {
        let got = findings("## 2026-01-05\n\nDecisions:\n\nSignals:\n- B\n");
        assert_eq!(got.len(), 1);
        assert!(got[0].contains("`Decisions:` has no bullets"));
    }
}
