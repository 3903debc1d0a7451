//! Per-day coordination of classified entries into project logs.

use crate::memolog::merge::merge_into_log;
use crate::memolog::store::LogStore;
use crate::memolog::warn::{self, WarnEvent};

/// Ephemeral classified content awaiting merge, scoped to one project and
/// one date.
#[derive(Debug, Clone)]
pub struct PendingEntry {
    pub project: String,
    pub text: String,
}

#[derive(Debug, Clone, Default)]
pub struct DayMergeOutcome {
    pub date: String,
    pub merged: Vec<String>,
    pub failed: Vec<String>,
}

/// Merge one day's Pending Entries: group by project preserving arrival
/// order, concatenate same-project texts blank-line separated, and run one
/// load → merge → save cycle per project. A failure for one project is
/// recorded and does not block the others.
pub fn merge_day_entries(
    store: &LogStore,
    sections: &[String],
    date: &str,
    entries: &[PendingEntry],
) -> DayMergeOutcome {
    let mut grouped: Vec<(String, Vec<String>)> = Vec::new();
    for entry in entries {
        let text = entry.text.trim();
        if text.is_empty() {
            continue;
        }
        match grouped.iter_mut().find(|(name, _)| name == &entry.project) {
            Some((_, texts)) => texts.push(text.to_string()),
            None => grouped.push((entry.project.clone(), vec![text.to_string()])),
        }
    }

    let mut out = DayMergeOutcome {
        date: date.to_string(),
        ..Default::default()
    };

    for (project, texts) in grouped {
        let combined = texts.join("\n\n");
        let result = store.load(&project).and_then(|existing| {
            let merged = merge_into_log(&existing, date, &combined, sections);
            store.save(&project, &merged)
        });

        match result {
            Ok(()) => out.merged.push(project),
            Err(err) => {
                warn::emit(WarnEvent {
                    code: "MERGE_FAILED",
                    stage: "merge",
                    action: "load-merge-save",
                    file: "",
                    project: &project,
                    date,
                    reason: "project-update-failed",
                    err: &format!("{err:#}"),
                });
                out.failed.push(project);
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::{PendingEntry, merge_day_entries};
    use crate::memolog::store::LogStore;
    use std::fs;
    use tempfile::tempdir;

    fn sections() -> Vec<String> {
        vec!["Decisions:".to_string(), "Signals:".to_string()]
    }

    fn entry(project: &str, text: &str) -> PendingEntry {
        PendingEntry {
            project: project.to_string(),
            text: text.to_string(),
        }
    }

    #[test]
    fn same_project_entries_combine_in_arrival_order() {
        let tmp = tempdir().expect("tempdir");
        let store = LogStore::new(tmp.path());

        let entries = vec![
            entry("Harbor", "Decisions:\n- A\n"),
            entry("Harbor", "Decisions:\n- B\n"),
        ];
        let outcome = merge_day_entries(&store, &sections(), "2026-01-05", &entries);

        assert_eq!(outcome.merged, vec!["Harbor"]);
        assert!(outcome.failed.is_empty());
        let log = store.load("Harbor").expect("load");
        assert!(log.contains("Decisions:\n- A\n- B\n"));
        assert_eq!(log.matches("## 2026-01-05").count(), 1);
    }

    #[test]
    fn each_project_gets_its_own_log() {
        let tmp = tempdir().expect("tempdir");
        let store = LogStore::new(tmp.path());

        let entries = vec![
            entry("Harbor", "Decisions:\n- A\n"),
            entry("Mill", "Signals:\n- S\n"),
        ];
        let outcome = merge_day_entries(&store, &sections(), "2026-01-05", &entries);

        assert_eq!(outcome.merged, vec!["Harbor", "Mill"]);
        assert!(store.load("Harbor").expect("load").contains("- A"));
        assert!(store.load("Mill").expect("load").contains("- S"));
    }

    #[test]
    fn blank_entries_are_skipped() {
        let tmp = tempdir().expect("tempdir");
        let store = LogStore::new(tmp.path());

        let entries = vec![entry("Harbor", "   \n")];
        let outcome = merge_day_entries(&store, &sections(), "2026-01-05", &entries);

        assert!(outcome.merged.is_empty());
        assert!(outcome.failed.is_empty());
    }

    #[test]
    fn one_failing_project_does_not_block_the_others() {
        let tmp = tempdir().expect("tempdir");
        let store = LogStore::new(tmp.path());
        // A directory squatting on the log path makes every read and
        // write for that project fail.
        fs::create_dir_all(tmp.path().join("Broken.md")).expect("mkdir");

        let entries = vec![
            entry("Broken", "Decisions:\n- A\n"),
            entry("Harbor", "Decisions:\n- B\n"),
        ];
        let outcome = merge_day_entries(&store, &sections(), "2026-01-05", &entries);

        assert_eq!(outcome.failed, vec!["Broken"]);
        assert_eq!(outcome.merged, vec!["Harbor"]);
        assert!(store.load("Harbor").expect("load").contains("- B"));
    }
}
