//! The `status` command: resolved paths, the catalog, and pending work.

use crate::commands::CommandReport;
use crate::memolog::config::load_config;
use crate::memolog::inbox;
use crate::memolog::paths::resolve_paths;
use anyhow::Result;
use std::collections::BTreeMap;
use std::fs;

pub fn run() -> Result<CommandReport> {
    let mut report = CommandReport::new("status");
    let paths = resolve_paths()?;
    let cfg = load_config()?;

    report.detail(format!("home: {}", paths.home.display()));
    report.detail(format!("inbox: {}", paths.inbox_dir.display()));
    report.detail(format!("processed: {}", paths.processed_dir.display()));
    report.detail(format!("projects: {}", paths.projects_dir.display()));
    report.detail(format!("provider: {}", cfg.classify.provider));
    report.detail(format!("sections: {}", cfg.log.sections.join(" | ")));
    report.detail(format!("unclassified: {}", cfg.log.unclassified));

    let catalog = cfg.catalog();
    report.detail(format!("catalog: {} project(s)", catalog.len()));
    for entry in catalog.entries() {
        report.detail(format!("  {} (aliases: {})", entry.name, entry.aliases.join(", ")));
    }

    let files = inbox::collect_inbox_files(&paths.inbox_dir)?;
    let mut by_date: BTreeMap<String, usize> = BTreeMap::new();
    for file in &files {
        if let Ok(date) = inbox::extract_date(file) {
            *by_date.entry(date).or_default() += 1;
        }
    }
    report.detail(format!("inbox: {} memo(s) pending", files.len()));
    for (date, count) in &by_date {
        report.detail(format!("  {date}: {count}"));
    }

    let log_count = match fs::read_dir(&paths.projects_dir) {
        Ok(read_dir) => read_dir
            .flatten()
            .filter(|entry| {
                entry
                    .path()
                    .extension()
                    .is_some_and(|ext| ext.eq_ignore_ascii_case("md"))
            })
            .count(),
        Err(_) => 0,
    };
    report.detail(format!("project logs: {log_count}"));

    Ok(report)
}
