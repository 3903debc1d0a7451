//! The `catalog` subcommands: inspect and update the project catalog.

use crate::commands::CommandReport;
use crate::memolog::config::{self, load_config};
use anyhow::{Context, Result};

pub fn list() -> Result<CommandReport> {
    let mut report = CommandReport::new("catalog list");
    let cfg = load_config()?;
    let catalog = cfg.catalog();

    report.detail(format!("{} project(s)", catalog.len()));
    for entry in catalog.entries() {
        report.detail(format!("{} (aliases: {})", entry.name, entry.aliases.join(", ")));
    }
    Ok(report)
}

pub fn add_alias(project: &str, aliases: &[String]) -> Result<CommandReport> {
    let mut report = CommandReport::new("catalog add-alias");
    let path = config::resolve_config_path().context("config path could not be resolved")?;

    let mut cfg = config::read_config_file(&path)?;
    let updated = cfg.catalog().with_aliases(project, aliases)?;
    cfg.projects = updated.entries().to_vec();
    config::validate(&cfg)?;
    config::write_config_file(&path, &cfg)?;

    let entry = cfg
        .projects
        .iter()
        .find(|entry| entry.name == project)
        .context("project vanished during update")?;
    report.detail(format!(
        "{}: aliases now [{}]",
        entry.name,
        entry.aliases.join(", ")
    ));
    report.detail(format!("written to {}", path.display()));
    Ok(report)
}
