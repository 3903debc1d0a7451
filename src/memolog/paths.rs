use anyhow::{Context, Result};
use std::env;
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct MemologPaths {
    pub home: PathBuf,
    pub inbox_dir: PathBuf,
    pub processed_dir: PathBuf,
    pub projects_dir: PathBuf,
    pub logs_dir: PathBuf,
}

fn required_home_dir() -> Result<PathBuf> {
    if let Some(home) = dirs::home_dir() {
        return Ok(home);
    }
    Err(anyhow::anyhow!("HOME directory could not be resolved"))
}

fn env_or_default_path(var: &str, fallback: PathBuf) -> PathBuf {
    match env::var(var) {
        Ok(v) if !v.trim().is_empty() => PathBuf::from(v.trim()),
        _ => fallback,
    }
}

pub fn resolve_paths() -> Result<MemologPaths> {
    let home = required_home_dir()?;
    let memolog_home = env_or_default_path("MEMOLOG_HOME", home.join("memolog"));

    let inbox_dir = env_or_default_path("MEMOLOG_INBOX_DIR", memolog_home.join("input/inbox"));
    let processed_dir =
        env_or_default_path("MEMOLOG_PROCESSED_DIR", memolog_home.join("input/processed"));
    let projects_dir = env_or_default_path("MEMOLOG_PROJECTS_DIR", memolog_home.join("projects"));
    let logs_dir = env_or_default_path("MEMOLOG_LOGS_DIR", memolog_home.join("logs"));

    Ok(MemologPaths {
        home: memolog_home,
        inbox_dir,
        processed_dir,
        projects_dir,
        logs_dir,
    })
}

pub fn ensure_dirs(paths: &MemologPaths) -> Result<()> {
    for dir in [
        &paths.inbox_dir,
        &paths.processed_dir,
        &paths.projects_dir,
        &paths.logs_dir,
    ] {
        fs::create_dir_all(dir).with_context(|| format!("failed to create {}", dir.display()))?;
    }
    Ok(())
}
