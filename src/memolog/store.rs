//! One markdown log file per project.

use anyhow::{Context, Result};
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use tempfile::NamedTempFile;

/// Filesystem-safe log filename for a project display name. Path
/// separators are replaced; everything else passes through, so the
/// transform is deterministic but not injective — collisions between
/// distinct project names are rejected at config load.
pub fn safe_file_name(project: &str) -> String {
    format!("{}.md", project.replace(['/', '\\'], "-"))
}

#[derive(Debug, Clone)]
pub struct LogStore {
    projects_dir: PathBuf,
}

impl LogStore {
    pub fn new(projects_dir: impl Into<PathBuf>) -> Self {
        Self {
            projects_dir: projects_dir.into(),
        }
    }

    pub fn path_for(&self, project: &str) -> PathBuf {
        self.projects_dir.join(safe_file_name(project))
    }

    /// Full current log text for `project`, or `""` before the first write.
    pub fn load(&self, project: &str) -> Result<String> {
        let path = self.path_for(project);
        if !path.exists() {
            return Ok(String::new());
        }
        fs::read_to_string(&path).with_context(|| format!("failed to read {}", path.display()))
    }

    /// Replace the whole log file atomically. The merge already produced
    /// the complete new content, so this is a full overwrite, never an
    /// append.
    pub fn save(&self, project: &str, text: &str) -> Result<()> {
        fs::create_dir_all(&self.projects_dir)
            .with_context(|| format!("failed to create {}", self.projects_dir.display()))?;

        let path = self.path_for(project);
        let mut tmp = NamedTempFile::new_in(&self.projects_dir)
            .with_context(|| format!("failed to stage write in {}", self.projects_dir.display()))?;
        tmp.write_all(text.as_bytes())
            .with_context(|| format!("failed to stage content for {}", path.display()))?;
        tmp.persist(&path)
            .with_context(|| format!("failed to write {}", path.display()))?;
        Ok(())
    }
}
