//! The project catalog: canonical names and their alias search-terms.
//!
//! The catalog is an explicit value passed into classification and log
//! filename derivation. It is never mutated in place; the one update
//! operation returns a new catalog, which the caller persists.

use anyhow::Result;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectEntry {
    pub name: String,
    #[serde(default)]
    pub aliases: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ProjectCatalog {
    entries: Vec<ProjectEntry>,
}

impl ProjectCatalog {
    pub fn new(entries: Vec<ProjectEntry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[ProjectEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|entry| entry.name == name)
    }

    /// Return a new catalog with `additions` appended to `project`'s
    /// aliases. Blank and already-known aliases are dropped; the receiver
    /// is left untouched.
    pub fn with_aliases(&self, project: &str, additions: &[String]) -> Result<ProjectCatalog> {
        let mut entries = self.entries.clone();
        let Some(entry) = entries.iter_mut().find(|entry| entry.name == project) else {
            anyhow::bail!("unknown project `{project}`");
        };

        for alias in additions {
            let trimmed = alias.trim();
            if trimmed.is_empty() || entry.aliases.iter().any(|known| known == trimmed) {
                continue;
            }
            entry.aliases.push(trimmed.to_string());
        }

        Ok(ProjectCatalog { entries })
    }
}
