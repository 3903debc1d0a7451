use crate::error::MemologError;
use crate::memolog::catalog::{ProjectCatalog, ProjectEntry};
use crate::memolog::store::safe_file_name;
use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifyConfig {
    /// `auto`, `local`, or a provider alias (`openai`, `anthropic`,
    /// `gemini`, `openai-compatible`).
    #[serde(default = "default_classify_provider")]
    pub provider: String,
    /// Model name, optionally provider-prefixed (`openai:gpt-4.1-mini`).
    /// Empty means the provider's default.
    #[serde(default)]
    pub model: String,
}

fn default_classify_provider() -> String {
    "auto".to_string()
}

impl Default for ClassifyConfig {
    fn default() -> Self {
        Self {
            provider: default_classify_provider(),
            model: String::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogFormatConfig {
    /// Recognized subsection headers, in canonical emission order. Matched
    /// verbatim, trailing colon included.
    #[serde(default = "default_sections")]
    pub sections: Vec<String>,
    /// Project value for content that could not be classified.
    #[serde(default = "default_unclassified")]
    pub unclassified: String,
}

fn default_sections() -> Vec<String> {
    vec![
        "Decisions / agreements:".to_string(),
        "Signals / attention points:".to_string(),
    ]
}

fn default_unclassified() -> String {
    "_unfiled".to_string()
}

impl Default for LogFormatConfig {
    fn default() -> Self {
        Self {
            sections: default_sections(),
            unclassified: default_unclassified(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct MemologConfig {
    pub classify: ClassifyConfig,
    pub log: LogFormatConfig,
    #[serde(default, rename = "project")]
    pub projects: Vec<ProjectEntry>,
}

impl MemologConfig {
    pub fn catalog(&self) -> ProjectCatalog {
        ProjectCatalog::new(self.projects.clone())
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
struct PartialMemologConfig {
    classify: Option<ClassifyConfig>,
    log: Option<LogFormatConfig>,
    #[serde(rename = "project")]
    projects: Option<Vec<ProjectEntry>>,
}

fn env_or_string(var: &str, fallback: &str) -> String {
    match env::var(var) {
        Ok(v) if !v.trim().is_empty() => v.trim().to_string(),
        _ => fallback.to_string(),
    }
}

fn env_or_csv(var: &str, fallback: &[String]) -> Vec<String> {
    match env::var(var) {
        Ok(v) => {
            let out = v
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(ToOwned::to_owned)
                .collect::<Vec<_>>();
            if out.is_empty() { fallback.to_vec() } else { out }
        }
        Err(_) => fallback.to_vec(),
    }
}

fn invalid(message: impl Into<String>) -> anyhow::Error {
    MemologError::InvalidConfig(message.into()).into()
}

pub(crate) fn validate(cfg: &MemologConfig) -> Result<()> {
    if cfg.log.sections.is_empty() {
        return Err(invalid("at least one subsection name is required"));
    }
    for name in &cfg.log.sections {
        if name.trim().is_empty() {
            return Err(invalid("subsection names cannot be blank"));
        }
        if !name.trim_end().ends_with(':') {
            return Err(invalid(format!(
                "subsection name `{name}` must end with a colon"
            )));
        }
    }
    if cfg.log.unclassified.trim().is_empty() {
        return Err(invalid("the unclassified project name cannot be blank"));
    }
    if cfg.classify.provider.trim().is_empty() {
        return Err(invalid("classify provider cannot be blank"));
    }

    // Distinct project names must land in distinct log files; the
    // unclassified sentinel claims a file too.
    let mut by_file: BTreeMap<String, &str> = BTreeMap::new();
    by_file.insert(
        safe_file_name(&cfg.log.unclassified),
        cfg.log.unclassified.as_str(),
    );
    for entry in &cfg.projects {
        if entry.name.trim().is_empty() {
            return Err(invalid("project names cannot be blank"));
        }
        if let Some(other) = by_file.insert(safe_file_name(&entry.name), &entry.name) {
            return Err(invalid(format!(
                "projects `{other}` and `{}` share the log file `{}`",
                entry.name,
                safe_file_name(&entry.name)
            )));
        }
    }
    Ok(())
}

pub fn resolve_config_path() -> Option<PathBuf> {
    if let Ok(custom) = env::var("MEMOLOG_CONFIG_PATH") {
        let trimmed = custom.trim();
        if !trimmed.is_empty() {
            return Some(PathBuf::from(trimmed));
        }
    }

    let home = dirs::home_dir()?;
    Some(home.join(".memolog").join("memolog.toml"))
}

/// Defaults overlaid with whatever `path` provides; absent file means
/// plain defaults. No env overrides, no validation.
pub fn read_config_file(path: &Path) -> Result<MemologConfig> {
    let mut cfg = MemologConfig::default();
    if !path.exists() {
        return Ok(cfg);
    }

    let raw =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    let parsed: PartialMemologConfig = toml::from_str(&raw)
        .map_err(|err| anyhow!("failed to parse config {}: {err}", path.display()))?;
    if let Some(classify) = parsed.classify {
        cfg.classify = classify;
    }
    if let Some(log) = parsed.log {
        cfg.log = log;
    }
    if let Some(projects) = parsed.projects {
        cfg.projects = projects;
    }
    Ok(cfg)
}

pub fn write_config_file(path: &Path, cfg: &MemologConfig) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let raw = toml::to_string_pretty(cfg).context("failed to serialize config")?;
    fs::write(path, raw).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}

pub fn load_config() -> Result<MemologConfig> {
    let mut cfg = match resolve_config_path() {
        Some(path) => read_config_file(&path)?,
        None => MemologConfig::default(),
    };

    cfg.classify.provider = env_or_string("MEMOLOG_CLASSIFY_PROVIDER", &cfg.classify.provider);
    cfg.classify.model = env_or_string("MEMOLOG_CLASSIFY_MODEL", &cfg.classify.model);
    cfg.log.sections = env_or_csv("MEMOLOG_SECTIONS", &cfg.log.sections);
    cfg.log.unclassified = env_or_string("MEMOLOG_UNCLASSIFIED", &cfg.log.unclassified);

    validate(&cfg)?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::{MemologConfig, validate};
    use crate::memolog::catalog::ProjectEntry;

    fn project(name: &str) -> ProjectEntry {
        ProjectEntry {
            name: name.to_string(),
            aliases: Vec::new(),
        }
    }

    #[test]
    fn defaults_validate() {
        let cfg = MemologConfig::default();
        assert!(validate(&cfg).is_ok());
    }

    #[test]
    fn empty_section_list_is_rejected() {
        let mut cfg = MemologConfig::default();
        cfg.log.sections.clear();
        assert!(validate(&cfg).is_err());
    }

    #[test]
    fn section_without_colon_is_rejected() {
        let mut cfg = MemologConfig::default();
        cfg.log.sections = vec!["Decisions".to_string()];
        assert!(validate(&cfg).is_err());
    }

    #[test]
    fn duplicate_project_names_are_rejected() {
        let mut cfg = MemologConfig::default();
        cfg.projects = vec![project("Harbor"), project("Harbor")];
        assert!(validate(&cfg).is_err());
    }

    #[test]
    fn safe_filename_collisions_are_rejected() {
        let mut cfg = MemologConfig::default();
        cfg.projects = vec![project("a/b"), project("a\\b")];
        assert!(validate(&cfg).is_err());
    }

    #[test]
    fn project_colliding_with_sentinel_file_is_rejected() {
        let mut cfg = MemologConfig::default();
        cfg.projects = vec![project("_unfiled")];
        assert!(validate(&cfg).is_err());
    }
}
