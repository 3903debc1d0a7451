pub mod gateway;
pub mod output;
pub mod transcribe;

use crate::memolog::catalog::ProjectCatalog;
use crate::memolog::config::ClassifyConfig;
use crate::memolog::warn::{self, WarnEvent};
use serde::{Deserialize, Serialize};

/// One classified assignment: a canonical project name (or the
/// unclassified sentinel) and sectioned markdown content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifiedEntry {
    pub project: String,
    pub entry: String,
}

#[derive(Debug, Clone)]
pub struct ClassifyRequest<'a> {
    pub memo_text: &'a str,
    pub catalog: &'a ProjectCatalog,
    pub sections: &'a [String],
    pub unclassified: &'a str,
}

/// Classify one memo, returning the provider label used and the entries.
///
/// Degradation order mirrors the rest of the pipeline's bias for
/// over-preservation: a remote classifier whose output fails to parse has
/// its raw output re-shaped into bullets under the sentinel; a remote
/// transport failure, or no configured provider, falls back to local alias
/// matching. Content is never discarded here.
pub fn classify_memo(req: &ClassifyRequest, cfg: &ClassifyConfig) -> (String, Vec<ClassifiedEntry>) {
    let Some(remote) = gateway::resolve_remote_config(cfg) else {
        return ("local".to_string(), gateway::classify_by_alias(req));
    };

    match gateway::classify_remote(&remote, req) {
        Ok(raw) => match output::parse_entries(&raw) {
            Ok(entries) => (
                remote.label().to_string(),
                output::normalize_entries(entries, req),
            ),
            Err(err) => {
                warn::emit(WarnEvent {
                    code: "CLASSIFIER_OUTPUT_MALFORMED",
                    stage: "classify",
                    action: "parse-entries",
                    file: "",
                    project: req.unclassified,
                    date: "",
                    reason: "raw-output-routed-to-unclassified",
                    err: &format!("{err:#}"),
                });
                let entry = output::bulletize(&raw, req.sections);
                let entries = if entry.is_empty() {
                    Vec::new()
                } else {
                    vec![ClassifiedEntry {
                        project: req.unclassified.to_string(),
                        entry,
                    }]
                };
                (remote.label().to_string(), entries)
            }
        },
        Err(err) => {
            warn::emit(WarnEvent {
                code: "CLASSIFIER_CALL_FAILED",
                stage: "classify",
                action: "remote-call",
                file: "",
                project: "",
                date: "",
                reason: "falling-back-to-alias-match",
                err: &format!("{err:#}"),
            });
            ("local".to_string(), gateway::classify_by_alias(req))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ClassifyRequest, classify_memo};
    use crate::memolog::catalog::{ProjectCatalog, ProjectEntry};
    use crate::memolog::config::ClassifyConfig;

    fn catalog() -> ProjectCatalog {
        ProjectCatalog::new(vec![ProjectEntry {
            name: "Harbor".to_string(),
            aliases: vec!["quay".to_string()],
        }])
    }

    #[test]
    fn local_provider_uses_alias_matching() {
        let catalog = catalog();
        let sections = vec!["Decisions:".to_string()];
        let req = ClassifyRequest {
            memo_text: "Inspected the quay wall today.",
            catalog: &catalog,
            sections: &sections,
            unclassified: "_unfiled",
        };
        let cfg = ClassifyConfig {
            provider: "local".to_string(),
            model: String::new(),
        };

        let (provider, entries) = classify_memo(&req, &cfg);
        assert_eq!(provider, "local");
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].project, "Harbor");
        assert_eq!(entries[0].entry, "Decisions:\n- Inspected the quay wall today.\n");
    }
}
