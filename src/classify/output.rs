//! Parsing and re-shaping of classifier output.

use crate::classify::{ClassifiedEntry, ClassifyRequest};
use anyhow::{Context, Result};

/// Drop a surrounding markdown code fence, if any. Models wrap JSON in
/// fences no matter how firmly the prompt forbids it.
pub fn strip_code_fences(text: &str) -> String {
    let mut t = text.trim();
    if t.starts_with("```") {
        t = match t.find('\n') {
            Some(i) => &t[i + 1..],
            None => "",
        };
    }
    if t.ends_with("```")
        && let Some(i) = t.rfind("```")
    {
        t = &t[..i];
    }
    t.trim().to_string()
}

pub fn parse_entries(raw: &str) -> Result<Vec<ClassifiedEntry>> {
    let cleaned = strip_code_fences(raw);
    let entries: Vec<ClassifiedEntry> =
        serde_json::from_str(&cleaned).context("classifier output is not a JSON entry array")?;
    Ok(entries)
}

/// Re-shape free text into bullets under the first recognized subsection,
/// so it survives the merger's unrecognized-line filter. Returns `""`
/// when there is nothing worth keeping.
pub fn bulletize(text: &str, sections: &[String]) -> String {
    let Some(section) = sections.first() else {
        return String::new();
    };

    let mut bullets = String::new();
    for line in text.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let normalized = trimmed.trim_start_matches("- ").trim();
        if normalized.is_empty() {
            continue;
        }
        bullets.push_str("- ");
        bullets.push_str(normalized);
        bullets.push('\n');
    }

    if bullets.is_empty() {
        return String::new();
    }
    format!("{section}\n{bullets}")
}

/// Structural trust only: drop entries with no content and re-route any
/// project name outside the catalog to the unclassified sentinel.
pub fn normalize_entries(
    entries: Vec<ClassifiedEntry>,
    req: &ClassifyRequest,
) -> Vec<ClassifiedEntry> {
    let mut out = Vec::with_capacity(entries.len());
    for mut entry in entries {
        if entry.entry.trim().is_empty() {
            continue;
        }
        if entry.project != req.unclassified && !req.catalog.contains(&entry.project) {
            entry.project = req.unclassified.to_string();
        }
        out.push(entry);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::{bulletize, normalize_entries, parse_entries, strip_code_fences};
    use crate::classify::{ClassifiedEntry, ClassifyRequest};
    use crate::memolog::catalog::{ProjectCatalog, ProjectEntry};

    #[test]
    fn strips_fenced_json() {
        let raw = "```json\n[{\"project\": \"P\", \"entry\": \"x\"}]\n```";
        assert_eq!(strip_code_fences(raw), "[{\"project\": \"P\", \"entry\": \"x\"}]");
    }

    #[test]
    fn unfenced_text_passes_through() {
        assert_eq!(strip_code_fences("  [1, 2]  "), "[1, 2]");
    }

    #[test]
    fn parses_entry_array() {
        let raw = r#"[{"project": "Harbor", "entry": "Decisions:\n- A"}]"#;
        let got = parse_entries(raw).expect("parse");
        assert_eq!(
            got,
            vec![ClassifiedEntry {
                project: "Harbor".to_string(),
                entry: "Decisions:\n- A".to_string(),
            }]
        );
    }

    #[test]
    fn malformed_output_is_an_error() {
        assert!(parse_entries("I could not classify this memo.").is_err());
    }

    #[test]
    fn bulletize_normalizes_lines_and_skips_blanks() {
        let sections = vec!["Decisions:".to_string()];
        let got = bulletize("first\n\n- second\n   \n", &sections);
        assert_eq!(got, "Decisions:\n- first\n- second\n");
    }

    #[test]
    fn bulletize_of_empty_text_is_empty() {
        let sections = vec!["Decisions:".to_string()];
        assert_eq!(bulletize("  \n\n", &sections), "");
    }

    #[test]
    fn unknown_projects_are_rerouted_to_the_sentinel() {
        let catalog = ProjectCatalog::new(vec![ProjectEntry {
            name: "Harbor".to_string(),
            aliases: Vec::new(),
        }]);
        let sections = vec!["Decisions:".to_string()];
        let req = ClassifyRequest {
            memo_text: "",
            catalog: &catalog,
            sections: &sections,
            unclassified: "_unfiled",
        };

        let entries = vec![
            ClassifiedEntry {
                project: "Harbor".to_string(),
                entry: "Decisions:\n- keep".to_string(),
            },
            ClassifiedEntry {
                project: "Hallucinated".to_string(),
                entry: "Decisions:\n- reroute".to_string(),
            },
            ClassifiedEntry {
                project: "Harbor".to_string(),
                entry: "   ".to_string(),
            },
        ];
        let got = normalize_entries(entries, &req);

        assert_eq!(got.len(), 2);
        assert_eq!(got[0].project, "Harbor");
        assert_eq!(got[1].project, "_unfiled");
    }
}
