//! Structural scanning of a project log's markdown text.
//!
//! A log is a sequence of date blocks. Each block starts with a header line
//! `## YYYY-MM-DD` and runs until the next `## ` header or end of file.
//! Inside a block, recognized subsection headers introduce runs of `- `
//! bullet lines. All functions here are pure; nothing touches the
//! filesystem.

use std::collections::BTreeMap;

/// Line range of one date block: `start` is the header line, `end` is the
/// index of the next `## ` header (exclusive) or one past the last line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockRange {
    pub start: usize,
    pub end: usize,
}

pub fn date_header(date: &str) -> String {
    format!("## {date}")
}

/// Locate the block for `date` in `lines`.
///
/// The header must occupy a whole line (exact match after trimming), so a
/// date mentioned inside a bullet never forms a structural boundary.
pub fn find_date_block(lines: &[&str], date: &str) -> Option<BlockRange> {
    let header = date_header(date);
    let mut start = None;

    for (i, line) in lines.iter().enumerate() {
        match start {
            None if line.trim() == header => start = Some(i),
            Some(s) if line.starts_with("## ") => {
                return Some(BlockRange { start: s, end: i });
            }
            _ => {}
        }
    }

    start.map(|s| BlockRange {
        start: s,
        end: lines.len(),
    })
}

/// Split `text` into `{subsection name: [bullet lines]}` for the recognized
/// subsection `names`, via a single linear scan with the current subsection
/// as the only state. Lines outside a recognized subsection, and non-bullet
/// lines inside one, are ignored: malformed classifier output must not leak
/// into a log.
pub fn split_subsections(text: &str, names: &[String]) -> BTreeMap<String, Vec<String>> {
    let mut out: BTreeMap<String, Vec<String>> = BTreeMap::new();
    let mut current: Option<&str> = None;

    for line in text.lines() {
        let trimmed = line.trim();
        if let Some(name) = names.iter().find(|name| name.as_str() == trimmed) {
            current = Some(name.as_str());
            out.entry(name.clone()).or_default();
        } else if let Some(name) = current
            && trimmed.starts_with("- ")
            && let Some(bullets) = out.get_mut(name)
        {
            bullets.push(line.to_string());
        }
    }

    out
}
