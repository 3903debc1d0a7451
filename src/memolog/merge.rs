//! The date-sectioned merge engine.
//!
//! Merging is append-only with respect to bullet content: no existing
//! bullet is ever dropped or reordered, and new bullets land after the
//! existing ones in their subsection. It is deliberately NOT idempotent —
//! merging the same new content twice duplicates its bullets. Callers
//! guarantee each source file is merged at most once by archiving it after
//! its day's merges are persisted.

use crate::memolog::section;

/// Merge `new_content` (markdown with recognized subsections of bullets)
/// into `existing` under the `## date` block, returning the complete new
/// log text.
///
/// When no block for `date` exists yet the new content is appended verbatim
/// as a fresh block at the end of the file, after a blank-line separator
/// (none when the file was empty). When the block exists, bullets are
/// unioned per subsection in canonical `sections` order and the block is
/// rewritten in place.
pub fn merge_into_log(existing: &str, date: &str, new_content: &str, sections: &[String]) -> String {
    let header = section::date_header(date);
    let lines: Vec<&str> = existing.split('\n').collect();

    let Some(range) = section::find_date_block(&lines, date) else {
        let block = format!("{header}\n\n{}\n\n", new_content.trim());
        if existing.trim().is_empty() {
            return block;
        }
        return format!("{}\n\n{block}", existing.trim_end_matches('\n'));
    };

    let block_text = lines[range.start..range.end].join("\n");
    let merged = merge_date_block(&block_text, new_content, &header, sections);
    let merged_lines: Vec<&str> = merged.split('\n').collect();

    let mut out: Vec<&str> = Vec::with_capacity(lines.len() + merged_lines.len());
    out.extend_from_slice(&lines[..range.start]);
    out.extend_from_slice(&merged_lines);
    out.extend_from_slice(&lines[range.end..]);
    out.join("\n")
}

/// Rebuild one date block: existing bullets first, new bullets after, per
/// subsection in canonical order. A subsection with no bullets is omitted
/// entirely.
fn merge_date_block(
    existing_block: &str,
    new_content: &str,
    header: &str,
    sections: &[String],
) -> String {
    let existing_parts = section::split_subsections(existing_block, sections);
    let new_parts = section::split_subsections(new_content, sections);

    let mut out: Vec<String> = vec![header.to_string(), String::new()];
    for name in sections {
        let mut combined: Vec<String> = Vec::new();
        if let Some(bullets) = existing_parts.get(name) {
            combined.extend(bullets.iter().cloned());
        }
        if let Some(bullets) = new_parts.get(name) {
            combined.extend(bullets.iter().cloned());
        }
        if combined.is_empty() {
            continue;
        }
        out.push(name.clone());
        out.append(&mut combined);
        out.push(String::new());
    }

    format!("{}\n", out.join("\n").trim_end_matches('\n'))
}
