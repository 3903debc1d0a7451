//! Inbox discovery, filename date/time conventions, and archival.

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use regex::Regex;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

pub const AUDIO_EXTENSIONS: [&str; 5] = ["m4a", "wav", "mp3", "webm", "mp4"];
pub const TEXT_EXTENSIONS: [&str; 2] = ["txt", "md"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemoKind {
    Audio,
    Text,
}

fn date_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\d{4}-\d{2}-\d{2}").expect("static date pattern"))
}

fn time_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\d{4}-\d{2}-\d{2}_(\d{2})-(\d{2})").expect("static time pattern")
    })
}

pub fn memo_kind(path: &Path) -> Option<MemoKind> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    if AUDIO_EXTENSIONS.contains(&ext.as_str()) {
        return Some(MemoKind::Audio);
    }
    if TEXT_EXTENSIONS.contains(&ext.as_str()) {
        return Some(MemoKind::Text);
    }
    None
}

/// Supported files in the inbox, in lexicographic filename order. That
/// order doubles as arrival order for same-day memos, so bullets end up in
/// chronological order within a day.
pub fn collect_inbox_files(inbox_dir: &Path) -> Result<Vec<PathBuf>> {
    if !inbox_dir.is_dir() {
        return Ok(Vec::new());
    }

    let mut out = Vec::new();
    let read_dir = fs::read_dir(inbox_dir)
        .with_context(|| format!("failed to read {}", inbox_dir.display()))?;
    for entry in read_dir {
        let path = entry?.path();
        if path.is_file() && memo_kind(&path).is_some() {
            out.push(path);
        }
    }
    out.sort();
    Ok(out)
}

/// `YYYY-MM-DD` from the filename, falling back to the file's mtime.
pub fn extract_date(path: &Path) -> Result<String> {
    if let Some(name) = path.file_name().and_then(|s| s.to_str())
        && let Some(found) = date_re().find(name)
    {
        return Ok(found.as_str().to_string());
    }

    let meta =
        fs::metadata(path).with_context(|| format!("failed to stat {}", path.display()))?;
    let modified = meta
        .modified()
        .with_context(|| format!("no modification time for {}", path.display()))?;
    Ok(DateTime::<Local>::from(modified).format("%Y-%m-%d").to_string())
}

/// `HH:MM` from a `YYYY-MM-DD_HH-MM` filename, or `None`.
pub fn extract_time_label(path: &Path) -> Option<String> {
    let stem = path.file_stem()?.to_str()?;
    let caps = time_re().captures(stem)?;
    Some(format!("{}:{}", &caps[1], &caps[2]))
}

fn move_file(from: &Path, to: &Path) -> Result<()> {
    match fs::rename(from, to) {
        Ok(_) => Ok(()),
        Err(rename_err) => {
            if matches!(
                rename_err.kind(),
                ErrorKind::CrossesDevices | ErrorKind::PermissionDenied
            ) {
                fs::copy(from, to).with_context(|| {
                    format!("failed to copy {} to {}", from.display(), to.display())
                })?;
                fs::remove_file(from)
                    .with_context(|| format!("failed to remove {}", from.display()))?;
                Ok(())
            } else {
                Err(rename_err).with_context(|| {
                    format!("failed to move {} to {}", from.display(), to.display())
                })
            }
        }
    }
}

/// Relocate a processed source file into `processed/<date>/`, appending a
/// numeric suffix before the extension on name collision.
pub fn move_to_processed(processed_dir: &Path, source: &Path, date: &str) -> Result<PathBuf> {
    let date_dir = processed_dir.join(date);
    fs::create_dir_all(&date_dir)
        .with_context(|| format!("failed to create {}", date_dir.display()))?;

    let name = source
        .file_name()
        .with_context(|| format!("source has no file name: {}", source.display()))?;
    let mut dest = date_dir.join(name);

    if dest.exists() {
        let stem = source
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("memo");
        let ext = source.extension().and_then(|s| s.to_str());
        let mut counter = 1usize;
        while dest.exists() {
            let candidate = match ext {
                Some(ext) => format!("{stem}_{counter}.{ext}"),
                None => format!("{stem}_{counter}"),
            };
            dest = date_dir.join(candidate);
            counter += 1;
        }
    }

    move_file(source, &dest)?;
    Ok(dest)
}

#[cfg(test)]
mod tests {
    use super::{
        MemoKind, collect_inbox_files, extract_date, extract_time_label, memo_kind,
        move_to_processed,
    };
    use std::fs;
    use std::path::Path;
    use tempfile::tempdir;

    #[test]
    fn memo_kind_by_extension_case_insensitive() {
        assert_eq!(memo_kind(Path::new("a.M4A")), Some(MemoKind::Audio));
        assert_eq!(memo_kind(Path::new("a.txt")), Some(MemoKind::Text));
        assert_eq!(memo_kind(Path::new("a.pdf")), None);
        assert_eq!(memo_kind(Path::new("noext")), None);
    }

    #[test]
    fn date_comes_from_filename_when_present() {
        let got = extract_date(Path::new("2026-01-30_09-14.m4a")).expect("date");
        assert_eq!(got, "2026-01-30");
    }

    #[test]
    fn date_falls_back_to_mtime() {
        let tmp = tempdir().expect("tempdir");
        let path = tmp.path().join("undated.txt");
        fs::write(&path, "x").expect("write");

        let got = extract_date(&path).expect("date");
        assert_eq!(got.len(), 10);
        assert!(chrono::NaiveDate::parse_from_str(&got, "%Y-%m-%d").is_ok());
    }

    #[test]
    fn time_label_from_filename() {
        assert_eq!(
            extract_time_label(Path::new("2026-01-30_09-14.m4a")),
            Some("09:14".to_string())
        );
        assert_eq!(extract_time_label(Path::new("2026-01-30.m4a")), None);
    }

    #[test]
    fn collect_filters_and_sorts() {
        let tmp = tempdir().expect("tempdir");
        for name in ["b.txt", "a.md", "ignored.pdf", "c.m4a"] {
            fs::write(tmp.path().join(name), "x").expect("write");
        }

        let got = collect_inbox_files(tmp.path()).expect("collect");
        let names: Vec<_> = got
            .iter()
            .filter_map(|p| p.file_name().and_then(|s| s.to_str()))
            .collect();
        assert_eq!(names, vec!["a.md", "b.txt", "c.m4a"]);
    }

    #[test]
    fn collect_of_missing_dir_is_empty() {
        let got = collect_inbox_files(Path::new("/nonexistent/inbox")).expect("collect");
        assert!(got.is_empty());
    }

    #[test]
    fn move_to_processed_suffixes_on_collision() {
        let tmp = tempdir().expect("tempdir");
        let processed = tmp.path().join("processed");
        let first = tmp.path().join("memo.txt");
        let second = tmp.path().join("memo.txt");

        fs::write(&first, "one").expect("write");
        let dest1 = move_to_processed(&processed, &first, "2026-01-05").expect("move");
        fs::write(&second, "two").expect("write");
        let dest2 = move_to_processed(&processed, &second, "2026-01-05").expect("move");

        assert_eq!(dest1, processed.join("2026-01-05/memo.txt"));
        assert_eq!(dest2, processed.join("2026-01-05/memo_1.txt"));
        assert_eq!(fs::read_to_string(dest2).expect("read"), "two");
    }
}
