//! JSON-lines persistence helpers.
//!
//! Corpus reads apply the upstream newline quirk: some producers double-escape
//! line breaks, so a literal `\n` in file content is treated as a real newline
//! before splitting. Files this crate writes itself are read back with
//! [`read_records_raw`], since `serde_json` escapes embedded newlines as `\n`
//! inside strings and the quirk would split those lines. Writes go to a temporary file next to the destination
//! and are renamed over it, so a failed write never truncates the old file.

use crate::error::{CorpusError, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::io::{BufWriter, Write};
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::debug;

/// Replace literal `\n` escape sequences with real newlines.
pub fn unescape_newlines(text: &str) -> String {
    text.replace("\\n", "\n")
}

/// Parse every non-empty line of `path` as one `T`.
///
/// Blank lines are skipped. The first unparseable line aborts the read with
/// [`CorpusError::MalformedRecord`].
pub fn read_records<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let content = fs::read_to_string(path)?;
    parse_records(path, &unescape_newlines(&content))
}

/// Like [`read_records`] but without the newline quirk; for files written by
/// [`write_records`].
pub fn read_records_raw<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let content = fs::read_to_string(path)?;
    parse_records(path, &content)
}

pub(crate) fn parse_records<T: DeserializeOwned>(path: &Path, content: &str) -> Result<Vec<T>> {
    let mut records = Vec::new();

    for (idx, raw) in content.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }
        let record = serde_json::from_str(line).map_err(|source| CorpusError::MalformedRecord {
            path: path.to_path_buf(),
            line: idx + 1,
            source,
        })?;
        records.push(record);
    }

    Ok(records)
}

/// Serialize `rows` one per line and atomically replace `path`.
pub fn write_records<T: Serialize>(path: &Path, rows: &[T]) -> Result<()> {
    let mut temp = temp_file_beside(path)?;
    {
        let mut writer = BufWriter::new(temp.as_file_mut());
        for row in rows {
            serde_json::to_writer(&mut writer, row)?;
            writer.write_all(b"\n")?;
        }
        writer.flush()?;
    }
    commit(temp, path)?;
    debug!(path = %path.display(), rows = rows.len(), "Wrote JSONL");
    Ok(())
}

/// Atomically replace `path` with `content`.
pub fn write_text(path: &Path, content: &str) -> Result<()> {
    let mut temp = temp_file_beside(path)?;
    temp.write_all(content.as_bytes())?;
    temp.flush()?;
    commit(temp, path)?;
    debug!(path = %path.display(), bytes = content.len(), "Wrote file");
    Ok(())
}

fn temp_file_beside(path: &Path) -> Result<NamedTempFile> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent)?;
    Ok(NamedTempFile::new_in(parent)?)
}

fn commit(temp: NamedTempFile, path: &Path) -> Result<()> {
    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|e| CorpusError::Io(e.error))?;
    Ok(())
}
