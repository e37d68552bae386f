//! Document (JSON) and table (CSV) writers.

use anyhow::{Context, Result};
use kautian_core::{Document, Record, RowSet};
use serde_json::Value;
use std::borrow::Cow;
use std::fs;
use std::path::{Path, PathBuf};

/// Pretty-printed UTF-8 JSON array of entry documents (2-space indent).
pub fn render_documents(documents: &[Document]) -> Result<Vec<u8>> {
    let mut out = serde_json::to_vec_pretty(documents).context("failed to serialize documents")?;
    out.push(b'\n');
    Ok(out)
}

/// CSV with a header over the union of all row columns.
///
/// Absent and null cells are empty; strings are written raw; other scalars
/// as their JSON text.
pub fn render_csv(rows: &RowSet) -> String {
    let columns = rows.columns();
    let mut out = String::new();
    if columns.is_empty() {
        return out;
    }

    push_line(&mut out, columns.iter().map(|c| Cow::Borrowed(c.as_str())));
    for row in rows.iter() {
        push_line(&mut out, columns.iter().map(|c| cell_text(row, c)));
    }
    out
}

fn cell_text<'a>(row: &'a Record, column: &str) -> Cow<'a, str> {
    match row.get(column) {
        None | Some(Value::Null) => Cow::Borrowed(""),
        Some(Value::String(s)) => Cow::Borrowed(s.as_str()),
        Some(other) => Cow::Owned(other.to_string()),
    }
}

fn push_line<'a>(out: &mut String, fields: impl Iterator<Item = Cow<'a, str>>) {
    for (i, field) in fields.enumerate() {
        if i > 0 {
            out.push(',');
        }
        if field.contains(&[',', '"', '\n', '\r'][..]) {
            out.push('"');
            out.push_str(&field.replace('"', "\"\""));
            out.push('"');
        } else {
            out.push_str(&field);
        }
    }
    out.push('\n');
}

/// Write `bytes` to a sibling temp file, then rename over `path`.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let tmp = tmp_path(path);
    fs::write(&tmp, bytes).with_context(|| format!("failed to write {}", tmp.display()))?;
    fs::rename(&tmp, path)
        .with_context(|| format!("failed to move {} into place", path.display()))?;
    Ok(())
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}
