//! Workbook → `kautian.json` + `kautian.csv`.

use crate::workbook::load_workbook;
use crate::writers::{render_csv, render_documents, write_atomic};
use anyhow::{Context, Result};
use kautian_core::{transform, Schema, Transformed};
use std::fs;
use std::path::Path;
use tracing::info;

/// Read a schema override file; `None` gives the kautian vocabulary.
pub fn load_schema(path: Option<&Path>) -> Result<Schema> {
    let Some(path) = path else {
        return Ok(Schema::default());
    };
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read schema {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("invalid schema {}", path.display()))
}

/// Load, transform and write both outputs.
///
/// Both files are rendered before either is written, so a failing transform
/// or serialization leaves existing outputs untouched.
pub fn convert_workbook(
    input: &Path,
    json_out: &Path,
    csv_out: &Path,
    schema: &Schema,
) -> Result<Transformed> {
    let workbook = load_workbook(input, schema)?;
    let transformed = transform(&workbook, schema)
        .with_context(|| format!("failed to transform {}", input.display()))?;

    let json = render_documents(&transformed.documents)?;
    let csv = render_csv(&transformed.rows);

    write_atomic(json_out, &json)?;
    info!(path = %json_out.display(), entries = transformed.documents.len(), "wrote documents");
    write_atomic(csv_out, csv.as_bytes())?;
    info!(path = %csv_out.display(), rows = transformed.rows.len(), "wrote rows");

    Ok(transformed)
}
