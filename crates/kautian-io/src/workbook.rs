//! JSON workbook loader.
//!
//! A workbook file is one JSON object mapping sheet name → array of row
//! objects, e.g. an ODS export:
//!
//! ```json
//! { "詞目": [{"詞目id": 1, "漢字": "一"}], "義項": [...], "例句": [...] }
//! ```

use anyhow::{anyhow, Context, Result};
use kautian_core::{Record, Schema, Table, TransformError, Workbook};
use serde_json::Value;
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

pub fn load_workbook(path: &Path, schema: &Schema) -> Result<Workbook> {
    info!(path = %path.display(), "reading workbook");
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read workbook {}", path.display()))?;
    parse_workbook(&text, schema).with_context(|| format!("in workbook {}", path.display()))
}

/// Parse workbook JSON, keeping only the sheets `schema` names.
///
/// Named sheets that are absent load as empty tables; the entry sheet is left
/// absent so the transform can report it as missing.
pub fn parse_workbook(text: &str, schema: &Schema) -> Result<Workbook> {
    let value: Value = serde_json::from_str(text)?;
    let Value::Object(mut sheets) = value else {
        return Err(anyhow!("workbook must be a JSON object of sheets"));
    };

    let wanted: HashSet<&str> = schema.sheet_names().into_iter().collect();
    for name in sheets.keys().filter(|name| !wanted.contains(name.as_str())) {
        debug!(sheet = %name, "ignoring sheet");
    }

    let mut workbook = Workbook::new();
    for name in schema.sheet_names() {
        match sheets.remove(name) {
            Some(sheet) => {
                let table = parse_sheet(name, sheet)?;
                debug!(sheet = %name, rows = table.len(), "loaded sheet");
                workbook.insert(name, table);
            }
            None => {
                warn!(sheet = %name, "sheet not found");
                if name != schema.entry_table {
                    workbook.insert(name, Table::new());
                }
            }
        }
    }
    Ok(workbook)
}

fn parse_sheet(name: &str, sheet: Value) -> Result<Table, TransformError> {
    let malformed = |reason: String| TransformError::MalformedTable {
        table: name.to_string(),
        reason,
    };

    let Value::Array(rows) = sheet else {
        return Err(malformed("expected an array of rows".to_string()));
    };
    rows.into_iter()
        .enumerate()
        .map(|(i, row)| match row {
            Value::Object(record) => Ok::<Record, _>(record),
            other => Err(malformed(format!("row {i} is not an object: {other}"))),
        })
        .collect()
}
