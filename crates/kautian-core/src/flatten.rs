//! Flattener: entry documents → one row per definition.
//!
//! List-valued relation fields become JSON-array text, or null when the
//! list is empty. Entries without definitions yield a single row with no
//! definition columns, so rows may differ in their column sets;
//! [`RowSet::columns`] gives the union for tabular writers.

use crate::assemble::Document;
use crate::error::{Result, TransformError};
use crate::json_text::to_spaced_string;
use crate::schema::Schema;
use crate::table::Record;
use serde_json::Value;
use std::collections::HashSet;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RowSet {
    rows: Vec<Record>,
}

impl RowSet {
    pub fn rows(&self) -> &[Record] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<Record> {
        self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Record> {
        self.rows.iter()
    }

    /// Union of column names across all rows, in first-seen order.
    pub fn columns(&self) -> Vec<String> {
        let mut seen: HashSet<&str> = HashSet::new();
        let mut columns = Vec::new();
        for row in &self.rows {
            for column in row.keys() {
                if seen.insert(column.as_str()) {
                    columns.push(column.clone());
                }
            }
        }
        columns
    }
}

impl From<Vec<Record>> for RowSet {
    fn from(rows: Vec<Record>) -> Self {
        Self { rows }
    }
}

/// Flatten assembled documents into rows.
pub fn flatten(documents: &[Document], schema: &Schema) -> Result<RowSet> {
    let mut rows = Vec::with_capacity(documents.len());

    for document in documents {
        let mut base = scalar_fields(document);
        // Once per entry; cloned into every definition row below.
        for kind in schema.entry_relations() {
            base.insert(kind.name.clone(), list_cell(document, &kind.name)?);
        }

        let definitions = match document.get(&schema.definitions_field) {
            Some(Value::Array(items)) if !items.is_empty() => items,
            _ => {
                rows.push(base);
                continue;
            }
        };

        for (index, definition) in definitions.iter().enumerate() {
            let Value::Object(definition) = definition else {
                return Err(TransformError::MalformedTable {
                    table: schema.definitions_field.clone(),
                    reason: format!("definition {index} is not an object"),
                });
            };
            let mut row = base.clone();
            for (column, value) in definition.iter().filter(|(_, v)| !v.is_array()) {
                row.insert(column.clone(), value.clone());
            }
            row.insert(
                schema.sentences_field.clone(),
                list_cell(definition, &schema.sentences_field)?,
            );
            for kind in schema.definition_relations() {
                row.insert(kind.name.clone(), list_cell(definition, &kind.name)?);
            }
            rows.push(row);
        }
    }

    Ok(RowSet { rows })
}

fn scalar_fields(document: &Record) -> Record {
    document
        .iter()
        .filter(|(_, value)| !value.is_array())
        .map(|(column, value)| (column.clone(), value.clone()))
        .collect()
}

fn list_cell(record: &Record, field: &str) -> Result<Value> {
    match record.get(field) {
        Some(Value::Array(items)) if !items.is_empty() => to_spaced_string(items)
            .map(Value::String)
            .map_err(|source| TransformError::Serialization {
                field: field.to_string(),
                source,
            }),
        _ => Ok(Value::Null),
    }
}
