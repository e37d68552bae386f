//! Loaded tables: ordered records of column name → cell value.

use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// One sheet row. Column order is the sheet's column order.
pub type Record = Map<String, Value>;

/// One sheet, rows in source order.
pub type Table = Vec<Record>;

/// A set of named tables as handed over by a workbook loader.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Workbook {
    tables: BTreeMap<String, Table>,
}

impl Workbook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert (or replace) a table, returning the previous one.
    pub fn insert(&mut self, name: impl Into<String>, table: Table) -> Option<Table> {
        self.tables.insert(name.into(), table)
    }

    pub fn with_table(mut self, name: impl Into<String>, table: Table) -> Self {
        self.insert(name, table);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Table> {
        self.tables.get(name)
    }

    /// Absent tables read as empty.
    pub fn table_or_empty(&self, name: &str) -> &[Record] {
        self.tables.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.tables.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

/// A spreadsheet cell with no content: null, or an empty string.
pub fn is_missing(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

/// Copy a record, replacing every missing cell with an explicit null.
pub fn normalize_missing(record: &Record) -> Record {
    record
        .iter()
        .map(|(column, value)| {
            let value = if is_missing(value) {
                Value::Null
            } else {
                value.clone()
            };
            (column.clone(), value)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> Record {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn normalize_replaces_empty_strings_and_keeps_column_order() {
        let row = record(json!({"詞目id": 7, "漢字": "", "羅馬字": "tsit", "分類": null}));
        let normalized = normalize_missing(&row);

        let columns: Vec<&str> = normalized.keys().map(String::as_str).collect();
        assert_eq!(columns, vec!["詞目id", "漢字", "羅馬字", "分類"]);
        assert_eq!(normalized["漢字"], Value::Null);
        assert_eq!(normalized["分類"], Value::Null);
        assert_eq!(normalized["羅馬字"], json!("tsit"));
        assert_eq!(normalized["詞目id"], json!(7));
    }

    #[test]
    fn zero_and_false_are_not_missing() {
        assert!(!is_missing(&json!(0)));
        assert!(!is_missing(&json!(false)));
        assert!(!is_missing(&json!(" ")));
        assert!(is_missing(&json!("")));
    }

    #[test]
    fn absent_table_reads_as_empty() {
        let workbook = Workbook::new().with_table("詞目", vec![Record::new()]);
        assert_eq!(workbook.table_or_empty("詞目").len(), 1);
        assert!(workbook.table_or_empty("例句").is_empty());
        assert!(workbook.get("例句").is_none());
    }
}
