//! Relation grouping engine
//!
//! Indexes a sheet by a one- or two-column key into per-key record lists.
//! Keys compare by value without string coercion: `1` and `1.0` are the
//! same key, `"1"` is not. A missing cell (absent column or null) is its own
//! key component.

use crate::error::{Result, TransformError};
use crate::table::Record;
use serde_json::Value;
use std::collections::BTreeMap;

/// One component of a grouping key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum KeyPart {
    Missing,
    Bool(bool),
    Int(i64),
    UInt(u64),
    /// Non-integral floats, as IEEE-754 bits.
    Float(u64),
    Text(String),
    /// Arrays and objects, by their compact JSON text.
    Json(String),
}

impl From<Option<&Value>> for KeyPart {
    fn from(value: Option<&Value>) -> Self {
        match value {
            None | Some(Value::Null) => KeyPart::Missing,
            Some(Value::Bool(b)) => KeyPart::Bool(*b),
            Some(Value::Number(n)) => {
                if let Some(i) = n.as_i64() {
                    KeyPart::Int(i)
                } else if let Some(u) = n.as_u64() {
                    KeyPart::UInt(u)
                } else {
                    numeric_key(n.as_f64().unwrap_or_default())
                }
            }
            Some(Value::String(s)) => KeyPart::Text(s.clone()),
            Some(other) => KeyPart::Json(other.to_string()),
        }
    }
}

/// Integral floats join their integer counterparts: `1.0` keys like `1`.
fn numeric_key(f: f64) -> KeyPart {
    const TWO_POW_63: f64 = 9_223_372_036_854_775_808.0;
    if f.fract() == 0.0 {
        if (-TWO_POW_63..TWO_POW_63).contains(&f) {
            return KeyPart::Int(f as i64);
        }
        if (0.0..2.0 * TWO_POW_63).contains(&f) {
            return KeyPart::UInt(f as u64);
        }
    }
    KeyPart::Float(f.to_bits())
}

impl From<&Value> for KeyPart {
    fn from(value: &Value) -> Self {
        KeyPart::from(Some(value))
    }
}

/// A composite grouping key: `(詞目id,)` or `(詞目id, 義項id)`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GroupKey(Vec<KeyPart>);

impl GroupKey {
    pub fn new(parts: Vec<KeyPart>) -> Self {
        Self(parts)
    }

    /// Key of `record` over `columns`.
    pub fn of(record: &Record, columns: &[&str]) -> Self {
        Self(
            columns
                .iter()
                .map(|column| KeyPart::from(record.get(*column)))
                .collect(),
        )
    }

    /// This key with one more component appended.
    pub fn extended(&self, part: impl Into<KeyPart>) -> Self {
        let mut parts = self.0.clone();
        parts.push(part.into());
        Self(parts)
    }

    pub fn parts(&self) -> &[KeyPart] {
        &self.0
    }

    /// The leading (entry) component.
    pub fn head(&self) -> Option<&KeyPart> {
        self.0.first()
    }
}

/// Records of one sheet grouped by key, source order kept within each group.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Grouped {
    groups: BTreeMap<GroupKey, Vec<Record>>,
    rows: usize,
}

impl Grouped {
    /// Items for `key`; empty when the key has no rows.
    pub fn get(&self, key: &GroupKey) -> &[Record] {
        self.groups.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn contains(&self, key: &GroupKey) -> bool {
        self.groups.contains_key(key)
    }

    /// Number of distinct keys.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Number of grouped rows across all keys.
    pub fn row_count(&self) -> usize {
        self.rows
    }

    pub fn iter(&self) -> impl Iterator<Item = (&GroupKey, &[Record])> {
        self.groups.iter().map(|(key, items)| (key, items.as_slice()))
    }
}

/// Group `table` by `key_columns` (one or two columns).
///
/// Each item is the source row minus the key columns, other cells untouched.
pub fn group(table: &[Record], key_columns: &[&str]) -> Result<Grouped> {
    if key_columns.is_empty() || key_columns.len() > 2 {
        return Err(TransformError::InvalidKeyArity {
            arity: key_columns.len(),
        });
    }

    let mut grouped = Grouped::default();
    for row in table {
        let key = GroupKey::of(row, key_columns);
        let item: Record = row
            .iter()
            .filter(|(column, _)| !key_columns.contains(&column.as_str()))
            .map(|(column, value)| (column.clone(), value.clone()))
            .collect();
        grouped.groups.entry(key).or_default().push(item);
        grouped.rows += 1;
    }
    Ok(grouped)
}
