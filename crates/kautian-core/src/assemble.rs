//! Tree assembler
//!
//! Builds one nested document per entry row:
//!
//! ```text
//! 詞目 { ...entry columns, 又唸作: [..], ..., 義項: [
//!     { ...definition columns, 例句: [..], 義項tuì義項近義: [..], ... }
//! ] }
//! ```
//!
//! Entry order follows the entry sheet. Definitions whose `詞目id` matches no
//! entry are excluded and only show up in the [`OrphanReport`].

use crate::error::Result;
use crate::grouping::{group, GroupKey, Grouped, KeyPart};
use crate::schema::{RelationScope, Schema};
use crate::table::{normalize_missing, Record, Workbook};
use serde::Serialize;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::debug;

/// An assembled entry document (definitions nested under the definitions field).
pub type Document = Record;

/// Sentences and every relation sheet, grouped and ready for lookup.
#[derive(Debug, Clone, Default)]
pub struct RelationMaps {
    pub sentences: Grouped,
    pub entry: BTreeMap<String, Grouped>,
    pub definition: BTreeMap<String, Grouped>,
}

impl RelationMaps {
    /// Group the sentence sheet and all relation sheets named by `schema`.
    /// Sheets missing from the workbook group to empty mappings.
    pub fn build(workbook: &Workbook, schema: &Schema) -> Result<Self> {
        let pair = schema.key_columns(RelationScope::Definition);
        let sentences = group(workbook.table_or_empty(&schema.sentence_table), &pair)?;
        debug!(
            table = %schema.sentence_table,
            rows = sentences.row_count(),
            keys = sentences.len(),
            "grouped sentences"
        );

        let mut maps = RelationMaps {
            sentences,
            ..Default::default()
        };
        for kind in &schema.relations {
            let columns = schema.key_columns(kind.scope);
            let grouped = group(workbook.table_or_empty(&kind.name), &columns)?;
            debug!(
                relation = %kind.name,
                rows = grouped.row_count(),
                keys = grouped.len(),
                "grouped relation"
            );
            match kind.scope {
                RelationScope::Entry => maps.entry.insert(kind.name.clone(), grouped),
                RelationScope::Definition => maps.definition.insert(kind.name.clone(), grouped),
            };
        }
        Ok(maps)
    }

    fn entry_items(&self, name: &str, key: &GroupKey) -> Value {
        items_value(self.entry.get(name).map(|g| g.get(key)).unwrap_or(&[]))
    }

    fn definition_items(&self, name: &str, key: &GroupKey) -> Value {
        items_value(self.definition.get(name).map(|g| g.get(key)).unwrap_or(&[]))
    }
}

fn items_value(items: &[Record]) -> Value {
    Value::Array(items.iter().cloned().map(Value::Object).collect())
}

/// Rows that referenced a parent key no entry/definition carried.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OrphanReport {
    pub definitions: usize,
    pub sentences: usize,
    /// Per relation name; only relations with orphans appear.
    pub relations: BTreeMap<String, usize>,
}

impl OrphanReport {
    pub fn total(&self) -> usize {
        self.definitions + self.sentences + self.relations.values().sum::<usize>()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}

#[derive(Debug, Clone, Default)]
pub struct Assembly {
    pub documents: Vec<Document>,
    pub orphans: OrphanReport,
}

/// Assemble entry documents from the entry and definition sheets plus the
/// pre-grouped sentence/relation maps.
pub fn assemble(
    entries: &[Record],
    definitions: &[Record],
    relations: &RelationMaps,
    schema: &Schema,
) -> Assembly {
    let entry_columns = [schema.entry_key.as_str()];

    // 詞目id -> definition rows, definition sheet order.
    let mut definitions_by_entry: HashMap<GroupKey, Vec<&Record>> = HashMap::new();
    for row in definitions {
        definitions_by_entry
            .entry(GroupKey::of(row, &entry_columns))
            .or_default()
            .push(row);
    }

    let mut entry_keys: HashSet<GroupKey> = HashSet::with_capacity(entries.len());
    let mut definition_keys: HashSet<GroupKey> = HashSet::new();
    let mut documents = Vec::with_capacity(entries.len());

    for entry_row in entries {
        let entry_key = GroupKey::of(entry_row, &entry_columns);
        let mut document = normalize_missing(entry_row);

        for kind in schema.entry_relations() {
            document.insert(kind.name.clone(), relations.entry_items(&kind.name, &entry_key));
        }

        let rows = definitions_by_entry
            .get(&entry_key)
            .map(Vec::as_slice)
            .unwrap_or(&[]);
        let mut definition_docs = Vec::with_capacity(rows.len());
        for definition_row in rows {
            let definition_key =
                entry_key.extended(KeyPart::from(definition_row.get(&schema.definition_key)));
            let mut definition = normalize_missing(definition_row);
            definition.insert(
                schema.sentences_field.clone(),
                items_value(relations.sentences.get(&definition_key)),
            );
            for kind in schema.definition_relations() {
                definition.insert(
                    kind.name.clone(),
                    relations.definition_items(&kind.name, &definition_key),
                );
            }
            definition_docs.push(Value::Object(definition));
            definition_keys.insert(definition_key);
        }

        document.insert(
            schema.definitions_field.clone(),
            Value::Array(definition_docs),
        );
        documents.push(document);
        entry_keys.insert(entry_key);
    }

    let orphans = count_orphans(
        &definitions_by_entry,
        relations,
        &entry_keys,
        &definition_keys,
    );
    Assembly { documents, orphans }
}

fn count_orphans(
    definitions_by_entry: &HashMap<GroupKey, Vec<&Record>>,
    relations: &RelationMaps,
    entry_keys: &HashSet<GroupKey>,
    definition_keys: &HashSet<GroupKey>,
) -> OrphanReport {
    fn unattached(grouped: &Grouped, attached: &HashSet<GroupKey>) -> usize {
        grouped
            .iter()
            .filter(|(key, _)| !attached.contains(*key))
            .map(|(_, items)| items.len())
            .sum()
    }

    let mut report = OrphanReport {
        definitions: definitions_by_entry
            .iter()
            .filter(|(key, _)| !entry_keys.contains(*key))
            .map(|(_, rows)| rows.len())
            .sum(),
        sentences: unattached(&relations.sentences, definition_keys),
        relations: BTreeMap::new(),
    };

    let scoped = relations
        .entry
        .iter()
        .map(|(name, grouped)| (name, unattached(grouped, entry_keys)))
        .chain(
            relations
                .definition
                .iter()
                .map(|(name, grouped)| (name, unattached(grouped, definition_keys))),
        );
    for (name, count) in scoped {
        if count > 0 {
            debug!(relation = %name, rows = count, "orphaned relation rows");
            report.relations.insert(name.clone(), count);
        }
    }
    report
}
