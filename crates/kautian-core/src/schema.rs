//! Relation vocabulary and the column/field names the transform joins on.
//!
//! Adding a relation kind means adding one [`RelationKind`] to
//! [`Schema::relations`]; the loader, assembler and flattener all read it
//! from here.

use serde::{Deserialize, Serialize};

/// Entry-level relation sheets, keyed by `詞目id`.
pub const ENTRY_RELATIONS: [&str; 10] = [
    "又唸作",
    "合音唸作",
    "俗唸作",
    "語音差異",
    "詞彙比較",
    "名",
    "姓",
    "異用字",
    "詞目tuì詞目近義",
    "詞目tuì詞目反義",
];

/// Definition-level relation sheets, keyed by `(詞目id, 義項id)`.
pub const DEFINITION_RELATIONS: [&str; 4] = [
    "義項tuì義項近義",
    "義項tuì義項反義",
    "義項tuì詞目近義",
    "義項tuì詞目反義",
];

/// Which record a relation hangs off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationScope {
    Entry,
    Definition,
}

impl RelationScope {
    /// Number of key columns the relation sheet is grouped by.
    pub fn key_arity(self) -> usize {
        match self {
            RelationScope::Entry => 1,
            RelationScope::Definition => 2,
        }
    }
}

/// A named relation sheet. The name doubles as the embedded field name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationKind {
    pub name: String,
    pub scope: RelationScope,
}

impl RelationKind {
    pub fn entry(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            scope: RelationScope::Entry,
        }
    }

    pub fn definition(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            scope: RelationScope::Definition,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Schema {
    pub entry_table: String,
    pub definition_table: String,
    pub sentence_table: String,
    /// Entry key column (`詞目id`).
    pub entry_key: String,
    /// Definition key column, unique within an entry (`義項id`).
    pub definition_key: String,
    /// Field holding the definition list in an entry document.
    pub definitions_field: String,
    /// Field holding the sentence list in a definition document.
    pub sentences_field: String,
    pub relations: Vec<RelationKind>,
}

impl Default for Schema {
    fn default() -> Self {
        let relations = ENTRY_RELATIONS
            .iter()
            .map(|name| RelationKind::entry(*name))
            .chain(
                DEFINITION_RELATIONS
                    .iter()
                    .map(|name| RelationKind::definition(*name)),
            )
            .collect();

        Self {
            entry_table: "詞目".to_string(),
            definition_table: "義項".to_string(),
            sentence_table: "例句".to_string(),
            entry_key: "詞目id".to_string(),
            definition_key: "義項id".to_string(),
            definitions_field: "義項".to_string(),
            sentences_field: "例句".to_string(),
            relations,
        }
    }
}

impl Schema {
    pub fn entry_relations(&self) -> impl Iterator<Item = &RelationKind> {
        self.relations_in(RelationScope::Entry)
    }

    pub fn definition_relations(&self) -> impl Iterator<Item = &RelationKind> {
        self.relations_in(RelationScope::Definition)
    }

    fn relations_in(&self, scope: RelationScope) -> impl Iterator<Item = &RelationKind> {
        self.relations.iter().filter(move |kind| kind.scope == scope)
    }

    /// Key columns used to group sheets attached at `scope`.
    pub fn key_columns(&self, scope: RelationScope) -> Vec<&str> {
        let columns = [self.entry_key.as_str(), self.definition_key.as_str()];
        columns[..scope.key_arity()].to_vec()
    }

    /// Every sheet the transform reads, entry table first.
    pub fn sheet_names(&self) -> Vec<&str> {
        let mut names = vec![
            self.entry_table.as_str(),
            self.definition_table.as_str(),
            self.sentence_table.as_str(),
        ];
        names.extend(self.relations.iter().map(|kind| kind.name.as_str()));
        names
    }
}
