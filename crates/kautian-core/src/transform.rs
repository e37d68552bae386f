//! Whole-workbook transform: group → assemble → flatten.

use crate::assemble::{assemble, Document, OrphanReport, RelationMaps};
use crate::error::{Result, TransformError};
use crate::flatten::{flatten, RowSet};
use crate::schema::Schema;
use crate::table::Workbook;
use tracing::info;

/// Both derived forms of one workbook.
#[derive(Debug, Clone)]
pub struct Transformed {
    pub documents: Vec<Document>,
    pub rows: RowSet,
    pub orphans: OrphanReport,
}

impl Transformed {
    /// Definitions attached across all documents.
    pub fn definition_count(&self, schema: &Schema) -> usize {
        self.documents
            .iter()
            .filter_map(|doc| doc.get(&schema.definitions_field))
            .filter_map(|defs| defs.as_array())
            .map(Vec::len)
            .sum()
    }
}

/// Run the full transform. Only the entry table is required; every other
/// sheet named by `schema` reads as empty when absent.
pub fn transform(workbook: &Workbook, schema: &Schema) -> Result<Transformed> {
    let entries = workbook
        .get(&schema.entry_table)
        .ok_or_else(|| TransformError::MissingTable {
            table: schema.entry_table.clone(),
        })?;
    let definitions = workbook.table_or_empty(&schema.definition_table);

    let relations = RelationMaps::build(workbook, schema)?;
    let assembly = assemble(entries, definitions, &relations, schema);
    if !assembly.orphans.is_empty() {
        info!(
            definitions = assembly.orphans.definitions,
            sentences = assembly.orphans.sentences,
            relations = assembly.orphans.relations.values().sum::<usize>(),
            "excluded rows referencing unknown parents"
        );
    }

    let rows = flatten(&assembly.documents, schema)?;
    info!(
        entries = assembly.documents.len(),
        definitions = definitions.len(),
        rows = rows.len(),
        "transformed workbook"
    );

    Ok(Transformed {
        documents: assembly.documents,
        rows,
        orphans: assembly.orphans,
    })
}
