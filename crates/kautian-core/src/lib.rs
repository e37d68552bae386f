//! Kautian dictionary reshaping
//!
//! Turns the relational dictionary workbook (entries, definitions, example
//! sentences and the named cross-reference sheets) into two derived forms:
//! - a document tree: one nested record per entry, definitions and relations embedded
//! - a flattened row set: one row per definition, list-valued relations as JSON text
//!
//! The crate is a pure, in-memory batch transform. Loading workbooks and
//! writing JSON/CSV files lives in `kautian-io`.
//!
//! ```text
//!  Workbook ──► group() ──► RelationMaps ─┐
//!     │                                    ├──► assemble() ──► documents ──► flatten() ──► RowSet
//!     └──────── entries / definitions ─────┘
//! ```

pub mod assemble;
pub mod error;
pub mod flatten;
pub mod grouping;
pub mod json_text;
pub mod schema;
pub mod table;
pub mod transform;

pub use assemble::{assemble, Assembly, Document, OrphanReport, RelationMaps};
pub use error::{Result, TransformError};
pub use flatten::{flatten, RowSet};
pub use grouping::{group, GroupKey, Grouped, KeyPart};
pub use schema::{RelationKind, RelationScope, Schema, DEFINITION_RELATIONS, ENTRY_RELATIONS};
pub use table::{is_missing, normalize_missing, Record, Table, Workbook};
pub use transform::{transform, Transformed};
