//! Kautian I/O
//!
//! Everything around the in-memory transform in `kautian-core`:
//! - loading a JSON workbook (sheet name → rows) into a [`Workbook`](kautian_core::Workbook)
//! - writing the document tree as pretty JSON and the rows as CSV
//! - SHA-256 manifests and timestamped, versioned publishing
//!
//! Outputs are rendered fully in memory before any file is written, and every
//! file goes through [`write_atomic`].

pub mod convert;
pub mod manifest;
pub mod publish;
pub mod workbook;
pub mod writers;

pub use convert::{convert_workbook, load_schema};
pub use manifest::{sha256_file, Manifest};
pub use publish::{publish, PublishOutcome};
pub use workbook::{load_workbook, parse_workbook};
pub use writers::{render_csv, render_documents, write_atomic};
