//! Error taxonomy for the reshaping pipeline.
//!
//! Orphaned rows are not errors; they are counted in
//! [`OrphanReport`](crate::assemble::OrphanReport).

#[derive(Debug, thiserror::Error)]
pub enum TransformError {
    #[error("required table `{table}` is missing")]
    MissingTable { table: String },

    #[error("table `{table}` is malformed: {reason}")]
    MalformedTable { table: String, reason: String },

    #[error("grouping key must have 1 or 2 columns, got {arity}")]
    InvalidKeyArity { arity: usize },

    #[error("cannot serialize field `{field}`: {source}")]
    Serialization {
        field: String,
        #[source]
        source: serde_json::Error,
    },
}

pub type Result<T, E = TransformError> = std::result::Result<T, E>;
