//! Database-specific error types and conversions.

use barangay_core::error::BarangayError;

/// Database-layer error type.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("SurrealDB error: {0}")]
    Surreal(#[from] surrealdb::Error),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Malformed row: {0}")]
    Decode(String),

    #[error("Record not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },
}

impl From<DbError> for BarangayError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => BarangayError::NotFound { entity, id },
            other => BarangayError::Database(other.to_string()),
        }
    }
}
