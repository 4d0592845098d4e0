//! Errors raised by the data store gateway.
//!
//! Every failure the gateway can produce is a [`PersistenceError`]. Input
//! validation problems are the caller's concern and never show up here.

use std::path::{Path, PathBuf};

/// Gateway failures.
#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    #[error("failed to open the database at {}: {reason}", .path.display())]
    Open { path: PathBuf, reason: String },
    #[error("failed to connect to the database: {0}")]
    Connection(#[source] libsql::Error),
    #[error("statement failed: {0}")]
    Statement(#[from] libsql::Error),
    #[error("insert into `{0}` affected no rows")]
    NoRowsAffected(&'static str),
    #[error("insert into `{0}` returned no generated id")]
    MissingGeneratedId(&'static str),
    #[error("invalid `{column}` column: {reason}")]
    Mapping { column: &'static str, reason: String },
    #[error("category {id} is referenced by {expenses} expense(s)")]
    CategoryInUse { id: i64, expenses: u64 },
}

impl PersistenceError {
    pub(crate) fn open(path: &Path, reason: impl ToString) -> Self {
        PersistenceError::Open {
            path: path.to_path_buf(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn mapping(column: &'static str, reason: impl ToString) -> Self {
        PersistenceError::Mapping {
            column,
            reason: reason.to_string(),
        }
    }
}

/// True when the store refused a statement because of a foreign key.
pub fn is_foreign_key_violation(err: &libsql::Error) -> bool {
    err.to_string().contains("FOREIGN KEY constraint failed")
}

pub type Result<T> = std::result::Result<T, PersistenceError>;
