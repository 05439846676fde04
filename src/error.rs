// src/error.rs
//! Failures of the collaborators behind the swipe core: row store, blob store
//! and the remote analysis function. None of them is fatal to a swipe session.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DataStoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("{0} not found")]
    NotFound(String),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("invalid record: {0}")]
    Invalid(String),
}

impl DataStoreError {
    /// Maps SQLite unique/check constraint failures to `Conflict`.
    pub fn from_constraint(err: sqlx::Error, what: &str) -> Self {
        match &err {
            sqlx::Error::Database(db_err)
                if db_err.is_unique_violation() || db_err.is_check_violation() =>
            {
                DataStoreError::Conflict(format!("{}: {}", what, db_err.message()))
            }
            _ => DataStoreError::Database(err),
        }
    }
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("invalid storage path: {0}")]
    InvalidPath(String),
    #[error("object already exists: {0}")]
    AlreadyExists(String),
    #[error("object not found: {0}")]
    NotFound(String),
    #[error("storage I/O failed for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Error)]
pub enum InvocationError {
    #[error("failed to reach function {function}: {source}")]
    Transport {
        function: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("function {function} returned status {status}: {body}")]
    Status {
        function: String,
        status: u16,
        body: String,
    },
    #[error("function {function} returned a malformed response: {reason}")]
    MalformedResponse { function: String, reason: String },
    #[error("analysis is not valid JSON: {0}")]
    MalformedAnalysis(String),
}
