use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::join::dataset::ColumnType;

/// Main error type for dataset join coordination.
///
/// Every variant is terminal for the whole join: the coordinator surfaces
/// the first error it observes and discards everything that completes
/// afterwards. Errors are never aggregated or retried.
#[derive(Debug, Error, Clone, PartialEq, Serialize, Deserialize)]
pub enum JoinError {
    /// A requested dataset identifier did not resolve via the fetcher
    #[error("Data Set \"{0}\" was not found")]
    NotFound(String),

    /// The fetcher reported a transport/processing error for an identifier
    #[error("Error fetching data set {uuid}: {message}")]
    Fetch { uuid: String, message: String },

    /// An incoming dataset's column count disagrees with the accumulator
    #[error("Data set {uuid} has {found} columns, expected {expected}")]
    ColumnCountMismatch {
        uuid: String,
        expected: usize,
        found: usize,
    },

    /// An incoming dataset's column type disagrees positionally with the
    /// accumulator established by the first-arriving dataset
    #[error("Data set {uuid} column {column} should be of type {expected}, found {found}")]
    ColumnTypeMismatch {
        uuid: String,
        column: usize,
        expected: ColumnType,
        found: ColumnType,
    },

    /// A named column could not be resolved: unknown column in a filter
    /// or sort clause, or an incoming column absent from the joined schema
    #[error("Lookup error: {0}")]
    Lookup(String),
}

impl JoinError {
    /// Wrap a fetch failure with the identifier it was issued for
    pub fn fetch(uuid: impl Into<String>, message: impl Into<String>) -> Self {
        JoinError::Fetch {
            uuid: uuid.into(),
            message: message.into(),
        }
    }

    /// True when the error came from the fetch collaborator rather than
    /// from the merge or lookup stages
    pub fn is_fetch_side(&self) -> bool {
        matches!(self, JoinError::NotFound(_) | JoinError::Fetch { .. })
    }
}

/// Type alias for Result with JoinError
pub type Result<T> = std::result::Result<T, JoinError>;
