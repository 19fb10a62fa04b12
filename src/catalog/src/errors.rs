//! Error types for catalog operations.
//!
//! Hard failures (validation, remote access, I/O) are `CatalogError`s. Soft outcomes such as an
//! LFN missing from the master catalog or a missing step directory are logged and reported in
//! the step reports instead.
use std::fmt::Display;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CatalogError>;

/// A catalog value that violates one of the catalog invariants.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid {field}: {reason}")]
pub struct ValidationError {
    /// The offending field, qualified by its position in the document when known.
    pub field: String,
    /// The rule that was violated.
    pub reason: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Qualifies the field with the location of the value containing it.
    pub fn within(self, parent: impl Display) -> Self {
        Self {
            field: format!("{}.{}", parent, self.field),
            reason: self.reason,
        }
    }
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// An operation that needs local access was attempted on a remote replica.
    #[error("cannot {operation}: {url}")]
    RemoteAccess { operation: &'static str, url: String },

    #[error("malformed catalog {origin}: {source}")]
    Malformed {
        origin: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("malformed pool XML catalog: {message}")]
    PoolXml { message: String },

    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("step `{0}` is still in progress; merge or cancel it first")]
    StepInProgress(String),

    #[error("no step is in progress")]
    NoStepInProgress,
}

impl CatalogError {
    pub fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    pub fn pool_xml(message: impl Display) -> Self {
        Self::PoolXml {
            message: message.to_string(),
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}
