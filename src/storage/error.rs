//! Store addressing errors.
//!
//! Every error carries the path it is anchored at and an [`ErrorKind`]. The
//! path is the one handed to the failing lookup: `get` reports the requested
//! path, `patch` reports the parent path when the parent cannot be reached and
//! the full path when the final step fails.

use super::path::Path;
use crate::ast::Value;
use thiserror::Error;

/// Kinds of addressing failure.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ErrorKind {
    #[error("path must be non-empty")]
    NonEmpty,

    #[error("path must begin with a string key")]
    StringHead,

    #[error("document does not exist")]
    DoesNotExist,

    #[error("object key must be a string, got {0}")]
    ObjectKeyType(Value),

    #[error("array index must be a non-negative integer, got {0}")]
    ArrayIndexType(Value),

    #[error("array index out of range")]
    OutOfRange,

    #[error("cannot append to non-array {0}")]
    NonArray(Value),

    #[error("cannot descend into non-collection {0}")]
    NonCollection(Value),
}

impl ErrorKind {
    /// True for failures meaning "nothing is stored there" rather than
    /// "the path is malformed for this document".
    pub fn is_not_found(&self) -> bool {
        matches!(self, ErrorKind::DoesNotExist | ErrorKind::OutOfRange)
    }
}

/// A store addressing error anchored at a path.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("storage error at {path}: {kind}")]
pub struct StorageError {
    pub path: Path,
    pub kind: ErrorKind,
}

impl StorageError {
    pub fn new(path: Path, kind: ErrorKind) -> Self {
        Self { path, kind }
    }

    pub fn is_not_found(&self) -> bool {
        self.kind.is_not_found()
    }
}
