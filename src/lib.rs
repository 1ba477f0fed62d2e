// Regula - policy evaluation over JSON documents
// A document store plus a backtracking unification evaluator

#![warn(rust_2018_idioms)]

pub mod ast;
pub mod eval;
pub mod format;
pub mod runtime;
pub mod storage;

// Re-exports for convenience
pub use ast::{Body, Expr, Module, Rule, Term, Value};
pub use eval::{Bindings, EvalError, Evaluator, RuleOutcome};
pub use format::OutputFormat;
pub use runtime::{Runtime, RuntimeConfig};
pub use storage::{DataStore, Path, PatchOp, StorageError};

/// Regula error types
pub mod error {
    use crate::eval::EvalError;
    use crate::storage::StorageError;
    use thiserror::Error;

    #[derive(Error, Debug)]
    pub enum Error {
        #[error(transparent)]
        Storage(#[from] StorageError),

        #[error("Evaluation error: {0}")]
        Eval(#[from] EvalError),

        #[error("Invalid document: {0}")]
        InvalidDocument(String),

        #[error("Configuration error: {0}")]
        Config(#[from] config::ConfigError),

        #[error("Serialization error: {0}")]
        SerializationError(String),

        #[error("I/O error: {0}")]
        Io(#[from] std::io::Error),
    }

    pub type Result<T> = std::result::Result<T, Error>;
}

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
