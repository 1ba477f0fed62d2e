//! Query evaluation
//!
//! # Architecture
//!
//! Evaluation is a depth-first backtracking search over the expressions of a
//! body, left to right:
//!
//! 1. **Expansion**: every argument is rewritten under the current bindings.
//!    References are resolved against the store snapshot; an unbound variable
//!    inside a reference iterates over the elements or keys found there,
//!    producing one candidate per element.
//! 2. **Application**: each candidate combination is fed to the builtin.
//!    Unifying builtins bind variables (`unify.rs`); comparisons test
//!    ground values.
//! 3. **Backtracking**: successes are pushed onto an explicit worklist, so
//!    deep bodies do not grow the call stack.
//!
//! A non-match is never an error. Errors are reserved for malformed queries
//! and for store addressing failures that are not part of an iteration.
//!
//! # Example
//!
//! ```rust
//! use regula::ast::{Body, Expr, Term};
//! use regula::eval::Evaluator;
//! use regula::storage::DataStore;
//! use serde_json::json;
//!
//! let store = DataStore::from_json(json!({"a": [10, 20]})).unwrap();
//! let body = Body::new(vec![Expr::eq(
//!     Term::data_ref(vec![Term::lit("a"), Term::var("i")]),
//!     Term::lit(20),
//! )]);
//!
//! let rows = Evaluator::new(&store).evaluate(&body).unwrap();
//! assert_eq!(rows.len(), 1);
//! assert_eq!(rows[0].to_json(), json!({"i": 1}));
//! ```

pub mod bindings;
pub mod evaluator;
pub mod unify;

pub use bindings::Bindings;
pub use evaluator::{Evaluator, RuleOutcome};
pub use unify::unify;

use crate::storage::StorageError;
use thiserror::Error;

/// Errors that abort an evaluation
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvalError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("unknown builtin: {0}")]
    UnknownBuiltin(String),

    #[error("{name}: expected {expected} arguments, got {actual}")]
    Arity {
        name: String,
        expected: usize,
        actual: usize,
    },

    #[error("reference base is not bound: {0}")]
    UnsafeReference(String),

    #[error("reference segment is not ground: {0}")]
    NonGroundSegment(String),

    #[error("rule head is not ground: {0}")]
    NonGroundHead(String),
}
