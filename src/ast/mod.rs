//! Policy language data model.
//!
//! This module provides the representation shared by the document store and
//! the evaluator:
//!
//! - **Value** (`value.rs`): JSON-shaped data
//! - **Terms** (`term.rs`): variables, references, composite terms,
//!   expressions, bodies, rules and modules
//! - **Builtins** (`builtins.rs`): the static registry of built-in predicates
//!
//! # Architecture
//!
//! The compiler (not part of this crate) produces `Body`/`Rule`/`Module`
//! values. The evaluator only reads them:
//!
//! 1. **Value Layer** (`value.rs`): documents and binding values
//! 2. **Term Layer** (`term.rs`): the query tree
//! 3. **Builtin Layer** (`builtins.rs`): operator metadata consulted during search

pub mod builtins;
pub mod term;
pub mod value;

pub use builtins::{Builtin, Operator};
pub use term::{Body, Expr, Module, Ref, Rule, RuleHead, Term, Var, DATA_ROOT};
pub use value::Value;
