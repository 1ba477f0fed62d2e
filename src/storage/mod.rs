//! Storage layer
//!
//! # Architecture
//!
//! The store holds one JSON-shaped root document, always an object:
//!
//! ```text
//! root (object)
//!   └─→ key → value (any JSON kind, arbitrarily nested)
//! ```
//!
//! ## Operations
//!
//! - `get(path)`: read the value at a concrete path
//! - `patch(op, path, value)`: `Add`, `Remove` or `Replace` a subtree
//!
//! ## Implementation
//!
//! - **Path algebra** (`path.rs`): resolution and write validation
//! - **Errors** (`error.rs`): the addressing error taxonomy
//! - **Copy-on-write root** (`data_store.rs`): readers take `Arc` snapshots,
//!   writers mutate under a write lock
//! - **Loader** (`loader.rs`): base documents from JSON files

pub mod data_store;
pub mod error;
pub mod loader;
pub mod path;

pub use data_store::{DataStore, PatchOp};
pub use error::{ErrorKind, StorageError};
pub use loader::load_files;
pub use path::Path;
