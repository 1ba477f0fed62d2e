//! In-memory document store.
//!
//! The store owns a single root document, which is always an object. Reads
//! return clones or copy-on-write snapshots; patches are applied under a write
//! lock, so a reader observes either the pre-patch or the post-patch document.

use super::error::{ErrorKind, StorageError};
use super::path::{self, Path};
use crate::ast::Value;
use crate::error::{Error, Result};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Structural patch operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatchOp {
    Add,
    Remove,
    Replace,
}

impl fmt::Display for PatchOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PatchOp::Add => write!(f, "add"),
            PatchOp::Remove => write!(f, "remove"),
            PatchOp::Replace => write!(f, "replace"),
        }
    }
}

impl FromStr for PatchOp {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "add" => Ok(PatchOp::Add),
            "remove" => Ok(PatchOp::Remove),
            "replace" => Ok(PatchOp::Replace),
            other => Err(format!("unknown patch operation: {}", other)),
        }
    }
}

/// The document store.
pub struct DataStore {
    root: RwLock<Arc<Value>>,
}

impl fmt::Debug for DataStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataStore").finish()
    }
}

impl Default for DataStore {
    fn default() -> Self {
        Self::new()
    }
}

impl DataStore {
    /// Create a store with an empty root object
    pub fn new() -> Self {
        Self::from_object(BTreeMap::new())
    }

    /// Create a store whose root is the given object
    pub fn from_object(root: BTreeMap<String, Value>) -> Self {
        Self {
            root: RwLock::new(Arc::new(Value::Object(root))),
        }
    }

    /// Create a store from a JSON object
    pub fn from_json(json: serde_json::Value) -> Result<Self> {
        match Value::from(json) {
            Value::Object(root) => Ok(Self::from_object(root)),
            other => Err(Error::InvalidDocument(format!(
                "root document must be an object, got {}",
                other.kind()
            ))),
        }
    }

    /// Consistent read-only view of the whole document.
    ///
    /// Later patches never affect a snapshot already taken.
    pub fn snapshot(&self) -> Arc<Value> {
        Arc::clone(&self.root.read())
    }

    /// Copy of the whole root document
    pub fn dump(&self) -> Value {
        self.snapshot().as_ref().clone()
    }

    /// Read the value at `path`.
    pub fn get(&self, path: &Path) -> std::result::Result<Value, StorageError> {
        let root = self.snapshot();
        path::resolve(&root, path).cloned()
    }

    /// Apply a structural patch.
    ///
    /// On error the store is left unmodified.
    #[instrument(skip(self, value), fields(op = %op, path = %path))]
    pub fn patch(&self, op: PatchOp, path: &Path, value: Value) -> std::result::Result<(), StorageError> {
        let mut guard = self.root.write();
        let root = Arc::make_mut(&mut guard);
        apply_patch(root, op, path, value)?;
        debug!("Patch applied");
        Ok(())
    }
}

fn apply_patch(root: &mut Value, op: PatchOp, path: &Path, value: Value) -> std::result::Result<(), StorageError> {
    path::validate_for_write(path)?;

    let len = path.len();
    if op == PatchOp::Add && len >= 2 && path.ends_with_append() {
        return append(root, path, value);
    }

    let parent_path = path.prefix(len - 1);
    let parent = path::resolve_mut(root, &parent_path)?;
    let last = &path.segments()[len - 1];
    let fail = |kind: ErrorKind| StorageError::new(path.clone(), kind);

    match parent {
        Value::Object(obj) => {
            let key = last
                .as_string()
                .ok_or_else(|| fail(ErrorKind::ObjectKeyType(last.clone())))?;
            match op {
                PatchOp::Add => {
                    obj.insert(key.to_string(), value);
                }
                PatchOp::Remove => {
                    obj.remove(key).ok_or_else(|| fail(ErrorKind::DoesNotExist))?;
                }
                PatchOp::Replace => {
                    let slot = obj.get_mut(key).ok_or_else(|| fail(ErrorKind::DoesNotExist))?;
                    *slot = value;
                }
            }
            Ok(())
        }
        Value::Array(arr) => {
            let index = last
                .as_index()
                .ok_or_else(|| fail(ErrorKind::ArrayIndexType(last.clone())))?;
            // Add may address one past the end; Remove/Replace must hit an element.
            let bound = match op {
                PatchOp::Add => arr.len() + 1,
                PatchOp::Remove | PatchOp::Replace => arr.len(),
            };
            let index = usize::try_from(index)
                .ok()
                .filter(|i| *i < bound)
                .ok_or_else(|| fail(ErrorKind::OutOfRange))?;
            match op {
                PatchOp::Add => arr.insert(index, value),
                PatchOp::Remove => {
                    arr.remove(index);
                }
                PatchOp::Replace => arr[index] = value,
            }
            Ok(())
        }
        scalar => Err(fail(ErrorKind::NonCollection(scalar.clone()))),
    }
}

/// `Add` with a trailing `"-"`: push onto the array at `path[..len-1]`.
fn append(root: &mut Value, path: &Path, value: Value) -> std::result::Result<(), StorageError> {
    let len = path.len();
    let array_path = path.prefix(len - 1);
    let container_path = path.prefix(len - 2);
    let array_key = array_path.segments()[len - 2].clone();

    let container = path::resolve_mut(root, &container_path)?;
    let target = path::step_mut(container, &array_key)
        .map_err(|kind| StorageError::new(array_path.clone(), kind))?;

    match target {
        Value::Array(arr) => {
            arr.push(value);
            Ok(())
        }
        _ => Err(StorageError::new(array_path, ErrorKind::NonArray(array_key))),
    }
}
