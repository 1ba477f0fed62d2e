//! Base document loading.
//!
//! Each input file holds a JSON object. Its top-level keys are applied to the
//! store as `Add` patches, so a key defined by a later file overwrites the
//! same key from an earlier one.

use super::data_store::{DataStore, PatchOp};
use super::path::Path;
use crate::ast::Value;
use crate::error::{Error, Result};
use tracing::{debug, info, instrument};

/// Load every file in `paths` into `store`.
///
/// Directories are skipped. Returns the number of documents loaded.
#[instrument(skip(store, paths), fields(files = paths.len()))]
pub fn load_files<P: AsRef<std::path::Path>>(store: &DataStore, paths: &[P]) -> Result<usize> {
    let mut loaded = 0;

    for file in paths {
        let file = file.as_ref();
        if std::fs::metadata(file)?.is_dir() {
            debug!(path = %file.display(), "Skipping directory");
            continue;
        }

        let bytes = std::fs::read(file)?;
        let json: serde_json::Value = serde_json::from_slice(&bytes)
            .map_err(|e| Error::InvalidDocument(format!("{}: {}", file.display(), e)))?;

        let root = match Value::from(json) {
            Value::Object(root) => root,
            other => {
                return Err(Error::InvalidDocument(format!(
                    "{}: top-level value must be an object, got {}",
                    file.display(),
                    other.kind()
                )))
            }
        };

        let keys = root.len();
        for (key, value) in root {
            store.patch(PatchOp::Add, &Path::new(vec![Value::String(key)]), value)?;
        }

        info!(path = %file.display(), keys, "Loaded document");
        loaded += 1;
    }

    Ok(loaded)
}

impl DataStore {
    /// Create a store populated from JSON files
    pub fn from_files<P: AsRef<std::path::Path>>(paths: &[P]) -> Result<Self> {
        let store = DataStore::new();
        load_files(&store, paths)?;
        Ok(store)
    }
}
