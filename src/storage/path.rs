//! Path algebra.
//!
//! A [`Path`] is a concrete address into the store: a sequence of segments,
//! each normally a string key (objects) or a non-negative integer index
//! (arrays). Segments are kept as [`Value`]s so that malformed addresses
//! (`a[3.14]`, `b[100]` on an object) can still be represented and reported.
//!
//! The string `"-"` as the final segment of an `Add` patch means "append".

use super::error::{ErrorKind, StorageError};
use crate::ast::term::is_identifier;
use crate::ast::Value;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Segment that appends to an array when used as the last segment of `Add`.
pub const APPEND_SEGMENT: &str = "-";

/// A concrete storage address.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Path(Vec<Value>);

impl Path {
    pub fn new(segments: Vec<Value>) -> Self {
        Path(segments)
    }

    /// The empty path, addressing the root document
    pub fn root() -> Self {
        Path(Vec::new())
    }

    pub fn segments(&self) -> &[Value] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn last(&self) -> Option<&Value> {
        self.0.last()
    }

    /// The first `len` segments
    pub fn prefix(&self, len: usize) -> Path {
        Path(self.0[..len.min(self.0.len())].to_vec())
    }

    /// A copy of this path extended by one segment
    pub fn child(&self, segment: Value) -> Path {
        let mut segments = self.0.clone();
        segments.push(segment);
        Path(segments)
    }

    /// True if the final segment is the append sentinel
    pub fn ends_with_append(&self) -> bool {
        matches!(self.last(), Some(Value::String(s)) if s == APPEND_SEGMENT)
    }
}

impl From<Vec<Value>> for Path {
    fn from(segments: Vec<Value>) -> Self {
        Path(segments)
    }
}

impl FromIterator<Value> for Path {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        Path(iter.into_iter().collect())
    }
}

/// Parses a JSON array such as `["a", 0, "b"]`.
impl FromStr for Path {
    type Err = serde_json::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let segments: Vec<Value> = serde_json::from_str(s)?;
        Ok(Path(segments))
    }
}

/// Renders in reference notation, e.g. `c[0].x["-"]`.
impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return write!(f, "[]");
        }
        for (i, seg) in self.0.iter().enumerate() {
            match seg {
                Value::String(s) if is_identifier(s) => {
                    if i > 0 {
                        write!(f, ".")?;
                    }
                    write!(f, "{}", s)?;
                }
                other => write!(f, "[{}]", other)?,
            }
        }
        Ok(())
    }
}

/// Interpret a segment as an array index, rejecting non-integers.
fn array_index(seg: &Value) -> Result<i64, ErrorKind> {
    seg.as_index()
        .ok_or_else(|| ErrorKind::ArrayIndexType(seg.clone()))
}

/// Look up one segment inside a container.
pub fn step<'a>(container: &'a Value, seg: &Value) -> Result<&'a Value, ErrorKind> {
    match container {
        Value::Object(obj) => {
            let key = seg
                .as_string()
                .ok_or_else(|| ErrorKind::ObjectKeyType(seg.clone()))?;
            obj.get(key).ok_or(ErrorKind::DoesNotExist)
        }
        Value::Array(arr) => {
            let index = array_index(seg)?;
            usize::try_from(index)
                .ok()
                .and_then(|i| arr.get(i))
                .ok_or(ErrorKind::OutOfRange)
        }
        scalar => Err(ErrorKind::NonCollection(scalar.clone())),
    }
}

/// Mutable counterpart of [`step`].
pub(crate) fn step_mut<'a>(container: &'a mut Value, seg: &Value) -> Result<&'a mut Value, ErrorKind> {
    match container {
        Value::Object(obj) => {
            let key = seg
                .as_string()
                .ok_or_else(|| ErrorKind::ObjectKeyType(seg.clone()))?;
            obj.get_mut(key).ok_or(ErrorKind::DoesNotExist)
        }
        Value::Array(arr) => {
            let index = array_index(seg)?;
            usize::try_from(index)
                .ok()
                .and_then(move |i| arr.get_mut(i))
                .ok_or(ErrorKind::OutOfRange)
        }
        scalar => Err(ErrorKind::NonCollection(scalar.clone())),
    }
}

/// Resolve `path` against `root`.
///
/// Errors are anchored at `path` itself.
pub fn resolve<'a>(root: &'a Value, path: &Path) -> Result<&'a Value, StorageError> {
    let mut current = root;
    for seg in path.segments() {
        current = step(current, seg).map_err(|kind| StorageError::new(path.clone(), kind))?;
    }
    Ok(current)
}

/// Mutable counterpart of [`resolve`].
pub(crate) fn resolve_mut<'a>(root: &'a mut Value, path: &Path) -> Result<&'a mut Value, StorageError> {
    let mut current = root;
    for seg in path.segments() {
        current = step_mut(current, seg).map_err(|kind| StorageError::new(path.clone(), kind))?;
    }
    Ok(current)
}

/// Check that `path` may be the target of a patch.
///
/// The root document itself can never be replaced, and since the root is
/// always an object the first segment must be a string.
pub fn validate_for_write(path: &Path) -> Result<(), StorageError> {
    match path.segments().first() {
        None => Err(StorageError::new(path.clone(), ErrorKind::NonEmpty)),
        Some(Value::String(_)) => Ok(()),
        Some(_) => Err(StorageError::new(path.clone(), ErrorKind::StringHead)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn path(json: serde_json::Value) -> Path {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn test_display() {
        assert_eq!(path(json!(["a", 0, "b"])).to_string(), "a[0].b");
        assert_eq!(path(json!(["c", 0, "x", "-"])).to_string(), r#"c[0].x["-"]"#);
        assert_eq!(path(json!(["a", 3.14])).to_string(), "a[3.14]");
        assert_eq!(Path::root().to_string(), "[]");
    }

    #[test]
    fn test_from_str() {
        let parsed: Path = r#"["a", 1]"#.parse().unwrap();
        assert_eq!(parsed, path(json!(["a", 1])));
        assert!("a.b".parse::<Path>().is_err());
    }

    #[test]
    fn test_resolve_errors_anchor_at_requested_path() {
        let root = Value::from(json!({"a": [1, 2, 3, 4], "b": {"v1": "hello"}}));

        assert_eq!(resolve(&root, &path(json!(["a", 0]))).unwrap(), &Value::from(1));

        let err = resolve(&root, &path(json!(["dead", "beef"]))).unwrap_err();
        assert_eq!(err, StorageError::new(path(json!(["dead", "beef"])), ErrorKind::DoesNotExist));

        let err = resolve(&root, &path(json!(["a", "str"]))).unwrap_err();
        assert_eq!(err.kind, ErrorKind::ArrayIndexType(Value::from("str")));

        let err = resolve(&root, &path(json!(["a", -1]))).unwrap_err();
        assert_eq!(err.kind, ErrorKind::OutOfRange);

        let err = resolve(&root, &path(json!(["b", 100]))).unwrap_err();
        assert_eq!(err.kind, ErrorKind::ObjectKeyType(Value::from(100)));

        let err = resolve(&root, &path(json!(["b", "v1", 0]))).unwrap_err();
        assert_eq!(err.kind, ErrorKind::NonCollection(Value::from("hello")));
    }

    #[test]
    fn test_validate_for_write() {
        assert_eq!(validate_for_write(&Path::root()).unwrap_err().kind, ErrorKind::NonEmpty);
        assert_eq!(validate_for_write(&path(json!([1]))).unwrap_err().kind, ErrorKind::StringHead);
        assert!(validate_for_write(&path(json!(["a", 1]))).is_ok());
    }

    #[test]
    fn test_append_sentinel() {
        assert!(path(json!(["a", "-"])).ends_with_append());
        assert!(!path(json!(["a", "b"])).ends_with_append());
    }
}
