//! Dotted-path nested store
//!
//! `PathStore` is the schema-flexible tree underneath `TaxData`. Interview
//! code and tests address it with dotted paths (`personal_info.first_name`);
//! the typed accessors in `model` are layered on top and the whole tree
//! round-trips through `serde_json` for persistence.
//!
//! The backing `serde_json::Map` preserves insertion order (the
//! `preserve_order` feature), so saved documents diff cleanly.

use crate::error::{TenfortyError, TenfortyResult};
use serde_json::{Map, Value};

/// Nested mapping addressed by dotted key sequences.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PathStore {
    root: Map<String, Value>,
}

impl PathStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a store from a serialized tree.
    ///
    /// The root must be a JSON object; anything else is a malformed
    /// document.
    pub fn from_value(value: Value) -> TenfortyResult<Self> {
        match value {
            Value::Object(root) => Ok(Self { root }),
            other => Err(TenfortyError::malformed(format!(
                "expected an object at the document root, found {}",
                json_kind(&other)
            ))),
        }
    }

    /// The full tree as a JSON value (clones)
    pub fn as_value(&self) -> Value {
        Value::Object(self.root.clone())
    }

    /// Consume the store, yielding the tree
    pub fn into_value(self) -> Value {
        Value::Object(self.root)
    }

    /// Read the value at `path`, or `None` if any segment is absent.
    ///
    /// Never fails: a missing path and a path blocked by a scalar both
    /// read as absent.
    pub fn get(&self, path: &str) -> Option<&Value> {
        let mut segments = split_path(path).ok()?;
        let last = segments.pop()?;
        let mut node = &self.root;
        for segment in segments {
            node = node.get(segment)?.as_object()?;
        }
        node.get(last)
    }

    /// Mutable access to the value at `path`, if present
    pub fn get_mut(&mut self, path: &str) -> Option<&mut Value> {
        let mut segments = split_path(path).ok()?;
        let last = segments.pop()?;
        let mut node = &mut self.root;
        for segment in segments {
            node = node.get_mut(segment)?.as_object_mut()?;
        }
        node.get_mut(last)
    }

    /// True iff `path` resolves to a present leaf.
    ///
    /// Present-but-falsy values (`0`, `""`, `false`, explicit `null`)
    /// count as present; absence and intermediate mapping nodes read
    /// false. Arrays are leaves (dotted paths only traverse mappings).
    pub fn has(&self, path: &str) -> bool {
        self.get(path).is_some_and(|v| !v.is_object())
    }

    /// Write `value` at `path`, creating intermediate objects as needed.
    ///
    /// Fails with `TypeConflict` when an intermediate segment already
    /// holds a non-object value; the conflicting scalar is left intact.
    pub fn set(&mut self, path: &str, value: impl Into<Value>) -> TenfortyResult<()> {
        let mut segments = split_path(path)?;
        let last = segments.pop().ok_or_else(|| invalid_path(path))?;

        let mut node = &mut self.root;
        let mut walked: Vec<&str> = Vec::new();
        for segment in segments {
            walked.push(segment);
            let child = node
                .entry(segment.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            node = match child.as_object_mut() {
                Some(map) => map,
                None => {
                    return Err(TenfortyError::TypeConflict {
                        path: path.to_string(),
                        segment: walked.join("."),
                    })
                }
            };
        }
        node.insert(last.to_string(), value.into());
        Ok(())
    }

    /// Remove and return the value at `path`, if present
    pub fn remove(&mut self, path: &str) -> Option<Value> {
        let mut segments = split_path(path).ok()?;
        let last = segments.pop()?;
        let mut node = &mut self.root;
        for segment in segments {
            node = node.get_mut(segment)?.as_object_mut()?;
        }
        node.remove(last)
    }

    /// True if no path has ever been set
    pub fn is_empty(&self) -> bool {
        self.root.is_empty()
    }
}

/// Human name for a JSON value's type, for error messages
pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn split_path(path: &str) -> TenfortyResult<Vec<&str>> {
    if path.is_empty() {
        return Err(invalid_path(path));
    }
    let segments: Vec<&str> = path.split('.').collect();
    if segments.iter().any(|s| s.is_empty()) {
        return Err(invalid_path(path));
    }
    Ok(segments)
}

fn invalid_path(path: &str) -> TenfortyError {
    TenfortyError::InvalidPath {
        path: path.to_string(),
    }
}
