//! Canonical snapshot serialization
//!
//! Every snapshot goes through a `serde_json::Value` tree before it becomes
//! bytes. Object keys are emitted in sorted order and arrays keep their
//! order, so the same logical snapshot always produces the same bytes.

use crate::{Error, Result};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::{Map, Value};

/// Convert a snapshot into its ordered tree form.
pub fn to_tree<T: Serialize + ?Sized>(snapshot: &T) -> Result<Value> {
    let tree = serde_json::to_value(snapshot).map_err(Error::Serialize)?;
    Ok(sort_keys(tree))
}

/// Serialize a snapshot to canonical bytes (pretty JSON, trailing newline).
pub fn to_canonical_bytes<T: Serialize + ?Sized>(snapshot: &T) -> Result<Vec<u8>> {
    tree_to_bytes(&to_tree(snapshot)?)
}

/// Parse a snapshot from bytes previously written by [`to_canonical_bytes`].
pub fn from_slice<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    serde_json::from_slice(bytes).map_err(Error::Parse)
}

pub(crate) fn tree_to_bytes(tree: &Value) -> Result<Vec<u8>> {
    let mut bytes = serde_json::to_vec_pretty(tree).map_err(Error::Serialize)?;
    bytes.push(b'\n');
    Ok(bytes)
}

// serde_json keeps insertion order when `preserve_order` is unified in by
// another crate, so ordering is enforced here rather than assumed.
fn sort_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(String, Value)> = map.into_iter().collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            Value::Object(
                entries
                    .into_iter()
                    .map(|(key, child)| (key, sort_keys(child)))
                    .collect::<Map<String, Value>>(),
            )
        }
        Value::Array(items) => Value::Array(items.into_iter().map(sort_keys).collect()),
        other => other,
    }
}
