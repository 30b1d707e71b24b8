//! Merge-patch engine for dot-path partial updates
//!
//! A patch is a flat JSON object whose keys are dot-separated paths into
//! the stored document (`{"status.state": "completed"}`). Applying a patch
//! sets each path, creating intermediate objects as needed and overwriting
//! scalars, while every untouched path in the old document is preserved.
//!
//! Application order is irrelevant for non-overlapping paths; for
//! prefix-conflicting paths the last applied key wins, with no defined
//! iteration order between keys of one patch.

use serde_json::{Map, Value};

use crate::error::{Error, Result};

/// Apply a dot-path patch onto an old JSON document
///
/// Returns the merged document as JSON bytes. Fails with [`Error::Format`]
/// if `old_json` is not valid JSON and [`Error::Patch`] if the patch is not
/// a flat JSON object.
pub fn merge_documents(old_json: &[u8], patch_json: &[u8]) -> Result<Vec<u8>> {
    let mut root: Value =
        serde_json::from_slice(old_json).map_err(|e| Error::Format(format!("old document: {e}")))?;
    apply_dot_patch(&mut root, patch_json)?;
    serde_json::to_vec(&root).map_err(|e| Error::Format(e.to_string()))
}

/// Apply each `path: value` entry of a patch onto `root`
pub fn apply_dot_patch(root: &mut Value, patch_json: &[u8]) -> Result<()> {
    let patch: Value =
        serde_json::from_slice(patch_json).map_err(|e| Error::Patch(e.to_string()))?;
    let entries = patch
        .as_object()
        .ok_or_else(|| Error::Patch("patch must be a JSON object".to_string()))?;
    for (path, value) in entries {
        set_dot_path(root, path, value.clone());
    }
    Ok(())
}

/// Set a single dotted path, creating intermediate objects as needed
///
/// A non-object value in the middle of the path is replaced by an object;
/// best-effort structural merge, not a schema check.
fn set_dot_path(root: &mut Value, path: &str, value: Value) {
    match path.split_once('.') {
        None => {
            ensure_object(root).insert(path.to_string(), value);
        }
        Some((head, rest)) => {
            let child = ensure_object(root)
                .entry(head.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            set_dot_path(child, rest, value);
        }
    }
}

fn ensure_object(value: &mut Value) -> &mut Map<String, Value> {
    if !value.is_object() {
        *value = Value::Object(Map::new());
    }
    match value {
        Value::Object(map) => map,
        _ => unreachable!("value was just replaced with an object"),
    }
}
