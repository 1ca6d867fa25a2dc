//! Dot-path addressing over YAML documents
//!
//! Manifests are held in memory as `serde_yaml::Value` trees. Operations
//! locate fields by dot-separated paths (`serviceImport.serviceManifestRef`)
//! with numeric segments indexing into sequences.

use serde_yaml::Value;

use crate::error::{CoreError, Result};

/// Read the value at a dot-path, or `None` if any segment is absent.
pub fn value_at_path<'a>(root: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = root;
    for part in path.split('.') {
        current = match current {
            Value::Mapping(map) => map.get(&Value::String(part.to_string()))?,
            Value::Sequence(seq) => seq.get(part.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}

/// Mutable variant of [`value_at_path`].
pub fn value_at_path_mut<'a>(root: &'a mut Value, path: &str) -> Option<&'a mut Value> {
    let mut current = root;
    for part in path.split('.') {
        current = match current {
            Value::Mapping(map) => map.get_mut(&Value::String(part.to_string()))?,
            Value::Sequence(seq) => seq.get_mut(part.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}

/// Read a string field at a dot-path, failing with a structural error when
/// the path is absent or not a string.
pub fn string_at_path(root: &Value, path: &str, file: &str) -> Result<String> {
    value_at_path(root, path)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| CoreError::structure(path, file))
}

/// Overwrite the string field at a dot-path.
pub fn set_string_at_path(root: &mut Value, path: &str, value: &str, file: &str) -> Result<()> {
    let target =
        value_at_path_mut(root, path).ok_or_else(|| CoreError::structure(path, file))?;
    *target = Value::String(value.to_string());
    Ok(())
}

/// Fetch the mapping at a dot-path, failing structurally when absent.
pub fn mapping_at_path_mut<'a>(
    root: &'a mut Value,
    path: &str,
    file: &str,
) -> Result<&'a mut serde_yaml::Mapping> {
    value_at_path_mut(root, path)
        .and_then(Value::as_mapping_mut)
        .ok_or_else(|| CoreError::structure(path, file))
}
