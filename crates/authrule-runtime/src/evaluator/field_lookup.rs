//! Field Lookup Utilities
//!
//! Helper functions for navigating the serialized transaction context using
//! dot-notation paths.

use authrule_core::Value;

/// Resolve a dot-separated path (e.g. "transaction.location.country").
///
/// Objects are navigated by key and arrays by numeric index. Returns `None`
/// when any segment is missing, when a segment is applied to a scalar, or when
/// the path is empty or holds an empty segment.
pub(crate) fn resolve_path<'a>(root: &'a Value, path: &str) -> Option<&'a Value> {
    if path.is_empty() {
        return None;
    }

    let mut current = root;
    for segment in path.split('.') {
        if segment.is_empty() {
            return None;
        }
        current = match current {
            Value::Object(map) => map.get(segment)?,
            Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => {
                tracing::debug!("Cannot access '{}' on non-object in path {}", segment, path);
                return None;
            }
        };
    }

    Some(current)
}
