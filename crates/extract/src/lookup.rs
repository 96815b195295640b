//! Single/multi-valued field lookups on JSON-LD trees.
//!
//! Exporters write a field with one value as a bare value and the same field
//! with several values as an array, at any level of nesting. A `path` is a
//! list of object keys starting at the node passed in.

use serde_json::Value;

/// Follows `path` through nested objects only; any array along the way
/// means "not found".
pub(crate) fn single<'a>(node: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter().try_fold(node, |node, key| node.as_object()?.get(*key))
}

/// Follows `path`, fanning out over every array encountered, including at
/// the leaf.
pub(crate) fn multi<'a>(node: &'a Value, path: &[&str]) -> Vec<&'a Value> {
    let mut nodes = vec![node];
    for key in path {
        nodes = nodes.into_iter().flat_map(flatten).filter_map(|n| n.as_object()?.get(*key)).collect();
    }
    nodes.into_iter().flat_map(flatten).collect()
}

/// All scalar values at `path`. A present single value wins; the array
/// traversal only runs when the single path doesn't resolve to a scalar.
pub(crate) fn values(node: &Value, path: &[&str]) -> Vec<String> {
    match single(node, path).and_then(scalar) {
        Some(value) => vec![value],
        None => multi(node, path).into_iter().filter_map(scalar).collect(),
    }
}

/// The first scalar value at `path`, if any.
pub(crate) fn first(node: &Value, path: &[&str]) -> Option<String> {
    values(node, path).into_iter().next()
}

fn flatten(node: &Value) -> Vec<&Value> {
    match node {
        Value::Array(items) => items.iter().collect(),
        other => vec![other],
    }
}

fn scalar(node: &Value) -> Option<String> {
    match node {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
