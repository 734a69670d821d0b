//! Ordered access paths into loosely-shaped module results.
//!
//! Upstream modules disagree on where they put things. Rather than probing
//! ad hoc at every call site, each field has a fixed, ordered list of dotted
//! paths and a single probe walks it. The path that matched is returned so
//! callers can record it.

use serde_json::Value;

/// A dotted path into a JSON value. `""` addresses the value itself;
/// numeric segments index arrays.
pub type AccessPath = &'static str;

/// Follow `path` from `value`.
pub fn lookup<'v>(value: &'v Value, path: &str) -> Option<&'v Value> {
    if path.is_empty() {
        return Some(value);
    }
    path.split('.').try_fold(value, |current, segment| match current {
        Value::Object(map) => map.get(segment),
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|idx| items.get(idx)),
        _ => None,
    })
}

/// First path holding a non-empty array.
pub fn probe_array<'v>(value: &'v Value, paths: &[AccessPath]) -> Option<(AccessPath, &'v Vec<Value>)> {
    paths.iter().find_map(|path| match lookup(value, path) {
        Some(Value::Array(items)) if !items.is_empty() => {
            tracing::trace!(path, len = items.len(), "array path matched");
            Some((*path, items))
        }
        _ => None,
    })
}

/// First path holding a string with non-whitespace content.
pub fn probe_str<'v>(value: &'v Value, paths: &[AccessPath]) -> Option<(AccessPath, &'v str)> {
    paths.iter().find_map(|path| match lookup(value, path) {
        Some(Value::String(text)) if !text.trim().is_empty() => {
            tracing::trace!(path, "string path matched");
            Some((*path, text.as_str()))
        }
        _ => None,
    })
}

/// First path holding a JSON number.
pub fn probe_f64(value: &Value, paths: &[AccessPath]) -> Option<f64> {
    paths
        .iter()
        .find_map(|path| lookup(value, path).and_then(Value::as_f64))
}

/// First path holding a JSON number with an integral value.
///
/// Strings are never coerced: a `"12"` offset is treated as missing.
pub fn probe_i64(value: &Value, paths: &[AccessPath]) -> Option<i64> {
    paths.iter().find_map(|path| lookup(value, path).and_then(integral))
}

/// First path holding a boolean.
pub fn probe_bool(value: &Value, paths: &[AccessPath]) -> Option<bool> {
    paths
        .iter()
        .find_map(|path| lookup(value, path).and_then(Value::as_bool))
}

fn integral(value: &Value) -> Option<i64> {
    match value {
        Value::Number(number) => number.as_i64().or_else(|| {
            number
                .as_f64()
                .filter(|f| f.fract() == 0.0 && f.abs() < i64::MAX as f64)
                .map(|f| f as i64)
        }),
        _ => None,
    }
}
