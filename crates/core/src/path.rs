//! Dotted-path extraction over nested data.
//!
//! A field path such as `people.*.email` is split on `.`; a `*` segment fans
//! out over every key of an object or every index of an array. Each extracted
//! value carries its fully resolved path (`people.0.email`) so failures can be
//! attributed to the concrete location.

use serde_json::Value;

/// Segment that matches every key or index at its level.
pub const WILDCARD: &str = "*";

/// Path reported for the root value when no segments were given.
pub const ROOT_PATH: &str = "_root_";

/// Split a dotted field name into segments. The empty name has no segments.
pub fn split_path(field: &str) -> Vec<&str> {
    if field.is_empty() {
        Vec::new()
    } else {
        field.split('.').collect()
    }
}

/// Extract every `(resolved path, value)` pair addressed by `segments`.
///
/// An empty result means no concrete instantiation of the path exists in the
/// data; the evaluation loop treats that as a missing field.
pub fn values<'a>(data: &'a Value, segments: &[&str], base: &str) -> Vec<(String, &'a Value)> {
    let mut out = Vec::new();
    collect(data, segments, base, &mut out);
    out
}

fn collect<'a>(data: &'a Value, segments: &[&str], base: &str, out: &mut Vec<(String, &'a Value)>) {
    let Some((segment, rest)) = segments.split_first() else {
        let resolved = if base.is_empty() { ROOT_PATH } else { base };
        out.push((resolved.to_string(), data));
        return;
    };

    if *segment == WILDCARD {
        match data {
            Value::Object(map) => {
                for (key, child) in map {
                    collect(child, rest, &join(base, key), out);
                }
            }
            Value::Array(items) => {
                for (index, child) in items.iter().enumerate() {
                    collect(child, rest, &join(base, &index.to_string()), out);
                }
            }
            // Scalars have nothing to fan out over.
            _ => {}
        }
        return;
    }

    if let Some(child) = child(data, segment) {
        collect(child, rest, &join(base, segment), out);
    }
}

/// Resolve a dotted path without wildcards to a single value.
pub fn lookup<'a>(data: &'a Value, dotted: &str) -> Option<&'a Value> {
    split_path(dotted)
        .into_iter()
        .try_fold(data, |current, segment| child(current, segment))
}

fn child<'a>(data: &'a Value, segment: &str) -> Option<&'a Value> {
    match data {
        Value::Object(map) => map.get(segment),
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    }
}

fn join(base: &str, segment: &str) -> String {
    if base.is_empty() {
        segment.to_string()
    } else {
        format!("{base}.{segment}")
    }
}
