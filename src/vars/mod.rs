//! # Variable Resolver
//!
//! Normalizes whatever the upstream workflow hands us (a flat map, a
//! legacy snake_case map, or a deeply nested object) into one flat
//! mapping of dot-notation path to [`ResolvedVariable`]. The same map
//! feeds the variable picker and the inline `{{token}}` substitution.
//!
//! Resolution is a pure function of its input: same value in, same map
//! out. The map is a `BTreeMap`, so iteration is already in the
//! lexicographic order pickers present.

use serde_json::Value;
use std::collections::BTreeMap;

/// Flat mapping of dot path → resolved entry.
pub type VariableMap = BTreeMap<String, ResolvedVariable>;

/// The runtime type of a resolved variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub enum VariableKind {
    String,
    Number,
    Boolean,
    Array,
    Object,
    Null,
}

/// One normalized entry. `display_value` is truncated for UI purposes
/// only; `actual_value` is always the untouched original.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedVariable {
    pub kind: VariableKind,
    pub display_value: String,
    pub actual_value: Value,
}

/// Display strings longer than this are cut and suffixed with an ellipsis.
const DISPLAY_LIMIT: usize = 50;

/// Flatten/normalize an arbitrary variables object into a flat map.
///
/// Three input shapes are recognized, checked in order on the top-level
/// keys:
/// 1. any key contains `.`: already flat, values are normalized as-is;
/// 2. any key contains `_`: legacy snake_case names get a shallow
///    `_` → `.` rename (no recursive flatten);
/// 3. otherwise: full recursive flatten with `parent.key` prefixes.
///
/// Non-object input (including `null`) resolves to an empty map; the host
/// renders its "no variables available" state, not an error.
pub fn resolve(raw: &Value) -> VariableMap {
    let mut map = VariableMap::new();
    let Value::Object(obj) = raw else {
        return map;
    };

    if obj.keys().any(|k| k.contains('.')) {
        for (key, value) in obj {
            map.insert(key.clone(), normalize_entry(value));
        }
    } else if obj.keys().any(|k| k.contains('_')) {
        for (key, value) in obj {
            map.insert(key.replace('_', "."), normalize_entry(value));
        }
    } else {
        for (key, value) in obj {
            flatten_into(key, value, &mut map);
        }
    }
    map
}

/// The sorted path list for the variable picker.
pub fn variable_paths(map: &VariableMap) -> Vec<&str> {
    map.keys().map(String::as_str).collect()
}

fn flatten_into(path: &str, value: &Value, map: &mut VariableMap) {
    match value {
        Value::Object(obj) => {
            for (key, child) in obj {
                flatten_into(&format!("{}.{}", path, key), child, map);
            }
        }
        Value::Array(arr) if !arr.is_empty() => {
            map.insert(
                path.to_string(),
                ResolvedVariable {
                    kind: VariableKind::Array,
                    display_value: format!("Array[{}]", arr.len()),
                    actual_value: value.clone(),
                },
            );
            // The first element doubles as a schema preview for pickers.
            if let Value::Object(first) = &arr[0] {
                for (key, child) in first {
                    flatten_into(&format!("{}[0].{}", path, key), child, map);
                }
            }
        }
        _ => {
            map.insert(path.to_string(), normalize_entry(value));
        }
    }
}

/// Build a resolved entry for an arbitrary value without flattening it.
fn normalize_entry(value: &Value) -> ResolvedVariable {
    let (kind, display) = match value {
        Value::Null => (VariableKind::Null, "null".to_string()),
        Value::Bool(b) => (VariableKind::Boolean, b.to_string()),
        Value::Number(n) => (VariableKind::Number, n.to_string()),
        Value::String(s) => (VariableKind::String, s.clone()),
        Value::Array(arr) => (VariableKind::Array, format!("Array[{}]", arr.len())),
        Value::Object(_) => (
            VariableKind::Object,
            serde_json::to_string(value).unwrap_or_else(|_| "Object".to_string()),
        ),
    };
    ResolvedVariable {
        kind,
        display_value: truncate_display(display),
        actual_value: value.clone(),
    }
}

fn truncate_display(s: String) -> String {
    if s.chars().count() <= DISPLAY_LIMIT {
        return s;
    }
    let mut out: String = s.chars().take(DISPLAY_LIMIT).collect();
    out.push('…');
    out
}
