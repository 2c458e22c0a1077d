//! Schema normalization.
//!
//! Rewrites the `info` shorthand into a canonical field node:
//!
//! ```yaml
//! fields:
//!   - info: "Fill in the hero section first."
//! ```
//!
//! becomes `{type: info, name: info_0, text: "Fill in the hero section first."}`.
//! The counter starts at zero for every sibling list and only advances on
//! shorthand entries. Everything else passes through untouched, and the walk
//! continues through `fields` and `blocks[].fields` at every depth.

use serde_json::{Map, Value};

const INFO_KEY: &str = "info";

/// Normalize a decoded schema tree.
///
/// Accepts either the root map (`{fields: [...]}`) or a bare field list;
/// any other shape is returned unchanged.
pub fn normalize(tree: &Value) -> Value {
    match tree {
        Value::Object(root) => Value::Object(normalize_node(root)),
        Value::Array(fields) => Value::Array(normalize_fields(fields)),
        other => other.clone(),
    }
}

/// Normalize one sibling list. Order and length are preserved.
pub fn normalize_fields(fields: &[Value]) -> Vec<Value> {
    let mut info_counter = 0usize;
    fields
        .iter()
        .map(|entry| normalize_entry(entry, &mut info_counter))
        .collect()
}

fn normalize_entry(entry: &Value, info_counter: &mut usize) -> Value {
    let Value::Object(map) = entry else {
        return entry.clone();
    };

    if is_info_shorthand(map) {
        let rewritten = expand_info(map, *info_counter);
        *info_counter += 1;
        return Value::Object(normalize_node(&rewritten));
    }

    Value::Object(normalize_node(map))
}

fn is_info_shorthand(map: &Map<String, Value>) -> bool {
    map.contains_key(INFO_KEY) && !map.contains_key("type") && !map.contains_key("name")
}

fn expand_info(map: &Map<String, Value>, index: usize) -> Map<String, Value> {
    let mut out = Map::new();
    out.insert("type".into(), Value::String("info".into()));
    out.insert("name".into(), Value::String(format!("info_{index}")));
    out.insert(
        "text".into(),
        map.get(INFO_KEY).cloned().unwrap_or(Value::Null),
    );
    for (key, value) in map {
        if key != INFO_KEY && !out.contains_key(key) {
            out.insert(key.clone(), value.clone());
        }
    }
    out
}

/// Recurse into a node's `fields` and each `blocks[].fields`.
fn normalize_node(map: &Map<String, Value>) -> Map<String, Value> {
    let mut out = map.clone();

    if let Some(Value::Array(children)) = map.get("fields") {
        out.insert("fields".into(), Value::Array(normalize_fields(children)));
    }

    if let Some(Value::Array(blocks)) = map.get("blocks") {
        let blocks = blocks
            .iter()
            .map(|block| match block {
                Value::Object(variant) => Value::Object(normalize_node(variant)),
                other => other.clone(),
            })
            .collect();
        out.insert("blocks".into(), Value::Array(blocks));
    }

    out
}
