//! JSON dictionaries
//!
//! Objects become trees with string keys, arrays become trees keyed `0..n`.
//! Object keys spelled as canonical integers are read as integer keys, so a
//! tree with mixed keys reads back the way it was written.
//! Key order is kept as written (`serde_json` is built with
//! `preserve_order`). Output is pretty-printed with 4-space indentation and
//! unescaped Unicode.

use serde::Serialize;
use serde_json::ser::PrettyFormatter;

use crate::resource::{Key, ResourceTree, Value};

/// Parse a JSON document into a [`Value`]
pub fn parse_json(text: &str) -> serde_json::Result<Value> {
    let json: serde_json::Value = serde_json::from_str(text)?;
    Ok(from_json(json))
}

/// Render a tree as pretty-printed JSON
pub fn render_json(tree: &ResourceTree) -> serde_json::Result<String> {
    let json = tree_to_json(tree);
    let mut out = Vec::new();
    let formatter = PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
    json.serialize(&mut serializer)?;
    // serde_json only ever writes valid UTF-8
    Ok(String::from_utf8_lossy(&out).into_owned())
}

fn from_json(json: serde_json::Value) -> Value {
    match json {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Bool(b),
        serde_json::Value::Number(n) => Value::Number(n),
        serde_json::Value::String(s) => Value::Text(s),
        serde_json::Value::Array(items) => Value::Tree(
            items
                .into_iter()
                .enumerate()
                .map(|(i, item)| (Key::Int(i as i64), from_json(item)))
                .collect(),
        ),
        serde_json::Value::Object(map) => Value::Tree(
            map.into_iter()
                .map(|(key, item)| (Key::from_array_key(key), from_json(item)))
                .collect(),
        ),
    }
}

fn tree_to_json(tree: &ResourceTree) -> serde_json::Value {
    if tree.is_sequential() {
        serde_json::Value::Array(tree.iter().map(|(_, v)| to_json(v)).collect())
    } else {
        serde_json::Value::Object(
            tree.iter()
                .map(|(k, v)| (k.to_string(), to_json(v)))
                .collect(),
        )
    }
}

fn to_json(value: &Value) -> serde_json::Value {
    match value {
        Value::Text(s) => serde_json::Value::String(s.clone()),
        Value::Number(n) => serde_json::Value::Number(n.clone()),
        Value::Bool(b) => serde_json::Value::Bool(*b),
        Value::Null => serde_json::Value::Null,
        Value::Tree(tree) => tree_to_json(tree),
    }
}
