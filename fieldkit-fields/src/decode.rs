//! Schema source decoding.
//!
//! Schemas are authored as YAML. Decoding produces an untyped
//! [`serde_json::Value`] tree that the normalizer and validator walk before
//! anything is converted to typed [`crate::Schema`] form.

use serde_json::Value;

/// Turns schema source text into a tree.
pub trait SchemaDecoder {
    /// Decode `source`. Empty or whitespace-only input yields `Value::Null`.
    /// On malformed input the error is a human-readable message.
    fn decode(&self, source: &str) -> std::result::Result<Value, String>;
}

/// YAML decoder backed by `serde_yaml_ng`.
#[derive(Debug, Clone, Copy, Default)]
pub struct YamlDecoder;

impl SchemaDecoder for YamlDecoder {
    fn decode(&self, source: &str) -> std::result::Result<Value, String> {
        if source.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_yaml_ng::from_str::<Value>(source).map_err(|e| e.to_string())
    }
}
