//! Schema-driven sanitization of submitted values.
//!
//! The cleaning rule for a value depends on where its key sits in the schema,
//! and the schema shape is itself data: a block instance picks its field list
//! through its discriminator. The engine therefore walks the value tree and the
//! schema together, carrying the current sibling field list down the recursion.
//!
//! Nothing here fails. A key with no matching field gets plain-text cleaning, a
//! block instance whose discriminator matches no variant is cleaned against the
//! parent field list, and map keys that reduce to nothing are dropped. Each of
//! these degradations is logged at `debug`.

mod code;
mod html;
mod text;

pub use code::{clean_code, strip_dangerous_css, CodeLanguage};
pub use html::sanitize_html;
pub use text::{sanitize_key, sanitize_text, strip_all_tags};

use serde_json::{Map, Value};
use tracing::debug;

use crate::registry::FieldKind;
use crate::types::{find_field, Schema, SchemaNode};

/// Answers whether the acting author may submit unfiltered code.
///
/// Only `code` fields consult the probe.
pub trait TrustProbe {
    fn is_trusted_author(&self) -> bool;
}

impl TrustProbe for bool {
    fn is_trusted_author(&self) -> bool {
        *self
    }
}

impl<F> TrustProbe for F
where
    F: Fn() -> bool,
{
    fn is_trusted_author(&self) -> bool {
        self()
    }
}

/// Leaf cleaning rule for a string value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LeafRule {
    Code,
    RichText,
    Text,
}

impl LeafRule {
    fn for_kind(kind: &FieldKind) -> Self {
        match kind {
            FieldKind::Code => LeafRule::Code,
            FieldKind::RichText => LeafRule::RichText,
            FieldKind::Boolean
            | FieldKind::String
            | FieldKind::Text
            | FieldKind::Number
            | FieldKind::Date
            | FieldKind::Select
            | FieldKind::Taxonomy
            | FieldKind::PostType
            | FieldKind::DataObject
            | FieldKind::Image
            | FieldKind::File
            | FieldKind::Object
            | FieldKind::Block
            | FieldKind::Info => LeafRule::Text,
            FieldKind::Unknown(_) => LeafRule::Text,
        }
    }
}

/// Cleans raw value trees against a schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SanitizationEngine {
    trusted_author: bool,
}

impl SanitizationEngine {
    /// The trust probe is consulted once, when the engine is built.
    pub fn new(trust: impl TrustProbe) -> Self {
        Self {
            trusted_author: trust.is_trusted_author(),
        }
    }

    pub fn trusted_author(&self) -> bool {
        self.trusted_author
    }

    /// Clean `raw` against `schema`.
    pub fn sanitize(&self, raw: &Value, schema: &Schema) -> Value {
        self.sanitize_value(raw, &schema.fields, None)
    }

    /// Clean `value` whose key is `key` within the sibling list `fields`.
    fn sanitize_value(&self, value: &Value, fields: &[SchemaNode], key: Option<&str>) -> Value {
        match value {
            Value::Object(map) => Value::Object(self.sanitize_map(map, fields)),
            Value::Array(items) => {
                let mut cleaned: Vec<Value> = items
                    .iter()
                    .map(|item| {
                        let context = child_context(fields, key, item);
                        self.sanitize_value(item, context, key)
                    })
                    .collect();

                if let Some(field) = key.and_then(|k| find_field(fields, k)) {
                    if field.multiple && field.kind.drops_empty_placeholders() {
                        let before = cleaned.len();
                        cleaned.retain(|v| v.as_str() != Some(""));
                        if cleaned.len() != before {
                            debug!(
                                field = %field.name,
                                dropped = before - cleaned.len(),
                                "dropped empty reference placeholders"
                            );
                        }
                    }
                }
                Value::Array(cleaned)
            }
            Value::String(s) => Value::String(self.clean_leaf(s, fields, key)),
            Value::Number(_) | Value::Bool(_) | Value::Null => value.clone(),
        }
    }

    fn sanitize_map(&self, map: &Map<String, Value>, fields: &[SchemaNode]) -> Map<String, Value> {
        let mut out = Map::new();
        for (raw_key, child) in map {
            let clean_key = sanitize_key(raw_key);
            if clean_key.is_empty() {
                debug!(key = %raw_key, "dropping key with no identifier characters");
                continue;
            }
            let declared = find_field(fields, raw_key).is_some();
            if out.contains_key(&clean_key) {
                if !declared {
                    debug!(key = %raw_key, %clean_key, "dropping key that collides with another after cleaning");
                    continue;
                }
                debug!(key = %raw_key, "declared field replaces a colliding key");
            }
            let context = child_context(fields, Some(raw_key), child);
            let cleaned = self.sanitize_value(child, context, Some(raw_key));
            out.insert(clean_key, cleaned);
        }
        out
    }

    fn clean_leaf(&self, input: &str, fields: &[SchemaNode], key: Option<&str>) -> String {
        let field = key.and_then(|k| find_field(fields, k));
        let Some(field) = field else {
            if let Some(key) = key {
                debug!(%key, "no field declared for key, using text cleaning");
            }
            return sanitize_text(input);
        };

        match LeafRule::for_kind(&field.kind) {
            LeafRule::Code => {
                let language = CodeLanguage::from_option(field.option_str("language"));
                clean_code(input, language, self.trusted_author)
            }
            LeafRule::RichText => sanitize_html(input),
            LeafRule::Text => {
                if let FieldKind::Unknown(kind) = &field.kind {
                    debug!(field = %field.name, %kind, "unknown field type, using text cleaning");
                }
                sanitize_text(input)
            }
        }
    }
}

impl Default for SanitizationEngine {
    /// An engine for an untrusted author.
    fn default() -> Self {
        Self::new(false)
    }
}

/// Clean `raw` against `schema` for the given author trust.
pub fn sanitize(raw: &Value, schema: &Schema, trust: impl TrustProbe) -> Value {
    SanitizationEngine::new(trust).sanitize(raw, schema)
}

/// The field list used below `key` when descending into `value`.
///
/// Object fields descend into their own `fields`. A block field holding a
/// single instance map descends into the fields of the variant its
/// discriminator names. Anything else keeps the parent list.
fn child_context<'a>(fields: &'a [SchemaNode], key: Option<&str>, value: &Value) -> &'a [SchemaNode] {
    let Some(field) = key.and_then(|k| find_field(fields, k)) else {
        return fields;
    };

    match (&field.kind, value) {
        (FieldKind::Object, _) => &field.fields,
        (FieldKind::Block, Value::Object(instance)) => {
            let discriminator = instance.get(&field.block_key).and_then(Value::as_str);
            match discriminator.and_then(|d| field.variant(d)) {
                Some(variant) => &variant.fields,
                None => {
                    debug!(
                        field = %field.name,
                        block_key = %field.block_key,
                        variant = ?discriminator,
                        "no block variant matches, cleaning against parent fields"
                    );
                    fields
                }
            }
        }
        _ => fields,
    }
}
