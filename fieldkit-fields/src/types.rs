//! Core schema types.
//!
//! A schema is an inline tree: `object` nodes carry `fields`, `block` nodes
//! carry `blocks`, each block variant carries its own `fields`. Nothing is
//! referenced by name except block variants, which are looked up inside their
//! owning node, so a schema can never form a cycle.
//!
//! All types serialize to/from YAML and JSON via serde. Keys a node declares
//! that the engine has no dedicated slot for are kept in [`SchemaNode::options`].

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{FieldsError, Result};
use crate::registry::FieldKind;

/// Discriminator key used by block instances when a node does not set one.
pub const DEFAULT_BLOCK_KEY: &str = "type";

fn default_block_key() -> String {
    DEFAULT_BLOCK_KEY.to_string()
}

fn is_default_block_key(key: &str) -> bool {
    key == DEFAULT_BLOCK_KEY
}

fn is_false(b: &bool) -> bool {
    !*b
}

/// A single field declaration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SchemaNode {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: FieldKind,
    #[serde(default, skip_serializing_if = "is_false")]
    pub multiple: bool,
    /// Child fields of an `object` node.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<SchemaNode>,
    /// Whether a `block` node holds zero-or-more instances.
    #[serde(default, skip_serializing_if = "is_false")]
    pub list: bool,
    #[serde(
        rename = "block_key",
        alias = "blockKey",
        default = "default_block_key",
        skip_serializing_if = "is_default_block_key"
    )]
    pub block_key: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub blocks: Vec<BlockVariant>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    /// Type-specific parameters (`min`, `max`, `taxonomy`, `language`, `text`, ...).
    #[serde(flatten)]
    pub options: Map<String, Value>,
}

impl SchemaNode {
    /// A bare node of the given kind.
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            label: None,
            kind,
            multiple: false,
            fields: Vec::new(),
            list: false,
            block_key: default_block_key(),
            blocks: Vec::new(),
            default: None,
            options: Map::new(),
        }
    }

    /// Read a string option, e.g. `language` on a code field.
    pub fn option_str(&self, key: &str) -> Option<&str> {
        self.options.get(key).and_then(Value::as_str)
    }

    /// Find a block variant by its discriminator value.
    pub fn variant(&self, name: &str) -> Option<&BlockVariant> {
        self.blocks.iter().find(|b| b.name == name)
    }

    /// Display label, falling back to the field name.
    pub fn display_label(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.name)
    }
}

/// One shape a block instance may take.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BlockVariant {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default)]
    pub fields: Vec<SchemaNode>,
}

/// The root of a schema.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Schema {
    #[serde(default)]
    pub fields: Vec<SchemaNode>,
}

impl Schema {
    pub fn new(fields: Vec<SchemaNode>) -> Self {
        Self { fields }
    }

    /// Convert a normalized tree into typed form.
    pub fn from_tree(tree: &Value) -> Result<Self> {
        serde_json::from_value(tree.clone()).map_err(FieldsError::from)
    }

    /// The canonical tree persisted for this schema.
    pub fn to_tree(&self) -> Result<Value> {
        serde_json::to_value(self).map_err(FieldsError::from)
    }

    /// Top-level field by name.
    pub fn field(&self, name: &str) -> Option<&SchemaNode> {
        find_field(&self.fields, name)
    }

    /// Whether a top-level field with this name is declared.
    pub fn declares(&self, name: &str) -> bool {
        self.field(name).is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Direct-child lookup in a sibling list; never searches deeper.
pub fn find_field<'a>(fields: &'a [SchemaNode], name: &str) -> Option<&'a SchemaNode> {
    fields.iter().find(|f| f.name == name)
}
