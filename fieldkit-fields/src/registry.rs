//! Field type registry.
//!
//! The catalogue of field type identifiers a schema may declare. Types fall
//! into three groups: containers (`object`, `block`) that carry child field
//! lists, references (`taxonomy`, `data_object`, `image`, `file`) whose values
//! are identifiers into another store, and scalars.
//!
//! Unrecognized identifiers are kept as [`FieldKind::Unknown`] instead of being
//! rejected, so schemas written for newer field types still load; sanitization
//! treats them like plain text.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The type of a schema field.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FieldKind {
    Boolean,
    String,
    Text,
    RichText,
    Code,
    Number,
    Date,
    Select,
    Taxonomy,
    PostType,
    DataObject,
    Image,
    File,
    Object,
    Block,
    Info,
    /// A type identifier this registry does not know.
    Unknown(String),
}

impl FieldKind {
    /// Every known kind, in catalogue order.
    pub const KNOWN: [FieldKind; 16] = [
        FieldKind::Boolean,
        FieldKind::String,
        FieldKind::Text,
        FieldKind::RichText,
        FieldKind::Code,
        FieldKind::Number,
        FieldKind::Date,
        FieldKind::Select,
        FieldKind::Taxonomy,
        FieldKind::PostType,
        FieldKind::DataObject,
        FieldKind::Image,
        FieldKind::File,
        FieldKind::Object,
        FieldKind::Block,
        FieldKind::Info,
    ];

    /// Look up a type identifier. Never fails; unknown identifiers are preserved.
    pub fn parse(id: &str) -> Self {
        match id {
            "boolean" => FieldKind::Boolean,
            "string" => FieldKind::String,
            "text" => FieldKind::Text,
            "rich-text" => FieldKind::RichText,
            "code" => FieldKind::Code,
            "number" => FieldKind::Number,
            "date" => FieldKind::Date,
            "select" => FieldKind::Select,
            "taxonomy" => FieldKind::Taxonomy,
            "post_type" => FieldKind::PostType,
            "data_object" => FieldKind::DataObject,
            "image" => FieldKind::Image,
            "file" => FieldKind::File,
            "object" => FieldKind::Object,
            "block" => FieldKind::Block,
            "info" => FieldKind::Info,
            other => FieldKind::Unknown(other.to_string()),
        }
    }

    /// The identifier as written in schema source.
    pub fn as_str(&self) -> &str {
        match self {
            FieldKind::Boolean => "boolean",
            FieldKind::String => "string",
            FieldKind::Text => "text",
            FieldKind::RichText => "rich-text",
            FieldKind::Code => "code",
            FieldKind::Number => "number",
            FieldKind::Date => "date",
            FieldKind::Select => "select",
            FieldKind::Taxonomy => "taxonomy",
            FieldKind::PostType => "post_type",
            FieldKind::DataObject => "data_object",
            FieldKind::Image => "image",
            FieldKind::File => "file",
            FieldKind::Object => "object",
            FieldKind::Block => "block",
            FieldKind::Info => "info",
            FieldKind::Unknown(id) => id,
        }
    }

    /// `object` and `block` carry child field lists.
    pub fn is_container(&self) -> bool {
        matches!(self, FieldKind::Object | FieldKind::Block)
    }

    /// Values of these kinds are identifiers into another store.
    pub fn is_reference(&self) -> bool {
        matches!(
            self,
            FieldKind::Taxonomy | FieldKind::DataObject | FieldKind::Image | FieldKind::File
        )
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, FieldKind::Unknown(_))
    }

    /// Whether `multiple: true` is meaningful for this kind.
    pub fn supports_multiple(&self) -> bool {
        matches!(
            self,
            FieldKind::Select | FieldKind::Taxonomy | FieldKind::DataObject
        )
    }

    /// Reference kinds whose multi-value form is submitted with an empty
    /// placeholder entry that must be dropped on save.
    pub fn drops_empty_placeholders(&self) -> bool {
        matches!(self, FieldKind::Taxonomy | FieldKind::DataObject)
    }
}

/// Convenience wrappers over a raw type identifier.
pub fn is_container(id: &str) -> bool {
    FieldKind::parse(id).is_container()
}

pub fn is_reference(id: &str) -> bool {
    FieldKind::parse(id).is_reference()
}

pub fn is_known(id: &str) -> bool {
    FieldKind::parse(id).is_known()
}

impl Default for FieldKind {
    fn default() -> Self {
        FieldKind::Unknown(String::new())
    }
}

impl From<String> for FieldKind {
    fn from(id: String) -> Self {
        match FieldKind::parse(&id) {
            FieldKind::Unknown(_) => FieldKind::Unknown(id),
            known => known,
        }
    }
}

impl From<FieldKind> for String {
    fn from(kind: FieldKind) -> Self {
        match kind {
            FieldKind::Unknown(id) => id,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
