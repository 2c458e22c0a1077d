//! Schema validation.
//!
//! Decides whether schema source is acceptable before it becomes canonical.
//! Validation never fails with an error: decode failures, shape problems and
//! policy violations are all reported through [`ValidationResult`].
//!
//! Shape checks cover top-level entries only. Top-level names must already
//! be identifiers, since submitted keys are reduced to identifier characters
//! before they are stored. Nested `fields` and block variants are tolerated
//! as written; the sanitizer degrades gracefully on anything it cannot match.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::decode::{SchemaDecoder, YamlDecoder};
use crate::error::{FieldsError, Result};
use crate::normalize::normalize_fields;
use crate::policy::ContextPolicy;
use crate::registry::FieldKind;
use crate::sanitize::sanitize_key;

pub const MISSING_FIELDS_MESSAGE: &str = "Schema must contain a fields array";
pub const VALID_MESSAGE: &str = "Schema is valid";

/// Outcome of validating schema source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub valid: bool,
    pub message: String,
}

impl ValidationResult {
    pub fn ok() -> Self {
        Self {
            valid: true,
            message: VALID_MESSAGE.to_string(),
        }
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        Self {
            valid: false,
            message: message.into(),
        }
    }

    /// Turn a rejection into [`FieldsError::SchemaRejected`].
    pub fn into_result(self) -> Result<()> {
        if self.valid {
            Ok(())
        } else {
            Err(FieldsError::SchemaRejected {
                message: self.message,
            })
        }
    }
}

/// Validates schema source against structure and context policy.
#[derive(Debug, Clone, Default)]
pub struct SchemaValidator<D = YamlDecoder> {
    decoder: D,
    policy: ContextPolicy,
}

impl SchemaValidator<YamlDecoder> {
    pub fn new(policy: ContextPolicy) -> Self {
        Self {
            decoder: YamlDecoder,
            policy,
        }
    }
}

impl<D: SchemaDecoder> SchemaValidator<D> {
    /// Use a different source decoder.
    pub fn with_decoder(decoder: D, policy: ContextPolicy) -> Self {
        Self { decoder, policy }
    }

    pub fn policy(&self) -> &ContextPolicy {
        &self.policy
    }

    pub fn decoder(&self) -> &D {
        &self.decoder
    }

    /// Validate schema source text for an optional context.
    pub fn validate(&self, source: &str, context_id: Option<&str>) -> ValidationResult {
        match self.decoder.decode(source) {
            Ok(tree) => self.validate_tree(&tree, context_id),
            Err(message) => {
                debug!(%message, "schema source failed to decode");
                ValidationResult::invalid(message)
            }
        }
    }

    /// Validate an already decoded tree.
    pub fn validate_tree(&self, tree: &Value, context_id: Option<&str>) -> ValidationResult {
        let Some(fields) = tree.get("fields").and_then(Value::as_array) else {
            return ValidationResult::invalid(MISSING_FIELDS_MESSAGE);
        };

        let fields = normalize_fields(fields);

        for (index, entry) in fields.iter().enumerate() {
            if let Err(message) = self.check_entry(index, entry, context_id) {
                debug!(index, %message, "schema rejected");
                return ValidationResult::invalid(message);
            }
        }

        ValidationResult::ok()
    }

    fn check_entry(
        &self,
        index: usize,
        entry: &Value,
        context_id: Option<&str>,
    ) -> std::result::Result<(), String> {
        let Some(map) = entry.as_object() else {
            return Err(format!("Field at index {index} must be an object"));
        };

        let name = match map.get("name") {
            Some(Value::String(name)) if !name.is_empty() => name,
            _ => {
                return Err(format!(
                    "Field at index {index} is missing required property: name"
                ))
            }
        };

        if sanitize_key(name) != *name {
            return Err(format!(
                "Field name '{name}' may only contain ASCII letters, digits, '_' and '-'"
            ));
        }

        let kind = match map.get("type") {
            Some(Value::String(kind)) if !kind.is_empty() => FieldKind::parse(kind),
            _ => {
                return Err(format!(
                    "Field '{name}' is missing required property: type"
                ))
            }
        };

        if kind == FieldKind::Info {
            if let Some(context_id) = context_id {
                if self.policy.is_shared(context_id) {
                    return Err(format!(
                        "Info fields are not allowed for template partials and archives. Current template: {context_id}"
                    ));
                }
            }
        }

        Ok(())
    }
}
