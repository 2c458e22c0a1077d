//! Schema-driven structured content engine
//!
//! `fieldkit-fields` lets editors fill in structured content whose shape is
//! declared in a YAML schema. The engine takes schema source from text to
//! stored canonical form and takes submitted values from raw input to the
//! effective value a template reads.
//!
//! # Architecture
//!
//! - **Registry**: [`FieldKind`] catalogues the known field types; unknown
//!   identifiers are kept and cleaned as plain text
//! - **Normalizer**: [`normalize`] expands the `info` shorthand into canonical nodes
//! - **Validator**: [`SchemaValidator`] checks shape and context policy and
//!   reports through [`ValidationResult`], never an error
//! - **Sanitizer**: [`SanitizationEngine`] walks submitted values alongside the
//!   schema, choosing text, rich-text or code cleaning per field
//! - **Resolver**: [`FieldResolver`] finds a field's effective value across the
//!   local, document, group-shared and site-global scopes
//! - **Stores**: [`Store`] and [`DocumentMetaStore`] are the only persistence
//!   seams; memory and YAML-file implementations are provided
//!
//! [`FieldsContext`] ties these together over a pair of stores.

pub mod context;
pub mod decode;
pub mod error;
pub mod file_store;
pub mod keys;
pub mod normalize;
pub mod policy;
pub mod registry;
pub mod resolve;
pub mod sanitize;
pub mod store;
pub mod types;
pub mod validation;

pub use context::{FieldsContext, FieldsContextBuilder};
pub use decode::{SchemaDecoder, YamlDecoder};
pub use error::{FieldsError, Result};
pub use file_store::{FileMetaStore, FileStore};
pub use keys::{SchemaScope, StoreKeys, DEFAULT_KEY_PREFIX};
pub use normalize::{normalize, normalize_fields};
pub use policy::{ContextPolicy, ContextScope, DEFAULT_SHARED_CONTEXTS};
pub use registry::FieldKind;
pub use resolve::{FieldResolver, ResolutionContext, ResolutionTarget};
pub use sanitize::{sanitize, CodeLanguage, SanitizationEngine, TrustProbe};
pub use store::{DocumentMetaStore, MemoryMetaStore, MemoryStore, Store};
pub use types::{BlockVariant, Schema, SchemaNode, DEFAULT_BLOCK_KEY};
pub use validation::{SchemaValidator, ValidationResult};
