//! FieldsContext: main API surface for the fields engine.
//!
//! Owns the stores and ties the pieces together: schema saves go through the
//! validator, document saves through the sanitizer, reads through the
//! resolver. All keys come from one [`StoreKeys`].

use std::path::PathBuf;

use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::decode::{SchemaDecoder, YamlDecoder};
use crate::error::{FieldsError, Result};
use crate::file_store::{FileMetaStore, FileStore};
use crate::keys::{SchemaScope, StoreKeys};
use crate::normalize::normalize;
use crate::policy::ContextPolicy;
use crate::resolve::{FieldResolver, ResolutionContext};
use crate::sanitize::{sanitize_key, SanitizationEngine, TrustProbe};
use crate::store::{DocumentMetaStore, MemoryMetaStore, MemoryStore, Store};
use crate::types::Schema;
use crate::validation::{SchemaValidator, ValidationResult};

/// Builder for [`FieldsContext`].
pub struct FieldsContextBuilder<S, M> {
    store: S,
    meta: M,
    keys: StoreKeys,
    policy: ContextPolicy,
}

impl<S: Store, M: DocumentMetaStore> FieldsContextBuilder<S, M> {
    /// Use a custom key layout.
    pub fn with_keys(mut self, keys: StoreKeys) -> Self {
        self.keys = keys;
        self
    }

    pub fn with_key_prefix(self, prefix: impl Into<String>) -> Self {
        self.with_keys(StoreKeys::new(prefix))
    }

    /// Replace the shared-context classification used by schema validation.
    pub fn with_policy(mut self, policy: ContextPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn build(self) -> FieldsContext<S, M> {
        debug!(
            prefix = self.keys.prefix(),
            shared_patterns = self.policy.patterns().len(),
            "fields context opened"
        );
        FieldsContext {
            store: self.store,
            meta: self.meta,
            keys: self.keys,
            validator: SchemaValidator::new(self.policy),
        }
    }
}

/// The fields engine bound to a pair of stores.
///
/// ```rust
/// use fieldkit_fields::{FieldsContext, ResolutionContext, SchemaScope};
/// use serde_json::json;
///
/// let mut ctx = FieldsContext::in_memory().build();
/// let scope = SchemaScope::template("page.php");
/// ctx.save_schema(&scope, "fields:\n  - name: title\n    type: string\n", None)?;
/// ctx.bind_document("42", "page.php")?;
/// ctx.save_document("42", &json!({"title": "<b>Hi</b>"}), Vec::<String>::new(), false)?;
///
/// let title = ctx.resolve("title", &ResolutionContext::document("42"))?;
/// assert_eq!(title, Some(json!("Hi")));
/// # Ok::<(), fieldkit_fields::FieldsError>(())
/// ```
pub struct FieldsContext<S, M> {
    store: S,
    meta: M,
    keys: StoreKeys,
    validator: SchemaValidator,
}

impl FieldsContext<MemoryStore, MemoryMetaStore> {
    /// A context over fresh in-memory stores.
    pub fn in_memory() -> FieldsContextBuilder<MemoryStore, MemoryMetaStore> {
        FieldsContext::builder(MemoryStore::new(), MemoryMetaStore::new())
    }
}

impl FieldsContext<FileStore, FileMetaStore> {
    /// Open or create a file-backed store directory.
    pub fn open(root: impl Into<PathBuf>) -> Result<FieldsContextBuilder<FileStore, FileMetaStore>> {
        let root = root.into();
        let store = FileStore::create(&root)?;
        let meta = FileMetaStore::create(&root)?;
        Ok(FieldsContext::builder(store, meta))
    }
}

impl<S: Store, M: DocumentMetaStore> FieldsContext<S, M> {
    pub fn builder(store: S, meta: M) -> FieldsContextBuilder<S, M> {
        FieldsContextBuilder {
            store,
            meta,
            keys: StoreKeys::default(),
            policy: ContextPolicy::default(),
        }
    }

    pub fn keys(&self) -> &StoreKeys {
        &self.keys
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn meta(&self) -> &M {
        &self.meta
    }

    pub fn validator(&self) -> &SchemaValidator {
        &self.validator
    }

    /// Validate schema source without saving it.
    pub fn validate(&self, source: &str, context_id: Option<&str>) -> ValidationResult {
        self.validator.validate(source, context_id)
    }

    // --- Schemas ---

    /// Validate and persist schema source for `scope`.
    ///
    /// The context id used for policy checks defaults to the scope's template.
    /// A rejected save writes nothing; the returned result carries the reason.
    /// If a write fails, the previously stored schema and source are put back.
    pub fn save_schema(
        &mut self,
        scope: &SchemaScope,
        source: &str,
        context_id: Option<&str>,
    ) -> Result<ValidationResult> {
        let context_id = context_id.or_else(|| scope.template_id());
        let result = self.validator.validate(source, context_id);
        if !result.valid {
            warn!(%scope, message = %result.message, "schema save rejected");
            return Ok(result);
        }

        let schema = match YamlDecoder
            .decode(source)
            .map_err(|message| FieldsError::SchemaRejected { message })
            .and_then(|tree| Schema::from_tree(&normalize(&tree)))
        {
            Ok(schema) => schema,
            Err(e) => {
                warn!(%scope, error = %e, "schema save rejected");
                return Ok(ValidationResult::invalid(format!("Schema could not be read: {e}")));
            }
        };

        let tree = schema.to_tree()?;
        put_all_or_restore(
            &mut self.store,
            vec![
                (self.keys.schema_source(scope), Value::String(source.to_string())),
                (self.keys.schema(scope), tree),
            ],
        )?;
        info!(%scope, fields = schema.fields.len(), "schema saved");
        Ok(result)
    }

    /// The canonical schema for `scope`; empty when none was saved.
    pub fn load_schema(&self, scope: &SchemaScope) -> Result<Schema> {
        self.resolver().load_schema(scope)
    }

    /// The raw source last saved for `scope`.
    pub fn schema_source(&self, scope: &SchemaScope) -> Result<Option<String>> {
        let key = self.keys.schema_source(scope);
        match self.store.get(&key)? {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(source)) => Ok(Some(source)),
            Some(_) => Err(FieldsError::corrupt(key, "expected schema source text")),
        }
    }

    // --- Documents ---

    /// Bind a document to the template whose schema describes it.
    pub fn bind_document(&mut self, doc: &str, template: &str) -> Result<()> {
        self.meta.put(
            doc,
            &self.keys.document_template(),
            Value::String(template.to_string()),
        )?;
        debug!(%doc, %template, "document bound");
        Ok(())
    }

    pub fn document_template(&self, doc: &str) -> Result<Option<String>> {
        self.resolver().document_template(doc)
    }

    /// Sanitize and persist a document's submitted values.
    ///
    /// `shared_fields` names the fields the editor opted into group-shared
    /// data. The cleaned tree, opt-in map and schema snapshot are all computed
    /// before anything is written, and the values key is written last. If any
    /// write fails, every key written so far gets its previous value back.
    /// Returns the cleaned tree.
    pub fn save_document<I>(
        &mut self,
        doc: &str,
        raw: &Value,
        shared_fields: I,
        trust: impl TrustProbe,
    ) -> Result<Value>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        require_map(raw, "document values")?;
        let template = self
            .document_template(doc)?
            .ok_or_else(|| FieldsError::UnboundDocument {
                document: doc.to_string(),
            })?;
        let schema = self.load_schema(&SchemaScope::template(template.as_str()))?;

        let cleaned = SanitizationEngine::new(trust).sanitize(raw, &schema);
        let opt_in: Map<String, Value> = shared_fields
            .into_iter()
            .map(|name| sanitize_key(name.as_ref()))
            .filter(|name| !name.is_empty())
            .map(|name| (name, Value::Bool(true)))
            .collect();
        let snapshot = schema.to_tree()?;

        put_meta_all_or_restore(
            &mut self.meta,
            doc,
            vec![
                (self.keys.document_shared_fields(), Value::Object(opt_in)),
                (self.keys.document_schema_snapshot(), snapshot),
                (self.keys.document_values(), cleaned.clone()),
            ],
        )?;
        info!(%doc, %template, "document values saved");
        Ok(cleaned)
    }

    /// Sanitize and persist a template's group-shared values.
    pub fn save_group_values(
        &mut self,
        template: &str,
        raw: &Value,
        trust: impl TrustProbe,
    ) -> Result<Value> {
        require_map(raw, "group values")?;
        let schema = self.load_schema(&SchemaScope::shared_group(template))?;
        let cleaned = SanitizationEngine::new(trust).sanitize(raw, &schema);
        self.store
            .put(&self.keys.group_values(template), cleaned.clone())?;
        info!(%template, "group values saved");
        Ok(cleaned)
    }

    /// Sanitize and persist the site-global values.
    pub fn save_global_values(&mut self, raw: &Value, trust: impl TrustProbe) -> Result<Value> {
        require_map(raw, "global values")?;
        let schema = self.load_schema(&SchemaScope::Global)?;
        let cleaned = SanitizationEngine::new(trust).sanitize(raw, &schema);
        self.store.put(&self.keys.global_values(), cleaned.clone())?;
        info!("global values saved");
        Ok(cleaned)
    }

    /// Turn site-global values on or off for documents of a template.
    pub fn set_global_enabled(&mut self, template: &str, enabled: bool) -> Result<()> {
        self.store
            .put(&self.keys.global_enabled(template), Value::Bool(enabled))?;
        debug!(%template, enabled, "site-global flag set");
        Ok(())
    }

    // --- Resolution ---

    pub fn resolver(&self) -> FieldResolver<'_, S, M> {
        FieldResolver::new(&self.store, &self.meta, &self.keys)
    }

    pub fn resolve(&self, field: &str, ctx: &ResolutionContext<'_>) -> Result<Option<Value>> {
        self.resolver().resolve(field, ctx)
    }

    pub fn resolve_or_default(
        &self,
        field: &str,
        ctx: &ResolutionContext<'_>,
    ) -> Result<Option<Value>> {
        self.resolver().resolve_or_default(field, ctx)
    }

    pub fn resolve_all(&self, doc: &str) -> Result<Map<String, Value>> {
        self.resolver().resolve_all(doc)
    }
}

/// Write `entries` in order. On failure, restore what the earlier writes replaced.
///
/// Keys that had no value are restored to `null`, which every reader treats
/// as absent.
fn put_all_or_restore<S: Store + ?Sized>(store: &mut S, entries: Vec<(String, Value)>) -> Result<()> {
    let mut priors = Vec::with_capacity(entries.len());
    for (key, _) in &entries {
        priors.push(store.get(key)?.unwrap_or(Value::Null));
    }

    for (written, (key, value)) in entries.iter().enumerate() {
        if let Err(e) = store.put(key, value.clone()) {
            for i in (0..written).rev() {
                let key = &entries[i].0;
                if let Err(restore) = store.put(key, priors[i].clone()) {
                    warn!(%key, error = %restore, "could not restore key after failed write");
                }
            }
            return Err(e);
        }
    }
    Ok(())
}

/// [`put_all_or_restore`] for one document's meta keys.
fn put_meta_all_or_restore<M: DocumentMetaStore + ?Sized>(
    meta: &mut M,
    doc: &str,
    entries: Vec<(String, Value)>,
) -> Result<()> {
    let mut priors = Vec::with_capacity(entries.len());
    for (key, _) in &entries {
        priors.push(meta.get(doc, key)?.unwrap_or(Value::Null));
    }

    for (written, (key, value)) in entries.iter().enumerate() {
        if let Err(e) = meta.put(doc, key, value.clone()) {
            for i in (0..written).rev() {
                let key = &entries[i].0;
                if let Err(restore) = meta.put(doc, key, priors[i].clone()) {
                    warn!(%doc, %key, error = %restore, "could not restore key after failed write");
                }
            }
            return Err(e);
        }
    }
    Ok(())
}

fn require_map(raw: &Value, what: &str) -> Result<()> {
    if raw.is_object() {
        Ok(())
    } else {
        Err(FieldsError::InvalidValues {
            message: format!("{what} must be a map of field names"),
        })
    }
}
