//! Field value resolution across scopes.
//!
//! A field's value may live in four places: a context-local tree the caller
//! is already holding, the document's own values, the group-shared values of
//! the document's template, and the site-global values. For a document the
//! probes run in a fixed order and the first non-null hit wins:
//!
//! 1. context-local tree (short-circuits, no store access)
//! 2. group-shared, when the document opted this field into shared data
//! 3. site-global, when the document's template has site-global enabled
//! 4. the document's own values
//! 5. group-shared, when the field is declared only in the group-shared schema
//!
//! Opted-in shared data therefore masks a document's own value.

use serde_json::{Map, Value};
use tracing::trace;

use crate::error::{FieldsError, Result};
use crate::keys::{SchemaScope, StoreKeys};
use crate::store::{DocumentMetaStore, Store};
use crate::types::{Schema, SchemaNode};

/// What a resolution is for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolutionTarget {
    Document(String),
    Group(String),
}

/// Where to look for a field.
///
/// Built only through constructors that set a local tree, a target, or both.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolutionContext<'a> {
    local: Option<&'a Value>,
    target: Option<ResolutionTarget>,
}

impl<'a> ResolutionContext<'a> {
    /// Resolve for a document.
    pub fn document(id: impl Into<String>) -> Self {
        Self {
            local: None,
            target: Some(ResolutionTarget::Document(id.into())),
        }
    }

    /// Resolve for a template's group-shared data.
    pub fn group(key: impl Into<String>) -> Self {
        Self {
            local: None,
            target: Some(ResolutionTarget::Group(key.into())),
        }
    }

    /// Resolve only inside an already resolved tree, such as a block instance.
    pub fn local(tree: &'a Value) -> Self {
        Self {
            local: Some(tree),
            target: None,
        }
    }

    /// Restrict this context to `tree`. Store probes no longer run.
    pub fn within(mut self, tree: &'a Value) -> Self {
        self.local = Some(tree);
        self
    }

    pub fn local_tree(&self) -> Option<&'a Value> {
        self.local
    }

    pub fn target(&self) -> Option<&ResolutionTarget> {
        self.target.as_ref()
    }
}

/// Reads effective field values from the stores.
pub struct FieldResolver<'s, S: Store + ?Sized, M: DocumentMetaStore + ?Sized> {
    store: &'s S,
    meta: &'s M,
    keys: &'s StoreKeys,
}

impl<'s, S: Store + ?Sized, M: DocumentMetaStore + ?Sized> FieldResolver<'s, S, M> {
    pub fn new(store: &'s S, meta: &'s M, keys: &'s StoreKeys) -> Self {
        Self { store, meta, keys }
    }

    /// The effective value of `field`, or `None`.
    pub fn resolve(&self, field: &str, ctx: &ResolutionContext<'_>) -> Result<Option<Value>> {
        if let Some(tree) = ctx.local {
            trace!(%field, probe = "context-local", "resolving inside local tree");
            return Ok(present(tree, field));
        }

        match &ctx.target {
            Some(ResolutionTarget::Document(doc)) => self.resolve_document(field, doc),
            Some(ResolutionTarget::Group(group)) => self.resolve_group(field, group),
            None => Ok(None),
        }
    }

    /// Like [`resolve`](Self::resolve), falling back to the declaring schema
    /// node's `default`.
    pub fn resolve_or_default(
        &self,
        field: &str,
        ctx: &ResolutionContext<'_>,
    ) -> Result<Option<Value>> {
        if let Some(value) = self.resolve(field, ctx)? {
            return Ok(Some(value));
        }
        if ctx.local.is_some() {
            return Ok(None);
        }
        let node = match &ctx.target {
            Some(ResolutionTarget::Document(doc)) => match self.document_template(doc)? {
                Some(template) => self.declaring_node(field, &template)?,
                None => None,
            },
            Some(ResolutionTarget::Group(group)) => self
                .load_schema(&SchemaScope::shared_group(group.as_str()))?
                .field(field)
                .cloned(),
            None => None,
        };
        Ok(node.and_then(|n| n.default))
    }

    /// Effective values for every top-level field declared in the document's
    /// template schema and group-shared schema. Unresolved fields map to their
    /// default, or null.
    pub fn resolve_all(&self, doc: &str) -> Result<Map<String, Value>> {
        let template = self
            .document_template(doc)?
            .ok_or_else(|| FieldsError::UnboundDocument {
                document: doc.to_string(),
            })?;

        let own = self.load_schema(&SchemaScope::template(template.as_str()))?;
        let shared = self.load_schema(&SchemaScope::shared_group(template.as_str()))?;
        let ctx = ResolutionContext::document(doc);

        let mut out = Map::new();
        for node in own.fields.iter().chain(shared.fields.iter()) {
            if node.name.is_empty() || out.contains_key(&node.name) {
                continue;
            }
            let value = match self.resolve(&node.name, &ctx)? {
                Some(value) => value,
                None => node.default.clone().unwrap_or(Value::Null),
            };
            out.insert(node.name.clone(), value);
        }
        Ok(out)
    }

    fn resolve_document(&self, field: &str, doc: &str) -> Result<Option<Value>> {
        let template = self.document_template(doc)?;

        if let Some(template) = template.as_deref() {
            if self.opted_in(doc, field)? {
                if let Some(value) = self.group_value(template, field)? {
                    trace!(%field, %doc, probe = "group-opt-in", "resolved");
                    return Ok(Some(value));
                }
            }

            if self.global_enabled(template)? {
                if let Some(value) = self.global_value(field)? {
                    trace!(%field, %doc, probe = "site-global", "resolved");
                    return Ok(Some(value));
                }
            }
        }

        if let Some(value) = self.document_value(doc, field)? {
            trace!(%field, %doc, probe = "document", "resolved");
            return Ok(Some(value));
        }

        if let Some(template) = template.as_deref() {
            let own = self.load_schema(&SchemaScope::template(template))?;
            if !own.declares(field) {
                let shared = self.load_schema(&SchemaScope::shared_group(template))?;
                if shared.declares(field) {
                    if let Some(value) = self.group_value(template, field)? {
                        trace!(%field, %doc, probe = "group-fallback", "resolved");
                        return Ok(Some(value));
                    }
                }
            }
        }

        trace!(%field, %doc, "no probe produced a value");
        Ok(None)
    }

    /// Group-shared value, then site-global when the group has it enabled.
    fn resolve_group(&self, field: &str, group: &str) -> Result<Option<Value>> {
        if let Some(value) = self.group_value(group, field)? {
            trace!(%field, %group, probe = "group", "resolved");
            return Ok(Some(value));
        }
        if self.global_enabled(group)? {
            if let Some(value) = self.global_value(field)? {
                trace!(%field, %group, probe = "site-global", "resolved");
                return Ok(Some(value));
            }
        }
        Ok(None)
    }

    /// The template a document is bound to.
    pub fn document_template(&self, doc: &str) -> Result<Option<String>> {
        let key = self.keys.document_template();
        match self.meta.get(doc, &key)? {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(t)) if !t.is_empty() => Ok(Some(t)),
            Some(Value::String(_)) => Ok(None),
            Some(other) => Err(FieldsError::corrupt(
                key,
                format!("expected a template id, found {other}"),
            )),
        }
    }

    /// Load a canonical schema. A missing schema is empty.
    pub fn load_schema(&self, scope: &SchemaScope) -> Result<Schema> {
        let key = self.keys.schema(scope);
        match self.store.get(&key)? {
            None | Some(Value::Null) => Ok(Schema::default()),
            Some(tree) => Schema::from_tree(&tree).map_err(|e| FieldsError::corrupt(key, e)),
        }
    }

    fn declaring_node(&self, field: &str, template: &str) -> Result<Option<SchemaNode>> {
        if let Some(node) = self.load_schema(&SchemaScope::template(template))?.field(field) {
            return Ok(Some(node.clone()));
        }
        Ok(self
            .load_schema(&SchemaScope::shared_group(template))?
            .field(field)
            .cloned())
    }

    fn opted_in(&self, doc: &str, field: &str) -> Result<bool> {
        let key = self.keys.document_shared_fields();
        Ok(match self.meta.get(doc, &key)? {
            Some(Value::Object(map)) => map.get(field).is_some_and(truthy),
            Some(Value::Array(names)) => names.iter().any(|n| n.as_str() == Some(field)),
            _ => false,
        })
    }

    fn global_enabled(&self, template: &str) -> Result<bool> {
        Ok(self
            .store
            .get(&self.keys.global_enabled(template))?
            .as_ref()
            .is_some_and(truthy))
    }

    fn group_value(&self, template: &str, field: &str) -> Result<Option<Value>> {
        let tree = self.store.get(&self.keys.group_values(template))?;
        value_in(tree, field, &self.keys.group_values(template))
    }

    fn global_value(&self, field: &str) -> Result<Option<Value>> {
        let key = self.keys.global_values();
        value_in(self.store.get(&key)?, field, &key)
    }

    fn document_value(&self, doc: &str, field: &str) -> Result<Option<Value>> {
        let key = self.keys.document_values();
        value_in(self.meta.get(doc, &key)?, field, &key)
    }
}

/// Look `field` up in a stored value tree. The tree must be a map or absent.
fn value_in(tree: Option<Value>, field: &str, key: &str) -> Result<Option<Value>> {
    match tree {
        None | Some(Value::Null) => Ok(None),
        Some(tree @ Value::Object(_)) => Ok(present(&tree, field)),
        Some(_) => Err(FieldsError::corrupt(key, "expected a map of field values")),
    }
}

/// A key counts as present when it exists with a non-null value.
fn present(tree: &Value, field: &str) -> Option<Value> {
    tree.get(field).filter(|v| !v.is_null()).cloned()
}

/// Loose truthiness for stored flags, which may arrive as form strings.
pub(crate) fn truthy(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => matches!(s.trim().to_ascii_lowercase().as_str(), "1" | "true" | "on" | "yes"),
        Value::Null | Value::Array(_) | Value::Object(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryMetaStore, MemoryStore};
    use serde_json::json;

    struct Fixture {
        store: MemoryStore,
        meta: MemoryMetaStore,
        keys: StoreKeys,
    }

    impl Fixture {
        /// Document "7" bound to "page.php" with price=10; group price=20.
        fn new() -> Self {
            let keys = StoreKeys::default();
            let mut store = MemoryStore::new();
            let mut meta = MemoryMetaStore::new();
            store
                .put(
                    &keys.schema(&SchemaScope::template("page.php")),
                    json!({"fields": [
                        {"name": "price", "type": "number", "default": 1},
                        {"name": "title", "type": "string"}
                    ]}),
                )
                .unwrap();
            store
                .put(
                    &keys.schema(&SchemaScope::shared_group("page.php")),
                    json!({"fields": [
                        {"name": "price", "type": "number"},
                        {"name": "phone", "type": "string", "default": "n/a"}
                    ]}),
                )
                .unwrap();
            store
                .put(&keys.group_values("page.php"), json!({"price": 20, "phone": "555"}))
                .unwrap();
            meta.put("7", &keys.document_template(), json!("page.php")).unwrap();
            meta.put("7", &keys.document_values(), json!({"price": 10, "title": "Own"}))
                .unwrap();
            Self { store, meta, keys }
        }

        fn resolver(&self) -> FieldResolver<'_, MemoryStore, MemoryMetaStore> {
            FieldResolver::new(&self.store, &self.meta, &self.keys)
        }

        fn opt_in(&mut self, field: &str, on: bool) {
            self.meta
                .put("7", &self.keys.document_shared_fields(), json!({ field: on }))
                .unwrap();
        }
    }

    #[test]
    fn opted_in_group_value_masks_document_value() {
        let mut fx = Fixture::new();
        fx.opt_in("price", true);
        let value = fx.resolver().resolve("price", &ResolutionContext::document("7")).unwrap();
        assert_eq!(value, Some(json!(20)));
    }

    #[test]
    fn document_value_wins_without_opt_in() {
        let mut fx = Fixture::new();
        fx.opt_in("price", false);
        let value = fx.resolver().resolve("price", &ResolutionContext::document("7")).unwrap();
        assert_eq!(value, Some(json!(10)));
    }

    #[test]
    fn site_global_beats_document_when_enabled() {
        let mut fx = Fixture::new();
        fx.store.put(&fx.keys.global_values(), json!({"title": "Site"})).unwrap();
        let ctx = ResolutionContext::document("7");
        assert_eq!(fx.resolver().resolve("title", &ctx).unwrap(), Some(json!("Own")));

        fx.store.put(&fx.keys.global_enabled("page.php"), json!(true)).unwrap();
        assert_eq!(fx.resolver().resolve("title", &ctx).unwrap(), Some(json!("Site")));
    }

    #[test]
    fn group_opt_in_beats_site_global() {
        let mut fx = Fixture::new();
        fx.opt_in("price", true);
        fx.store.put(&fx.keys.global_values(), json!({"price": 30})).unwrap();
        fx.store.put(&fx.keys.global_enabled("page.php"), json!("1")).unwrap();
        let value = fx.resolver().resolve("price", &ResolutionContext::document("7")).unwrap();
        assert_eq!(value, Some(json!(20)));
    }

    #[test]
    fn group_only_fields_fall_back_to_group_values() {
        let fx = Fixture::new();
        let value = fx.resolver().resolve("phone", &ResolutionContext::document("7")).unwrap();
        assert_eq!(value, Some(json!("555")));
    }

    #[test]
    fn fields_declared_locally_do_not_fall_back() {
        let mut fx = Fixture::new();
        fx.meta.put("7", &fx.keys.document_values(), json!({})).unwrap();
        // `price` is declared in the page schema, so the group value is not used.
        let value = fx.resolver().resolve("price", &ResolutionContext::document("7")).unwrap();
        assert_eq!(value, None);
    }

    #[test]
    fn null_values_are_absent() {
        let mut fx = Fixture::new();
        fx.opt_in("price", true);
        fx.store
            .put(&fx.keys.group_values("page.php"), json!({"price": null}))
            .unwrap();
        let value = fx.resolver().resolve("price", &ResolutionContext::document("7")).unwrap();
        assert_eq!(value, Some(json!(10)));
    }

    #[test]
    fn context_local_tree_short_circuits() {
        let fx = Fixture::new();
        let tree = json!({"x": 5});
        let ctx = ResolutionContext::document("ignored").within(&tree);
        assert_eq!(fx.resolver().resolve("x", &ctx).unwrap(), Some(json!(5)));
        // `price` exists for the document but the local tree does not have it.
        let ctx = ResolutionContext::document("7").within(&tree);
        assert_eq!(fx.resolver().resolve("price", &ctx).unwrap(), None);
    }

    /// Fails the test on any store access.
    struct Untouchable;

    impl Store for Untouchable {
        fn get(&self, key: &str) -> Result<Option<Value>> {
            panic!("store read for {key}");
        }

        fn put(&mut self, key: &str, _value: Value) -> Result<()> {
            panic!("store write for {key}");
        }
    }

    impl DocumentMetaStore for Untouchable {
        fn get(&self, document: &str, key: &str) -> Result<Option<Value>> {
            panic!("meta read for {document}/{key}");
        }

        fn put(&mut self, document: &str, key: &str, _value: Value) -> Result<()> {
            panic!("meta write for {document}/{key}");
        }
    }

    #[test]
    fn local_resolution_needs_no_stores() {
        let keys = StoreKeys::default();
        let resolver = FieldResolver::new(&Untouchable, &Untouchable, &keys);
        let tree = json!({"caption": "hi", "x": 5});
        let value = resolver.resolve("caption", &ResolutionContext::local(&tree)).unwrap();
        assert_eq!(value, Some(json!("hi")));

        let ctx = ResolutionContext::document("ignored").within(&tree);
        assert_eq!(resolver.resolve("x", &ctx).unwrap(), Some(json!(5)));
        assert_eq!(resolver.resolve("missing", &ctx).unwrap(), None);
        assert_eq!(resolver.resolve_or_default("missing", &ctx).unwrap(), None);
    }

    #[test]
    fn unbound_document_uses_own_values_only() {
        let mut fx = Fixture::new();
        fx.meta.put("8", &fx.keys.document_values(), json!({"price": 3})).unwrap();
        let resolver = fx.resolver();
        assert_eq!(
            resolver.resolve("price", &ResolutionContext::document("8")).unwrap(),
            Some(json!(3))
        );
        assert_eq!(
            resolver.resolve("phone", &ResolutionContext::document("8")).unwrap(),
            None
        );
    }

    #[test]
    fn group_resolution_then_global() {
        let mut fx = Fixture::new();
        fx.store.put(&fx.keys.global_values(), json!({"logo": "g.png"})).unwrap();
        let ctx = ResolutionContext::group("page.php");
        assert_eq!(fx.resolver().resolve("price", &ctx).unwrap(), Some(json!(20)));
        assert_eq!(fx.resolver().resolve("logo", &ctx).unwrap(), None);
        fx.store.put(&fx.keys.global_enabled("page.php"), json!(1)).unwrap();
        assert_eq!(fx.resolver().resolve("logo", &ctx).unwrap(), Some(json!("g.png")));
    }

    #[test]
    fn defaults_fill_unresolved_fields() {
        let mut fx = Fixture::new();
        fx.meta.put("7", &fx.keys.document_values(), json!({})).unwrap();
        let ctx = ResolutionContext::document("7");
        let resolver = fx.resolver();
        assert_eq!(resolver.resolve_or_default("price", &ctx).unwrap(), Some(json!(1)));
        assert_eq!(resolver.resolve_or_default("title", &ctx).unwrap(), None);
    }

    #[test]
    fn resolve_all_covers_both_schemas() {
        let fx = Fixture::new();
        let all = fx.resolver().resolve_all("7").unwrap();
        assert_eq!(
            Value::Object(all),
            json!({"price": 10, "title": "Own", "phone": "555"})
        );
    }

    #[test]
    fn resolve_all_requires_binding() {
        let fx = Fixture::new();
        let err = fx.resolver().resolve_all("missing").unwrap_err();
        assert!(matches!(err, FieldsError::UnboundDocument { .. }));
    }

    #[test]
    fn non_map_value_tree_is_corrupt() {
        let mut fx = Fixture::new();
        fx.store.put(&fx.keys.global_values(), json!("oops")).unwrap();
        fx.store.put(&fx.keys.global_enabled("page.php"), json!(true)).unwrap();
        let err = fx
            .resolver()
            .resolve("title", &ResolutionContext::document("7"))
            .unwrap_err();
        assert!(matches!(err, FieldsError::CorruptValue { .. }));
    }

    #[test]
    fn truthiness_of_stored_flags() {
        assert!(truthy(&json!(true)));
        assert!(truthy(&json!("on")));
        assert!(truthy(&json!(1)));
        assert!(!truthy(&json!("0")));
        assert!(!truthy(&json!(false)));
        assert!(!truthy(&json!(null)));
    }
}
