//! Store key layout.
//!
//! Every persisted item lives under a key derived from a configurable prefix:
//!
//! ```text
//! {prefix}_schema_{scope}          canonical schema tree
//! {prefix}_schema_source_{scope}   raw schema source, for round-trip editing
//! {prefix}_values_group_{template} group-shared value tree
//! {prefix}_values_global           site-global value tree
//! {prefix}_global_enabled_{template}
//! ```
//!
//! and, per document in the meta store, `{prefix}_values`,
//! `{prefix}_shared_fields`, `{prefix}_schema_snapshot` and `{prefix}_template`.

use std::fmt;
use std::str::FromStr;

pub const DEFAULT_KEY_PREFIX: &str = "fieldkit";

/// Which schema a key refers to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SchemaScope {
    /// The per-document schema of documents bound to a template.
    Template(String),
    /// The group-shared schema of a template.
    SharedGroup(String),
    /// The single site-global schema.
    Global,
}

impl SchemaScope {
    pub fn template(name: impl Into<String>) -> Self {
        SchemaScope::Template(name.into())
    }

    pub fn shared_group(name: impl Into<String>) -> Self {
        SchemaScope::SharedGroup(name.into())
    }

    /// The template id this scope belongs to, if any.
    pub fn template_id(&self) -> Option<&str> {
        match self {
            SchemaScope::Template(t) | SchemaScope::SharedGroup(t) => Some(t),
            SchemaScope::Global => None,
        }
    }

    fn key_segment(&self) -> String {
        match self {
            SchemaScope::Template(t) => format!("template_{t}"),
            SchemaScope::SharedGroup(t) => format!("group_{t}"),
            SchemaScope::Global => "global".to_string(),
        }
    }
}

impl fmt::Display for SchemaScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaScope::Template(t) => write!(f, "template:{t}"),
            SchemaScope::SharedGroup(t) => write!(f, "group:{t}"),
            SchemaScope::Global => f.write_str("global"),
        }
    }
}

impl FromStr for SchemaScope {
    type Err = String;

    /// Parse `template:<id>`, `group:<id>` or `global`.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        if s == "global" {
            return Ok(SchemaScope::Global);
        }
        match s.split_once(':') {
            Some(("template", id)) if !id.is_empty() => Ok(SchemaScope::template(id)),
            Some(("group", id)) if !id.is_empty() => Ok(SchemaScope::shared_group(id)),
            _ => Err(format!(
                "invalid schema scope '{s}': expected template:<id>, group:<id> or global"
            )),
        }
    }
}

/// Names every key the engine reads or writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreKeys {
    prefix: String,
}

impl StoreKeys {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn schema(&self, scope: &SchemaScope) -> String {
        format!("{}_schema_{}", self.prefix, scope.key_segment())
    }

    pub fn schema_source(&self, scope: &SchemaScope) -> String {
        format!("{}_schema_source_{}", self.prefix, scope.key_segment())
    }

    pub fn group_values(&self, template: &str) -> String {
        format!("{}_values_group_{template}", self.prefix)
    }

    pub fn global_values(&self) -> String {
        format!("{}_values_global", self.prefix)
    }

    pub fn global_enabled(&self, template: &str) -> String {
        format!("{}_global_enabled_{template}", self.prefix)
    }

    // Document meta keys

    pub fn document_values(&self) -> String {
        format!("{}_values", self.prefix)
    }

    pub fn document_shared_fields(&self) -> String {
        format!("{}_shared_fields", self.prefix)
    }

    pub fn document_schema_snapshot(&self) -> String {
        format!("{}_schema_snapshot", self.prefix)
    }

    pub fn document_template(&self) -> String {
        format!("{}_template", self.prefix)
    }
}

impl Default for StoreKeys {
    fn default() -> Self {
        Self::new(DEFAULT_KEY_PREFIX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_keys_differ_per_scope() {
        let keys = StoreKeys::default();
        assert_eq!(
            keys.schema(&SchemaScope::template("page.php")),
            "fieldkit_schema_template_page.php"
        );
        assert_eq!(
            keys.schema(&SchemaScope::shared_group("page.php")),
            "fieldkit_schema_group_page.php"
        );
        assert_eq!(keys.schema(&SchemaScope::Global), "fieldkit_schema_global");
        assert_eq!(
            keys.schema_source(&SchemaScope::Global),
            "fieldkit_schema_source_global"
        );
    }

    #[test]
    fn prefix_is_configurable() {
        let keys = StoreKeys::new("site");
        assert_eq!(keys.global_values(), "site_values_global");
        assert_eq!(keys.group_values("home.php"), "site_values_group_home.php");
        assert_eq!(keys.global_enabled("home.php"), "site_global_enabled_home.php");
        assert_eq!(keys.document_values(), "site_values");
        assert_eq!(keys.document_template(), "site_template");
    }

    #[test]
    fn scope_parses_from_display_form() {
        for scope in [
            SchemaScope::template("page.php"),
            SchemaScope::shared_group("parts/header.php"),
            SchemaScope::Global,
        ] {
            assert_eq!(scope.to_string().parse::<SchemaScope>().unwrap(), scope);
        }
        assert!("template:".parse::<SchemaScope>().is_err());
        assert!("page.php".parse::<SchemaScope>().is_err());
    }

    #[test]
    fn template_id() {
        assert_eq!(SchemaScope::shared_group("x").template_id(), Some("x"));
        assert_eq!(SchemaScope::Global.template_id(), None);
    }
}
