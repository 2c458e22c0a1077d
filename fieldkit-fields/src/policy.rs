//! Context classification for schema policy rules.
//!
//! A schema is saved for a context: usually a template file such as
//! `page.php` or `template-parts/header.php`. Templates that render one
//! document are document-scoped. Partials and archive-like templates render
//! data shared by many documents and are shared-scoped.
//!
//! The classification is a fixed list of glob patterns matched against the
//! base name of the context id. The list is configuration, not inference.

use glob::{MatchOptions, Pattern};
use tracing::warn;

/// Patterns for conventional shared-content templates.
pub const DEFAULT_SHARED_CONTEXTS: &[&str] = &[
    "header.php",
    "header-*.php",
    "footer.php",
    "footer-*.php",
    "sidebar.php",
    "sidebar-*.php",
    "searchform.php",
    "comments.php",
    "content.php",
    "content-*.php",
    "index.php",
    "home.php",
    "search.php",
    "archive.php",
    "archive-*.php",
    "category.php",
    "category-*.php",
    "tag.php",
    "tag-*.php",
    "taxonomy.php",
    "taxonomy-*.php",
    "author.php",
    "author-*.php",
    "date.php",
];

/// How a context relates to documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextScope {
    /// Exactly one document's editor sees this context.
    Document,
    /// Data in this context is shared across documents.
    Shared,
}

/// Glob-based context classifier.
#[derive(Debug, Clone)]
pub struct ContextPolicy {
    patterns: Vec<Pattern>,
}

impl ContextPolicy {
    /// Build a policy from glob patterns. Invalid patterns are skipped with a warning.
    pub fn new<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let patterns = patterns
            .into_iter()
            .filter_map(|p| match Pattern::new(p.as_ref()) {
                Ok(pattern) => Some(pattern),
                Err(e) => {
                    warn!(pattern = p.as_ref(), %e, "skipping invalid shared-context pattern");
                    None
                }
            })
            .collect();
        Self { patterns }
    }

    /// The configured patterns, as written.
    pub fn patterns(&self) -> Vec<&str> {
        self.patterns.iter().map(Pattern::as_str).collect()
    }

    pub fn classify(&self, context_id: &str) -> ContextScope {
        let base = base_name(context_id);
        let options = MatchOptions {
            case_sensitive: false,
            require_literal_separator: false,
            require_literal_leading_dot: false,
        };
        if self
            .patterns
            .iter()
            .any(|p| p.matches_with(base, options))
        {
            ContextScope::Shared
        } else {
            ContextScope::Document
        }
    }

    pub fn is_shared(&self, context_id: &str) -> bool {
        self.classify(context_id) == ContextScope::Shared
    }
}

impl Default for ContextPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_SHARED_CONTEXTS)
    }
}

/// Strip any leading path segments.
fn base_name(context_id: &str) -> &str {
    context_id
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(context_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_document_templates_are_document_scoped() {
        let policy = ContextPolicy::default();
        for id in ["page.php", "single.php", "single-product.php", "front-page.php"] {
            assert_eq!(policy.classify(id), ContextScope::Document, "{id}");
        }
    }

    #[test]
    fn partials_and_archives_are_shared() {
        let policy = ContextPolicy::default();
        for id in ["header.php", "footer-shop.php", "archive-product.php", "category.php"] {
            assert!(policy.is_shared(id), "{id}");
        }
    }

    #[test]
    fn leading_path_segments_are_ignored() {
        let policy = ContextPolicy::default();
        assert!(policy.is_shared("template-parts/header.php"));
        assert!(policy.is_shared("theme\\partials\\sidebar.php"));
        assert!(!policy.is_shared("headers/page.php"));
    }

    #[test]
    fn matching_is_case_insensitive() {
        assert!(ContextPolicy::default().is_shared("Header.PHP"));
    }

    #[test]
    fn custom_patterns_replace_defaults() {
        let policy = ContextPolicy::new(["listing-*"]);
        assert!(policy.is_shared("listing-events"));
        assert!(!policy.is_shared("header.php"));
        assert_eq!(policy.patterns(), vec!["listing-*"]);
    }

    #[test]
    fn invalid_patterns_are_skipped() {
        let policy = ContextPolicy::new(["[", "header.php"]);
        assert_eq!(policy.patterns(), vec!["header.php"]);
    }
}
