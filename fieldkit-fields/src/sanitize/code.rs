//! Cleaning for `code` fields.
//!
//! The rule depends on the field's `language` option and on whether the
//! acting author is trusted with custom code:
//!
//! | language        | trusted              | untrusted            |
//! |-----------------|----------------------|----------------------|
//! | `css`           | dangerous constructs stripped | same          |
//! | `js`/`javascript` | verbatim           | all tags stripped    |
//! | `html` (default) | verbatim            | allowlist HTML clean |

use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;

use super::html::sanitize_html;
use super::text::strip_all_tags;

/// CSS constructs that can execute script or pull in foreign content.
static DANGEROUS_CSS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)expression\s*\(|javascript\s*:|vbscript\s*:|@import|behavior\s*:|-moz-binding|data\s*:\s*text/html",
    )
    .expect("css pattern is valid")
});

/// Language of a code field, read from its `language` option.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodeLanguage {
    Css,
    JavaScript,
    Html,
}

impl CodeLanguage {
    /// Map a `language` option value. Missing or unrecognized languages are HTML.
    pub fn from_option(language: Option<&str>) -> Self {
        match language.map(|l| l.trim().to_ascii_lowercase()).as_deref() {
            Some("css") => CodeLanguage::Css,
            Some("js") | Some("javascript") => CodeLanguage::JavaScript,
            _ => CodeLanguage::Html,
        }
    }
}

impl fmt::Display for CodeLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CodeLanguage::Css => "css",
            CodeLanguage::JavaScript => "javascript",
            CodeLanguage::Html => "html",
        };
        f.write_str(name)
    }
}

/// Clean a code value for the given language and trust level.
pub fn clean_code(source: &str, language: CodeLanguage, trusted_author: bool) -> String {
    match (language, trusted_author) {
        (CodeLanguage::Css, _) => strip_dangerous_css(source),
        (CodeLanguage::JavaScript, true) | (CodeLanguage::Html, true) => source.to_string(),
        (CodeLanguage::JavaScript, false) => strip_all_tags(source),
        (CodeLanguage::Html, false) => sanitize_html(source),
    }
}

/// Remove dangerous CSS constructs, repeating until none remain so that
/// removals cannot splice a new match together.
pub fn strip_dangerous_css(css: &str) -> String {
    let mut current = css.to_string();
    loop {
        let next = DANGEROUS_CSS.replace_all(&current, "").into_owned();
        if next == current {
            return current;
        }
        current = next;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn language_option_mapping() {
        assert_eq!(CodeLanguage::from_option(Some("CSS")), CodeLanguage::Css);
        assert_eq!(CodeLanguage::from_option(Some("js")), CodeLanguage::JavaScript);
        assert_eq!(
            CodeLanguage::from_option(Some("javascript")),
            CodeLanguage::JavaScript
        );
        assert_eq!(CodeLanguage::from_option(Some("php")), CodeLanguage::Html);
        assert_eq!(CodeLanguage::from_option(None), CodeLanguage::Html);
    }

    #[test]
    fn css_is_stripped_for_both_trust_levels() {
        let css = "a { width: expression(alert(1)); background: url(javascript:x) } @import 'x.css';";
        let trusted = clean_code(css, CodeLanguage::Css, true);
        let untrusted = clean_code(css, CodeLanguage::Css, false);
        assert_eq!(trusted, untrusted);
        assert!(!trusted.to_lowercase().contains("expression("));
        assert!(!trusted.contains("javascript:"));
        assert!(!trusted.contains("@import"));
        assert!(trusted.contains("a {"));
    }

    #[test]
    fn css_stripping_is_case_insensitive_and_spaced() {
        let out = strip_dangerous_css("x { -MOZ-BINDING: url(a); behavior : url(b); y: DATA : text/html }");
        assert!(!out.to_lowercase().contains("-moz-binding"));
        assert!(!out.to_lowercase().contains("behavior"));
        assert!(!out.to_lowercase().contains("text/html"));
    }

    #[test]
    fn css_removal_cannot_splice_a_new_match() {
        let out = strip_dangerous_css("javajavascript:script: red");
        assert!(!out.contains("javascript:"));
    }

    #[test]
    fn plain_css_passes_through() {
        let css = "body { color: red; }\n.a > .b { margin: 0 }";
        assert_eq!(strip_dangerous_css(css), css);
    }

    #[test]
    fn javascript_trusted_is_verbatim() {
        let js = "if (a < b) { document.write('<b>x</b>'); }";
        assert_eq!(clean_code(js, CodeLanguage::JavaScript, true), js);
    }

    #[test]
    fn javascript_untrusted_loses_tags() {
        let out = clean_code("<script>alert(1)</script>var x = 1;", CodeLanguage::JavaScript, false);
        assert_eq!(out, "var x = 1;");
    }

    #[test]
    fn html_trusted_is_verbatim() {
        let html = "<div onclick=\"go()\"><script>track()</script></div>";
        assert_eq!(clean_code(html, CodeLanguage::Html, true), html);
    }

    #[test]
    fn html_untrusted_is_allowlist_cleaned() {
        let out = clean_code(
            "<div onclick=\"go()\">hi<script>track()</script></div>",
            CodeLanguage::Html,
            false,
        );
        assert_eq!(out, "<div>hi</div>");
    }
}
