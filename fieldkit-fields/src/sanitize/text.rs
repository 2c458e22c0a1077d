//! Conservative text cleaning.
//!
//! The default rule for every string the schema does not mark as rich text or
//! code: all markup is removed, internal line breaks survive, control
//! characters and surrounding whitespace do not.

use once_cell::sync::Lazy;
use regex::Regex;

/// `<script>` and `<style>` elements, content included.
static SCRIPT_STYLE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)<(script|style)\b[^>]*>.*?(?:</(?:script|style)\s*>|\z)")
        .expect("script/style pattern is valid")
});

/// Any remaining tag, comment or processing instruction.
static TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<!--.*?(?:-->|\z)|</?[A-Za-z!?][^>]*>?").expect("tag pattern is valid"));

/// Tags and comments closed by `>`. A lone `<` is left for escaping.
static CLOSED_TAG: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)<!--.*?-->|</?[A-Za-z!?][^<>]*>").expect("closed tag pattern is valid")
});

/// Percent-encoded octets, which smuggle markup past tag stripping.
static OCTET: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"%[a-fA-F0-9]{2}").expect("octet pattern is valid"));

/// Remove every tag. Script and style elements lose their content too.
///
/// Runs until nothing changes, so a removal cannot splice a new tag together.
pub fn strip_all_tags(input: &str) -> String {
    let mut current = input.to_string();
    loop {
        let without_blocks = SCRIPT_STYLE.replace_all(&current, "");
        let next = TAG.replace_all(&without_blocks, "").into_owned();
        if next == current {
            return current;
        }
        current = next;
    }
}

/// Remove script and style elements and every closed tag.
///
/// Text after an unterminated `<` survives, unlike [`strip_all_tags`].
fn strip_markup(input: &str) -> String {
    let mut current = input.to_string();
    loop {
        let without_blocks = SCRIPT_STYLE.replace_all(&current, "");
        let next = CLOSED_TAG.replace_all(&without_blocks, "").into_owned();
        if next == current {
            return current;
        }
        current = next;
    }
}

/// Clean a plain-text value, keeping line breaks.
///
/// Markup is removed; a stray `<` is escaped.
pub fn sanitize_text(input: &str) -> String {
    let stripped = strip_markup(input);
    let normalized = stripped.replace("\r\n", "\n").replace('\r', "\n");
    let without_octets = OCTET.replace_all(&normalized, "");
    let cleaned: String = without_octets
        .chars()
        .filter(|c| !c.is_control() || *c == '\n' || *c == '\t')
        .collect();
    cleaned
        .split('\n')
        .map(str::trim_end)
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .replace('<', "&lt;")
}

/// Reduce a map key to identifier characters: ASCII letters, digits, `_` and `-`.
pub fn sanitize_key(key: &str) -> String {
    key.chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '-')
        .collect()
}
