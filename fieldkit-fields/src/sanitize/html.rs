//! Allowlist HTML cleaning for rich text.
//!
//! Input is parsed as an HTML fragment and re-serialized keeping only the
//! tags and attributes trusted for post content. Disallowed elements are
//! unwrapped (their text survives), except for script-bearing elements whose
//! content is dropped. Event handler attributes and URLs with executable
//! schemes never survive.

use html_escape::{encode_double_quoted_attribute, encode_text};
use scraper::{ElementRef, Html, Node};

/// Tags allowed in post content.
const ALLOWED_TAGS: &[&str] = &[
    "a", "abbr", "acronym", "address", "article", "aside", "b", "bdo", "big", "blockquote", "br",
    "caption", "cite", "code", "col", "colgroup", "dd", "del", "details", "dfn", "div", "dl", "dt",
    "em", "figcaption", "figure", "footer", "h1", "h2", "h3", "h4", "h5", "h6", "header", "hr",
    "i", "img", "ins", "kbd", "li", "main", "mark", "nav", "ol", "p", "pre", "q", "s", "section",
    "small", "span", "strike", "strong", "sub", "summary", "sup", "table", "tbody", "td",
    "tfoot", "th", "thead", "time", "tr", "u", "ul", "var",
];

/// Elements dropped together with everything inside them.
const DROPPED_WITH_CONTENT: &[&str] = &[
    "script", "style", "iframe", "object", "embed", "applet", "noscript", "template", "svg",
    "math", "frame", "frameset",
];

const VOID_TAGS: &[&str] = &["br", "col", "hr", "img"];

/// Attributes allowed on every allowed tag.
const GLOBAL_ATTRS: &[&str] = &["class", "id", "style", "title", "lang", "dir", "role"];

/// Per-tag attribute allowlist.
fn tag_attrs(tag: &str) -> &'static [&'static str] {
    match tag {
        "a" => &["href", "rel", "rev", "name", "target", "download", "hreflang"],
        "img" => &[
            "src", "alt", "width", "height", "srcset", "sizes", "loading", "decoding", "align",
        ],
        "blockquote" | "q" | "del" | "ins" => &["cite", "datetime"],
        "ol" => &["start", "reversed", "type"],
        "li" => &["value"],
        "td" | "th" => &["colspan", "rowspan", "scope", "headers", "align", "valign"],
        "col" | "colgroup" => &["span", "align", "valign", "width"],
        "table" => &["border", "cellpadding", "cellspacing", "summary", "width"],
        "time" => &["datetime"],
        "details" => &["open"],
        "abbr" | "acronym" | "dfn" => &["title"],
        _ => &[],
    }
}

const URL_ATTRS: &[&str] = &["href", "src", "cite", "srcset"];

const ALLOWED_SCHEMES: &[&str] = &["http", "https", "mailto", "tel", "ftp", "ftps", "sms"];

/// Clean an HTML fragment against the post-content allowlist.
pub fn sanitize_html(input: &str) -> String {
    let fragment = Html::parse_fragment(input);
    let mut out = String::with_capacity(input.len());
    write_children(fragment.root_element(), &mut out);
    out
}

fn write_children(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        if let Some(child_element) = ElementRef::wrap(child) {
            write_element(child_element, out);
        } else if let Node::Text(text) = child.value() {
            out.push_str(&encode_text(&**text));
        }
    }
}

fn write_element(element: ElementRef<'_>, out: &mut String) {
    let tag = element.value().name().to_ascii_lowercase();

    if DROPPED_WITH_CONTENT.contains(&tag.as_str()) {
        return;
    }

    if !ALLOWED_TAGS.contains(&tag.as_str()) {
        write_children(element, out);
        return;
    }

    out.push('<');
    out.push_str(&tag);
    for (name, value) in element.value().attrs() {
        let name = name.to_ascii_lowercase();
        if !attribute_allowed(&tag, &name) {
            continue;
        }
        if URL_ATTRS.contains(&name.as_str()) && !url_allowed(value) {
            continue;
        }
        if name == "style" && style_is_dangerous(value) {
            continue;
        }
        out.push(' ');
        out.push_str(&name);
        out.push_str("=\"");
        out.push_str(&encode_double_quoted_attribute(value));
        out.push('"');
    }
    out.push('>');

    if VOID_TAGS.contains(&tag.as_str()) {
        return;
    }

    write_children(element, out);
    out.push_str("</");
    out.push_str(&tag);
    out.push('>');
}

fn attribute_allowed(tag: &str, name: &str) -> bool {
    if name.starts_with("on") {
        return false;
    }
    GLOBAL_ATTRS.contains(&name)
        || tag_attrs(tag).contains(&name)
        || name.starts_with("aria-")
        || name.starts_with("data-")
}

/// Relative URLs, fragments and allowlisted schemes pass.
pub(crate) fn url_allowed(value: &str) -> bool {
    let compact: String = value
        .chars()
        .filter(|c| !c.is_whitespace() && !c.is_control())
        .collect::<String>()
        .to_ascii_lowercase();

    let Some(colon) = compact.find(':') else {
        return true;
    };
    // A colon after the first path, query or fragment delimiter is not a scheme.
    if compact[..colon].contains(['/', '?', '#']) {
        return true;
    }
    ALLOWED_SCHEMES.contains(&&compact[..colon])
}

fn style_is_dangerous(value: &str) -> bool {
    let lower = value.to_ascii_lowercase();
    ["expression(", "javascript:", "vbscript:", "behavior:", "-moz-binding", "url("]
        .iter()
        .any(|needle| lower.contains(needle))
}
