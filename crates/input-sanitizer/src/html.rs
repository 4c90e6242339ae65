//! Allow-list filter for rich-text HTML.
//!
//! This is a weaker guarantee than [`sanitize_string`](crate::sanitize_string):
//! allowed tags keep their attributes (apart from event handlers and
//! script/data URLs) and the text between removed tags is kept.  Use it only
//! for rich text written by trusted authors, never for arbitrary user input.

use std::sync::LazyLock;

use regex::{Captures, Regex};

/// Tag names that survive [`sanitize_html`].
pub const ALLOWED_TAGS: &[&str] = &[
    "p", "br", "b", "strong", "i", "em", "u", "ol", "ul", "li", "a", "h1", "h2", "h3", "h4", "h5",
    "h6",
];

/// A well-formed tag (group 1 the name, group 2 the attribute text) or, failing
/// that, a stray `<` opening something tag-like (group 3).
static TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)</?([a-z][a-z0-9]*)\b((?:"[^"]*"|'[^']*'|[^'">])*)>|<(/?[a-z])"#)
        .expect("tag pattern must compile")
});

/// One attribute: group 1 the name, group 2 the raw value.  `/` and
/// whitespace both separate attributes.
static ATTR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"([^\s/>=]+)(?:\s*=\s*("[^"]*"|'[^']*'|[^\s>]*))?"#)
        .expect("attribute pattern must compile")
});

const URL_ATTRS: &[&str] = &["href", "src", "action", "formaction", "xlink:href"];

const UNSAFE_SCHEMES: &[&str] = &["javascript:", "vbscript:", "data:"];

/// Returns `true` if `tag` is in [`ALLOWED_TAGS`] (ASCII case-insensitive).
pub fn is_allowed_tag(tag: &str) -> bool {
    ALLOWED_TAGS.iter().any(|t| t.eq_ignore_ascii_case(tag))
}

/// Drop every tag outside [`ALLOWED_TAGS`] and strip event handlers and
/// `javascript:`/`data:` URLs from the tags that remain.
///
/// Allowed tags are rebuilt from their parsed attributes, so nothing but
/// the tag name, the surviving attributes and a self-closing `/` is carried
/// over.  A `<` that does not open a well-formed tag is escaped as `&lt;`.
///
/// ```rust
/// use input_sanitizer::sanitize_html;
///
/// let out = sanitize_html(r#"<p onclick="x()">Hi <span>there</span></p>"#);
/// assert_eq!(out, "<p>Hi there</p>");
/// ```
pub fn sanitize_html(html: &str) -> String {
    TAG.replace_all(html, |caps: &Captures<'_>| {
        if let Some(stray) = caps.get(3) {
            return format!("&lt;{}", stray.as_str());
        }
        if !is_allowed_tag(&caps[1]) {
            return String::new();
        }
        let attrs = caps.get(2).map_or("", |m| m.as_str());
        if caps[0].starts_with("</") {
            format!("</{}>", &caps[1])
        } else {
            rebuild_tag(&caps[1], attrs)
        }
    })
    .into_owned()
}

fn rebuild_tag(name: &str, attrs: &str) -> String {
    let mut out = format!("<{name}");
    let mut consumed = 0;
    for attr in ATTR.captures_iter(attrs) {
        let Some(whole) = attr.get(0) else { continue };
        consumed = whole.end();
        let attr_name = &attr[1];
        let value = attr.get(2).map(|m| m.as_str());
        if is_unsafe_attribute(attr_name, value) {
            continue;
        }
        out.push(' ');
        out.push_str(attr_name);
        if let Some(value) = value {
            out.push('=');
            out.push_str(value);
        }
    }
    if attrs[consumed..].contains('/') {
        out.push('/');
    }
    out.push('>');
    out
}

fn is_unsafe_attribute(name: &str, value: Option<&str>) -> bool {
    let name = name.to_ascii_lowercase();
    if name.starts_with("on") {
        return true;
    }
    if !URL_ATTRS.contains(&name.as_str()) {
        return false;
    }
    let Some(value) = value else { return false };
    // Browsers ignore whitespace and control characters inside a scheme.
    let url: String = value
        .trim_matches(|c: char| c == '"' || c == '\'')
        .chars()
        .filter(|c| !c.is_ascii_whitespace() && !c.is_control())
        .collect::<String>()
        .to_ascii_lowercase();
    UNSAFE_SCHEMES.iter().any(|scheme| url.starts_with(scheme))
}
