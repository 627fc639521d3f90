//! Allow-list HTML sanitizer for notice markup.
//!
//! Known inline and block tags survive with a per-tag set of attributes.
//! Unknown tags are removed while their text is kept; `script` and `style`
//! elements disappear together with their content. Link targets must be
//! relative or use a safe protocol.

use regex::Regex;

lazy_static::lazy_static! {
    static ref COMMENT: Regex = Regex::new(r"(?s)<!--.*?(?:-->|\z)").unwrap();
    static ref SCRIPT_BLOCK: Regex = Regex::new(r"(?is)<script\b[^>]*>.*?(?:</script\s*>|\z)").unwrap();
    static ref STYLE_BLOCK: Regex = Regex::new(r"(?is)<style\b[^>]*>.*?(?:</style\s*>|\z)").unwrap();
    static ref TAG: Regex = Regex::new(r"<(/?)([A-Za-z][A-Za-z0-9]*)([^<>]*)>").unwrap();
    static ref ATTRIBUTE: Regex =
        Regex::new(r#"([A-Za-z_:][-A-Za-z0-9_:.]*)\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'>`=]+))"#).unwrap();
    static ref ENTITY: Regex = Regex::new(r"^&(?:#[0-9]{1,7}|#[xX][0-9a-fA-F]{1,6}|[A-Za-z][A-Za-z0-9]{1,31});").unwrap();
    static ref CHAR_REF: Regex =
        Regex::new(r"&(?:#[xX]([0-9a-fA-F]+)|#([0-9]+)|([A-Za-z][A-Za-z0-9]{1,31}));?").unwrap();
}

/// Tags that may appear in a notice and the attributes each may carry.
const ALLOWED_TAGS: &[(&str, &[&str])] = &[
    ("a", &["href", "title", "target", "rel", "class"]),
    ("abbr", &["title"]),
    ("b", &[]),
    ("br", &[]),
    ("code", &[]),
    ("em", &[]),
    ("i", &[]),
    ("li", &[]),
    ("ol", &[]),
    ("p", &["class"]),
    ("span", &["class"]),
    ("strong", &[]),
    ("ul", &[]),
];

const URL_ATTRIBUTES: &[&str] = &["href"];
const ALLOWED_PROTOCOLS: &[&str] = &["http", "https", "mailto"];

/// Sanitize notice markup against the allow-list.
pub fn sanitize_html(input: &str) -> String {
    let stripped = COMMENT.replace_all(input, "");
    let stripped = SCRIPT_BLOCK.replace_all(&stripped, "");
    let stripped = STYLE_BLOCK.replace_all(&stripped, "");

    let mut output = String::with_capacity(stripped.len());
    let mut cursor = 0;
    for caps in TAG.captures_iter(&stripped) {
        let Some(whole) = caps.get(0) else { continue };
        output.push_str(&escape_text(&stripped[cursor..whole.start()]));
        cursor = whole.end();

        let closing = !caps[1].is_empty();
        let name = caps[2].to_ascii_lowercase();
        let Some((_, allowed_attrs)) = ALLOWED_TAGS.iter().find(|(tag, _)| *tag == name) else {
            continue;
        };

        if closing {
            output.push_str("</");
            output.push_str(&name);
            output.push('>');
        } else {
            output.push('<');
            output.push_str(&name);
            output.push_str(&render_attributes(&caps[3], allowed_attrs));
            if caps[3].trim_end().ends_with('/') {
                output.push_str(" /");
            }
            output.push('>');
        }
    }
    output.push_str(&escape_text(&stripped[cursor..]));
    output
}

fn render_attributes(raw: &str, allowed: &[&str]) -> String {
    let mut rendered = String::new();
    for caps in ATTRIBUTE.captures_iter(raw) {
        let name = caps[1].to_ascii_lowercase();
        if !allowed.contains(&name.as_str()) {
            continue;
        }
        let value = caps
            .get(2)
            .or_else(|| caps.get(3))
            .or_else(|| caps.get(4))
            .map(|m| m.as_str())
            .unwrap_or("");
        if URL_ATTRIBUTES.contains(&name.as_str()) && !is_safe_url(value) {
            continue;
        }
        rendered.push(' ');
        rendered.push_str(&name);
        rendered.push_str("=\"");
        rendered.push_str(&escape_attr(value));
        rendered.push('"');
    }
    rendered
}

/// Relative URLs and URLs with an allowed protocol are safe.
///
/// The scheme is read the way a browser reads it: character references are
/// decoded first, then whitespace and control characters are dropped.
fn is_safe_url(value: &str) -> bool {
    let normalized = decode_char_refs(value)
        .chars()
        .filter(|c| !c.is_whitespace() && !c.is_control())
        .collect::<String>()
        .to_ascii_lowercase();

    let scheme_end = normalized.find(':');
    let path_start = normalized.find(['/', '?', '#']);
    match (scheme_end, path_start) {
        (Some(colon), Some(path)) if path < colon => true,
        (Some(colon), _) => ALLOWED_PROTOCOLS.contains(&&normalized[..colon]),
        (None, _) => true,
    }
}

/// Decode numeric references and the named ones that can hide a scheme.
fn decode_char_refs(value: &str) -> String {
    CHAR_REF
        .replace_all(value, |caps: &regex::Captures| {
            let code = match (caps.get(1), caps.get(2)) {
                (Some(hex), _) => Some(u32::from_str_radix(hex.as_str(), 16).unwrap_or(u32::MAX)),
                (None, Some(dec)) => Some(dec.as_str().parse::<u32>().unwrap_or(u32::MAX)),
                (None, None) => None,
            };
            if let Some(code) = code {
                return char::from_u32(code).unwrap_or('\u{FFFD}').to_string();
            }
            match &caps[3] {
                "colon" => ":".to_string(),
                "Tab" => "\t".to_string(),
                "NewLine" => "\n".to_string(),
                _ => caps[0].to_string(),
            }
        })
        .into_owned()
}

/// Escape text for use inside a double-quoted attribute.
///
/// Existing character references are left alone so values are not double-encoded.
pub fn escape_attr(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for (index, ch) in value.char_indices() {
        match ch {
            '&' if ENTITY.is_match(&value[index..]) => escaped.push('&'),
            '&' => escaped.push_str("&amp;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#039;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            c => escaped.push(c),
        }
    }
    escaped
}

fn escape_text(text: &str) -> String {
    text.replace('<', "&lt;").replace('>', "&gt;")
}
