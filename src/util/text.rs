use std::borrow::Cow;
use std::sync::LazyLock;

use quick_xml::escape::resolve_html5_entity;
use regex::Regex;

/// Longest named reference in the HTML5 table is 31 bytes plus the `#x` margin.
const MAX_ENTITY_LEN: usize = 32;

/// Block-level tags that separate lines of text once markup is stripped.
static BLOCK_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)</?(?:h[1-6]|br|p|ul|ol|li|blockquote|section|table|tr|div)\b[^>]*>")
        .expect("BLOCK_TAG regex")
});

/// Any tag, comment or declaration.
static ANY_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").expect("ANY_TAG regex"));

/// Decodes character references: XML builtins, numeric references and the
/// HTML5 named entities.
///
/// Unknown or malformed references are kept verbatim, so text like `AT&T`
/// survives untouched. Returns `Cow::Borrowed` when the input has no `&`.
///
/// # Examples
///
/// ```
/// use feedcanon::util::decode_entities;
///
/// assert_eq!(decode_entities("Fish &amp; Chips"), "Fish & Chips");
/// assert_eq!(decode_entities("&#8220;quoted&#x201D;"), "\u{201c}quoted\u{201d}");
/// assert_eq!(decode_entities("AT&T"), "AT&T");
/// ```
pub fn decode_entities(s: &str) -> Cow<'_, str> {
    if !s.contains('&') {
        return Cow::Borrowed(s);
    }

    let mut out = String::with_capacity(s.len());
    let mut rest = s;

    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp + 1..];

        let decoded = tail
            .find(';')
            .filter(|&end| end > 0 && end <= MAX_ENTITY_LEN)
            .and_then(|end| resolve_reference(&tail[..end], &mut out).then_some(end));

        match decoded {
            Some(end) => rest = &tail[end + 1..],
            None => {
                out.push('&');
                rest = tail;
            }
        }
    }

    out.push_str(rest);
    Cow::Owned(out)
}

/// Appends the replacement for `reference` (the text between `&` and `;`).
/// Returns `false` and leaves `out` untouched when the reference is unknown.
fn resolve_reference(reference: &str, out: &mut String) -> bool {
    if let Some(number) = reference.strip_prefix('#') {
        let code = match number.strip_prefix(['x', 'X']) {
            Some(hex) => u32::from_str_radix(hex, 16).ok(),
            None => number.parse::<u32>().ok(),
        };
        return match code.and_then(char::from_u32) {
            Some(c) => {
                out.push(c);
                true
            }
            None => false,
        };
    }

    match resolve_html5_entity(reference) {
        Some(replacement) => {
            out.push_str(replacement);
            true
        }
        None => false,
    }
}

/// Removes markup, turning block-level tags into line breaks.
///
/// Entities are left encoded so escaped angle brackets in the text are not
/// mistaken for tags.
pub fn strip_html(html: &str) -> String {
    let with_breaks = BLOCK_TAG.replace_all(html, "\n");
    ANY_TAG.replace_all(&with_breaks, "").into_owned()
}

/// Collapses horizontal whitespace to single spaces, trims every line and
/// drops blank lines.
pub fn collapse_whitespace(s: &str) -> String {
    s.lines()
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Plain-text snippet of an HTML fragment.
///
/// Strips tags, decodes entities and collapses whitespace. Returns `None`
/// when nothing readable is left, so callers omit the field instead of
/// writing an empty string.
///
/// # Examples
///
/// ```
/// use feedcanon::util::snippet;
///
/// assert_eq!(snippet("<b>Lorem</b> ipsum").as_deref(), Some("Lorem ipsum"));
/// assert_eq!(snippet("<p>One</p><p>Two &amp; three</p>").as_deref(), Some("One\nTwo & three"));
/// assert_eq!(snippet("<img src=\"x.png\"/>"), None);
/// ```
pub fn snippet(html: &str) -> Option<String> {
    let stripped = strip_html(html);
    let text = collapse_whitespace(&decode_entities(&stripped));
    (!text.is_empty()).then_some(text)
}
