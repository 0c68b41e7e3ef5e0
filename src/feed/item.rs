//! Per-item post-processing: derived dates, snippets and enclosures.

use serde_json::{Map, Value};

use super::model::Fields;
use crate::util::{snippet, to_iso_date};
use crate::xml::XmlNode;

/// Writes the resolved raw date as `date` and, when it parses, `isoDate`.
///
/// An unparseable date keeps `date` and just omits `isoDate`.
pub(crate) fn set_date(item: &mut Fields, raw: Option<&str>) {
    let Some(raw) = raw.filter(|r| !r.trim().is_empty()) else {
        return;
    };

    item.insert("date".to_string(), Value::String(raw.to_string()));
    match to_iso_date(raw) {
        Some(iso) => {
            item.insert("isoDate".to_string(), Value::String(iso));
        }
        None => {
            tracing::debug!(date = %raw, "Unparseable item date, omitting isoDate");
        }
    }
}

/// Writes `content` and its derived `contentSnippet`.
///
/// Blank content writes neither key; markup with no readable text writes
/// `content` only.
pub(crate) fn set_content(item: &mut Fields, content: Option<String>) {
    let Some(content) = content.filter(|c| !c.trim().is_empty()) else {
        return;
    };

    let content_snippet = snippet(&content);
    item.insert("content".to_string(), Value::String(content));
    if let Some(content_snippet) = content_snippet {
        item.insert("contentSnippet".to_string(), Value::String(content_snippet));
    }
}

/// Attribute map of the first RSS `<enclosure>`, e.g. `{url, length, type}`.
pub(crate) fn rss_enclosure(item: &XmlNode) -> Option<Value> {
    item.child("enclosure")
        .filter(|enclosure| enclosure.has_attributes())
        .map(|enclosure| Value::Object(enclosure.attribute_map()))
}

/// `{url, length?, type?}` from the first Atom `<link rel="enclosure">` with an href.
pub(crate) fn atom_enclosure(entry: &XmlNode) -> Option<Value> {
    let link = entry
        .children_named("link")
        .find(|link| link.attr("rel") == Some("enclosure") && link.attr("href").is_some())?;

    let mut enclosure = Map::new();
    for (source, destination) in [("href", "url"), ("length", "length"), ("type", "type")] {
        if let Some(value) = link.attr(source) {
            enclosure.insert(destination.to_string(), Value::String(value.to_string()));
        }
    }
    Some(Value::Object(enclosure))
}
