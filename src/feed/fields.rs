//! Canonical field tables and the copy routine shared by every dialect.

use serde_json::{Map, Value};

use super::model::Fields;
use crate::xml::{collapse_text, XmlNode};

/// Channel tags copied for RSS 0.9x/1.0/2.0, as `(source, destination)`.
/// Applied in order, so a later source writing the same key wins.
pub(crate) const RSS_CHANNEL_FIELDS: &[(&str, &str)] = &[
    ("author", "creator"),
    ("dc:publisher", "publisher"),
    ("dc:creator", "creator"),
    ("dc:source", "source"),
    ("dc:title", "title"),
    ("dc:type", "type"),
    ("title", "title"),
    ("description", "description"),
    ("author", "author"),
    ("pubDate", "pubDate"),
    ("webMaster", "webMaster"),
    ("managingEditor", "managingEditor"),
    ("generator", "generator"),
    ("link", "link"),
    ("language", "language"),
    ("copyright", "copyright"),
    ("lastBuildDate", "lastBuildDate"),
    ("docs", "docs"),
    ("ttl", "ttl"),
    ("rating", "rating"),
    ("skipHours", "skipHours"),
    ("skipDays", "skipDays"),
];

/// Item tags copied for RSS 0.9x/1.0/2.0. `dc:creator` beats `author` for `creator`.
pub(crate) const RSS_ITEM_FIELDS: &[(&str, &str)] = &[
    ("author", "creator"),
    ("dc:creator", "creator"),
    ("dc:date", "date"),
    ("dc:title", "title"),
    ("title", "title"),
    ("link", "link"),
    ("pubDate", "pubDate"),
    ("author", "author"),
    ("content:encoded", "content:encoded"),
    ("dc:creator", "dc:creator"),
    ("dc:date", "dc:date"),
    ("comments", "comments"),
];

/// `rel` values collected into `paginationLinks`.
const PAGINATION_RELS: &[&str] = &["self", "first", "last", "prev", "next"];

/// Copies the first `source` child of `node` into `fields[destination]`.
/// Writes nothing when there is no such child.
pub(crate) fn copy_first(node: &XmlNode, source: &str, destination: &str, fields: &mut Fields) {
    if let Some(child) = node.child(source) {
        fields.insert(destination.to_string(), collapse_text(child.to_value()));
    }
}

pub(crate) fn copy_table(node: &XmlNode, table: &[(&str, &str)], fields: &mut Fields) {
    for (source, destination) in table {
        copy_first(node, source, destination, fields);
    }
}

/// Inserts `value` under `key` when it is present and not blank.
pub(crate) fn insert_text(fields: &mut Fields, key: &str, value: Option<&str>) {
    if let Some(value) = value.filter(|v| !v.trim().is_empty()) {
        fields.insert(key.to_string(), Value::String(value.to_string()));
    }
}

/// Text of a leaf node, or its children (and any mixed-in text) re-serialized
/// as markup. Used for RSS descriptions and Atom text constructs.
pub(crate) fn content_of(node: &XmlNode) -> Option<String> {
    if node.children().is_empty() {
        return node.text().map(str::to_string);
    }
    match crate::xml::wrapped_markup(node) {
        Ok(markup) => Some(markup),
        Err(e) => {
            tracing::warn!(element = node.name(), error = %e, "Failed to serialize embedded markup");
            None
        }
    }
}

/// Plain text of an Atom text construct. An `xhtml` body is flattened to its
/// text so titles stay strings.
pub(crate) fn text_construct(node: &XmlNode) -> Option<String> {
    if node.children().is_empty() {
        return node.text().map(str::to_string);
    }
    content_of(node).and_then(|markup| crate::util::snippet(&markup))
}

/// `{self, first, last, prev, next}` hrefs from a set of link elements.
/// The first link for each rel wins. Returns `None` when no rel matches.
pub(crate) fn pagination_links<'a>(links: impl IntoIterator<Item = &'a XmlNode>) -> Option<Value> {
    let mut pagination = Map::new();
    for link in links {
        let (Some(rel), Some(href)) = (link.attr("rel"), link.attr("href")) else {
            continue;
        };
        if PAGINATION_RELS.contains(&rel) && !pagination.contains_key(rel) {
            pagination.insert(rel.to_string(), Value::String(href.to_string()));
        }
    }
    (!pagination.is_empty()).then_some(Value::Object(pagination))
}
