//! iTunes podcast decoration for RSS 2.0 feeds.
//!
//! Everything here is additive: a tag that is missing or blank leaves no key
//! behind, and an `itunes` object that ends up empty is not emitted at all.

use serde_json::{Map, Value};

use super::fields::insert_text;
use crate::config::KeywordFormat;
use crate::xml::XmlNode;

/// Plain text fields copied into the feed-level `itunes` object.
const FEED_FIELDS: &[&str] = &["author", "subtitle", "summary", "explicit"];

/// Plain text fields copied into the item-level `itunes` object.
const ITEM_FIELDS: &[&str] = &[
    "author", "subtitle", "summary", "explicit", "duration", "episode", "season",
];

/// True when `node` declares the `itunes` namespace prefix.
pub(crate) fn is_declared(node: &XmlNode) -> bool {
    node.attr("xmlns:itunes").is_some()
}

/// Feed-level `itunes` object built from the channel.
pub(crate) fn feed_itunes(channel: &XmlNode, keywords: KeywordFormat) -> Option<Value> {
    let mut itunes = Map::new();

    if let Some(owner) = channel.child("itunes:owner").and_then(owner) {
        itunes.insert("owner".to_string(), owner);
    }
    insert_text(&mut itunes, "image", image_href(channel));

    let categories: Vec<&XmlNode> = channel.children_named("itunes:category").collect();
    let names: Vec<Value> = categories
        .iter()
        .filter_map(|category| category.attr("text"))
        .map(|name| Value::String(name.to_string()))
        .collect();
    if !names.is_empty() {
        itunes.insert("categories".to_string(), Value::Array(names));
        itunes.insert(
            "categoriesWithSubs".to_string(),
            Value::Array(categories.iter().filter_map(|c| category_with_subs(c)).collect()),
        );
    }

    if let Some(value) = keywords_value(channel, keywords) {
        itunes.insert("keywords".to_string(), value);
    }
    copy_fields(channel, FEED_FIELDS, &mut itunes);

    (!itunes.is_empty()).then_some(Value::Object(itunes))
}

/// Item-level `itunes` object.
pub(crate) fn item_itunes(item: &XmlNode, keywords: KeywordFormat) -> Option<Value> {
    let mut itunes = Map::new();

    copy_fields(item, ITEM_FIELDS, &mut itunes);
    if let Some(value) = keywords_value(item, keywords) {
        itunes.insert("keywords".to_string(), value);
    }
    insert_text(&mut itunes, "image", image_href(item));

    (!itunes.is_empty()).then_some(Value::Object(itunes))
}

fn copy_fields(node: &XmlNode, fields: &[&str], itunes: &mut Map<String, Value>) {
    for field in fields {
        insert_text(itunes, field, node.child_text(&format!("itunes:{field}")));
    }
}

fn owner(owner: &XmlNode) -> Option<Value> {
    let mut fields = Map::new();
    insert_text(&mut fields, "name", owner.child_text("itunes:name"));
    insert_text(&mut fields, "email", owner.child_text("itunes:email"));
    (!fields.is_empty()).then_some(Value::Object(fields))
}

fn image_href(node: &XmlNode) -> Option<&str> {
    node.child("itunes:image").and_then(|image| image.attr("href"))
}

/// `{name, subs?}` for one top-level category; `subs` only when nested
/// categories carry a name.
fn category_with_subs(category: &XmlNode) -> Option<Value> {
    let name = category.attr("text")?;

    let mut entry = Map::new();
    entry.insert("name".to_string(), Value::String(name.to_string()));

    let subs: Vec<Value> = category
        .children_named("itunes:category")
        .filter_map(|sub| sub.attr("text"))
        .map(|sub| {
            let mut sub_entry = Map::new();
            sub_entry.insert("name".to_string(), Value::String(sub.to_string()));
            Value::Object(sub_entry)
        })
        .collect();
    if !subs.is_empty() {
        entry.insert("subs".to_string(), Value::Array(subs));
    }
    Some(Value::Object(entry))
}

/// Keywords gathered from every `itunes:keywords` tag.
///
/// A tag contributes its text, or its `text` attribute when it has none.
/// Each contribution is split on commas, trimmed, and emptied entries dropped.
pub(crate) fn collect_keywords(node: &XmlNode) -> Vec<String> {
    node.children_named("itunes:keywords")
        .filter_map(|tag| {
            tag.text()
                .filter(|text| !text.trim().is_empty())
                .or_else(|| tag.attr("text"))
        })
        .flat_map(|raw| raw.split(','))
        .map(str::trim)
        .filter(|keyword| !keyword.is_empty())
        .map(str::to_string)
        .collect()
}

fn keywords_value(node: &XmlNode, format: KeywordFormat) -> Option<Value> {
    let keywords = collect_keywords(node);
    if keywords.is_empty() {
        return None;
    }
    Some(match format {
        KeywordFormat::Array => Value::Array(keywords.into_iter().map(Value::String).collect()),
        KeywordFormat::String => Value::String(keywords.join(",")),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml::{parse, TreeOptions};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn node(xml: &str) -> XmlNode {
        parse(xml, &TreeOptions::default()).unwrap()
    }

    #[test]
    fn test_feed_itunes_full() {
        let channel = node(
            r#"<channel>
                <itunes:author>Narro</itunes:author>
                <itunes:subtitle>Articles read aloud</itunes:subtitle>
                <itunes:explicit>no</itunes:explicit>
                <itunes:owner>
                    <itunes:name>Narro</itunes:name>
                    <itunes:email>hi@narro.co</itunes:email>
                </itunes:owner>
                <itunes:image href="https://narro.co/cover.png"/>
                <itunes:category text="Technology">
                    <itunes:category text="Podcasting"/>
                </itunes:category>
                <itunes:category text="News"/>
                <itunes:keywords>tech, audio ,,news</itunes:keywords>
            </channel>"#,
        );

        assert_eq!(
            feed_itunes(&channel, KeywordFormat::Array),
            Some(json!({
                "owner": {"name": "Narro", "email": "hi@narro.co"},
                "image": "https://narro.co/cover.png",
                "categories": ["Technology", "News"],
                "categoriesWithSubs": [
                    {"name": "Technology", "subs": [{"name": "Podcasting"}]},
                    {"name": "News"}
                ],
                "keywords": ["tech", "audio", "news"],
                "author": "Narro",
                "subtitle": "Articles read aloud",
                "explicit": "no"
            }))
        );
    }

    #[test]
    fn test_missing_or_empty_image_omitted() {
        let missing = node("<channel><itunes:author>A</itunes:author></channel>");
        let empty = node(r#"<channel><itunes:author>A</itunes:author><itunes:image href=""/></channel>"#);
        for channel in [missing, empty] {
            let itunes = feed_itunes(&channel, KeywordFormat::Array).unwrap();
            assert!(itunes.get("image").is_none());
        }

        let item = node(r#"<item><itunes:image/></item>"#);
        assert_eq!(item_itunes(&item, KeywordFormat::Array), None);
    }

    #[test]
    fn test_keywords_as_tag_list() {
        let channel = node(
            r#"<channel>
                <itunes:keywords>one</itunes:keywords>
                <itunes:keywords text="two, three"/>
            </channel>"#,
        );
        assert_eq!(collect_keywords(&channel), vec!["one", "two", "three"]);
        assert_eq!(
            feed_itunes(&channel, KeywordFormat::String),
            Some(json!({"keywords": "one,two,three"}))
        );
    }

    #[test]
    fn test_empty_object_omitted() {
        let channel = node("<channel><title>No podcast data</title></channel>");
        assert_eq!(feed_itunes(&channel, KeywordFormat::Array), None);

        let owner_only_blank = node("<channel><itunes:owner><itunes:name> </itunes:name></itunes:owner></channel>");
        assert_eq!(feed_itunes(&owner_only_blank, KeywordFormat::Array), None);
    }

    #[test]
    fn test_item_itunes() {
        let item = node(
            r#"<item>
                <itunes:duration>00:12:31</itunes:duration>
                <itunes:episode>4</itunes:episode>
                <itunes:season>2</itunes:season>
                <itunes:keywords>a,b</itunes:keywords>
                <itunes:image href="https://e.com/ep4.png"/>
            </item>"#,
        );
        assert_eq!(
            item_itunes(&item, KeywordFormat::Array),
            Some(json!({
                "duration": "00:12:31",
                "episode": "4",
                "season": "2",
                "keywords": ["a", "b"],
                "image": "https://e.com/ep4.png"
            }))
        );
    }
}
