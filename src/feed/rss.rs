//! RSS 0.9x, 1.0 and 2.0 extraction.
//!
//! The two RSS strategies share everything but item discovery: RSS 2.0 nests
//! items inside `<channel>`, RSS 1.0 (RDF) places them next to it.

use serde_json::{Map, Value};

use super::dialect::DialectExtractor;
use super::fields::{
    content_of, copy_table, insert_text, pagination_links, RSS_CHANNEL_FIELDS, RSS_ITEM_FIELDS,
};
use super::item::{rss_enclosure, set_content, set_date};
use super::itunes;
use super::model::Fields;
use crate::config::ParserConfig;
use crate::xml::{collapse_text, XmlNode};

/// Item tags tried in order for `content`.
const CONTENT_SOURCES: &[&str] = &["content:encoded", "description"];

/// Child elements of `<image>` copied into the feed's `image` object.
const IMAGE_FIELDS: &[&str] = &["link", "url", "title", "width", "height"];

pub(crate) struct Rss2Extractor;

pub(crate) struct Rss1Extractor;

impl DialectExtractor for Rss2Extractor {
    fn feed_node<'a>(&self, root: &'a XmlNode) -> &'a XmlNode {
        channel(root)
    }

    fn item_nodes<'a>(&self, root: &'a XmlNode) -> Vec<&'a XmlNode> {
        channel(root).children_named("item").collect()
    }

    fn extract_feed(&self, root: &XmlNode) -> Fields {
        extract_channel(channel(root))
    }

    fn extract_item(&self, node: &XmlNode) -> Fields {
        extract_rss_item(node)
    }

    fn decorate(
        &self,
        root: &XmlNode,
        feed: &mut Fields,
        items: &mut [Fields],
        config: &ParserConfig,
    ) {
        let channel = channel(root);
        if !itunes::is_declared(root) && !itunes::is_declared(channel) {
            return;
        }

        if let Some(value) = itunes::feed_itunes(channel, config.keywords) {
            feed.insert("itunes".to_string(), value);
        }
        for (node, item) in self.item_nodes(root).into_iter().zip(items.iter_mut()) {
            if let Some(value) = itunes::item_itunes(node, config.keywords) {
                item.insert("itunes".to_string(), value);
            }
        }
    }
}

impl DialectExtractor for Rss1Extractor {
    fn feed_node<'a>(&self, root: &'a XmlNode) -> &'a XmlNode {
        channel(root)
    }

    fn item_nodes<'a>(&self, root: &'a XmlNode) -> Vec<&'a XmlNode> {
        let mut items: Vec<&XmlNode> = root.children_named("item").collect();
        if let Some(channel) = root.child("channel") {
            items.extend(channel.children_named("item"));
        }
        items
    }

    fn extract_feed(&self, root: &XmlNode) -> Fields {
        extract_channel(channel(root))
    }

    fn extract_item(&self, node: &XmlNode) -> Fields {
        extract_rss_item(node)
    }
}

/// `<channel>`, or the root itself for documents that omit it.
fn channel(root: &XmlNode) -> &XmlNode {
    root.child("channel").unwrap_or(root)
}

fn extract_channel(channel: &XmlNode) -> Fields {
    if channel.name() != "channel" {
        tracing::debug!(root = channel.name(), "RSS document has no <channel>, reading the root");
    }

    let mut feed = Fields::new();
    copy_table(channel, RSS_CHANNEL_FIELDS, &mut feed);

    let atom_links: Vec<&XmlNode> = channel.children_named("atom:link").collect();
    if let Some(href) = atom_links.first().and_then(|link| link.attr("href")) {
        feed.insert("feedUrl".to_string(), Value::String(href.to_string()));
    }
    if let Some(image) = channel.child("image").and_then(channel_image) {
        feed.insert("image".to_string(), image);
    }
    if let Some(links) = pagination_links(atom_links) {
        feed.insert("paginationLinks".to_string(), links);
    }
    feed
}

/// `{link, url, title, width, height}` of a channel image that has a `<url>`.
fn channel_image(image: &XmlNode) -> Option<Value> {
    image.child_text("url").filter(|url| !url.trim().is_empty())?;

    let mut fields = Map::new();
    for field in IMAGE_FIELDS {
        insert_text(&mut fields, field, image.child_text(field));
    }
    Some(Value::Object(fields))
}

fn extract_rss_item(node: &XmlNode) -> Fields {
    let mut item = Fields::new();
    copy_table(node, RSS_ITEM_FIELDS, &mut item);

    if let Some(enclosure) = rss_enclosure(node) {
        item.insert("enclosure".to_string(), enclosure);
    }

    let content = CONTENT_SOURCES
        .iter()
        .filter_map(|source| node.child(source))
        .filter_map(content_of)
        .find(|content| !content.trim().is_empty());
    set_content(&mut item, content);

    insert_text(&mut item, "guid", node.child_text("guid"));

    let categories: Vec<Value> = node
        .children_named("category")
        .map(|category| collapse_text(category.to_value()))
        .collect();
    if !categories.is_empty() {
        item.insert("categories".to_string(), Value::Array(categories));
    }

    let date = ["pubDate", "dc:date"]
        .into_iter()
        .filter_map(|source| node.child_text(source))
        .find(|date| !date.trim().is_empty());
    set_date(&mut item, date);

    item
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml::{parse, TreeOptions};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn root(xml: &str) -> XmlNode {
        parse(xml, &TreeOptions::default()).unwrap()
    }

    #[test]
    fn test_rss2_channel_fields() {
        let doc = root(
            r#"<rss version="2.0" xmlns:atom="http://www.w3.org/2005/Atom"><channel>
                <title>Blog</title>
                <link>https://e.com/</link>
                <description>About things</description>
                <language>en</language>
                <atom:link rel="self" href="https://e.com/feed"/>
                <atom:link rel="next" href="https://e.com/feed?page=2"/>
                <image><url>https://e.com/logo.png</url><title>Blog</title><link>https://e.com/</link></image>
            </channel></rss>"#,
        );
        let feed = Rss2Extractor.extract_feed(&doc);

        assert_eq!(
            Value::Object(feed),
            json!({
                "title": "Blog",
                "description": "About things",
                "link": "https://e.com/",
                "language": "en",
                "feedUrl": "https://e.com/feed",
                "image": {"link": "https://e.com/", "url": "https://e.com/logo.png", "title": "Blog"},
                "paginationLinks": {"self": "https://e.com/feed", "next": "https://e.com/feed?page=2"}
            })
        );
    }

    #[test]
    fn test_image_without_url_is_skipped() {
        let doc = root("<rss><channel><image><title>x</title></image></channel></rss>");
        assert!(!Rss2Extractor.extract_feed(&doc).contains_key("image"));
    }

    #[test]
    fn test_rss2_item() {
        let doc = root(
            r#"<rss version="2.0"><channel><item>
                <title>Post</title>
                <link>https://e.com/post</link>
                <description>Short</description>
                <content:encoded>&lt;p&gt;Full &amp;amp; long&lt;/p&gt;</content:encoded>
                <guid isPermaLink="false">abc-123</guid>
                <category>rust</category>
                <category domain="x">xml</category>
                <pubDate>Wed, 04 May 2016 06:53:45 GMT</pubDate>
                <enclosure url="https://e.com/a.mp3" length="1" type="audio/mpeg"/>
            </item></channel></rss>"#,
        );
        let items = Rss2Extractor.extract_items(&doc);
        assert_eq!(items.len(), 1);

        assert_eq!(
            Value::Object(items[0].clone()),
            json!({
                "title": "Post",
                "link": "https://e.com/post",
                "pubDate": "Wed, 04 May 2016 06:53:45 GMT",
                "content:encoded": "<p>Full &amp; long</p>",
                "enclosure": {"url": "https://e.com/a.mp3", "length": "1", "type": "audio/mpeg"},
                "content": "<p>Full &amp; long</p>",
                "contentSnippet": "Full & long",
                "guid": "abc-123",
                "categories": ["rust", "xml"],
                "date": "Wed, 04 May 2016 06:53:45 GMT",
                "isoDate": "2016-05-04T06:53:45.000Z"
            })
        );
    }

    #[test]
    fn test_description_used_without_encoded_content() {
        let doc = root("<rss><channel><item><description>Just this</description></item></channel></rss>");
        let item = &Rss2Extractor.extract_items(&doc)[0];
        assert_eq!(item.get("content"), Some(&json!("Just this")));
        assert_eq!(item.get("contentSnippet"), Some(&json!("Just this")));
    }

    #[test]
    fn test_dublin_core_date_fallback() {
        let doc = root(
            "<rss><channel><item><dc:date>2016-05-04T06:53:45Z</dc:date></item></channel></rss>",
        );
        let item = &Rss2Extractor.extract_items(&doc)[0];
        assert_eq!(item.get("date"), Some(&json!("2016-05-04T06:53:45Z")));
        assert_eq!(item.get("dc:date"), Some(&json!("2016-05-04T06:53:45Z")));
        assert_eq!(item.get("isoDate"), Some(&json!("2016-05-04T06:53:45.000Z")));
    }

    #[test]
    fn test_rss1_items_beside_channel() {
        let doc = root(
            r#"<rdf:RDF xmlns="http://purl.org/rss/1.0/">
                <channel><title>Science</title><link>https://e.org</link></channel>
                <item><title>One</title></item>
                <item><title>Two</title></item>
            </rdf:RDF>"#,
        );
        let feed = Rss1Extractor.extract_feed(&doc);
        assert_eq!(feed.get("title"), Some(&json!("Science")));

        let titles: Vec<_> = Rss1Extractor
            .extract_items(&doc)
            .into_iter()
            .map(|item| item["title"].clone())
            .collect();
        assert_eq!(titles, vec![json!("One"), json!("Two")]);
    }

    #[test]
    fn test_missing_channel_reads_root() {
        let doc = root(r#"<rss version="2.0"><title>Bare</title><item><title>A</title></item></rss>"#);
        assert_eq!(Rss2Extractor.extract_feed(&doc).get("title"), Some(&json!("Bare")));
        assert_eq!(Rss2Extractor.item_nodes(&doc).len(), 1);
    }

    #[test]
    fn test_itunes_only_with_namespace() {
        let plain = root(
            r#"<rss version="2.0"><channel><itunes:author>A</itunes:author><item/></channel></rss>"#,
        );
        let mut feed = Rss2Extractor.extract_feed(&plain);
        let mut items = Rss2Extractor.extract_items(&plain);
        Rss2Extractor.decorate(&plain, &mut feed, &mut items, &ParserConfig::default());
        assert!(!feed.contains_key("itunes"));

        let podcast = root(
            r#"<rss version="2.0" xmlns:itunes="http://www.itunes.com/dtds/podcast-1.0.dtd"><channel>
                <itunes:author>A</itunes:author>
                <item><itunes:duration>12:00</itunes:duration></item>
            </channel></rss>"#,
        );
        let mut feed = Rss2Extractor.extract_feed(&podcast);
        let mut items = Rss2Extractor.extract_items(&podcast);
        Rss2Extractor.decorate(&podcast, &mut feed, &mut items, &ParserConfig::default());
        assert_eq!(feed.get("itunes"), Some(&json!({"author": "A"})));
        assert_eq!(items[0].get("itunes"), Some(&json!({"duration": "12:00"})));
    }
}
