//! Atom 1.0 extraction.

use serde_json::Value;

use super::dialect::DialectExtractor;
use super::fields::{content_of, insert_text, pagination_links, text_construct};
use super::item::{atom_enclosure, set_content, set_date};
use super::model::Fields;
use crate::xml::XmlNode;

pub(crate) struct AtomExtractor;

impl DialectExtractor for AtomExtractor {
    fn feed_node<'a>(&self, root: &'a XmlNode) -> &'a XmlNode {
        root
    }

    fn item_nodes<'a>(&self, root: &'a XmlNode) -> Vec<&'a XmlNode> {
        root.children_named("entry").collect()
    }

    fn extract_feed(&self, root: &XmlNode) -> Fields {
        let mut feed = Fields::new();
        let links: Vec<&XmlNode> = root.children_named("link").collect();

        let title = root.child("title").and_then(text_construct);
        let subtitle = root.child("subtitle").and_then(text_construct);
        insert_text(&mut feed, "title", title.as_deref());
        insert_text(&mut feed, "description", subtitle.as_deref());
        insert_text(&mut feed, "link", alternate_href(&links));
        insert_text(&mut feed, "feedUrl", self_href(&links));
        insert_text(&mut feed, "lastBuildDate", root.child_text("updated"));
        if let Some(pagination) = pagination_links(links) {
            feed.insert("paginationLinks".to_string(), pagination);
        }
        feed
    }

    fn extract_item(&self, entry: &XmlNode) -> Fields {
        let mut item = Fields::new();
        let links: Vec<&XmlNode> = entry.children_named("link").collect();

        let title = entry.child("title").and_then(text_construct);
        insert_text(&mut item, "title", title.as_deref());
        insert_text(&mut item, "link", alternate_href(&links));

        let published = entry.child_text("published");
        let updated = entry.child_text("updated");
        insert_text(&mut item, "published", published);
        insert_text(&mut item, "updated", updated);

        let author = entry
            .child("author")
            .and_then(|author| author.child_text("name"));
        insert_text(&mut item, "author", author);
        insert_text(&mut item, "creator", author);

        let summary = entry.child("summary").and_then(content_of);
        let content = entry
            .child("content")
            .and_then(content_of)
            .filter(|content| !content.trim().is_empty())
            .or_else(|| summary.clone());
        set_content(&mut item, content);
        insert_text(&mut item, "summary", summary.as_deref());

        let id = entry.child_text("id");
        insert_text(&mut item, "id", id);
        insert_text(&mut item, "guid", id);

        if let Some(enclosure) = atom_enclosure(entry) {
            item.insert("enclosure".to_string(), enclosure);
        }

        let categories: Vec<Value> = entry
            .children_named("category")
            .filter_map(|category| category.attr("term"))
            .map(|term| Value::String(term.to_string()))
            .collect();
        if !categories.is_empty() {
            item.insert("categories".to_string(), Value::Array(categories));
        }

        let date = [published, updated]
            .into_iter()
            .flatten()
            .find(|date| !date.trim().is_empty());
        set_date(&mut item, date);

        item
    }
}

/// href of the first link with no `rel` or `rel="alternate"`, else of the first link.
fn alternate_href<'a>(links: &[&'a XmlNode]) -> Option<&'a str> {
    links
        .iter()
        .copied()
        .find(|link| matches!(link.attr("rel"), None | Some("alternate")))
        .or_else(|| links.first().copied())
        .and_then(|link| link.attr("href"))
}

/// href of the first `rel="self"` link, else of the second link.
fn self_href<'a>(links: &[&'a XmlNode]) -> Option<&'a str> {
    links
        .iter()
        .copied()
        .find(|link| link.attr("rel") == Some("self"))
        .or_else(|| links.get(1).copied())
        .and_then(|link| link.attr("href"))
}
