//! Caller-declared custom fields.
//!
//! Rules are resolved once into [`CompiledRule`]s when the parser is built and
//! then applied mechanically after normalization and decoration, so they
//! always have the last word on the keys they write.

use serde_json::Value;

use super::model::Fields;
use crate::config::{ConfigError, CustomFields, FieldRule};
use crate::util::snippet;
use crate::xml::{collapse_text, XmlNode};

/// Feed-level key holding the item list, unavailable to feed rules.
const ITEMS_KEY: &str = "items";

/// Where a rule set applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scope {
    Feed,
    Item,
}

/// A [`FieldRule`] resolved into a tag path, an output key and flags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct CompiledRule {
    path: Vec<String>,
    destination: String,
    keep_array: bool,
    include_snippet: bool,
}

impl CompiledRule {
    fn compile(rule: &FieldRule, scope: Scope) -> Result<Self, ConfigError> {
        let destination = rule.destination().trim();
        let path: Vec<String> = rule
            .source()
            .split('/')
            .map(|segment| segment.trim().to_string())
            .collect();

        if destination.is_empty() || path.iter().any(String::is_empty) {
            return Err(ConfigError::EmptyRule);
        }
        if scope == Scope::Feed && destination == ITEMS_KEY {
            return Err(ConfigError::ReservedKey(destination.to_string()));
        }

        let options = rule.options();
        Ok(Self {
            path,
            destination: destination.to_string(),
            keep_array: options.keep_array,
            include_snippet: options.include_snippet,
        })
    }

    /// Copies the matches of this rule under `node` into `fields`.
    /// A rule with no match leaves `fields` untouched.
    fn apply(&self, node: &XmlNode, fields: &mut Fields) {
        let matches = node.find_path(&self.path);
        let Some(first) = matches.first() else {
            return;
        };

        let value = if self.keep_array {
            Value::Array(matches.iter().map(|m| m.to_value()).collect())
        } else {
            collapse_text(first.to_value())
        };

        if fields.contains_key(&self.destination) {
            tracing::debug!(key = %self.destination, "Custom field overwrites an existing key");
        }

        let value_snippet = if self.include_snippet {
            value.as_str().and_then(snippet)
        } else {
            None
        };
        fields.insert(self.destination.clone(), value);
        if let Some(text) = value_snippet {
            fields.insert(format!("{}Snippet", self.destination), Value::String(text));
        }
    }
}

/// Compiled feed and item rules owned by a parser.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct CompiledRules {
    feed: Vec<CompiledRule>,
    item: Vec<CompiledRule>,
}

impl CompiledRules {
    pub(crate) fn compile(custom: &CustomFields) -> Result<Self, ConfigError> {
        let feed = custom
            .feed
            .iter()
            .map(|rule| CompiledRule::compile(rule, Scope::Feed))
            .collect::<Result<Vec<_>, _>>()?;
        let item = custom
            .item
            .iter()
            .map(|rule| CompiledRule::compile(rule, Scope::Item))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { feed, item })
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.feed.is_empty() && self.item.is_empty()
    }

    pub(crate) fn inject_feed(&self, feed_node: &XmlNode, feed: &mut Fields) {
        for rule in &self.feed {
            rule.apply(feed_node, feed);
        }
    }

    pub(crate) fn inject_item(&self, item_node: &XmlNode, item: &mut Fields) {
        for rule in &self.item {
            rule.apply(item_node, item);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FieldOptions;
    use crate::xml::{parse, TreeOptions};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn node(xml: &str) -> XmlNode {
        parse(xml, &TreeOptions::default()).unwrap()
    }

    fn rules(feed: Vec<FieldRule>, item: Vec<FieldRule>) -> CompiledRules {
        CompiledRules::compile(&CustomFields { feed, item }).unwrap()
    }

    const KEEP: FieldOptions = FieldOptions {
        keep_array: true,
        include_snippet: false,
    };

    #[test]
    fn test_plain_name_takes_first_match() {
        let item = node("<item><subtitle>one</subtitle><subtitle>two</subtitle></item>");
        let mut fields = Fields::new();
        rules(vec![], vec!["subtitle".into()]).inject_item(&item, &mut fields);
        assert_eq!(fields.get("subtitle"), Some(&json!("one")));
    }

    #[test]
    fn test_keep_array_always_array() {
        let item = node(r#"<item><media:content url="a.jpg" medium="image"/></item>"#);
        let mut fields = Fields::new();
        rules(vec![], vec![("media:content", "media:content", KEEP).into()])
            .inject_item(&item, &mut fields);
        assert_eq!(
            fields.get("media:content"),
            Some(&json!([{"$": {"url": "a.jpg", "medium": "image"}}]))
        );

        let two = node(r#"<item><media:content url="a.jpg"/><media:content url="b.jpg"/></item>"#);
        let mut fields = Fields::new();
        rules(vec![], vec![("media:content", "media", KEEP).into()]).inject_item(&two, &mut fields);
        assert_eq!(
            fields.get("media"),
            Some(&json!([{"$": {"url": "a.jpg"}}, {"$": {"url": "b.jpg"}}]))
        );
    }

    #[test]
    fn test_zero_matches_add_nothing() {
        let item = node("<item><title>x</title></item>");
        let mut fields = Fields::new();
        rules(
            vec![],
            vec!["missing".into(), ("absent", "renamed", KEEP).into()],
        )
        .inject_item(&item, &mut fields);
        assert!(fields.is_empty());
    }

    #[test]
    fn test_rename_and_overwrite() {
        let item = node("<item><title>Hello</title></item>");
        let mut fields = Fields::new();
        fields.insert("title".to_string(), json!("Hello"));
        fields.insert("customName".to_string(), json!("stale"));
        rules(vec![], vec![("title", "customName").into()]).inject_item(&item, &mut fields);

        assert_eq!(
            Value::Object(fields),
            json!({"title": "Hello", "customName": "Hello"})
        );
    }

    #[test]
    fn test_path_rule_and_snippet() {
        let item = node(
            r#"<item><media:group>
                <media:title>&lt;b&gt;Clip&lt;/b&gt; one</media:title>
            </media:group><media:group>
                <media:title>Clip two</media:title>
            </media:group></item>"#,
        );
        let options = FieldOptions {
            keep_array: false,
            include_snippet: true,
        };
        let mut fields = Fields::new();
        rules(vec![], vec![("media:group/media:title", "clip", options).into()])
            .inject_item(&item, &mut fields);

        assert_eq!(fields.get("clip"), Some(&json!("<b>Clip</b> one")));
        assert_eq!(fields.get("clipSnippet"), Some(&json!("Clip one")));

        let mut all = Fields::new();
        rules(vec![], vec![("media:group/media:title", "clips", KEEP).into()])
            .inject_item(&item, &mut all);
        assert_eq!(all.get("clips"), Some(&json!(["<b>Clip</b> one", "Clip two"])));
    }

    #[test]
    fn test_feed_rules_run_on_feed_node() {
        let channel = node("<channel><thing>Instant Article Test 2</thing><nested-field><a>1</a></nested-field></channel>");
        let mut fields = Fields::new();
        rules(vec!["thing".into(), "nested-field".into()], vec![]).inject_feed(&channel, &mut fields);
        assert_eq!(
            Value::Object(fields),
            json!({"thing": "Instant Article Test 2", "nested-field": {"a": ["1"]}})
        );
    }

    #[test]
    fn test_invalid_rules_rejected() {
        let empty = CustomFields {
            feed: vec![],
            item: vec![("", "x").into()],
        };
        assert!(matches!(CompiledRules::compile(&empty), Err(ConfigError::EmptyRule)));

        let bad_path = CustomFields {
            feed: vec![],
            item: vec!["media:group//media:title".into()],
        };
        assert!(matches!(CompiledRules::compile(&bad_path), Err(ConfigError::EmptyRule)));

        let reserved = CustomFields {
            feed: vec![("entries", "items").into()],
            item: vec![],
        };
        assert!(matches!(
            CompiledRules::compile(&reserved),
            Err(ConfigError::ReservedKey(key)) if key == "items"
        ));

        let item_scope = CustomFields {
            feed: vec![],
            item: vec!["items".into()],
        };
        assert!(CompiledRules::compile(&item_scope).is_ok());
        assert!(rules(vec![], vec![]).is_empty());
    }
}
