use std::sync::Arc;

use thiserror::Error;

use super::custom::CompiledRules;
use super::dialect::{detect, FeedDialect};
use super::model::{Feed, Item};
use crate::config::{ConfigError, ParserConfig};
use crate::xml::TreeError;

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Error)]
pub enum FeedError {
    /// The document is not well-formed XML or breaks a tree limit.
    #[error(transparent)]
    Structural(#[from] TreeError),

    /// The document is XML but not a feed dialect we know.
    #[error("Feed not recognized as RSS 1 or 2.")]
    NotRecognized,

    /// The blocking parse task panicked or was cancelled.
    #[error("Feed parse task failed: {0}")]
    Task(String),
}

// ============================================================================
// Parser
// ============================================================================

/// Turns RSS and Atom documents into [`Feed`]s.
///
/// Holds an immutable, pre-compiled configuration; cloning is cheap and
/// clones can be shared across threads.
///
/// # Example
///
/// ```
/// use feedcanon::{FeedParser, ParserConfig};
///
/// let mut config = ParserConfig::default();
/// config.custom_fields.item.push(("title", "customName").into());
/// let parser = FeedParser::new(config)?;
///
/// let feed = parser.parse_str(
///     r#"<rss version="2.0"><channel><item><title>Hello</title></item></channel></rss>"#,
/// )?;
/// assert_eq!(feed.items()[0].get_str("customName"), Some("Hello"));
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone)]
pub struct FeedParser {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    config: ParserConfig,
    rules: CompiledRules,
}

impl FeedParser {
    /// Validates `config` and compiles its custom field rules.
    pub fn new(config: ParserConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let rules = CompiledRules::compile(&config.custom_fields)?;
        if !rules.is_empty() {
            tracing::debug!(
                feed_rules = config.custom_fields.feed.len(),
                item_rules = config.custom_fields.item.len(),
                "Compiled custom field rules"
            );
        }
        Ok(Self {
            inner: Arc::new(Inner { config, rules }),
        })
    }

    pub fn config(&self) -> &ParserConfig {
        &self.inner.config
    }

    /// Parses a complete feed document.
    ///
    /// Either the whole document is normalized or an error is returned;
    /// there is no partial output.
    pub fn parse_str(&self, xml: &str) -> Result<Feed, FeedError> {
        let Inner { config, rules } = self.inner.as_ref();

        let root = crate::xml::parse(xml, &config.xml)?;
        let dialect = detect(&root, config.default_rss);
        let Some(extractor) = dialect.extractor() else {
            tracing::warn!(root = root.name(), "Feed not recognized as RSS or Atom");
            return Err(FeedError::NotRecognized);
        };

        let mut feed = extractor.extract_feed(&root);
        let mut items = extractor.extract_items(&root);
        extractor.decorate(&root, &mut feed, &mut items, config);

        rules.inject_feed(extractor.feed_node(&root), &mut feed);
        for (node, item) in extractor.item_nodes(&root).into_iter().zip(items.iter_mut()) {
            rules.inject_item(node, item);
        }

        tracing::debug!(dialect = %dialect, items = items.len(), "Parsed feed");
        Ok(Feed::from_parts(
            feed,
            items.into_iter().map(Item::from_fields).collect(),
        ))
    }

    /// Async form of [`FeedParser::parse_str`].
    ///
    /// The whole parse runs as one unit on tokio's blocking pool, so it never
    /// stalls the calling runtime's worker threads.
    pub async fn parse(&self, xml: impl Into<String>) -> Result<Feed, FeedError> {
        let parser = self.clone();
        let xml = xml.into();
        tokio::task::spawn_blocking(move || parser.parse_str(&xml))
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Feed parse task failed");
                FeedError::Task(e.to_string())
            })?
    }

    /// Dialect the parser would use for `xml`, without extracting anything.
    pub fn dialect_of(&self, xml: &str) -> Result<FeedDialect, FeedError> {
        let root = crate::xml::parse(xml, &self.inner.config.xml)?;
        Ok(detect(&root, self.inner.config.default_rss))
    }
}

impl Default for FeedParser {
    fn default() -> Self {
        Self {
            inner: Arc::new(Inner {
                config: ParserConfig::default(),
                rules: CompiledRules::default(),
            }),
        }
    }
}

/// Parses `xml` with the default configuration.
pub fn parse_str(xml: &str) -> Result<Feed, FeedError> {
    FeedParser::default().parse_str(xml)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unrecognized_root() {
        let err = parse_str("<html><body/></html>").unwrap_err();
        assert!(matches!(err, FeedError::NotRecognized));
        assert!(err.to_string().contains("Feed not recognized as RSS"));
    }

    #[test]
    fn test_structural_error_passes_through() {
        let err = parse_str("<rss><channel></rss>").unwrap_err();
        assert!(matches!(err, FeedError::Structural(_)));
    }

    #[test]
    fn test_invalid_default_rss_rejected() {
        let config = ParserConfig {
            default_rss: Some(-1.0),
            ..Default::default()
        };
        assert!(matches!(
            FeedParser::new(config),
            Err(ConfigError::InvalidDefaultRss(_))
        ));
    }

    #[test]
    fn test_dialect_of() {
        let parser = FeedParser::default();
        assert_eq!(
            parser.dialect_of(r#"<rss version="2.0"/>"#).unwrap(),
            FeedDialect::Rss2
        );
        assert_eq!(parser.dialect_of("<feed/>").unwrap(), FeedDialect::Atom);
    }

    #[test]
    fn test_parser_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync + Clone>() {}
        assert_send_sync::<FeedParser>();
    }

    #[test]
    fn test_empty_channel() {
        let feed = parse_str(r#"<rss version="2.0"><channel/></rss>"#).unwrap();
        assert!(feed.fields().is_empty());
        assert!(feed.items().is_empty());
    }
}
