use std::fmt;

use serde::Serialize;

use super::atom::AtomExtractor;
use super::model::Fields;
use super::rss::{Rss1Extractor, Rss2Extractor};
use crate::config::ParserConfig;
use crate::xml::XmlNode;

pub const ATOM_NAMESPACE: &str = "http://www.w3.org/2005/Atom";
pub const RSS1_NAMESPACE: &str = "http://purl.org/rss/1.0/";

/// Feed syntax a document was classified as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum FeedDialect {
    /// RSS 1.0 (RDF)
    Rss1,
    /// RSS 2.0 and the 0.9x versions it grew from
    Rss2,
    Atom,
    Unrecognized,
}

impl fmt::Display for FeedDialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FeedDialect::Rss1 => "RSS 1.0",
            FeedDialect::Rss2 => "RSS 2.0",
            FeedDialect::Atom => "Atom",
            FeedDialect::Unrecognized => "unrecognized",
        };
        f.write_str(name)
    }
}

impl FeedDialect {
    /// Extraction strategy for this dialect, `None` when unrecognized.
    pub(crate) fn extractor(self) -> Option<&'static dyn DialectExtractor> {
        match self {
            FeedDialect::Rss1 => Some(&Rss1Extractor),
            FeedDialect::Rss2 => Some(&Rss2Extractor),
            FeedDialect::Atom => Some(&AtomExtractor),
            FeedDialect::Unrecognized => None,
        }
    }
}

/// Classifies a parsed document by its root element.
///
/// Explicit markers win: an Atom `<feed>`, an RDF root, or an `<rss>` whose
/// `version` starts with `2` or `0.9`. `default_rss` is only consulted for an
/// `<rss>` root whose version is missing or unusable, and only `0.9`, `1`
/// and `2` are honored.
pub fn detect(root: &XmlNode, default_rss: Option<f64>) -> FeedDialect {
    match root.name() {
        "feed" => {
            let namespace = root.attr("xmlns");
            if namespace != Some(ATOM_NAMESPACE) {
                tracing::debug!(namespace = ?namespace, "Treating <feed> without the Atom namespace as Atom");
            }
            FeedDialect::Atom
        }
        "rss" => detect_rss_version(root.attr("version"), default_rss),
        _ if root.local_name() == "RDF" => FeedDialect::Rss1,
        _ if root.attr("xmlns") == Some(RSS1_NAMESPACE) => FeedDialect::Rss1,
        other => {
            tracing::debug!(root = other, "Root element is not a known feed type");
            FeedDialect::Unrecognized
        }
    }
}

fn detect_rss_version(version: Option<&str>, default_rss: Option<f64>) -> FeedDialect {
    match version.map(str::trim) {
        Some(v) if v.starts_with('2') || v.starts_with("0.9") => FeedDialect::Rss2,
        _ => match default_rss {
            Some(v) if (v - 1.0).abs() < f64::EPSILON => FeedDialect::Rss1,
            Some(v) if (v - 2.0).abs() < f64::EPSILON || (v - 0.9).abs() < f64::EPSILON => {
                FeedDialect::Rss2
            }
            Some(v) => {
                tracing::debug!(default_rss = v, "Unsupported default RSS version");
                FeedDialect::Unrecognized
            }
            None => {
                tracing::debug!(version = ?version, "Ambiguous RSS version and no default configured");
                FeedDialect::Unrecognized
            }
        },
    }
}

/// One extraction strategy per dialect.
///
/// Extractors read the tree and return fresh maps. Items come back in
/// document order, index-aligned with [`DialectExtractor::item_nodes`].
pub(crate) trait DialectExtractor: Sync {
    /// Node holding the feed-level tags; custom feed rules run against it.
    fn feed_node<'a>(&self, root: &'a XmlNode) -> &'a XmlNode;

    fn item_nodes<'a>(&self, root: &'a XmlNode) -> Vec<&'a XmlNode>;

    /// Feed-level canonical fields, without items.
    fn extract_feed(&self, root: &XmlNode) -> Fields;

    /// Canonical fields of one item, derived fields included.
    fn extract_item(&self, node: &XmlNode) -> Fields;

    fn extract_items(&self, root: &XmlNode) -> Vec<Fields> {
        self.item_nodes(root)
            .into_iter()
            .map(|node| self.extract_item(node))
            .collect()
    }

    /// Dialect-specific enrichment after extraction.
    fn decorate(
        &self,
        _root: &XmlNode,
        _feed: &mut Fields,
        _items: &mut [Fields],
        _config: &ParserConfig,
    ) {
    }
}
