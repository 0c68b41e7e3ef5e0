//! Normalizes RSS and Atom feeds into a single canonical schema.
//!
//! RSS 0.9x, 1.0 and 2.0 documents and Atom feeds all come out as the same
//! [`Feed`]: an ordered map of feed-level fields plus a list of [`Item`]s with
//! stable keys (`title`, `link`, `date`, `isoDate`, `content`,
//! `contentSnippet`, `guid`, ...). Podcasts gain an `itunes` object, and
//! callers can pull extra tags into the output with custom field rules.
//!
//! ```
//! use feedcanon::{FeedParser, ParserConfig};
//!
//! let parser = FeedParser::new(ParserConfig::default())?;
//! let feed = parser.parse_str(
//!     r#"<rss version="2.0"><channel>
//!          <title>Blog</title>
//!          <item><title>Hello</title><pubDate>Wed, 04 May 2016 06:53:45 GMT</pubDate></item>
//!        </channel></rss>"#,
//! )?;
//!
//! assert_eq!(feed.title(), Some("Blog"));
//! assert_eq!(feed.items()[0].iso_date(), Some("2016-05-04T06:53:45.000Z"));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! The library emits `tracing` events but never installs a subscriber.

pub mod config;
pub mod feed;
pub mod util;
pub mod xml;

pub use config::{ConfigError, CustomFields, FieldOptions, FieldRule, KeywordFormat, ParserConfig};
pub use feed::{parse_str, Feed, FeedDialect, FeedError, FeedParser, Item};
pub use xml::{TreeError, TreeOptions};
