//! Feed normalization: RSS 0.9x/1.0/2.0 and Atom into one schema.
//!
//! A parse runs in a fixed order over an already-built [`crate::xml::XmlNode`]
//! tree:
//!
//! - **Detection** - [`detect`] classifies the root into a [`FeedDialect`]
//! - **Extraction** - one strategy per dialect copies the canonical feed and
//!   item fields (`rss`, `atom`), deriving `isoDate`, `contentSnippet` and
//!   `enclosure` as it goes (`item`)
//! - **Decoration** - RSS 2.0 podcasts get an `itunes` object (`itunes`)
//! - **Injection** - caller-declared custom fields are written last (`custom`)
//!
//! # Example
//!
//! ```
//! let feed = feedcanon::parse_str(
//!     r#"<feed xmlns="http://www.w3.org/2005/Atom">
//!          <title>Example</title>
//!          <entry><title>First</title><updated>2024-01-02T03:04:05Z</updated></entry>
//!        </feed>"#,
//! )?;
//!
//! assert_eq!(feed.title(), Some("Example"));
//! assert_eq!(feed.items()[0].iso_date(), Some("2024-01-02T03:04:05.000Z"));
//! # Ok::<(), feedcanon::FeedError>(())
//! ```

mod atom;
mod custom;
mod dialect;
mod fields;
mod item;
mod itunes;
mod model;
mod parser;
mod rss;

pub use dialect::{detect, FeedDialect, ATOM_NAMESPACE, RSS1_NAMESPACE};
pub use model::{Feed, Fields, Item};
pub use parser::{parse_str, FeedError, FeedParser};
