//! Text and date helpers shared by the item processor and the custom field injector.
//!
//! - **Text**: entity decoding, markup stripping and snippet derivation
//! - **Dates**: lenient feed timestamp parsing and ISO-8601 normalization
//!
//! # Examples
//!
//! ```
//! use feedcanon::util::{snippet, to_iso_date};
//!
//! assert_eq!(snippet("<b>Lorem</b> ipsum").as_deref(), Some("Lorem ipsum"));
//! assert_eq!(
//!     to_iso_date("2016-05-04T06:53:45Z").as_deref(),
//!     Some("2016-05-04T06:53:45.000Z")
//! );
//! ```

mod date;
mod text;

pub use date::{parse_date, to_iso_date};
pub use text::{collapse_whitespace, decode_entities, snippet, strip_html};
