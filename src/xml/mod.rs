//! Tree adapter between raw XML text and the normalization engine.
//!
//! - [`tree`] - tokenizes XML with `quick-xml` into an immutable [`XmlNode`] tree
//! - [`value`] - converts nodes into JSON values for raw and custom fields
//! - [`markup`] - re-serializes element children for embedded XHTML content
//!
//! The engine only ever reads the tree. [`TreeOptions`] arrive here verbatim
//! from [`crate::ParserConfig::xml`].

mod markup;
mod tree;
mod value;

pub use markup::wrapped_markup;
pub use tree::{parse, TreeError, TreeOptions, XmlNode, DEFAULT_MAX_DEPTH};
pub use value::{collapse_text, ATTR_KEY, TEXT_KEY};
