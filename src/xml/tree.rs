use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use serde::Deserialize;
use thiserror::Error;

use crate::util::decode_entities;

/// SEC-003: Default nesting limit for feed documents.
/// Real feeds rarely go past a dozen levels; anything deeper is hostile or broken.
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// Errors raised while turning raw XML text into an [`XmlNode`] tree.
#[derive(Debug, Error)]
pub enum TreeError {
    /// The tokenizer rejected the input.
    #[error("XML parse error: {0}")]
    Syntax(String),

    /// SEC-003: Element nesting exceeds the configured limit.
    #[error("XML nesting depth exceeds maximum of {0} levels")]
    MaxDepthExceeded(usize),

    /// The input contains no element at all.
    #[error("XML document has no root element")]
    NoRoot,

    /// The input ended while an element was still open.
    #[error("XML document ended inside <{0}>")]
    Unclosed(String),
}

/// Options forwarded untouched to the tree adapter.
///
/// Field names follow the usual xml-to-object conventions so configuration
/// written for other feed tooling (`emptyTag`, `trim`, `normalize`) carries over.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TreeOptions {
    /// Trim leading and trailing whitespace from text content.
    pub trim: bool,

    /// Collapse whitespace runs inside text content to a single space.
    pub normalize: bool,

    /// Value given to elements without attributes, children or text.
    #[serde(alias = "emptyTag")]
    pub empty_tag: Option<String>,

    /// Maximum element nesting depth accepted before the parse is rejected.
    #[serde(alias = "maxDepth")]
    pub max_depth: usize,
}

impl Default for TreeOptions {
    fn default() -> Self {
        Self {
            trim: false,
            normalize: false,
            empty_tag: None,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// One element of a parsed document.
///
/// Names are kept qualified exactly as written (`dc:creator`, `itunes:image`),
/// attributes and children keep document order. Built once by [`parse`] and
/// never mutated afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct XmlNode {
    pub(crate) name: String,
    pub(crate) attributes: Vec<(String, String)>,
    pub(crate) children: Vec<XmlNode>,
    pub(crate) text: Option<String>,
}

impl XmlNode {
    /// Qualified tag name, prefix included.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Tag name without its namespace prefix.
    pub fn local_name(&self) -> &str {
        self.name
            .split_once(':')
            .map_or(self.name.as_str(), |(_, local)| local)
    }

    pub fn attributes(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attributes
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn has_attributes(&self) -> bool {
        !self.attributes.is_empty()
    }

    pub fn children(&self) -> &[XmlNode] {
        &self.children
    }

    /// First child element with the given qualified name.
    pub fn child(&self, name: &str) -> Option<&XmlNode> {
        self.children.iter().find(|child| child.name == name)
    }

    /// All child elements with the given qualified name, in document order.
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a XmlNode> + 'a {
        self.children.iter().filter(move |child| child.name == name)
    }

    /// Direct text content after entity decoding and whitespace rules.
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    /// Text of the first child with the given name.
    pub fn child_text(&self, name: &str) -> Option<&str> {
        self.child(name).and_then(XmlNode::text)
    }

    /// Descends through `path` one tag name per segment, following every
    /// match at each level. Returns the final matches in document order.
    pub fn find_path(&self, path: &[String]) -> Vec<&XmlNode> {
        let mut current = vec![self];
        for segment in path {
            current = current
                .into_iter()
                .flat_map(|node| {
                    node.children
                        .iter()
                        .filter(move |child| child.name == *segment)
                })
                .collect();
            if current.is_empty() {
                break;
            }
        }
        current
    }
}

/// An element whose end tag has not been seen yet.
struct OpenElement {
    node: XmlNode,
    text: String,
    cdata: bool,
}

impl OpenElement {
    fn new(node: XmlNode) -> Self {
        Self {
            node,
            text: String::new(),
            cdata: false,
        }
    }

    /// Applies the text rules and yields the completed node.
    ///
    /// Whitespace-only text survives only on bare elements (no attributes, no
    /// children), where it is replaced by `empty_tag` when one is configured.
    fn finish(self, options: &TreeOptions) -> XmlNode {
        let OpenElement {
            mut node,
            mut text,
            cdata,
        } = self;

        if !cdata && text.trim().is_empty() {
            let bare = node.attributes.is_empty() && node.children.is_empty();
            node.text = if bare {
                Some(options.empty_tag.clone().unwrap_or(text))
            } else {
                None
            };
            return node;
        }

        if options.normalize {
            text = text.split_whitespace().collect::<Vec<_>>().join(" ");
        } else if options.trim {
            text = text.trim().to_string();
        }
        node.text = Some(text);
        node
    }
}

/// Parses raw XML text into an [`XmlNode`] tree.
///
/// # Errors
///
/// Returns [`TreeError`] when the tokenizer rejects the input, when nesting
/// exceeds `options.max_depth`, or when the document is empty or truncated.
///
/// # Security
///
/// SEC-002: `quick-xml` (0.37) never expands `<!ENTITY>` declarations. Entity
/// references in text and attributes are resolved by [`decode_entities`], which
/// only knows the XML builtins, numeric references and the fixed HTML5 table.
pub fn parse(xml: &str, options: &TreeOptions) -> Result<XmlNode, TreeError> {
    let mut reader = Reader::from_str(xml);
    let mut stack: Vec<OpenElement> = Vec::new();
    let mut root: Option<XmlNode> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                // SEC-003: Reject excessively nested documents
                if stack.len() >= options.max_depth {
                    return Err(TreeError::MaxDepthExceeded(options.max_depth));
                }
                stack.push(OpenElement::new(start_node(&e)));
            }
            Ok(Event::Empty(e)) => {
                if stack.len() >= options.max_depth {
                    return Err(TreeError::MaxDepthExceeded(options.max_depth));
                }
                let node = OpenElement::new(start_node(&e)).finish(options);
                attach(&mut stack, &mut root, node)?;
            }
            Ok(Event::End(_)) => {
                let open = stack
                    .pop()
                    .ok_or_else(|| TreeError::Syntax("unexpected closing tag".to_string()))?;
                let node = open.finish(options);
                attach(&mut stack, &mut root, node)?;
            }
            Ok(Event::Text(t)) => {
                if let Some(open) = stack.last_mut() {
                    let raw = String::from_utf8_lossy(&t);
                    open.text.push_str(&decode_entities(&raw));
                }
            }
            Ok(Event::CData(c)) => {
                if let Some(open) = stack.last_mut() {
                    open.text.push_str(&String::from_utf8_lossy(&c));
                    open.cdata = true;
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(TreeError::Syntax(e.to_string())),
            // Declarations, comments, processing instructions and doctypes carry no feed data
            _ => {}
        }
    }

    if let Some(open) = stack.pop() {
        return Err(TreeError::Unclosed(open.node.name));
    }
    root.ok_or(TreeError::NoRoot)
}

fn start_node(e: &BytesStart<'_>) -> XmlNode {
    let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
    let mut attributes = Vec::new();

    for attr_result in e.attributes() {
        let attr = match attr_result {
            Ok(attr) => attr,
            Err(err) => {
                tracing::warn!(element = %name, error = %err, "Skipping malformed attribute");
                continue;
            }
        };
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let raw = String::from_utf8_lossy(&attr.value);
        attributes.push((key, decode_entities(&raw).into_owned()));
    }

    XmlNode {
        name,
        attributes,
        children: Vec::new(),
        text: None,
    }
}

fn attach(
    stack: &mut [OpenElement],
    root: &mut Option<XmlNode>,
    node: XmlNode,
) -> Result<(), TreeError> {
    if let Some(parent) = stack.last_mut() {
        parent.node.children.push(node);
        return Ok(());
    }
    if root.is_some() {
        return Err(TreeError::Syntax(format!(
            "unexpected second root element <{}>",
            node.name
        )));
    }
    *root = Some(node);
    Ok(())
}
