//! Parser configuration: custom field rules, the RSS version fallback and
//! options forwarded to the tree adapter.
//!
//! Configuration is a plain value handed to [`crate::FeedParser::new`], which
//! validates it once. It can be built in code, deserialized with serde, or
//! loaded from a TOML file with [`ParserConfig::load`]. A missing file yields
//! `ParserConfig::default()`. Unknown keys are ignored by serde, and we log a
//! warning for each one since they are usually typos.
use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

use crate::xml::TreeOptions;

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TOML in config file: {0}")]
    Parse(#[from] toml::de::Error),

    /// SEC-014: Config file exceeds maximum allowed size.
    #[error("Config file too large: {0}")]
    TooLarge(String),

    #[error("Custom field rule has an empty source or destination")]
    EmptyRule,

    /// Feed-level rules may not write over the item list.
    #[error("Custom feed field cannot write to reserved key '{0}'")]
    ReservedKey(String),

    #[error("default_rss must be 0.9, 1 or 2, got {0}")]
    InvalidDefaultRss(f64),
}

// ============================================================================
// Configuration Structs
// ============================================================================

/// Options for a single custom field rule.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FieldOptions {
    /// Always produce an array of every match, even when there is only one.
    #[serde(alias = "keepArray")]
    pub keep_array: bool,

    /// Also write `<destination>Snippet` with the markup-free text of the value.
    #[serde(alias = "includeSnippet")]
    pub include_snippet: bool,
}

/// A caller-declared extraction rule.
///
/// In TOML or JSON a rule is either a tag name or a two- or three-element
/// array:
///
/// ```toml
/// [custom_fields]
/// feed = ["language", "copyright"]
/// item = [
///     "subtitle",
///     ["media:content", "media", { keep_array = true }],
///     ["media:group/media:title", "mediaTitle"],
/// ]
/// ```
///
/// The source may be a `/`-separated path of tag names.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum FieldRule {
    /// Copy the tag under its own name.
    Name(String),
    /// Copy the tag under a new key.
    Rename(String, String),
    /// Copy the tag under a new key with options.
    RenameWith(String, String, FieldOptions),
}

impl FieldRule {
    /// Source tag path as written.
    pub fn source(&self) -> &str {
        match self {
            FieldRule::Name(name) => name,
            FieldRule::Rename(source, _) | FieldRule::RenameWith(source, _, _) => source,
        }
    }

    /// Output key the rule writes.
    pub fn destination(&self) -> &str {
        match self {
            FieldRule::Name(name) => name,
            FieldRule::Rename(_, destination) | FieldRule::RenameWith(_, destination, _) => {
                destination
            }
        }
    }

    pub fn options(&self) -> FieldOptions {
        match self {
            FieldRule::RenameWith(_, _, options) => *options,
            _ => FieldOptions::default(),
        }
    }
}

impl From<&str> for FieldRule {
    fn from(name: &str) -> Self {
        FieldRule::Name(name.to_string())
    }
}

impl From<(&str, &str)> for FieldRule {
    fn from((source, destination): (&str, &str)) -> Self {
        FieldRule::Rename(source.to_string(), destination.to_string())
    }
}

impl From<(&str, &str, FieldOptions)> for FieldRule {
    fn from((source, destination, options): (&str, &str, FieldOptions)) -> Self {
        FieldRule::RenameWith(source.to_string(), destination.to_string(), options)
    }
}

/// Custom field rules, declared independently per scope.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CustomFields {
    /// Rules applied to the channel (RSS) or feed root (Atom).
    pub feed: Vec<FieldRule>,
    /// Rules applied to every item or entry.
    pub item: Vec<FieldRule>,
}

/// Output shape of iTunes keywords at feed and item level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeywordFormat {
    /// `["a", "b"]`
    #[default]
    Array,
    /// `"a,b"`
    String,
}

/// Top-level parser configuration.
///
/// All fields use `#[serde(default)]` so any subset of keys can be specified.
/// camelCase aliases (`customFields`, `defaultRSS`, `xml2js`) are accepted.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    #[serde(alias = "customFields")]
    pub custom_fields: CustomFields,

    /// RSS version assumed when an `<rss>` root has no usable `version`.
    /// `1` selects RSS 1.0 extraction, `0.9` and `2` select RSS 2.0.
    #[serde(alias = "defaultRSS")]
    pub default_rss: Option<f64>,

    /// Options forwarded verbatim to the tree adapter.
    #[serde(alias = "xml2js")]
    pub xml: TreeOptions,

    /// How iTunes keywords are represented in the output.
    pub keywords: KeywordFormat,
}

impl ParserConfig {
    /// SEC-014: Maximum config file size (1 MB).
    const MAX_FILE_SIZE: u64 = 1_048_576;

    const SUPPORTED_DEFAULT_RSS: [f64; 3] = [0.9, 1.0, 2.0];

    const KNOWN_KEYS: [&'static str; 7] = [
        "custom_fields",
        "customFields",
        "default_rss",
        "defaultRSS",
        "xml",
        "xml2js",
        "keywords",
    ];

    /// Load configuration from a TOML file.
    ///
    /// - Missing file → `Ok(ParserConfig::default())`
    /// - Empty file → `Ok(ParserConfig::default())`
    /// - Invalid TOML → `Err(ConfigError::Parse)` with line number info
    /// - Unknown keys → silently accepted (serde default behavior), logged as warning
    ///
    /// Rule validation happens in [`crate::FeedParser::new`].
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        // SEC-014: Check file size before reading to prevent memory exhaustion
        match std::fs::metadata(path) {
            Ok(meta) if meta.len() > Self::MAX_FILE_SIZE => {
                return Err(ConfigError::TooLarge(format!(
                    "Config file is {} bytes (max {} bytes)",
                    meta.len(),
                    Self::MAX_FILE_SIZE
                )));
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No config file found, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
            Ok(_) => {}
        }

        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                // Race condition: file deleted between metadata and read
                tracing::debug!(path = %path.display(), "Config file disappeared, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
        };

        Self::from_toml(&content)
    }

    /// Parse configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        if content.trim().is_empty() {
            tracing::debug!("Config is empty, using defaults");
            return Ok(Self::default());
        }

        if let Ok(raw) = content.parse::<toml::Table>() {
            for key in raw.keys() {
                if !Self::KNOWN_KEYS.contains(&key.as_str()) {
                    tracing::warn!(key = %key, "Unknown key in parser config, ignoring");
                }
            }
        }

        let config: ParserConfig = toml::from_str(content)?;
        tracing::info!(
            feed_rules = config.custom_fields.feed.len(),
            item_rules = config.custom_fields.item.len(),
            default_rss = ?config.default_rss,
            "Loaded parser configuration"
        );
        Ok(config)
    }

    /// Checks values that serde cannot. Rule shapes are checked when they are compiled.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(version) = self.default_rss {
            let supported = Self::SUPPORTED_DEFAULT_RSS
                .iter()
                .any(|v| (v - version).abs() < f64::EPSILON);
            if !supported {
                return Err(ConfigError::InvalidDefaultRss(version));
            }
        }
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
