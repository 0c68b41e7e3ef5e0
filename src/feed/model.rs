use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Key/value pairs of one feed or item, in insertion order.
pub type Fields = Map<String, Value>;

/// A normalized feed.
///
/// Feed-level keys (`title`, `description`, `link`, `feedUrl`, `itunes`,
/// custom keys, ...) live in a flat map next to the ordered item list. A key
/// is present only when the document backs it with data or a custom rule
/// matched; there are no null placeholders.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Feed {
    #[serde(flatten)]
    fields: Fields,
    #[serde(default)]
    items: Vec<Item>,
}

/// One normalized item or entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Item {
    fields: Fields,
}

impl Feed {
    pub(crate) fn from_parts(fields: Fields, items: Vec<Item>) -> Self {
        Self { fields, items }
    }

    pub fn fields(&self) -> &Fields {
        &self.fields
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// The value under `key` when it is a string.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.fields.get(key).and_then(Value::as_str)
    }

    pub fn title(&self) -> Option<&str> {
        self.get_str("title")
    }

    pub fn description(&self) -> Option<&str> {
        self.get_str("description")
    }

    pub fn link(&self) -> Option<&str> {
        self.get_str("link")
    }

    pub fn feed_url(&self) -> Option<&str> {
        self.get_str("feedUrl")
    }

    /// Splits the feed into its feed-level map and items.
    pub fn into_parts(self) -> (Fields, Vec<Item>) {
        (self.fields, self.items)
    }

    /// The whole feed as one JSON object, `items` included.
    pub fn to_value(&self) -> Value {
        let mut object = self.fields.clone();
        let items = self.items.iter().map(|item| Value::Object(item.fields.clone()));
        object.insert("items".to_string(), Value::Array(items.collect()));
        Value::Object(object)
    }
}

impl Item {
    pub(crate) fn from_fields(fields: Fields) -> Self {
        Self { fields }
    }

    pub fn fields(&self) -> &Fields {
        &self.fields
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.fields.get(key).and_then(Value::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    pub fn title(&self) -> Option<&str> {
        self.get_str("title")
    }

    pub fn link(&self) -> Option<&str> {
        self.get_str("link")
    }

    /// Raw date string as found in the document.
    pub fn date(&self) -> Option<&str> {
        self.get_str("date")
    }

    /// `date` normalized to `YYYY-MM-DDTHH:MM:SS.mmmZ`.
    pub fn iso_date(&self) -> Option<&str> {
        self.get_str("isoDate")
    }

    pub fn creator(&self) -> Option<&str> {
        self.get_str("creator")
    }

    pub fn content(&self) -> Option<&str> {
        self.get_str("content")
    }

    pub fn content_snippet(&self) -> Option<&str> {
        self.get_str("contentSnippet")
    }

    pub fn guid(&self) -> Option<&str> {
        self.get_str("guid")
    }

    pub fn into_fields(self) -> Fields {
        self.fields
    }
}
