use serde_json::{Map, Value};

use super::XmlNode;

/// Key holding an element's attribute map in its JSON form.
pub const ATTR_KEY: &str = "$";
/// Key holding an element's text when it also has attributes or children.
pub const TEXT_KEY: &str = "_";

impl XmlNode {
    /// Converts the element into a JSON value.
    ///
    /// A bare element becomes its text. Anything with attributes or children
    /// becomes an object: attributes under `"$"`, text under `"_"`, and one
    /// array per child tag name holding the converted children in order.
    pub fn to_value(&self) -> Value {
        if self.attributes.is_empty() && self.children.is_empty() {
            return Value::String(self.text.clone().unwrap_or_default());
        }

        let mut object = Map::new();
        if !self.attributes.is_empty() {
            object.insert(ATTR_KEY.to_string(), Value::Object(self.attribute_map()));
        }
        if let Some(text) = &self.text {
            object.insert(TEXT_KEY.to_string(), Value::String(text.clone()));
        }
        for child in &self.children {
            let slot = object
                .entry(child.name.clone())
                .or_insert_with(|| Value::Array(Vec::new()));
            if let Value::Array(list) = slot {
                list.push(child.to_value());
            }
        }
        Value::Object(object)
    }

    /// Attributes as a JSON object of strings.
    pub fn attribute_map(&self) -> Map<String, Value> {
        self.attributes
            .iter()
            .map(|(key, value)| (key.clone(), Value::String(value.clone())))
            .collect()
    }
}

/// Collapses an object carrying string text under `"_"` to that string.
///
/// Used wherever a single tag is copied into the output, so `<title type="html">x</title>`
/// reads as `"x"` rather than an object.
pub fn collapse_text(value: Value) -> Value {
    match value {
        Value::Object(mut object) => match object.remove(TEXT_KEY) {
            Some(Value::String(text)) => Value::String(text),
            Some(other) => {
                object.insert(TEXT_KEY.to_string(), other);
                Value::Object(object)
            }
            None => Value::Object(object),
        },
        other => other,
    }
}
