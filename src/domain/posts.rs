//! Upstream posts and enriched poem records.

use serde::{Deserialize, Serialize};
use serde_json::Value;

const LINK_FIELD: &str = "link_url";
const PERMALINK_FIELD: &str = "permalink_url";

/// A post exactly as returned by the blogging platform.
///
/// The structure is passed through untouched; only the link fields are read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Post(Value);

impl Post {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    pub fn into_value(self) -> Value {
        self.0
    }

    pub fn link_url(&self) -> Option<&str> {
        self.string_field(LINK_FIELD)
    }

    pub fn permalink_url(&self) -> Option<&str> {
        self.string_field(PERMALINK_FIELD)
    }

    /// URL used to look up embed content: the outbound link when present,
    /// otherwise the permalink. Empty when neither is set.
    pub fn source_url(&self) -> String {
        self.link_url()
            .or_else(|| self.permalink_url())
            .unwrap_or_default()
            .to_string()
    }

    fn string_field(&self, name: &str) -> Option<&str> {
        self.0
            .get(name)
            .and_then(Value::as_str)
            .filter(|value| !value.is_empty())
    }
}

impl From<Value> for Post {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

/// A post enriched with its oEmbed representation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Poem {
    pub content: Value,
    pub url: String,
}

/// Whether an oEmbed body carries no usable content. Only a non-empty
/// object, array or string counts as content; scalars never do.
pub fn is_empty_embed(content: &Value) -> bool {
    match content {
        Value::String(text) => text.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        Value::Null | Value::Bool(_) | Value::Number(_) => true,
    }
}
