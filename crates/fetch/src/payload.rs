//! One canonical shape for whatever the AJAX endpoints send back.
//!
//! The same logical call can answer with bare HTML, a JSON envelope whose
//! `message` (or older `d`) field holds HTML, a pre-extracted listing, or a
//! pre-extracted results object. Everything is folded into [`Payload`] here so
//! extractors only branch on meaning, never on wire format.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A normalized response body.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// Raw markup, unwrapped from any JSON envelope.
    Markup(String),
    /// A listing of `{id, name}` pairs (categories of a discipline).
    Listing(Vec<ListingItem>),
    /// An already-extracted `{id, name, riders}` results object.
    Results(Value),
}

/// One entry of a [`Payload::Listing`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingItem {
    pub id: String,
    pub name: String,
}
impl ListingItem {
    fn from_value(value: &Value) -> Option<Self> {
        let object = value.as_object()?;
        let id = match object.get("id").or_else(|| object.get("race_id"))? {
            Value::String(id) => id.trim().to_string(),
            Value::Number(id) => id.to_string(),
            _ => return None,
        };
        let name = object.get("name").and_then(Value::as_str).unwrap_or_default().trim().to_string();
        (!id.is_empty()).then_some(Self { id, name })
    }
}

impl Payload {
    /// Normalize a response body. Anything that isn't recognizable JSON is
    /// treated as markup.
    pub fn from_body(body: &str) -> Self {
        let trimmed = body.trim_start();
        if (trimmed.starts_with('{') || trimmed.starts_with('['))
            && let Ok(value) = serde_json::from_str::<Value>(trimmed)
            && let Some(payload) = Self::recognize(&value)
        {
            return payload;
        }
        Self::Markup(body.to_string())
    }

    /// Normalize an already-parsed JSON value.
    pub fn from_value(value: Value) -> Self {
        match Self::recognize(&value) {
            Some(payload) => payload,
            None => match value {
                Value::String(markup) => Self::Markup(markup),
                other => Self::Markup(other.to_string()),
            },
        }
    }

    fn recognize(value: &Value) -> Option<Self> {
        match value {
            Value::Object(object) => Self::recognize_object(object),
            Value::Array(items) => Some(Self::Listing(items.iter().filter_map(ListingItem::from_value).collect())),
            _ => None,
        }
    }

    fn recognize_object(object: &Map<String, Value>) -> Option<Self> {
        for envelope in ["message", "d"] {
            if let Some(Value::String(markup)) = object.get(envelope) {
                return Some(Self::Markup(markup.clone()));
            }
        }
        if object.contains_key("riders") {
            return Some(Self::Results(Value::Object(object.clone())));
        }
        if let Some(Value::Array(items)) = object.get("categories") {
            return Some(Self::Listing(items.iter().filter_map(ListingItem::from_value).collect()));
        }
        None
    }

    /// The markup, if this payload is markup.
    pub fn as_markup(&self) -> Option<&str> {
        match self {
            Self::Markup(markup) => Some(markup),
            _ => None,
        }
    }
}
