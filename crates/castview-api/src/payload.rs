//! Raw payload documents returned by adapters.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// An untyped structured document for a single root entity.
///
/// The service wraps single-record responses in an envelope keyed by the
/// entity type name (`{ "product": { ... } }`); collection rows usually
/// arrive bare. [`RawPayload::entity`] handles both shapes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawPayload(Value);

impl RawPayload {
    /// Wrap a JSON document.
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    /// The underlying JSON document.
    pub fn as_value(&self) -> &Value {
        &self.0
    }

    /// Consume the payload and return the JSON document.
    pub fn into_inner(self) -> Value {
        self.0
    }

    /// The root entity document for the given type.
    ///
    /// Unwraps the single-key `{ "<type>": { ... } }` envelope when present,
    /// otherwise returns the document itself.
    pub fn entity(&self, type_key: &str) -> &Value {
        match self.0.as_object() {
            Some(map) if map.len() == 1 => map.get(type_key).unwrap_or(&self.0),
            _ => &self.0,
        }
    }
}

impl From<Value> for RawPayload {
    fn from(value: Value) -> Self {
        Self(value)
    }
}
