//! Shared identity types for catalog entities.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Name of an entity type in the catalog (e.g. "stream", "channel",
/// "productEmoticon").
///
/// Types are compared case-sensitively; the service uses lowerCamelCase
/// payload keys and those names are carried through unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityType(String);

impl EntityType {
    /// Create an entity type from its payload-key name.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The type name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EntityType {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for EntityType {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Identifier of a single record within an entity type.
///
/// The service mixes numeric and string ids (channel `1`, emoticon `"bar"`),
/// so ids are normalized to their string form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    /// Create a record id from its string form.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Extract an id from a JSON value.
    ///
    /// Accepts strings and integers; anything else is not a resolvable id.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) if !s.is_empty() => Some(Self(s.clone())),
            Value::Number(n) => Some(Self(n.to_string())),
            _ => None,
        }
    }

    /// The id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RecordId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for RecordId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<u64> for RecordId {
    fn from(n: u64) -> Self {
        Self(n.to_string())
    }
}

/// Full identity of a record: (type, id).
///
/// The identity map guarantees at most one live record per key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RecordKey {
    /// Entity type
    pub ty: EntityType,

    /// Record id
    pub id: RecordId,
}

impl RecordKey {
    /// Create a record key.
    pub fn new(ty: impl Into<EntityType>, id: impl Into<RecordId>) -> Self {
        Self {
            ty: ty.into(),
            id: id.into(),
        }
    }
}

impl fmt::Display for RecordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.ty, self.id)
    }
}

/// Pagination window for collection queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryParams {
    /// Number of records to skip
    pub offset: usize,

    /// Maximum number of records to return
    pub limit: usize,
}

impl QueryParams {
    /// Create query parameters for a page window.
    pub fn new(offset: usize, limit: usize) -> Self {
        Self { offset, limit }
    }

    /// The page following this one.
    pub fn next_page(&self) -> Self {
        Self {
            offset: self.offset + self.limit,
            limit: self.limit,
        }
    }
}

impl Default for QueryParams {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: castview_config::DEFAULT_QUERY_LIMIT,
        }
    }
}
