//! Records and relationship descriptors.
//!
//! A [`Record`] is the one live instance for its (type, id). The store
//! hands out `Arc<Record>` clones and mutates the record in place on every
//! later normalization, so references held across a refresh stay valid.
//!
//! Thread-safe via interior mutability using parking_lot::RwLock.

use std::collections::HashMap;

use parking_lot::RwLock;
use serde_json::Value;

use castview_api::{EntityType, RecordId, RecordKey};

/// Cardinality of a relationship.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationKind {
    /// Points at a single target record
    Single,
    /// Points at an ordered list of target records
    Collection,
}

/// Resolution state of a relationship.
///
/// Transitions are monotonic (Unloaded → Loading → Loaded) except that
/// Errored resets to Loading when a caller retries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    /// Target ids known, targets not fetched
    Unloaded,
    /// A fetch is in flight
    Loading,
    /// Targets present in the store
    Loaded,
    /// Last fetch failed; next resolve retries
    Errored,
}

/// Cached target id(s) of a relationship.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelationTargets {
    /// Single-kind target (absent when the payload carried null)
    One(Option<RecordId>),
    /// Collection-kind targets
    Many(Vec<RecordId>),
}

impl RelationTargets {
    /// All target ids, in payload order.
    pub fn ids(&self) -> Vec<RecordId> {
        match self {
            Self::One(Some(id)) => vec![id.clone()],
            Self::One(None) => Vec::new(),
            Self::Many(ids) => ids.clone(),
        }
    }

    /// Whether there is nothing to resolve.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::One(id) => id.is_none(),
            Self::Many(ids) => ids.is_empty(),
        }
    }
}

/// A named relationship on a record.
#[derive(Debug, Clone)]
pub struct Relationship {
    /// Cardinality
    pub kind: RelationKind,

    /// Target entity type
    pub target: EntityType,

    /// Cached target id(s); fixed until a re-push widens them
    pub targets: RelationTargets,

    /// Resolution state, queryable without forcing the pending future
    pub state: LoadState,
}

/// A normalized relationship produced by the normalizer.
#[derive(Debug, Clone)]
pub struct RelationshipDescriptor {
    /// Cardinality
    pub kind: RelationKind,

    /// Target entity type
    pub target: EntityType,

    /// Target id(s) extracted from the payload
    pub targets: RelationTargets,

    /// Initial state: `Loaded` when the targets were embedded in the
    /// payload and hoisted alongside, `Unloaded` for plain id references
    pub state: LoadState,
}

/// A normalized record descriptor: one discrete entity out of a payload.
#[derive(Debug, Clone)]
pub struct RecordDescriptor {
    /// Record identity
    pub key: RecordKey,

    /// Scalar fields
    pub attributes: HashMap<String, Value>,

    /// Named relationships
    pub relationships: HashMap<String, RelationshipDescriptor>,
}

/// Mutable state of a record (protected by RwLock).
#[derive(Debug, Default)]
struct RecordState {
    attributes: HashMap<String, Value>,
    relationships: HashMap<String, Relationship>,
}

/// One live catalog entity.
///
/// Identity-map invariant: exactly one `Record` exists per (type, id);
/// every consumer observing that key sees this same instance.
#[derive(Debug)]
pub struct Record {
    key: RecordKey,
    state: RwLock<RecordState>,
}

impl Record {
    pub(crate) fn new(key: RecordKey) -> Self {
        Self {
            key,
            state: RwLock::new(RecordState::default()),
        }
    }

    /// The record's identity.
    pub fn key(&self) -> &RecordKey {
        &self.key
    }

    /// The entity type.
    pub fn ty(&self) -> &EntityType {
        &self.key.ty
    }

    /// The record id.
    pub fn id(&self) -> &RecordId {
        &self.key.id
    }

    /// A single attribute value, if present.
    pub fn attribute(&self, name: &str) -> Option<Value> {
        self.state.read().attributes.get(name).cloned()
    }

    /// Snapshot of all attributes.
    pub fn attributes(&self) -> HashMap<String, Value> {
        self.state.read().attributes.clone()
    }

    /// Snapshot of a named relationship.
    pub fn relationship(&self, key: &str) -> Option<Relationship> {
        self.state.read().relationships.get(key).cloned()
    }

    /// Resolution state of a named relationship.
    pub fn relationship_state(&self, key: &str) -> Option<LoadState> {
        self.state.read().relationships.get(key).map(|r| r.state)
    }

    /// Names of all relationships on this record.
    pub fn relationship_keys(&self) -> Vec<String> {
        self.state.read().relationships.keys().cloned().collect()
    }

    /// Merge a normalized descriptor into this record.
    ///
    /// Applied as one atomic step under the record's write lock: readers
    /// never observe a partially merged record. Attributes overwrite;
    /// relationship target ids update in place. A relationship whose
    /// targets changed falls back to the descriptor's state (so stale
    /// `Loaded` claims don't survive a membership change), otherwise the
    /// stronger of the two states wins.
    pub(crate) fn merge(&self, descriptor: RecordDescriptor) {
        debug_assert_eq!(&self.key, &descriptor.key);

        let mut state = self.state.write();

        state.attributes.extend(descriptor.attributes);

        for (key, incoming) in descriptor.relationships {
            match state.relationships.get_mut(&key) {
                Some(existing) => {
                    let targets_changed = existing.targets != incoming.targets;
                    existing.kind = incoming.kind;
                    existing.target = incoming.target;
                    existing.targets = incoming.targets;
                    if targets_changed {
                        existing.state = incoming.state;
                    } else if incoming.state == LoadState::Loaded {
                        existing.state = LoadState::Loaded;
                    }
                }
                None => {
                    state.relationships.insert(
                        key,
                        Relationship {
                            kind: incoming.kind,
                            target: incoming.target,
                            targets: incoming.targets,
                            state: incoming.state,
                        },
                    );
                }
            }
        }
    }

    /// Update the resolution state of a relationship.
    ///
    /// Returns false if the relationship does not exist.
    pub(crate) fn set_relationship_state(&self, key: &str, new_state: LoadState) -> bool {
        let mut state = self.state.write();
        match state.relationships.get_mut(key) {
            Some(rel) => {
                rel.state = new_state;
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn descriptor(key: RecordKey) -> RecordDescriptor {
        RecordDescriptor {
            key,
            attributes: HashMap::new(),
            relationships: HashMap::new(),
        }
    }

    #[test]
    fn test_merge_overwrites_attributes() {
        let record = Record::new(RecordKey::new("channel", "1"));

        let mut first = descriptor(RecordKey::new("channel", "1"));
        first.attributes.insert("name".into(), json!("old"));
        first.attributes.insert("followers".into(), json!(10));
        record.merge(first);

        let mut second = descriptor(RecordKey::new("channel", "1"));
        second.attributes.insert("name".into(), json!("new"));
        record.merge(second);

        // Updated field overwritten, untouched field preserved
        assert_eq!(record.attribute("name"), Some(json!("new")));
        assert_eq!(record.attribute("followers"), Some(json!(10)));
    }

    #[test]
    fn test_merge_preserves_loaded_state_for_same_targets() {
        let record = Record::new(RecordKey::new("streamHosted", "7"));

        let mut desc = descriptor(RecordKey::new("streamHosted", "7"));
        desc.relationships.insert(
            "target".into(),
            RelationshipDescriptor {
                kind: RelationKind::Single,
                target: EntityType::new("stream"),
                targets: RelationTargets::One(Some(RecordId::new("42"))),
                state: LoadState::Unloaded,
            },
        );
        record.merge(desc.clone());

        record.set_relationship_state("target", LoadState::Loaded);

        // Re-pushing the same ids must not regress Loaded back to Unloaded
        record.merge(desc);
        assert_eq!(record.relationship_state("target"), Some(LoadState::Loaded));
    }

    #[test]
    fn test_merge_resets_state_when_targets_change() {
        let record = Record::new(RecordKey::new("product", "1"));

        let mut desc = descriptor(RecordKey::new("product", "1"));
        desc.relationships.insert(
            "emoticons".into(),
            RelationshipDescriptor {
                kind: RelationKind::Collection,
                target: EntityType::new("productEmoticon"),
                targets: RelationTargets::Many(vec![RecordId::new("bar")]),
                state: LoadState::Unloaded,
            },
        );
        record.merge(desc);
        record.set_relationship_state("emoticons", LoadState::Loaded);

        // A wider id set arrives: the loaded claim no longer holds
        let mut wider = descriptor(RecordKey::new("product", "1"));
        wider.relationships.insert(
            "emoticons".into(),
            RelationshipDescriptor {
                kind: RelationKind::Collection,
                target: EntityType::new("productEmoticon"),
                targets: RelationTargets::Many(vec![RecordId::new("bar"), RecordId::new("baz")]),
                state: LoadState::Unloaded,
            },
        );
        record.merge(wider);

        let rel = record.relationship("emoticons").unwrap();
        assert_eq!(rel.state, LoadState::Unloaded);
        assert_eq!(rel.targets.ids().len(), 2);
    }

    #[test]
    fn test_set_relationship_state_unknown_key() {
        let record = Record::new(RecordKey::new("user", "foo"));
        assert!(!record.set_relationship_state("nope", LoadState::Loading));
    }

    #[test]
    fn test_relation_targets_ids() {
        assert_eq!(RelationTargets::One(None).ids(), Vec::<RecordId>::new());
        assert!(RelationTargets::One(None).is_empty());
        assert_eq!(
            RelationTargets::Many(vec![RecordId::new("a"), RecordId::new("b")]).ids(),
            vec![RecordId::new("a"), RecordId::new("b")]
        );
    }
}
