//! Payload normalization.
//!
//! Turns one raw API payload into discrete record descriptors. Embedded
//! sub-entities (entities nested inline instead of referenced by id) are
//! hoisted into descriptors of their own type, transitively, and the
//! owning relationship is rewritten to reference them by id.
//!
//! Normalization is a pure transform; feeding the result into the store is
//! the caller's job. Descriptor ordering: hoisted sub-entities precede
//! their owner, so the root entity's descriptor is always last.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;
use tracing::trace;

use castview_api::{EntityType, RawPayload, RecordId, RecordKey};

use crate::error::NormalizeError;
use crate::record::{
    LoadState, RecordDescriptor, RelationKind, RelationTargets, RelationshipDescriptor,
};
use crate::schema::{RelationshipSpec, SchemaRegistry};

/// Schema-driven payload normalizer.
#[derive(Debug, Clone)]
pub struct Normalizer {
    schemas: Arc<SchemaRegistry>,
}

impl Normalizer {
    /// Create a normalizer over a schema registry.
    pub fn new(schemas: Arc<SchemaRegistry>) -> Self {
        Self { schemas }
    }

    /// The schema registry this normalizer consults.
    pub fn schemas(&self) -> &SchemaRegistry {
        &self.schemas
    }

    /// Normalize a raw payload rooted at the given entity type.
    ///
    /// Returns one descriptor per discrete entity found in the payload;
    /// the root entity's descriptor is the last element.
    pub fn normalize(
        &self,
        payload: &RawPayload,
        root: &EntityType,
    ) -> Result<Vec<RecordDescriptor>, NormalizeError> {
        let mut out = Vec::new();
        let entity = payload.entity(root.as_str());
        self.normalize_entity(entity, root, &mut out)?;

        trace!("Normalized {} into {} descriptors", root, out.len());
        Ok(out)
    }

    /// Normalize one entity document, appending descriptors depth-first.
    ///
    /// Returns the entity's id so the owner can rewrite its relationship.
    fn normalize_entity(
        &self,
        value: &Value,
        ty: &EntityType,
        out: &mut Vec<RecordDescriptor>,
    ) -> Result<RecordId, NormalizeError> {
        let schema = self
            .schemas
            .get(ty)
            .ok_or_else(|| NormalizeError::unknown_type(ty.as_str()))?;

        let object = value
            .as_object()
            .ok_or_else(|| NormalizeError::malformed(ty.as_str(), "entity is not an object"))?;

        let id = object
            .get(schema.id_key())
            .and_then(RecordId::from_value)
            .ok_or_else(|| NormalizeError::missing_id(ty.as_str()))?;

        let mut attributes = HashMap::new();
        let mut relationships = HashMap::new();

        for (field, field_value) in object {
            if field == schema.id_key() {
                continue;
            }

            match schema.relationship(field) {
                Some(spec) => {
                    let descriptor = self.normalize_relationship(spec, field_value, out)?;
                    relationships.insert(field.clone(), descriptor);
                }
                None => {
                    attributes.insert(field.clone(), field_value.clone());
                }
            }
        }

        out.push(RecordDescriptor {
            key: RecordKey::new(ty.clone(), id.clone()),
            attributes,
            relationships,
        });

        Ok(id)
    }

    /// Normalize one relationship value.
    ///
    /// Inline objects are hoisted recursively and the relationship is
    /// marked `Loaded`; scalar values stay lazy id references.
    fn normalize_relationship(
        &self,
        spec: &RelationshipSpec,
        value: &Value,
        out: &mut Vec<RecordDescriptor>,
    ) -> Result<RelationshipDescriptor, NormalizeError> {
        let (targets, state) = match spec.kind {
            RelationKind::Single => match value {
                Value::Null => (RelationTargets::One(None), LoadState::Loaded),
                Value::Object(_) => {
                    let id = self.normalize_entity(value, &spec.target, out)?;
                    (RelationTargets::One(Some(id)), LoadState::Loaded)
                }
                _ => {
                    let id = RecordId::from_value(value).ok_or_else(|| {
                        NormalizeError::malformed(
                            spec.target.as_str(),
                            "relationship reference is not an id",
                        )
                    })?;
                    (RelationTargets::One(Some(id)), LoadState::Unloaded)
                }
            },
            RelationKind::Collection => match value {
                Value::Null => (RelationTargets::Many(Vec::new()), LoadState::Loaded),
                Value::Array(elements) => {
                    let mut ids = Vec::with_capacity(elements.len());
                    let mut all_embedded = true;

                    for element in elements {
                        if element.is_object() {
                            ids.push(self.normalize_entity(element, &spec.target, out)?);
                        } else {
                            all_embedded = false;
                            ids.push(RecordId::from_value(element).ok_or_else(|| {
                                NormalizeError::malformed(
                                    spec.target.as_str(),
                                    "collection element is not an id",
                                )
                            })?);
                        }
                    }

                    let state = if all_embedded {
                        LoadState::Loaded
                    } else {
                        LoadState::Unloaded
                    };
                    (RelationTargets::Many(ids), state)
                }
                _ => {
                    return Err(NormalizeError::malformed(
                        spec.target.as_str(),
                        "collection relationship is not an array",
                    ))
                }
            },
        };

        Ok(RelationshipDescriptor {
            kind: spec.kind,
            target: spec.target.clone(),
            targets,
            state,
        })
    }
}
