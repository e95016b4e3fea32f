//! Entity schemas: which payload fields are relationships.
//!
//! The normalizer is schema-driven. For every entity type the registry
//! declares the id field and the relationship fields (everything else is a
//! scalar attribute). [`SchemaRegistry::catalog`] builds the schemas for
//! the live-streaming catalog the client browses.

use std::collections::HashMap;

use castview_api::EntityType;

use crate::record::RelationKind;

/// Relationship declaration on a schema.
#[derive(Debug, Clone)]
pub struct RelationshipSpec {
    /// Cardinality
    pub kind: RelationKind,

    /// Target entity type
    pub target: EntityType,
}

/// Schema for one entity type.
#[derive(Debug, Clone)]
pub struct EntitySchema {
    ty: EntityType,
    id_key: String,
    relationships: HashMap<String, RelationshipSpec>,
}

impl EntitySchema {
    /// Create a schema with the conventional "id" field.
    pub fn new(ty: impl Into<EntityType>) -> Self {
        Self {
            ty: ty.into(),
            id_key: "id".to_string(),
            relationships: HashMap::new(),
        }
    }

    /// Use a non-conventional id field (the service uses "_id" on its
    /// older endpoints).
    pub fn with_id_key(mut self, id_key: impl Into<String>) -> Self {
        self.id_key = id_key.into();
        self
    }

    /// Declare a single-kind relationship.
    pub fn with_single(mut self, key: impl Into<String>, target: impl Into<EntityType>) -> Self {
        self.relationships.insert(
            key.into(),
            RelationshipSpec {
                kind: RelationKind::Single,
                target: target.into(),
            },
        );
        self
    }

    /// Declare a collection-kind relationship.
    pub fn with_collection(
        mut self,
        key: impl Into<String>,
        target: impl Into<EntityType>,
    ) -> Self {
        self.relationships.insert(
            key.into(),
            RelationshipSpec {
                kind: RelationKind::Collection,
                target: target.into(),
            },
        );
        self
    }

    /// The entity type this schema describes.
    pub fn ty(&self) -> &EntityType {
        &self.ty
    }

    /// The payload field holding the record id.
    pub fn id_key(&self) -> &str {
        &self.id_key
    }

    /// Relationship declaration for a payload field, if any.
    pub fn relationship(&self, key: &str) -> Option<&RelationshipSpec> {
        self.relationships.get(key)
    }

    /// All declared relationship keys.
    pub fn relationship_keys(&self) -> impl Iterator<Item = &str> {
        self.relationships.keys().map(String::as_str)
    }
}

/// Registry of entity schemas, consulted during normalization.
#[derive(Debug, Default)]
pub struct SchemaRegistry {
    schemas: HashMap<EntityType, EntitySchema>,
}

impl SchemaRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a schema, replacing any previous one for the same type.
    pub fn register(&mut self, schema: EntitySchema) -> &mut Self {
        self.schemas.insert(schema.ty().clone(), schema);
        self
    }

    /// Look up the schema for an entity type.
    pub fn get(&self, ty: &EntityType) -> Option<&EntitySchema> {
        self.schemas.get(ty)
    }

    /// Whether a schema is registered for the type.
    pub fn contains(&self, ty: &EntityType) -> bool {
        self.schemas.contains_key(ty)
    }

    /// Number of registered schemas.
    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    /// Schemas for the live-streaming catalog entities.
    ///
    /// Streams and channels come from the older endpoints and carry "_id";
    /// everything else uses the conventional "id" field. A stream's
    /// `preview` image set has no id of its own and stays a plain
    /// attribute.
    pub fn catalog() -> Self {
        let mut registry = Self::new();

        registry
            .register(EntitySchema::new("channel").with_id_key("_id"))
            .register(
                EntitySchema::new("stream")
                    .with_id_key("_id")
                    .with_single("channel", "channel"),
            )
            .register(EntitySchema::new("streamHosted").with_single("target", "stream"))
            .register(EntitySchema::new("user").with_single("channel", "channel"))
            .register(
                EntitySchema::new("product")
                    .with_single("partner_login", "user")
                    .with_single("channel", "channel")
                    .with_collection("emoticons", "productEmoticon"),
            )
            .register(EntitySchema::new("productEmoticon"))
            .register(EntitySchema::new("team").with_id_key("_id"))
            .register(EntitySchema::new("search"));

        registry
    }
}
