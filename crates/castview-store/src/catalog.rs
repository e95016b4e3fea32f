//! Catalog facade: the store surface route-level code talks to.
//!
//! Bundles the store, normalizer, resolver and preload coordinator behind
//! the operations a view actually performs: fetch one record, query a
//! page, resolve a relation, preload a relation across a page.

use std::sync::Arc;

use tracing::{debug, warn};

use castview_api::{Adapter, EntityType, QueryParams, RecordId, RecordKey};

use crate::error::StoreError;
use crate::normalize::Normalizer;
use crate::preload::PreloadCoordinator;
use crate::record::Record;
use crate::resolver::{RelationshipResolver, ResolvedRelation};
use crate::schema::SchemaRegistry;
use crate::store::Store;

/// Entry point to the data layer.
///
/// All collaborators are passed in at construction; there is no runtime
/// service lookup. One shared instance per session is the intended shape.
pub struct Catalog {
    store: Arc<Store>,
    adapter: Arc<dyn Adapter>,
    normalizer: Normalizer,
    resolver: Arc<RelationshipResolver>,
    preloader: PreloadCoordinator,
}

impl Catalog {
    /// Create a catalog over a schema registry and adapter.
    pub fn new(schemas: SchemaRegistry, adapter: Arc<dyn Adapter>) -> Self {
        let schemas = Arc::new(schemas);
        let store = Arc::new(Store::new());
        let normalizer = Normalizer::new(schemas);
        let resolver = Arc::new(RelationshipResolver::new(
            Arc::clone(&store),
            Arc::clone(&adapter),
            normalizer.clone(),
        ));
        let preloader = PreloadCoordinator::new(Arc::clone(&resolver));

        Self {
            store,
            adapter,
            normalizer,
            resolver,
            preloader,
        }
    }

    /// Create a catalog with the built-in streaming-catalog schemas.
    pub fn with_catalog_schemas(adapter: Arc<dyn Adapter>) -> Self {
        Self::new(SchemaRegistry::catalog(), adapter)
    }

    /// The identity-mapped store.
    pub fn store(&self) -> &Arc<Store> {
        &self.store
    }

    /// Fetch a record from the service, normalize it and return the live
    /// instance.
    ///
    /// Concurrent fetches of the same record share one operation.
    pub async fn find_record(
        &self,
        ty: impl Into<EntityType>,
        id: impl Into<RecordId>,
    ) -> Result<Arc<Record>, StoreError> {
        let key = RecordKey::new(ty, id);
        self.resolver.refresh(&key).await
    }

    /// Query a page of records, pushing every row into the store.
    ///
    /// Rows that fail to normalize are skipped with a warning rather than
    /// failing the page; a view prefers a short list over no list.
    pub async fn query(
        &self,
        ty: &EntityType,
        params: &QueryParams,
    ) -> Result<Vec<Arc<Record>>, StoreError> {
        debug!(
            "Querying {} (offset={}, limit={})",
            ty, params.offset, params.limit
        );

        let payloads = self.adapter.query_records(ty, params).await?;

        let mut records = Vec::with_capacity(payloads.len());
        for payload in payloads {
            match self.normalizer.normalize(&payload, ty) {
                Ok(descriptors) => {
                    // The root entity's descriptor is last
                    if let Some(root) = self.store.push_all(descriptors).pop() {
                        records.push(root);
                    }
                }
                Err(e) => {
                    warn!("Skipping {} row: {}", ty, e);
                }
            }
        }

        Ok(records)
    }

    /// Resolve a named relationship on a record.
    pub async fn resolve(
        &self,
        record: &Arc<Record>,
        key: &str,
    ) -> Result<ResolvedRelation, StoreError> {
        self.resolver.resolve(record, key).await
    }

    /// Preload a relationship for every record in a collection.
    pub async fn preload(&self, records: &[Arc<Record>], key: &str) -> Result<(), StoreError> {
        self.preloader.preload(records, key).await
    }

    /// Refresh a record by identity, reusing any in-flight refresh.
    pub async fn refresh(&self, key: &RecordKey) -> Result<Arc<Record>, StoreError> {
        self.resolver.refresh(key).await
    }
}
