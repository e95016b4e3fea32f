//! Coordinated batch preloading of a shared relationship.
//!
//! List views need a relation resolved for every item before rendering
//! (every hosted-stream row needs its target stream's preview data). The
//! coordinator gathers the target ids across the collection, deduplicates
//! them, drives one refresh per distinct target and joins everything with
//! a wait-all barrier.

use std::collections::HashSet;
use std::sync::Arc;

use futures::future::join_all;
use tracing::{debug, warn};

use castview_api::RecordKey;

use crate::error::StoreError;
use crate::record::Record;
use crate::resolver::RelationshipResolver;

/// Drives bulk relationship loading across a collection of records.
pub struct PreloadCoordinator {
    resolver: Arc<RelationshipResolver>,
}

impl PreloadCoordinator {
    /// Create a coordinator over a resolver.
    pub fn new(resolver: Arc<RelationshipResolver>) -> Self {
        Self { resolver }
    }

    /// Preload the named relationship for every record in the collection.
    ///
    /// Targets shared by several records are refreshed once. A target whose
    /// refresh is already in flight is awaited rather than refetched; any
    /// other target gets an explicit refresh so list consumers see freshly
    /// loaded data. The returned future settles only after every distinct
    /// target's operation has settled; the first failure is then surfaced.
    /// Targets still in flight when one fails are not cancelled, their
    /// results are simply discarded.
    ///
    /// There is no timeout: a hung target fetch blocks the barrier
    /// indefinitely.
    pub async fn preload(&self, records: &[Arc<Record>], key: &str) -> Result<(), StoreError> {
        let mut seen = HashSet::new();
        let mut targets = Vec::new();

        for record in records {
            let rel = record.relationship(key).ok_or_else(|| {
                StoreError::unknown_relationship(record.ty().as_str(), record.id().as_str(), key)
            })?;

            for id in rel.targets.ids() {
                let target = RecordKey::new(rel.target.clone(), id);
                if seen.insert(target.clone()) {
                    targets.push(target);
                }
            }
        }

        if targets.is_empty() {
            return Ok(());
        }

        debug!(
            "Preloading '{}' for {} records ({} distinct targets)",
            key,
            records.len(),
            targets.len()
        );

        let refreshes: Vec<_> = targets
            .iter()
            .map(|target| self.resolver.refresh_shared(target))
            .collect();

        // Wait-all barrier: every operation settles before any error wins
        let results = join_all(refreshes).await;

        let mut first_failure = None;
        for (target, result) in targets.iter().zip(results) {
            if let Err(e) = result {
                warn!("Preload of {} failed: {}", target, e);
                first_failure.get_or_insert(e);
            }
        }

        match first_failure {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Behavioral coverage lives in tests/preload.rs with the shared mock
    // adapter; this module only checks the cheap invariants.

    use crate::record::{RecordDescriptor, RelationKind, RelationTargets, RelationshipDescriptor};
    use crate::record::LoadState;
    use crate::normalize::Normalizer;
    use crate::schema::SchemaRegistry;
    use crate::store::Store;

    use async_trait::async_trait;
    use castview_api::{Adapter, AdapterError, EntityType, QueryParams, RawPayload, RecordId};
    use std::collections::HashMap;

    struct NoopAdapter;

    #[async_trait]
    impl Adapter for NoopAdapter {
        async fn fetch_record(
            &self,
            _ty: &EntityType,
            _id: &RecordId,
        ) -> Result<RawPayload, AdapterError> {
            Err(AdapterError::http(404, "noop"))
        }

        async fn query_records(
            &self,
            _ty: &EntityType,
            _params: &QueryParams,
        ) -> Result<Vec<RawPayload>, AdapterError> {
            Err(AdapterError::http(404, "noop"))
        }
    }

    fn coordinator(store: &Arc<Store>) -> PreloadCoordinator {
        let normalizer = Normalizer::new(Arc::new(SchemaRegistry::catalog()));
        let resolver = Arc::new(RelationshipResolver::new(
            Arc::clone(store),
            Arc::new(NoopAdapter),
            normalizer,
        ));
        PreloadCoordinator::new(resolver)
    }

    #[tokio::test]
    async fn test_preload_empty_collection() {
        let store = Arc::new(Store::new());
        let coordinator = coordinator(&store);

        assert!(coordinator.preload(&[], "target").await.is_ok());
    }

    #[tokio::test]
    async fn test_preload_unknown_relationship() {
        let store = Arc::new(Store::new());
        let coordinator = coordinator(&store);

        let record = store.push(RecordDescriptor {
            key: castview_api::RecordKey::new("streamHosted", "h1"),
            attributes: HashMap::new(),
            relationships: HashMap::new(),
        });

        let err = coordinator.preload(&[record], "target").await.unwrap_err();
        assert!(matches!(err, StoreError::UnknownRelationship { .. }));
    }

    #[tokio::test]
    async fn test_preload_skips_empty_targets() {
        let store = Arc::new(Store::new());
        let coordinator = coordinator(&store);

        // A row whose single-kind target is absent contributes nothing
        let mut relationships = HashMap::new();
        relationships.insert(
            "target".to_string(),
            RelationshipDescriptor {
                kind: RelationKind::Single,
                target: EntityType::new("stream"),
                targets: RelationTargets::One(None),
                state: LoadState::Loaded,
            },
        );
        let record = store.push(RecordDescriptor {
            key: castview_api::RecordKey::new("streamHosted", "h1"),
            attributes: HashMap::new(),
            relationships,
        });

        // No targets, no fetches, no error from the noop adapter
        assert!(coordinator.preload(&[record], "target").await.is_ok());
    }
}
