//! Lazy relationship resolution.
//!
//! Resolves a named relationship on a record into the target record(s),
//! fetching through the adapter on first access. Concurrent resolutions of
//! the same (record, relationship) share one in-flight future, so an
//! identical pair never issues a second adapter call while one is
//! outstanding. Individual target fetches additionally go through a
//! per-record refresh table, so a relation fetch and a record refresh of
//! the same target also collapse into one adapter call. Rejections are
//! never cached: a failed resolution resets to a retryable state and the
//! next call fetches again.
//!
//! Fetch work runs in spawned tasks, so an abandoned awaiter never cancels
//! an in-flight adapter call; its result is simply discarded.

use std::collections::HashMap;
use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt, Shared};
use parking_lot::Mutex;
use tracing::{debug, warn};

use castview_api::{Adapter, EntityType, RecordId, RecordKey};

use crate::error::StoreError;
use crate::normalize::Normalizer;
use crate::record::{LoadState, Record, RelationTargets, Relationship};
use crate::store::Store;

/// A memoized in-flight fetch, cloneable to every awaiter.
type SharedFetch<T> = Shared<BoxFuture<'static, Result<T, StoreError>>>;

/// Key of the resolution table: (owning record, relationship name).
type RelationTableKey = (RecordKey, String);

/// Outcome of resolving a relationship.
#[derive(Debug, Clone)]
pub enum ResolvedRelation {
    /// Single-kind relationship target
    One(Arc<Record>),
    /// Collection-kind relationship targets, in descriptor order
    Many(Vec<Arc<Record>>),
}

impl ResolvedRelation {
    /// The target records as a list (a single target becomes one element).
    pub fn records(&self) -> Vec<Arc<Record>> {
        match self {
            Self::One(record) => vec![Arc::clone(record)],
            Self::Many(records) => records.clone(),
        }
    }

    /// The single target, if this was a single-kind resolution.
    pub fn as_one(&self) -> Option<&Arc<Record>> {
        match self {
            Self::One(record) => Some(record),
            Self::Many(_) => None,
        }
    }
}

/// Resolves relationships and record refreshes with in-flight deduplication.
///
/// Cloning yields another handle onto the same resolution tables.
#[derive(Clone)]
pub struct RelationshipResolver {
    store: Arc<Store>,
    adapter: Arc<dyn Adapter>,
    normalizer: Normalizer,

    /// In-flight relationship resolutions
    relations: Arc<Mutex<HashMap<RelationTableKey, SharedFetch<ResolvedRelation>>>>,

    /// In-flight record refreshes, keyed by target identity only
    refreshes: Arc<Mutex<HashMap<RecordKey, SharedFetch<Arc<Record>>>>>,
}

impl RelationshipResolver {
    /// Create a resolver over a store, adapter and normalizer.
    pub fn new(store: Arc<Store>, adapter: Arc<dyn Adapter>, normalizer: Normalizer) -> Self {
        Self {
            store,
            adapter,
            normalizer,
            relations: Arc::new(Mutex::new(HashMap::new())),
            refreshes: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Resolve a named relationship on a record.
    ///
    /// Loaded relationships resolve immediately by re-peeking the store,
    /// so merges applied since the original load are reflected. Unloaded
    /// and errored relationships trigger a fetch; a concurrent resolve of
    /// the same pair joins the fetch already in flight.
    pub async fn resolve(
        &self,
        record: &Arc<Record>,
        key: &str,
    ) -> Result<ResolvedRelation, StoreError> {
        let rel = record.relationship(key).ok_or_else(|| {
            StoreError::unknown_relationship(record.ty().as_str(), record.id().as_str(), key)
        })?;

        // A single-kind relationship with no target has nothing to fetch
        if let RelationTargets::One(None) = rel.targets {
            return Err(StoreError::empty_relationship(record.ty().as_str(), key));
        }

        if rel.state == LoadState::Loaded {
            if let Some(resolved) = self.peek_resolved(&rel) {
                return Ok(resolved);
            }
            // Loaded claim is stale (a target is gone from the store after
            // a membership change); fall through to a fresh fetch.
            warn!(
                "Relationship '{}' on {} marked loaded but targets absent; refetching",
                key,
                record.key()
            );
        }

        let fetch = {
            let table_key = (record.key().clone(), key.to_string());
            let mut relations = self.relations.lock();
            match relations.get(&table_key) {
                Some(inflight) => inflight.clone(),
                None => {
                    record.set_relationship_state(key, LoadState::Loading);
                    debug!("Resolving '{}' on {}", key, record.key());
                    let fetch = self.spawn_relation_fetch(Arc::clone(record), key.to_string(), rel);
                    relations.insert(table_key, fetch.clone());
                    fetch
                }
            }
        };

        fetch.await
    }

    /// Refresh a record from the service, deduplicating by record identity.
    ///
    /// If a refresh of the same record is already in flight the existing
    /// operation is awaited instead of starting a second fetch.
    pub async fn refresh(&self, key: &RecordKey) -> Result<Arc<Record>, StoreError> {
        self.refresh_shared(key).await
    }

    /// Whether a refresh of the record is currently in flight.
    pub fn refresh_in_flight(&self, key: &RecordKey) -> bool {
        self.refreshes.lock().contains_key(key)
    }

    /// The shared future for a refresh, starting one if none is in flight.
    pub(crate) fn refresh_shared(&self, key: &RecordKey) -> SharedFetch<Arc<Record>> {
        let mut refreshes = self.refreshes.lock();
        if let Some(inflight) = refreshes.get(key) {
            debug!("Joining in-flight refresh of {}", key);
            return inflight.clone();
        }

        debug!("Refreshing {}", key);

        let store = Arc::clone(&self.store);
        let adapter = Arc::clone(&self.adapter);
        let normalizer = self.normalizer.clone();
        let table = Arc::clone(&self.refreshes);
        let target = key.clone();

        let handle = tokio::spawn(async move {
            let result =
                fetch_target(&store, adapter.as_ref(), &normalizer, &target.ty, &target.id).await;
            table.lock().remove(&target);
            result
        });

        let fetch = wrap_handle(handle);
        refreshes.insert(key.clone(), fetch.clone());
        fetch
    }

    /// Resolve a loaded relationship straight from the store.
    ///
    /// Returns None when any cached target id has no live record, which
    /// sends the caller down the fetch path.
    fn peek_resolved(&self, rel: &Relationship) -> Option<ResolvedRelation> {
        match &rel.targets {
            RelationTargets::One(Some(id)) => self
                .store
                .peek(&rel.target, id)
                .map(ResolvedRelation::One),
            RelationTargets::One(None) => None,
            RelationTargets::Many(ids) => ids
                .iter()
                .map(|id| self.store.peek(&rel.target, id))
                .collect::<Option<Vec<_>>>()
                .map(ResolvedRelation::Many),
        }
    }

    /// Spawn the fetch task for one relationship resolution.
    ///
    /// The task performs the fetch, records the final relationship state
    /// and drops the resolution-table entry before any awaiter observes
    /// completion; errors therefore never linger in the table.
    fn spawn_relation_fetch(
        &self,
        record: Arc<Record>,
        key: String,
        rel: Relationship,
    ) -> SharedFetch<ResolvedRelation> {
        let resolver = self.clone();
        let table = Arc::clone(&self.relations);

        let handle = tokio::spawn(async move {
            let result = resolver.fetch_relation(&rel).await;

            let final_state = match result {
                Ok(_) => LoadState::Loaded,
                Err(_) => LoadState::Errored,
            };
            record.set_relationship_state(&key, final_state);
            table.lock().remove(&(record.key().clone(), key));

            result
        });

        wrap_handle(handle)
    }

    /// Fetch every target of a relationship.
    ///
    /// Each target goes through the refresh table, so a relation fetch
    /// joins any refresh of the same record already in flight (and vice
    /// versa) instead of issuing a second adapter call.
    async fn fetch_relation(&self, rel: &Relationship) -> Result<ResolvedRelation, StoreError> {
        match &rel.targets {
            RelationTargets::One(Some(id)) => {
                let key = RecordKey::new(rel.target.clone(), id.clone());
                let record = self.refresh_shared(&key).await?;
                Ok(ResolvedRelation::One(record))
            }
            // Filtered out before the fetch is spawned
            RelationTargets::One(None) => {
                Err(StoreError::empty_relationship(rel.target.as_str(), ""))
            }
            RelationTargets::Many(ids) => {
                let mut records = Vec::with_capacity(ids.len());
                for id in ids {
                    let key = RecordKey::new(rel.target.clone(), id.clone());
                    records.push(self.refresh_shared(&key).await?);
                }
                Ok(ResolvedRelation::Many(records))
            }
        }
    }
}

/// Convert a join handle into a shared, cloneable fetch future.
fn wrap_handle<T>(handle: tokio::task::JoinHandle<Result<T, StoreError>>) -> SharedFetch<T>
where
    T: Clone + Send + 'static,
{
    async move {
        match handle.await {
            Ok(result) => result,
            Err(e) => Err(StoreError::task(e.to_string())),
        }
    }
    .boxed()
    .shared()
}

/// Fetch one record, normalize it and push the result into the store.
///
/// The fetched payload must actually contain the requested id; a payload
/// for some other record is a missing-target condition.
async fn fetch_target(
    store: &Store,
    adapter: &dyn Adapter,
    normalizer: &Normalizer,
    ty: &EntityType,
    id: &RecordId,
) -> Result<Arc<Record>, StoreError> {
    let payload = adapter.fetch_record(ty, id).await?;
    let descriptors = normalizer.normalize(&payload, ty)?;
    store.push_all(descriptors);

    store
        .peek(ty, id)
        .ok_or_else(|| StoreError::missing_target(ty.as_str(), id.as_str()))
}
