//! Shared test support: a fixture-backed adapter with call counting.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;

use castview_api::{Adapter, AdapterError, EntityType, QueryParams, RawPayload, RecordId};

/// Adapter serving canned JSON fixtures, counting every fetch.
#[derive(Default)]
pub struct MockAdapter {
    records: Mutex<HashMap<(String, String), Value>>,
    queries: Mutex<HashMap<String, Vec<Value>>>,
    failures: Mutex<HashSet<(String, String)>>,
    fetch_counts: Mutex<HashMap<(String, String), usize>>,
    query_count: AtomicUsize,
}

impl MockAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a single-record fixture.
    pub fn insert(&self, ty: &str, id: &str, body: Value) {
        self.records
            .lock()
            .insert((ty.to_string(), id.to_string()), body);
    }

    /// Register the rows returned for a collection query.
    pub fn insert_query(&self, ty: &str, rows: Vec<Value>) {
        self.queries.lock().insert(ty.to_string(), rows);
    }

    /// Make fetches of one record fail with HTTP 500 until cleared.
    pub fn fail(&self, ty: &str, id: &str) {
        self.failures
            .lock()
            .insert((ty.to_string(), id.to_string()));
    }

    /// Stop failing fetches of one record.
    pub fn clear_failure(&self, ty: &str, id: &str) {
        self.failures
            .lock()
            .remove(&(ty.to_string(), id.to_string()));
    }

    /// Number of single-record fetches issued for one record.
    pub fn fetch_count_for(&self, ty: &str, id: &str) -> usize {
        self.fetch_counts
            .lock()
            .get(&(ty.to_string(), id.to_string()))
            .copied()
            .unwrap_or(0)
    }

    /// Total number of single-record fetches issued.
    pub fn total_fetches(&self) -> usize {
        self.fetch_counts.lock().values().sum()
    }

    /// Number of collection queries issued.
    pub fn query_count(&self) -> usize {
        self.query_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Adapter for MockAdapter {
    async fn fetch_record(
        &self,
        ty: &EntityType,
        id: &RecordId,
    ) -> Result<RawPayload, AdapterError> {
        let lookup = (ty.as_str().to_string(), id.as_str().to_string());

        *self.fetch_counts.lock().entry(lookup.clone()).or_insert(0) += 1;

        if self.failures.lock().contains(&lookup) {
            return Err(AdapterError::http(500, "injected failure"));
        }

        self.records
            .lock()
            .get(&lookup)
            .cloned()
            .map(RawPayload::new)
            .ok_or_else(|| AdapterError::http(404, format!("no fixture for {}:{}", ty, id)))
    }

    async fn query_records(
        &self,
        ty: &EntityType,
        params: &QueryParams,
    ) -> Result<Vec<RawPayload>, AdapterError> {
        self.query_count.fetch_add(1, Ordering::SeqCst);

        let rows = self
            .queries
            .lock()
            .get(ty.as_str())
            .cloned()
            .ok_or_else(|| AdapterError::http(404, format!("no query fixture for {}", ty)))?;

        // Apply the pagination window the way the service would
        Ok(rows
            .into_iter()
            .skip(params.offset)
            .take(params.limit)
            .map(RawPayload::new)
            .collect())
    }
}
