//! Identity-mapped record store.
//!
//! Holds at most one live [`Record`] per (type, id). Pushing a descriptor
//! for a known key merges into the existing instance and returns that same
//! instance, so references held by consumers stay current across refreshes.
//!
//! All operations are synchronous and never touch the network; records
//! live for the store's session (no eviction).

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::trace;

use castview_api::{EntityType, RecordId, RecordKey};

use crate::record::{Record, RecordDescriptor};

/// In-memory identity map of catalog records.
#[derive(Debug, Default)]
pub struct Store {
    records: RwLock<HashMap<RecordKey, Arc<Record>>>,
}

impl Store {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Push a normalized descriptor into the store.
    ///
    /// Creates the record on first push for its key; merges in place on
    /// every later push. Always returns the one live instance for the key.
    /// Idempotent: re-pushing an identical descriptor only overwrites
    /// attributes with equal values.
    pub fn push(&self, descriptor: RecordDescriptor) -> Arc<Record> {
        let record = {
            let mut records = self.records.write();
            match records.get(&descriptor.key) {
                Some(existing) => Arc::clone(existing),
                None => {
                    trace!("Creating record {}", descriptor.key);
                    let record = Arc::new(Record::new(descriptor.key.clone()));
                    records.insert(descriptor.key.clone(), Arc::clone(&record));
                    record
                }
            }
        };

        // Merge is one atomic step under the record's own lock
        record.merge(descriptor);
        record
    }

    /// Push a batch of descriptors, returning the records in order.
    pub fn push_all(&self, descriptors: Vec<RecordDescriptor>) -> Vec<Arc<Record>> {
        descriptors.into_iter().map(|d| self.push(d)).collect()
    }

    /// Look up a record without triggering any fetch.
    pub fn peek(&self, ty: &EntityType, id: &RecordId) -> Option<Arc<Record>> {
        let key = RecordKey::new(ty.clone(), id.clone());
        self.records.read().get(&key).cloned()
    }

    /// Look up a record by key without triggering any fetch.
    pub fn peek_key(&self, key: &RecordKey) -> Option<Arc<Record>> {
        self.records.read().get(key).cloned()
    }

    /// Whether a record exists for (type, id).
    pub fn has_record_for_id(&self, ty: &EntityType, id: &RecordId) -> bool {
        let key = RecordKey::new(ty.clone(), id.clone());
        self.records.read().contains_key(&key)
    }

    /// All records of one type, in unspecified order.
    pub fn peek_all(&self, ty: &EntityType) -> Vec<Arc<Record>> {
        self.records
            .read()
            .iter()
            .filter(|(key, _)| &key.ty == ty)
            .map(|(_, record)| Arc::clone(record))
            .collect()
    }

    /// Total number of live records.
    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    /// Whether the store holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }
}
