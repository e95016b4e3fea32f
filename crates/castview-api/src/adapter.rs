//! Adapter trait definition.
//!
//! Defines the async transport contract the record store fetches through.

use async_trait::async_trait;

use crate::error::AdapterError;
use crate::payload::RawPayload;
use crate::types::{EntityType, QueryParams, RecordId};

/// Transport for catalog fetches.
///
/// This trait is the seam between the data layer and the network. The store
/// hands every fetch to an adapter and treats the returned document as
/// opaque until normalization. Implementations must be safe to share behind
/// an `Arc` across concurrent resolutions.
#[async_trait]
pub trait Adapter: Send + Sync {
    /// Fetch a single record by type and id.
    ///
    /// # Arguments
    /// * `ty` - Entity type (e.g. "stream")
    /// * `id` - Record id
    ///
    /// # Returns
    /// The raw payload for the record, possibly with embedded sub-entities.
    async fn fetch_record(&self, ty: &EntityType, id: &RecordId)
        -> Result<RawPayload, AdapterError>;

    /// Query a page of records of one type.
    ///
    /// # Arguments
    /// * `ty` - Entity type
    /// * `params` - Pagination window
    ///
    /// # Returns
    /// One raw payload per row, in service order.
    async fn query_records(
        &self,
        ty: &EntityType,
        params: &QueryParams,
    ) -> Result<Vec<RawPayload>, AdapterError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    // Test that the trait is object-safe
    fn _assert_object_safe(_: &dyn Adapter) {}
}
