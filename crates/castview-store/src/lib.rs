//! Castview Store - Normalized client-side record cache
//!
//! This crate is the data layer of the catalog client:
//! - [`Store`]: identity-mapped cache, one live [`Record`] per (type, id)
//! - [`Normalizer`]: raw payload → discrete record descriptors, with
//!   embedded sub-entities hoisted into records of their own
//! - [`RelationshipResolver`]: lazy cross-entity relation loading with
//!   in-flight deduplication
//! - [`PreloadCoordinator`]: batched, deduplicated relation loading for
//!   list views, joined by a wait-all barrier
//! - [`Catalog`]: the facade bundling all of the above behind the
//!   operations routes actually perform
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use castview_api::{EntityType, HttpAdapter, QueryParams};
//! use castview_store::Catalog;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let adapter = Arc::new(HttpAdapter::new("https://api.castview.tv/v5")?);
//!     let catalog = Catalog::with_catalog_schemas(adapter);
//!
//!     // A hosted-streams page, with every row's target stream preloaded
//!     let hosted = EntityType::new("streamHosted");
//!     let rows = catalog.query(&hosted, &QueryParams::new(0, 25)).await?;
//!     catalog.preload(&rows, "target").await?;
//!
//!     Ok(())
//! }
//! ```

mod catalog;
mod error;
mod filters;
mod normalize;
mod preload;
mod record;
mod resolver;
mod schema;
mod store;

pub use catalog::Catalog;
pub use error::{NormalizeError, StoreError};
pub use filters::{filter_label, SearchFilter, DEFAULT_FILTER_LABEL, SEARCH_FILTERS};
pub use normalize::Normalizer;
pub use preload::PreloadCoordinator;
pub use record::{
    LoadState, Record, RecordDescriptor, RelationKind, RelationTargets, Relationship,
    RelationshipDescriptor,
};
pub use resolver::{RelationshipResolver, ResolvedRelation};
pub use schema::{EntitySchema, RelationshipSpec, SchemaRegistry};
pub use store::Store;

// Identity types live in the adapter crate; re-export for convenience.
pub use castview_api::{EntityType, RecordId, RecordKey};

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
