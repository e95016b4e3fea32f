//! Castview API - Catalog service adapter layer
//!
//! This crate provides the transport seam between the record store and the
//! remote catalog service:
//! - Shared identity types ([`EntityType`], [`RecordId`], [`RecordKey`])
//! - The [`Adapter`] trait: the async contract the store resolves through
//! - [`RawPayload`]: the untyped document an adapter hands back
//! - [`HttpAdapter`]: reqwest-based implementation against the REST API
//!
//! The store never talks to the network directly; everything flows through
//! an `Arc<dyn Adapter>` passed in at construction time.
//!
//! ## Example
//!
//! ```ignore
//! use castview_api::{Adapter, EntityType, HttpAdapter, QueryParams, RecordId};
//! use castview_config::ApiConfig;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let adapter = HttpAdapter::from_config(&ApiConfig::default())?;
//!
//!     let stream = adapter
//!         .fetch_record(&EntityType::new("stream"), &RecordId::new("42"))
//!         .await?;
//!
//!     let page = adapter
//!         .query_records(&EntityType::new("streamHosted"), &QueryParams::new(0, 25))
//!         .await?;
//!
//!     Ok(())
//! }
//! ```

mod adapter;
mod error;
mod http;
mod payload;
mod types;

pub use adapter::Adapter;
pub use error::AdapterError;
pub use http::HttpAdapter;
pub use payload::RawPayload;
pub use types::{EntityType, QueryParams, RecordId, RecordKey};

/// Result type for adapter operations.
pub type Result<T> = std::result::Result<T, AdapterError>;
