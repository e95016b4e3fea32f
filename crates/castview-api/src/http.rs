//! HTTP adapter against the catalog REST API.
//!
//! # Endpoint Format
//!
//! - Single record: `GET {base_url}/{path}/{id}`
//! - Collection:    `GET {base_url}/{path}?offset=&limit=`
//!
//! The per-type path defaults to the type name and can be overridden for
//! endpoints that don't follow the convention (e.g. the hosted-streams
//! listing living under a nested route).

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, trace};

use castview_config::ApiConfig;

use crate::adapter::Adapter;
use crate::error::AdapterError;
use crate::payload::RawPayload;
use crate::types::{EntityType, QueryParams, RecordId};

/// Header carrying the client identifier the service requires.
const CLIENT_ID_HEADER: &str = "Client-ID";

/// HTTP adapter backed by a shared reqwest client.
pub struct HttpAdapter {
    /// Shared HTTP client (connection pooling, timeout)
    client: Client,

    /// Base URL of the catalog service, without trailing slash
    base_url: String,

    /// Client identifier sent with every request
    client_id: Option<String>,

    /// Per-type endpoint path overrides
    paths: HashMap<EntityType, String>,
}

impl HttpAdapter {
    /// Create an adapter for a base URL with the default timeout.
    pub fn new(base_url: impl Into<String>) -> Result<Self, AdapterError> {
        Self::with_timeout(base_url, castview_config::DEFAULT_TIMEOUT_SECS)
    }

    /// Create an adapter with an explicit request timeout.
    pub fn with_timeout(
        base_url: impl Into<String>,
        timeout_secs: u64,
    ) -> Result<Self, AdapterError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| AdapterError::connection(e.to_string()))?;

        let base_url = base_url.into().trim_end_matches('/').to_string();

        Ok(Self {
            client,
            base_url,
            client_id: None,
            paths: HashMap::new(),
        })
    }

    /// Create an adapter from an API configuration section.
    pub fn from_config(config: &ApiConfig) -> Result<Self, AdapterError> {
        let mut adapter = Self::with_timeout(&config.base_url, config.timeout_secs)?;
        adapter.client_id = config.client_id.clone();
        Ok(adapter)
    }

    /// Set the client identifier header value.
    pub fn with_client_id(mut self, client_id: impl Into<String>) -> Self {
        self.client_id = Some(client_id.into());
        self
    }

    /// Override the endpoint path for an entity type.
    pub fn with_path(mut self, ty: impl Into<EntityType>, path: impl Into<String>) -> Self {
        self.paths
            .insert(ty.into(), path.into().trim_matches('/').to_string());
        self
    }

    /// The base URL this adapter talks to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Endpoint path for an entity type.
    ///
    /// Falls back to the type name, borrowed from the caller's type.
    fn path_for<'a>(&'a self, ty: &'a EntityType) -> &'a str {
        self.paths.get(ty).map_or(ty.as_str(), String::as_str)
    }

    /// URL for a single-record fetch.
    fn record_url(&self, ty: &EntityType, id: &RecordId) -> String {
        format!("{}/{}/{}", self.base_url, self.path_for(ty), id)
    }

    /// URL for a collection query (pagination goes in the query string).
    fn collection_url(&self, ty: &EntityType) -> String {
        format!("{}/{}", self.base_url, self.path_for(ty))
    }

    /// Perform a GET request and decode the JSON body.
    async fn get_json(&self, url: &str, params: Option<&QueryParams>) -> Result<Value, AdapterError> {
        trace!("GET {}", url);

        let mut request = self.client.get(url);

        if let Some(ref client_id) = self.client_id {
            request = request.header(CLIENT_ID_HEADER, client_id);
        }

        if let Some(params) = params {
            request = request.query(&[("offset", params.offset), ("limit", params.limit)]);
        }

        let response = request.send().await.map_err(classify_reqwest_error)?;
        let status = response.status();

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(AdapterError::http(status.as_u16(), message));
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| AdapterError::decode(e.to_string()))
    }
}

/// Map a reqwest error onto the adapter taxonomy.
fn classify_reqwest_error(e: reqwest::Error) -> AdapterError {
    if e.is_decode() {
        AdapterError::decode(e.to_string())
    } else {
        AdapterError::connection(e.to_string())
    }
}

/// Extract collection rows from a query response body.
///
/// The service returns either a bare array or an object with the rows under
/// a single array field (e.g. `{ "_total": 120, "hosts": [ ... ] }`).
fn extract_rows(body: Value) -> Result<Vec<Value>, AdapterError> {
    match body {
        Value::Array(rows) => Ok(rows),
        Value::Object(map) => {
            let mut arrays = map.into_iter().filter_map(|(_, v)| match v {
                Value::Array(rows) => Some(rows),
                _ => None,
            });
            arrays
                .next()
                .ok_or_else(|| AdapterError::decode("query response contains no row array"))
        }
        other => Err(AdapterError::decode(format!(
            "unexpected query response shape: {}",
            value_kind(&other)
        ))),
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[async_trait]
impl Adapter for HttpAdapter {
    async fn fetch_record(
        &self,
        ty: &EntityType,
        id: &RecordId,
    ) -> Result<RawPayload, AdapterError> {
        let url = self.record_url(ty, id);
        debug!("Fetching {}:{}", ty, id);

        let body = self.get_json(&url, None).await?;
        Ok(RawPayload::new(body))
    }

    async fn query_records(
        &self,
        ty: &EntityType,
        params: &QueryParams,
    ) -> Result<Vec<RawPayload>, AdapterError> {
        let url = self.collection_url(ty);
        debug!(
            "Querying {} (offset={}, limit={})",
            ty, params.offset, params.limit
        );

        let body = self.get_json(&url, Some(params)).await?;
        let rows = extract_rows(body)?;

        Ok(rows.into_iter().map(RawPayload::new).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_record_url() {
        let adapter = HttpAdapter::new("http://localhost:8000/api/").unwrap();
        let url = adapter.record_url(&EntityType::new("stream"), &RecordId::new("42"));
        assert_eq!(url, "http://localhost:8000/api/stream/42");
    }

    #[test]
    fn test_path_override() {
        let adapter = HttpAdapter::new("http://localhost:8000/api")
            .unwrap()
            .with_path("streamHosted", "users/followed/hosting");

        let url = adapter.collection_url(&EntityType::new("streamHosted"));
        assert_eq!(url, "http://localhost:8000/api/users/followed/hosting");

        // Unmapped types fall back to the type name
        let url = adapter.collection_url(&EntityType::new("channel"));
        assert_eq!(url, "http://localhost:8000/api/channel");
    }

    #[test]
    fn test_from_config_carries_client_id() {
        let config = ApiConfig {
            base_url: "http://localhost:8000/api".to_string(),
            client_id: Some("abc123".to_string()),
            timeout_secs: 5,
        };

        let adapter = HttpAdapter::from_config(&config).unwrap();
        assert_eq!(adapter.base_url(), "http://localhost:8000/api");
        assert_eq!(adapter.client_id, Some("abc123".to_string()));
    }

    #[test]
    fn test_extract_rows_bare_array() {
        let rows = extract_rows(json!([{ "id": 1 }, { "id": 2 }])).unwrap();
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn test_extract_rows_enveloped() {
        let rows = extract_rows(json!({ "_total": 120, "hosts": [{ "id": 1 }] })).unwrap();
        assert_eq!(rows, vec![json!({ "id": 1 })]);
    }

    #[test]
    fn test_extract_rows_rejects_scalars() {
        assert!(extract_rows(json!(42)).is_err());
        assert!(extract_rows(json!({ "_total": 0 })).is_err());
    }
}
