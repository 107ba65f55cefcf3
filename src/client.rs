//! SpaceX GraphQL API client.
//!
//! Every operation follows the same path: render the named template from the
//! [`QueryStore`], wrap it in a `{"query": ...}` envelope and POST it to the
//! configured endpoint. Responses come back as raw bytes.

use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::logging::query_span;
use crate::store::{MISSION_BY_ID, MISSIONS_BY_MANUFACTURER, PAST_LAUNCHES, QueryStore, ROCKETS};
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use serde::Serialize;
use std::time::Instant;
use tracing::Instrument;

const CONTENT_TYPE_JSON: &str = "application/json";

/// Operations exposed by the SpaceX API.
///
/// Implemented by [`SpaceXClient`]; tests and callers can provide their own
/// implementation to avoid the network.
#[async_trait]
pub trait SpaceXApi: Send + Sync {
    /// Fetch a single mission by its id.
    async fn mission_by_id(&self, mission_id: &str) -> Result<Vec<u8>, ClientError>;

    /// Fetch up to `limit` missions flown for `manufacturer`.
    async fn missions_by_manufacturer(
        &self,
        manufacturer: &str,
        limit: u32,
    ) -> Result<Vec<u8>, ClientError>;

    /// Fetch the last `limit` launches.
    async fn past_launches(&self, limit: u32) -> Result<Vec<u8>, ClientError>;

    /// Fetch up to `limit` rockets.
    async fn rockets(&self, limit: u32) -> Result<Vec<u8>, ClientError>;
}

#[derive(Serialize)]
struct MissionParams<'a> {
    mission_id: &'a str,
}

#[derive(Serialize)]
struct ManufacturerParams<'a> {
    manufacturer: &'a str,
    limit: u32,
}

#[derive(Serialize)]
struct LimitParams {
    limit: u32,
}

/// GraphQL-over-HTTP request body.
#[derive(Serialize)]
struct GraphQlEnvelope<'a> {
    query: &'a str,
}

/// [`SpaceXApi`] over HTTP.
///
/// Safe to share between tasks: the store is immutable after construction
/// and `reqwest::Client` pools connections internally.
#[derive(Debug)]
pub struct SpaceXClient {
    store: QueryStore,
    http: reqwest::Client,
    endpoint: String,
}

impl SpaceXClient {
    /// Client for the public endpoint with the bundled queries.
    pub fn new() -> Result<Self, ClientError> {
        Self::with_config(ClientConfig::default())
    }

    /// Client with the bundled queries and the given transport settings.
    pub fn with_config(config: ClientConfig) -> Result<Self, ClientError> {
        let store = QueryStore::build()?;
        Self::from_parts(store, &config)
    }

    /// Build a client around an already loaded store, e.g. one from
    /// [`QueryStore::from_dir`].
    pub fn from_parts(store: QueryStore, config: &ClientConfig) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .pool_max_idle_per_host(config.pool_max_idle_per_host)
            .timeout(config.timeout)
            .build()
            .map_err(ClientError::HttpClient)?;

        tracing::debug!(
            endpoint = %config.endpoint,
            timeout_ms = config.timeout.as_millis() as u64,
            pool_max_idle_per_host = config.pool_max_idle_per_host,
            query_count = store.len(),
            "SpaceX client ready"
        );

        Ok(Self {
            store,
            http,
            endpoint: config.endpoint.clone(),
        })
    }

    pub fn store(&self) -> &QueryStore {
        &self.store
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Run any stored query with the given parameters.
    pub async fn query<P: Serialize + ?Sized>(
        &self,
        name: &str,
        params: &P,
    ) -> Result<Vec<u8>, ClientError> {
        let span = query_span(name);
        async {
            let context = tera::Context::from_serialize(params).map_err(|source| {
                ClientError::TemplateRender {
                    name: name.to_string(),
                    source,
                }
            })?;
            let query = self.store.render(name, &context)?;
            tracing::debug!(query_bytes = query.len(), "rendered query");

            self.post(&query).await
        }
        .instrument(span)
        .await
        .inspect_err(|error| {
            let cause = std::error::Error::source(error).map(ToString::to_string);
            tracing::warn!(
                query = name,
                category = error.category(),
                error = %error,
                cause = cause.as_deref(),
                "query failed"
            );
        })
    }

    async fn post(&self, query: &str) -> Result<Vec<u8>, ClientError> {
        let body = serde_json::to_vec(&GraphQlEnvelope { query })
            .map_err(ClientError::Serialization)?;

        let start = Instant::now();
        let response = self
            .http
            .post(&self.endpoint)
            .header(CONTENT_TYPE, CONTENT_TYPE_JSON)
            .body(body)
            .send()
            .await
            .map_err(|source| ClientError::Transport {
                url: self.endpoint.clone(),
                source,
            })?;

        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(ClientError::ResponseRead)?;

        if status.is_success() {
            tracing::info!(
                status = status.as_u16(),
                response_bytes = bytes.len(),
                duration_ms = start.elapsed().as_millis() as u64,
                "query completed"
            );
        } else {
            tracing::warn!(
                status = status.as_u16(),
                response_bytes = bytes.len(),
                duration_ms = start.elapsed().as_millis() as u64,
                "query returned non-success status"
            );
        }

        Ok(bytes.to_vec())
    }
}

#[async_trait]
impl SpaceXApi for SpaceXClient {
    async fn mission_by_id(&self, mission_id: &str) -> Result<Vec<u8>, ClientError> {
        self.query(MISSION_BY_ID, &MissionParams { mission_id })
            .await
    }

    async fn missions_by_manufacturer(
        &self,
        manufacturer: &str,
        limit: u32,
    ) -> Result<Vec<u8>, ClientError> {
        self.query(
            MISSIONS_BY_MANUFACTURER,
            &ManufacturerParams {
                manufacturer,
                limit,
            },
        )
        .await
    }

    async fn past_launches(&self, limit: u32) -> Result<Vec<u8>, ClientError> {
        self.query(PAST_LAUNCHES, &LimitParams { limit }).await
    }

    async fn rockets(&self, limit: u32) -> Result<Vec<u8>, ClientError> {
        self.query(ROCKETS, &LimitParams { limit }).await
    }
}
