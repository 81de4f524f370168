//! Record operations against the Dataverse Web API.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::Deserialize;
use tracing::{debug, info, instrument, warn};

use conductor_dv_auth::{ConnectionConfig, TokenManager};
use conductor_dv_client::security::odata;
use conductor_dv_client::{
    entity_id_from_url, ClientConfig, DvHttpClient, Record, RequestBuilder, Response, ResponseExt,
};

use crate::error::{Error, ErrorKind, Result};
use crate::query::QueryOptions;

/// Outcome of [`DataverseClient::create`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreatedRecord {
    /// The id parsed from the `OData-EntityId` header.
    Id(String),
    /// The record was created but the response carried no usable id.
    IdNotReturned,
}

impl CreatedRecord {
    /// The new record's id, if the server returned one.
    pub fn id(&self) -> Option<&str> {
        match self {
            CreatedRecord::Id(id) => Some(id),
            CreatedRecord::IdNotReturned => None,
        }
    }
}

impl fmt::Display for CreatedRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CreatedRecord::Id(id) => f.write_str(id),
            CreatedRecord::IdNotReturned => f.write_str("Record created, ID not returned"),
        }
    }
}

#[derive(Deserialize)]
struct EntityCollection {
    #[serde(default)]
    value: Vec<Record>,
}

/// Dataverse Web API client for query, create, update and delete.
///
/// Every call asks the [`TokenManager`] for fresh headers first, so an
/// expiring OAuth token is renewed inline. The client is cheap to clone;
/// clones share the token manager and connection pool.
///
/// # Example
///
/// ```rust,ignore
/// use conductor_dv_records::{DataverseClient, QueryOptions};
///
/// let client = DataverseClient::from_env()?;
/// client.connect().await?;
///
/// let machines = client
///     .query("ac_machines", &QueryOptions::new().with_top(10))
///     .await?;
/// ```
#[derive(Debug, Clone)]
pub struct DataverseClient {
    tokens: Arc<TokenManager>,
    http: DvHttpClient,
    connected: Arc<AtomicBool>,
}

impl DataverseClient {
    /// Create a client with a default HTTP configuration.
    pub fn new(config: ConnectionConfig) -> Result<Self> {
        let http = DvHttpClient::default_client()?;
        Ok(Self::with_http_client(config, http))
    }

    /// Create a client from `DATAVERSE_*` environment variables.
    ///
    /// `DATAVERSE_TIMEOUT_SECS` overrides the request timeout.
    pub fn from_env() -> Result<Self> {
        let config = ConnectionConfig::from_env()?;
        let http = DvHttpClient::new(ClientConfig::from_env())?;
        Ok(Self::with_http_client(config, http))
    }

    /// Create a client that sends both token and record requests through `http`.
    pub fn with_http_client(config: ConnectionConfig, http: DvHttpClient) -> Self {
        let tokens = TokenManager::with_http_client(config, http.clone());
        Self::with_token_manager(Arc::new(tokens), http)
    }

    /// Create a client around an existing token manager.
    pub fn with_token_manager(tokens: Arc<TokenManager>, http: DvHttpClient) -> Self {
        Self {
            tokens,
            http,
            connected: Arc::new(AtomicBool::new(false)),
        }
    }

    /// The connection configuration.
    pub fn config(&self) -> &ConnectionConfig {
        self.tokens.config()
    }

    /// The token manager shared by this client and its clones.
    pub fn token_manager(&self) -> &Arc<TokenManager> {
        &self.tokens
    }

    /// Authenticate against the environment.
    ///
    /// In OAuth mode this performs the token exchange; in API-key mode it
    /// succeeds without a network call.
    pub async fn connect(&self) -> Result<()> {
        self.tokens.connect().await?;
        self.connected.store(true, Ordering::Release);
        Ok(())
    }

    /// Returns true once [`connect`](Self::connect) has succeeded.
    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Acquire)
    }

    /// Query an entity set.
    ///
    /// Returns the `value` array of the response, or an empty list if the
    /// response has none.
    #[instrument(skip(self, options), fields(top = options.top))]
    pub async fn query(&self, entity: &str, options: &QueryOptions) -> Result<Vec<Record>> {
        let url = self.entity_url(entity)?;
        let params = options.to_query_params()?;
        let headers = self.tokens.headers().await?;

        let mut request = self.http.get(url).headers(&headers);
        for (name, value) in params {
            request = request.query(name, value);
        }

        let response = self.send(request, 200).await?;
        let collection: EntityCollection = response.json().await?;

        debug!(count = collection.value.len(), "Query returned records");
        Ok(collection.value)
    }

    /// Create a record and return its id.
    #[instrument(skip(self, record))]
    pub async fn create(&self, entity: &str, record: &Record) -> Result<CreatedRecord> {
        let url = self.entity_url(entity)?;
        let headers = self.tokens.headers().await?;

        let request = self.http.post(url).headers(&headers).json(record)?;
        let response = self.send(request, 204).await?;

        let created = response
            .odata_entity_id()
            .and_then(entity_id_from_url)
            .map(|id| CreatedRecord::Id(id.to_string()))
            .unwrap_or(CreatedRecord::IdNotReturned);

        info!(id = %created, "Record created");
        Ok(created)
    }

    /// Update the given columns of a record.
    #[instrument(skip(self, record))]
    pub async fn update(&self, entity: &str, id: &str, record: &Record) -> Result<bool> {
        let url = self.record_url(entity, id)?;
        let headers = self.tokens.headers().await?;

        let request = self.http.patch(url).headers(&headers).json(record)?;
        self.send(request, 204).await?;

        info!("Record updated");
        Ok(true)
    }

    /// Delete a record.
    #[instrument(skip(self))]
    pub async fn delete(&self, entity: &str, id: &str) -> Result<bool> {
        let url = self.record_url(entity, id)?;
        let headers = self.tokens.headers().await?;

        self.send(self.http.delete(url).headers(&headers), 204).await?;

        info!("Record deleted");
        Ok(true)
    }

    async fn send(&self, request: RequestBuilder, expected: u16) -> Result<Response> {
        let response = self.http.execute(request).await?;
        match response.expect_status(expected).await {
            Ok(response) => Ok(response),
            Err(e) => {
                warn!(status = e.status(), expected, "Dataverse request rejected");
                Err(e.into())
            }
        }
    }

    fn entity_url(&self, entity: &str) -> Result<String> {
        if !odata::is_safe_identifier(entity) {
            return Err(Error::new(ErrorKind::InvalidInput(format!(
                "invalid entity set name: {:?}",
                entity
            ))));
        }
        Ok(format!("{}/{}", self.config().web_api_url(), entity))
    }

    fn record_url(&self, entity: &str, id: &str) -> Result<String> {
        if id.trim().is_empty() {
            return Err(Error::new(ErrorKind::InvalidInput(
                "record id must not be empty".to_string(),
            )));
        }
        Ok(format!("{}({})", self.entity_url(entity)?, odata::encode_key(id)))
    }
}
