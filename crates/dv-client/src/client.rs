//! Core HTTP client with bounded timeouts and request tracing.

use std::time::Instant;

use tracing::{debug, info, instrument};

use crate::config::ClientConfig;
use crate::error::{Error, ErrorKind, Result};
use crate::request::{RequestBody, RequestBuilder, RequestMethod};
use crate::response::Response;

/// HTTP client for the Dataverse Web API.
///
/// Requests are sent exactly once; failures go straight back to the caller.
#[derive(Debug, Clone)]
pub struct DvHttpClient {
    inner: reqwest::Client,
    config: ClientConfig,
}

impl DvHttpClient {
    /// Create a new HTTP client with the given configuration.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let builder = reqwest::Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .pool_idle_timeout(config.pool_idle_timeout)
            .pool_max_idle_per_host(config.pool_max_idle_per_host)
            .user_agent(&config.user_agent)
            .gzip(config.accept_compressed)
            .deflate(config.accept_compressed);

        let inner = builder
            .build()
            .map_err(|e| Error::with_source(ErrorKind::Config(e.to_string()), e))?;

        Ok(Self { inner, config })
    }

    /// Create a new HTTP client with default configuration.
    pub fn default_client() -> Result<Self> {
        Self::new(ClientConfig::default())
    }

    /// Get the client configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Create a GET request builder.
    pub fn get(&self, url: impl Into<String>) -> RequestBuilder {
        RequestBuilder::new(RequestMethod::Get, url)
    }

    /// Create a POST request builder.
    pub fn post(&self, url: impl Into<String>) -> RequestBuilder {
        RequestBuilder::new(RequestMethod::Post, url)
    }

    /// Create a PATCH request builder.
    pub fn patch(&self, url: impl Into<String>) -> RequestBuilder {
        RequestBuilder::new(RequestMethod::Patch, url)
    }

    /// Create a DELETE request builder.
    pub fn delete(&self, url: impl Into<String>) -> RequestBuilder {
        RequestBuilder::new(RequestMethod::Delete, url)
    }

    /// Send a request and return the raw response, whatever its status.
    ///
    /// Status interpretation is left to the caller, see
    /// [`ResponseExt::expect_status`](crate::ResponseExt::expect_status).
    #[instrument(skip_all, fields(method = ?request.method, url = %request.url))]
    pub async fn execute(&self, request: RequestBuilder) -> Result<Response> {
        let RequestBuilder {
            method,
            url,
            headers,
            query_params,
            body,
        } = request;

        let mut outgoing = headers
            .iter()
            .fold(self.inner.request(method.to_reqwest(), &url), |req, (name, value)| {
                req.header(name, value)
            });
        if !query_params.is_empty() {
            outgoing = outgoing.query(&query_params);
        }
        outgoing = match body {
            Some(RequestBody::Json(value)) => outgoing.json(&value),
            Some(RequestBody::Form(pairs)) => outgoing.form(&pairs),
            None => outgoing,
        };

        let started = Instant::now();
        let response = outgoing.send().await?;

        if self.config.enable_tracing {
            let status = response.status().as_u16();
            let elapsed_ms = started.elapsed().as_millis() as u64;
            if response.status().is_success() {
                debug!(status, elapsed_ms, "Dataverse responded");
            } else {
                let request_id = response
                    .headers()
                    .get("x-ms-service-request-id")
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or("-");
                info!(status, elapsed_ms, request_id, "Dataverse responded with an error status");
            }
        }

        Ok(Response::new(response))
    }
}
