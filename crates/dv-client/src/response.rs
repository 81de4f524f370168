//! HTTP response handling with OData-specific extensions.

use serde::de::DeserializeOwned;

use crate::error::{Error, ErrorKind, Result};

/// Wrapper around an HTTP response with additional functionality.
#[derive(Debug)]
pub struct Response {
    inner: reqwest::Response,
}

impl Response {
    pub(crate) fn new(inner: reqwest::Response) -> Self {
        Self { inner }
    }

    /// Get the HTTP status code.
    pub fn status(&self) -> u16 {
        self.inner.status().as_u16()
    }

    /// Returns true if the response status is successful (2xx).
    pub fn is_success(&self) -> bool {
        self.inner.status().is_success()
    }

    /// Get a header value.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.inner.headers().get(name)?.to_str().ok()
    }

    /// Get the `OData-EntityId` header, the URL of a newly created record.
    pub fn odata_entity_id(&self) -> Option<&str> {
        self.header("odata-entityid")
    }

    /// Get the Content-Type header.
    pub fn content_type(&self) -> Option<&str> {
        self.header("content-type")
    }

    /// Get the response body as text.
    pub async fn text(self) -> Result<String> {
        self.inner.text().await.map_err(Into::into)
    }

    /// Deserialize the response body as JSON.
    pub async fn json<T: DeserializeOwned>(self) -> Result<T> {
        let bytes = self.inner.bytes().await?;
        serde_json::from_slice(&bytes).map_err(Into::into)
    }

    /// Get access to the inner reqwest::Response.
    pub fn into_inner(self) -> reqwest::Response {
        self.inner
    }
}

/// Extension trait for checking Dataverse response statuses.
pub trait ResponseExt {
    /// Pass the response through if its status equals `expected`, otherwise
    /// read the body and fail with [`ErrorKind::Status`].
    ///
    /// Dataverse signals success with one exact code per operation (200 for
    /// reads, 204 for writes), so anything else, 2xx included, is an error.
    fn expect_status(
        self,
        expected: u16,
    ) -> impl std::future::Future<Output = Result<Response>> + Send;
}

impl ResponseExt for Response {
    async fn expect_status(self, expected: u16) -> Result<Response> {
        let status = self.status();
        if status == expected {
            return Ok(self);
        }

        let body = self.text().await.unwrap_or_default();
        Err(Error::new(ErrorKind::Status { status, body }))
    }
}

/// Extract the record id from an `OData-EntityId` URL.
///
/// The id is the text inside the last complete `(...)` segment, e.g.
/// `https://org.crm.dynamics.com/api/data/v9.2/ac_machines(3f2c1a...)` gives
/// `3f2c1a...`. The opening parenthesis is found by scanning back from the
/// last `)`, skipping anything inside single-quoted alternate-key values.
/// Returns `None` when there is no non-empty parenthesized segment.
pub fn entity_id_from_url(entity_url: &str) -> Option<&str> {
    let close = entity_url.rfind(')')?;
    let head = &entity_url.as_bytes()[..close];

    let mut quoted = false;
    let open = head.iter().rposition(|&b| {
        if b == b'\'' {
            quoted = !quoted;
        }
        b == b'(' && !quoted
    })?;

    let id = &entity_url[open + 1..close];
    if id.is_empty() {
        None
    } else {
        Some(id)
    }
}
