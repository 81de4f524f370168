//! # dv-client
//!
//! Core HTTP client infrastructure for the Dataverse Web API.
//!
//! This crate provides the foundational HTTP layer with:
//! - Bounded request and connect timeouts on every call
//! - Compressed response support (gzip, deflate)
//! - Connection pooling
//! - Request/response tracing
//! - Typed errors that keep the remote status and body intact
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    Application Layer                        │
//! │  (dv-records, dv-mapping, dashboard pages)                  │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     TokenManager (dv-auth)                  │
//! │  - Validated connection config                              │
//! │  - OAuth token cache with refresh-before-expiry             │
//! │  - OData request headers                                    │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      DvHttpClient                           │
//! │  - Raw HTTP with timeouts and compression                   │
//! │  - Request building                                         │
//! │  - Response status checks                                   │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust,ignore
//! use conductor_dv_client::{ClientConfig, DvHttpClient, ResponseExt};
//!
//! let http = DvHttpClient::new(ClientConfig::default())?;
//! let response = http
//!     .execute(http.get("https://org.crm.dynamics.com/api/data/v9.2/ac_machines").query("$top", "5"))
//!     .await?
//!     .expect_status(200)
//!     .await?;
//! let body: serde_json::Value = response.json().await?;
//! ```

mod client;
mod config;
mod error;
mod request;
mod response;
pub mod security;
mod types;

pub use client::DvHttpClient;
pub use config::{ClientConfig, ClientConfigBuilder, DEFAULT_CONNECT_TIMEOUT, DEFAULT_TIMEOUT};
pub use error::{Error, ErrorKind, Result};
pub use request::{RequestBody, RequestBuilder, RequestMethod};
pub use response::{entity_id_from_url, Response, ResponseExt};
pub use types::{Record, RequestHeaders};

/// Default Dataverse Web API version.
pub const DEFAULT_API_VERSION: &str = "9.2";

/// OData protocol version sent in `OData-MaxVersion` and `OData-Version`.
pub const ODATA_VERSION: &str = "4.0";

/// User-Agent string for the client
pub const USER_AGENT: &str = concat!("conductor-dataverse/", env!("CARGO_PKG_VERSION"));
