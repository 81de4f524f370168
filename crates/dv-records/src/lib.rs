//! # dv-records
//!
//! Record operations against the Dataverse Web API (`/api/data/v9.2`).
//!
//! - `query` - GET an entity set with `$top`, `$select` and `$filter`
//! - `create` - POST a record, id read back from `OData-EntityId`
//! - `update` - PATCH `entity(id)`
//! - `delete` - DELETE `entity(id)`
//!
//! Reads succeed only on HTTP 200 and writes only on HTTP 204; any other
//! status is returned as [`ErrorKind::Remote`] with the status and body
//! untouched. Nothing is retried.
//!
//! ## Example
//!
//! ```rust,ignore
//! use conductor_dv_records::{DataverseClient, QueryOptions};
//! use conductor_dv_auth::ConnectionConfig;
//!
//! let config = ConnectionConfig::oauth(
//!     "https://org.crm.dynamics.com",
//!     "client-id",
//!     "client-secret",
//!     "tenant-id",
//! )?;
//! let client = DataverseClient::new(config)?;
//! client.connect().await?;
//!
//! let idle = client
//!     .query(
//!         "ac_machines",
//!         &QueryOptions::new()
//!             .with_select(["ac_name", "ac_ipaddress"])
//!             .with_filter("ac_status eq 'idle'"),
//!     )
//!     .await?;
//! ```

mod client;
mod error;
mod query;

pub use client::{CreatedRecord, DataverseClient};
pub use error::{Error, ErrorKind, Result};
pub use query::{QueryOptions, DEFAULT_TOP};

pub use conductor_dv_client::Record;
