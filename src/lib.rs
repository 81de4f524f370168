//! # conductor-dataverse
//!
//! Dataverse connection, credential and field-mapping layer for the
//! Automation Conductor dashboard.
//!
//! ## Security
//!
//! - Secrets (client secret, API key, access tokens) are redacted in Debug output
//! - Tracing spans skip credential parameters
//! - Remote failures keep the HTTP status and body, never the request headers
//!
//! ## Crates
//!
//! - **conductor-dv-client** - HTTP layer: timeouts, compression, status checks, OData escaping
//! - **conductor-dv-auth** - Connection config validation, OAuth client credentials, API keys, token refresh
//! - **conductor-dv-records** - Query, create, update and delete against `/api/data/v9.2`
//! - **conductor-dv-mapping** - App field to Dataverse column mapping, machine/process models
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use conductor_dataverse::{query_mapped, DataverseClient, QueryOptions, MACHINE_MAPPING};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = DataverseClient::from_env()?;
//!     client.connect().await?;
//!
//!     let machines =
//!         query_mapped(&client, &MACHINE_MAPPING, &QueryOptions::new().with_top(10)).await?;
//!
//!     for machine in machines {
//!         println!("{} ({})", machine["name"], machine["status"]);
//!     }
//!
//!     Ok(())
//! }
//! ```

// Re-export all crates for convenient access
#[cfg(feature = "auth")]
pub use conductor_dv_auth as auth;
#[cfg(feature = "client")]
pub use conductor_dv_client as client;
#[cfg(feature = "mapping")]
pub use conductor_dv_mapping as mapping;
#[cfg(feature = "records")]
pub use conductor_dv_records as records;

// Re-export commonly used types at the top level
#[cfg(feature = "auth")]
pub use conductor_dv_auth::{AuthMode, ConnectionConfig, TokenManager};
#[cfg(feature = "client")]
pub use conductor_dv_client::{ClientConfig, DvHttpClient, Record};
#[cfg(feature = "mapping")]
pub use conductor_dv_mapping::{
    from_remote, to_remote, FieldMapping, Machine, MachineStatus, Process, ProcessStatus,
    MACHINE_MAPPING, PROCESS_MAPPING,
};
#[cfg(feature = "records")]
pub use conductor_dv_records::{CreatedRecord, DataverseClient, QueryOptions};

/// Query `mapping`'s entity set and return app-shaped records.
#[cfg(all(feature = "records", feature = "mapping"))]
pub async fn query_mapped(
    client: &DataverseClient,
    mapping: &FieldMapping,
    options: &QueryOptions,
) -> conductor_dv_records::Result<Vec<Record>> {
    let rows = client.query(mapping.remote_entity(), options).await?;
    Ok(rows.iter().map(|row| from_remote(row, mapping)).collect())
}

/// Map an app-shaped record and create it in `mapping`'s entity set.
#[cfg(all(feature = "records", feature = "mapping"))]
pub async fn create_mapped(
    client: &DataverseClient,
    mapping: &FieldMapping,
    app_record: &Record,
) -> conductor_dv_records::Result<CreatedRecord> {
    client
        .create(mapping.remote_entity(), &to_remote(app_record, mapping))
        .await
}
