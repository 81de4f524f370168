//! # dv-auth
//!
//! Dataverse authentication: connection configuration, credential validation
//! and bearer-token management.
//!
//! ## Security
//!
//! - Secrets (client secret, API key, access tokens) are redacted in Debug output
//! - Tracing spans skip credential parameters
//! - Configuration errors name missing fields, never their values
//!
//! ## Supported Authentication Methods
//!
//! - **OAuth 2.0 Client Credentials** - Server-to-server access through an
//!   app registration (`client_id`, `client_secret`, `tenant_id`)
//! - **Static API key** - Sent as a bearer token on every request
//!
//! ## Example
//!
//! ```rust,ignore
//! use conductor_dv_auth::{ConnectionConfig, TokenManager};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), conductor_dv_auth::Error> {
//!     // From environment variables
//!     let config = ConnectionConfig::from_env()?;
//!
//!     // Or explicitly
//!     let config = ConnectionConfig::builder("https://org.crm.dynamics.com")
//!         .with_oauth("client-id", "client-secret", "tenant-id")
//!         .build()?;
//!
//!     let tokens = TokenManager::new(config)?;
//!     tokens.connect().await?;
//!     let headers = tokens.headers().await?;
//!
//!     Ok(())
//! }
//! ```

mod credentials;
mod error;
mod token;

pub use credentials::{AuthMode, ConnectionConfig, ConnectionConfigBuilder};
pub use error::{Error, ErrorKind, Result};
pub use token::{TokenManager, TokenState, REFRESH_MARGIN_SECS};

/// Default Microsoft Entra ID authority for the client-credentials exchange.
pub const DEFAULT_AUTHORITY_URL: &str = "https://login.microsoftonline.com";
