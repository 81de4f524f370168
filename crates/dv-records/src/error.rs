//! Error types for dv-records.
//!
//! Failures fall into three groups the caller can tell apart:
//! configuration (fatal, fix the settings), authentication (the token
//! exchange was rejected, unreachable or timed out) and remote (the record store answered with
//! an unexpected status or timed out). Remote and auth failures keep the HTTP
//! status and response body verbatim.

/// Result type alias for dv-records operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for dv-records operations.
#[derive(Debug, thiserror::Error)]
#[error("{kind}")]
pub struct Error {
    /// The kind of error that occurred.
    pub kind: ErrorKind,
    /// Optional source error.
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl Error {
    /// Create a new error with the given kind.
    pub fn new(kind: ErrorKind) -> Self {
        Self { kind, source: None }
    }

    /// Create a new error with the given kind and source.
    pub fn with_source(
        kind: ErrorKind,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            kind,
            source: Some(Box::new(source)),
        }
    }

    /// Returns true if the connection settings were invalid.
    pub fn is_config_error(&self) -> bool {
        matches!(self.kind, ErrorKind::Config(_))
    }

    /// Returns true if obtaining a token failed.
    pub fn is_auth_error(&self) -> bool {
        matches!(
            self.kind,
            ErrorKind::Auth { .. } | ErrorKind::AuthTimeout | ErrorKind::AuthRequest(_)
        )
    }

    /// Returns true if the record store rejected the request or timed out.
    pub fn is_remote_error(&self) -> bool {
        matches!(self.kind, ErrorKind::Remote { .. } | ErrorKind::RemoteTimeout)
    }

    /// Returns true if either the token exchange or the record call timed out.
    pub fn is_timeout(&self) -> bool {
        matches!(self.kind, ErrorKind::AuthTimeout | ErrorKind::RemoteTimeout)
    }

    /// HTTP status of a rejected request.
    pub fn status(&self) -> Option<u16> {
        match &self.kind {
            ErrorKind::Auth { status, .. } | ErrorKind::Remote { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Response body of a rejected request.
    pub fn body(&self) -> Option<&str> {
        match &self.kind {
            ErrorKind::Auth { body, .. } | ErrorKind::Remote { body, .. } => Some(body),
            _ => None,
        }
    }
}

/// The kind of error that occurred.
#[derive(Debug, thiserror::Error)]
pub enum ErrorKind {
    /// Invalid or incomplete connection configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The identity provider rejected the token request.
    #[error("Failed to obtain OAuth token: HTTP {status}: {body}")]
    Auth { status: u16, body: String },

    /// The token request timed out.
    #[error("Token request timed out")]
    AuthTimeout,

    /// The token endpoint could not be reached or sent an unusable answer.
    #[error("Token request failed: {0}")]
    AuthRequest(String),

    /// The record store answered with an unexpected status.
    #[error("Dataverse request failed: HTTP {status}: {body}")]
    Remote { status: u16, body: String },

    /// The record request timed out.
    #[error("Dataverse request timed out")]
    RemoteTimeout,

    /// The server could not be reached.
    #[error("Connection error: {0}")]
    Connection(String),

    /// JSON error.
    #[error("JSON error: {0}")]
    Json(String),

    /// A caller-supplied argument was rejected before any request was sent.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Other error.
    #[error("{0}")]
    Other(String),
}

impl From<conductor_dv_client::Error> for Error {
    fn from(err: conductor_dv_client::Error) -> Self {
        use conductor_dv_client::ErrorKind as ClientKind;

        let kind = match &err.kind {
            ClientKind::Status { status, body } => ErrorKind::Remote {
                status: *status,
                body: body.clone(),
            },
            ClientKind::Timeout => ErrorKind::RemoteTimeout,
            ClientKind::Connection(message) => ErrorKind::Connection(message.clone()),
            ClientKind::Json(message) => ErrorKind::Json(message.clone()),
            ClientKind::InvalidUrl(message) => ErrorKind::InvalidInput(message.clone()),
            ClientKind::Config(message) => ErrorKind::Config(message.clone()),
            ClientKind::Other(message) => ErrorKind::Other(message.clone()),
        };
        Error::with_source(kind, err)
    }
}

impl From<conductor_dv_auth::Error> for Error {
    fn from(err: conductor_dv_auth::Error) -> Self {
        use conductor_dv_auth::ErrorKind as AuthKind;

        let kind = match &err.kind {
            AuthKind::InvalidConfig(message) => ErrorKind::Config(message.clone()),
            AuthKind::EnvVar(name) => {
                ErrorKind::Config(format!("Environment variable not set: {}", name))
            }
            AuthKind::TokenExchange { status, body } => ErrorKind::Auth {
                status: *status,
                body: body.clone(),
            },
            AuthKind::Timeout => ErrorKind::AuthTimeout,
            AuthKind::Http(message) | AuthKind::Json(message) => {
                ErrorKind::AuthRequest(message.clone())
            }
            AuthKind::Other(message) => ErrorKind::Other(message.clone()),
        };
        Error::with_source(kind, err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::with_source(ErrorKind::Json(err.to_string()), err)
    }
}
