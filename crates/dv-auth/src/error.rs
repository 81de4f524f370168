//! Error types for dv-auth.
//!
//! Error messages are designed to avoid exposing credential values.

/// Result type alias for dv-auth operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for dv-auth operations.
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

    /// Returns true if the connection configuration was invalid or incomplete.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self.kind,
            ErrorKind::InvalidConfig(_) | ErrorKind::EnvVar(_)
        )
    }

    /// Returns true if acquiring a token failed.
    pub fn is_auth_error(&self) -> bool {
        matches!(
            self.kind,
            ErrorKind::TokenExchange { .. }
                | ErrorKind::Timeout
                | ErrorKind::Http(_)
                | ErrorKind::Json(_)
        )
    }

    /// Returns true if the token exchange ran past its timeout.
    pub fn is_timeout(&self) -> bool {
        matches!(self.kind, ErrorKind::Timeout)
    }
}

/// The kind of error that occurred.
#[derive(Debug, thiserror::Error)]
pub enum ErrorKind {
    /// Invalid or incomplete connection configuration.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Environment variable not set.
    #[error("Environment variable not set: {0}")]
    EnvVar(String),

    /// The identity provider rejected the token request.
    #[error("Failed to obtain OAuth token: HTTP {status}: {body}")]
    TokenExchange { status: u16, body: String },

    /// The token request timed out.
    #[error("Token request timed out")]
    Timeout,

    /// HTTP error during authentication.
    #[error("HTTP error: {0}")]
    Http(String),

    /// JSON error.
    #[error("JSON error: {0}")]
    Json(String),

    /// Other error.
    #[error("{0}")]
    Other(String),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::with_source(ErrorKind::Json(err.to_string()), err)
    }
}

impl From<conductor_dv_client::Error> for Error {
    fn from(err: conductor_dv_client::Error) -> Self {
        use conductor_dv_client::ErrorKind as ClientKind;

        let kind = match &err.kind {
            ClientKind::Status { status, body } => ErrorKind::TokenExchange {
                status: *status,
                body: body.clone(),
            },
            ClientKind::Timeout => ErrorKind::Timeout,
            ClientKind::Json(message) => ErrorKind::Json(message.clone()),
            ClientKind::Config(message) => ErrorKind::InvalidConfig(message.clone()),
            _ => {
                // Transport messages can echo request URLs; keep tokens out of them
                let message = err.to_string();
                if message.contains("Bearer") || message.contains("access_token") {
                    ErrorKind::Http("HTTP request failed (details redacted for security)".into())
                } else {
                    ErrorKind::Http(message)
                }
            }
        };
        Error::with_source(kind, err)
    }
}
