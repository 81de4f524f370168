//! Error types for dv-mapping.

/// Result type alias for dv-mapping operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for dv-mapping operations.
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
}

/// The kind of error that occurred.
#[derive(Debug, thiserror::Error)]
pub enum ErrorKind {
    /// The same application field appears twice in a mapping.
    #[error("Duplicate application field in mapping: {0}")]
    DuplicateAppField(String),

    /// The same remote column appears twice in a mapping.
    #[error("Duplicate remote column in mapping: {0}")]
    DuplicateRemoteColumn(String),

    /// A mapping needs an entity set name.
    #[error("Mapping has no remote entity")]
    MissingEntity,

    /// A record could not be converted to or from a typed model.
    #[error("Invalid record: {0}")]
    InvalidRecord(String),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::with_source(ErrorKind::InvalidRecord(err.to_string()), err)
    }
}
