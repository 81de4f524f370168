//! Connection configuration and credential validation.
//!
//! A [`ConnectionConfig`] can only be obtained through
//! [`ConnectionConfigBuilder::build`] or [`ConnectionConfig::from_env`], both
//! of which validate the credentials for the selected [`AuthMode`]. An
//! invalid configuration is rejected at construction time, never on first
//! use.

use std::fmt;
use std::str::FromStr;

use crate::error::{Error, ErrorKind, Result};
use crate::DEFAULT_AUTHORITY_URL;

/// How requests to the record store are authenticated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthMode {
    /// OAuth 2.0 client-credentials exchange against Microsoft Entra ID.
    #[default]
    OAuth,
    /// Static API key sent as a bearer token.
    ApiKey,
}

impl FromStr for AuthMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "oauth" => Ok(AuthMode::OAuth),
            "key" | "api_key" | "apikey" => Ok(AuthMode::ApiKey),
            other => Err(Error::new(ErrorKind::InvalidConfig(format!(
                "unrecognized auth mode '{}' (expected 'oauth' or 'key')",
                other
            )))),
        }
    }
}

impl fmt::Display for AuthMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthMode::OAuth => f.write_str("oauth"),
            AuthMode::ApiKey => f.write_str("key"),
        }
    }
}

/// Validated settings for reaching one Dataverse environment.
///
/// Fields are private; the value is immutable once built. Sensitive fields
/// are redacted in Debug output.
#[derive(Clone)]
pub struct ConnectionConfig {
    base_url: String,
    api_version: String,
    auth_mode: AuthMode,
    client_id: Option<String>,
    client_secret: Option<String>,
    tenant_id: Option<String>,
    api_key: Option<String>,
    authority_url: String,
}

impl fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("base_url", &self.base_url)
            .field("api_version", &self.api_version)
            .field("auth_mode", &self.auth_mode)
            .field("client_id", &self.client_id)
            .field(
                "client_secret",
                &self.client_secret.as_ref().map(|_| "[REDACTED]"),
            )
            .field("tenant_id", &self.tenant_id)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("authority_url", &self.authority_url)
            .finish()
    }
}

impl ConnectionConfig {
    /// Start building a configuration for the environment at `base_url`.
    pub fn builder(base_url: impl Into<String>) -> ConnectionConfigBuilder {
        ConnectionConfigBuilder::new(base_url)
    }

    /// Shorthand for a validated OAuth client-credentials configuration.
    pub fn oauth(
        base_url: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        tenant_id: impl Into<String>,
    ) -> Result<Self> {
        Self::builder(base_url)
            .with_oauth(client_id, client_secret, tenant_id)
            .build()
    }

    /// Shorthand for a validated API-key configuration.
    pub fn api_key(base_url: impl Into<String>, api_key: impl Into<String>) -> Result<Self> {
        Self::builder(base_url).with_api_key(api_key).build()
    }

    /// Load and validate configuration from environment variables.
    ///
    /// Required:
    /// - `DATAVERSE_URL`
    ///
    /// Required for OAuth (the default mode):
    /// - `DATAVERSE_CLIENT_ID`, `DATAVERSE_CLIENT_SECRET`, `DATAVERSE_TENANT_ID`
    ///
    /// Required for API-key mode:
    /// - `DATAVERSE_API_KEY`
    ///
    /// Optional:
    /// - `DATAVERSE_API_VERSION` (default: "9.2")
    /// - `DATAVERSE_AUTH_TYPE` (default: "oauth")
    /// - `DATAVERSE_AUTHORITY_URL` (default: "https://login.microsoftonline.com")
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let base_url = lookup("DATAVERSE_URL")
            .ok_or_else(|| Error::new(ErrorKind::EnvVar("DATAVERSE_URL".to_string())))?;

        let mut builder = Self::builder(base_url);

        if let Some(version) = lookup("DATAVERSE_API_VERSION") {
            builder = builder.with_api_version(version);
        }
        if let Some(mode) = lookup("DATAVERSE_AUTH_TYPE") {
            builder = builder.with_auth_mode(mode.parse()?);
        }
        if let Some(authority) = lookup("DATAVERSE_AUTHORITY_URL") {
            builder = builder.with_authority_url(authority);
        }

        builder.client_id = lookup("DATAVERSE_CLIENT_ID");
        builder.client_secret = lookup("DATAVERSE_CLIENT_SECRET");
        builder.tenant_id = lookup("DATAVERSE_TENANT_ID");
        builder.api_key = lookup("DATAVERSE_API_KEY");

        builder.build()
    }

    /// Environment root URL, without a trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Web API version, e.g. "9.2".
    pub fn api_version(&self) -> &str {
        &self.api_version
    }

    /// Selected authentication mode.
    pub fn auth_mode(&self) -> AuthMode {
        self.auth_mode
    }

    /// OAuth application (client) id.
    pub fn client_id(&self) -> Option<&str> {
        self.client_id.as_deref()
    }

    /// OAuth client secret.
    pub fn client_secret(&self) -> Option<&str> {
        self.client_secret.as_deref()
    }

    /// Directory (tenant) id.
    pub fn tenant_id(&self) -> Option<&str> {
        self.tenant_id.as_deref()
    }

    /// Static API key.
    pub fn api_key_value(&self) -> Option<&str> {
        self.api_key.as_deref()
    }

    /// Identity provider authority, without a trailing slash.
    pub fn authority_url(&self) -> &str {
        &self.authority_url
    }

    /// Web API root: `{base_url}/api/data/v{api_version}`.
    pub fn web_api_url(&self) -> String {
        format!("{}/api/data/v{}", self.base_url, self.api_version)
    }

    /// Token endpoint: `{authority_url}/{tenant_id}/oauth2/token`.
    ///
    /// Returns `None` outside OAuth mode.
    pub fn token_url(&self) -> Option<String> {
        match self.auth_mode {
            AuthMode::OAuth => self
                .tenant_id
                .as_deref()
                .map(|tenant| format!("{}/{}/oauth2/token", self.authority_url, tenant)),
            AuthMode::ApiKey => None,
        }
    }
}

/// Builder for [`ConnectionConfig`].
#[derive(Clone)]
pub struct ConnectionConfigBuilder {
    base_url: String,
    api_version: String,
    auth_mode: AuthMode,
    client_id: Option<String>,
    client_secret: Option<String>,
    tenant_id: Option<String>,
    api_key: Option<String>,
    authority_url: String,
}

impl fmt::Debug for ConnectionConfigBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionConfigBuilder")
            .field("base_url", &self.base_url)
            .field("auth_mode", &self.auth_mode)
            .finish_non_exhaustive()
    }
}

impl ConnectionConfigBuilder {
    /// Create a builder in OAuth mode with the default API version.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_version: conductor_dv_client::DEFAULT_API_VERSION.to_string(),
            auth_mode: AuthMode::OAuth,
            client_id: None,
            client_secret: None,
            tenant_id: None,
            api_key: None,
            authority_url: DEFAULT_AUTHORITY_URL.to_string(),
        }
    }

    /// Set the Web API version.
    pub fn with_api_version(mut self, version: impl Into<String>) -> Self {
        self.api_version = version.into();
        self
    }

    /// Set the authentication mode without touching credentials.
    pub fn with_auth_mode(mut self, mode: AuthMode) -> Self {
        self.auth_mode = mode;
        self
    }

    /// Switch to OAuth mode with the given app registration.
    pub fn with_oauth(
        mut self,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        tenant_id: impl Into<String>,
    ) -> Self {
        self.auth_mode = AuthMode::OAuth;
        self.client_id = Some(client_id.into());
        self.client_secret = Some(client_secret.into());
        self.tenant_id = Some(tenant_id.into());
        self
    }

    /// Switch to API-key mode.
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.auth_mode = AuthMode::ApiKey;
        self.api_key = Some(api_key.into());
        self
    }

    /// Override the identity provider authority (sovereign clouds, tests).
    pub fn with_authority_url(mut self, url: impl Into<String>) -> Self {
        self.authority_url = url.into();
        self
    }

    /// Validate and build the configuration.
    pub fn build(self) -> Result<ConnectionConfig> {
        let base_url = normalize_url(&self.base_url, "base_url")?;
        let authority_url = normalize_url(&self.authority_url, "authority_url")?;

        let api_version = self.api_version.trim().to_string();
        if api_version.is_empty() {
            return Err(Error::new(ErrorKind::InvalidConfig(
                "api_version must not be empty".to_string(),
            )));
        }

        match self.auth_mode {
            AuthMode::OAuth => {
                let missing: Vec<&str> = [
                    ("client_id", &self.client_id),
                    ("client_secret", &self.client_secret),
                    ("tenant_id", &self.tenant_id),
                ]
                .into_iter()
                .filter(|(_, value)| is_blank(value))
                .map(|(name, _)| name)
                .collect();

                if !missing.is_empty() {
                    return Err(Error::new(ErrorKind::InvalidConfig(format!(
                        "OAuth authentication requires {}",
                        missing.join(", ")
                    ))));
                }
            }
            AuthMode::ApiKey => {
                if is_blank(&self.api_key) {
                    return Err(Error::new(ErrorKind::InvalidConfig(
                        "API key authentication requires api_key".to_string(),
                    )));
                }
            }
        }

        Ok(ConnectionConfig {
            base_url,
            api_version,
            auth_mode: self.auth_mode,
            client_id: self.client_id,
            client_secret: self.client_secret,
            tenant_id: self.tenant_id,
            api_key: self.api_key,
            authority_url,
        })
    }
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().is_none_or(|v| v.trim().is_empty())
}

fn normalize_url(raw: &str, field: &str) -> Result<String> {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Err(Error::new(ErrorKind::InvalidConfig(format!(
            "{} must not be empty",
            field
        ))));
    }

    let parsed = url::Url::parse(trimmed).map_err(|e| {
        Error::with_source(
            ErrorKind::InvalidConfig(format!("{} is not a valid URL: {}", field, e)),
            e,
        )
    })?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(Error::new(ErrorKind::InvalidConfig(format!(
            "{} must use http or https",
            field
        ))));
    }

    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const ORG: &str = "https://org.crm.dynamics.com";

    #[test]
    fn test_auth_mode_parsing() {
        assert_eq!("oauth".parse::<AuthMode>().unwrap(), AuthMode::OAuth);
        assert_eq!(" OAuth ".parse::<AuthMode>().unwrap(), AuthMode::OAuth);
        assert_eq!("key".parse::<AuthMode>().unwrap(), AuthMode::ApiKey);
        assert_eq!("API_KEY".parse::<AuthMode>().unwrap(), AuthMode::ApiKey);
        assert_eq!("apikey".parse::<AuthMode>().unwrap(), AuthMode::ApiKey);

        let err = "basic".parse::<AuthMode>().unwrap_err();
        assert!(err.is_config_error());
        assert!(err.to_string().contains("basic"));
    }

    #[test]
    fn test_oauth_config_complete() {
        let config = ConnectionConfig::oauth(ORG, "client", "secret", "tenant").unwrap();
        assert_eq!(config.auth_mode(), AuthMode::OAuth);
        assert_eq!(config.api_version(), "9.2");
        assert_eq!(config.web_api_url(), "https://org.crm.dynamics.com/api/data/v9.2");
        assert_eq!(
            config.token_url().as_deref(),
            Some("https://login.microsoftonline.com/tenant/oauth2/token")
        );
    }

    #[test]
    fn test_oauth_config_missing_tenant() {
        let err = ConnectionConfig::builder(ORG)
            .with_oauth("client", "secret", "")
            .build()
            .unwrap_err();

        assert!(err.is_config_error());
        assert!(err.to_string().contains("tenant_id"));
        assert!(!err.to_string().contains("client_id"));
    }

    #[test]
    fn test_oauth_config_names_every_missing_field() {
        let err = ConnectionConfig::builder(ORG).build().unwrap_err();
        let message = err.to_string();
        assert!(message.contains("client_id"));
        assert!(message.contains("client_secret"));
        assert!(message.contains("tenant_id"));
    }

    #[test]
    fn test_api_key_config() {
        let config = ConnectionConfig::api_key(ORG, "k-123").unwrap();
        assert_eq!(config.auth_mode(), AuthMode::ApiKey);
        assert_eq!(config.api_key_value(), Some("k-123"));
        assert!(config.token_url().is_none());

        let err = ConnectionConfig::api_key(ORG, "   ").unwrap_err();
        assert!(err.is_config_error());
    }

    #[test]
    fn test_base_url_validation() {
        let config = ConnectionConfig::api_key("https://org.crm.dynamics.com/", "k").unwrap();
        assert_eq!(config.base_url(), ORG);

        assert!(ConnectionConfig::api_key("", "k").unwrap_err().is_config_error());
        assert!(ConnectionConfig::api_key("org.crm.dynamics.com", "k")
            .unwrap_err()
            .is_config_error());
        assert!(ConnectionConfig::api_key("ftp://org", "k")
            .unwrap_err()
            .is_config_error());
    }

    #[test]
    fn test_empty_api_version_rejected() {
        let err = ConnectionConfig::builder(ORG)
            .with_api_key("k")
            .with_api_version(" ")
            .build()
            .unwrap_err();
        assert!(err.is_config_error());
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let config =
            ConnectionConfig::oauth(ORG, "client", "super_secret_value", "tenant").unwrap();
        let debug_output = format!("{:?}", config);
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("super_secret_value"));

        let config = ConnectionConfig::api_key(ORG, "key_secret_value").unwrap();
        let debug_output = format!("{:?}", config);
        assert!(!debug_output.contains("key_secret_value"));
    }

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_from_env_oauth_defaults() {
        let config = ConnectionConfig::from_lookup(lookup_from(&[
            ("DATAVERSE_URL", ORG),
            ("DATAVERSE_CLIENT_ID", "client"),
            ("DATAVERSE_CLIENT_SECRET", "secret"),
            ("DATAVERSE_TENANT_ID", "tenant"),
        ]))
        .unwrap();

        assert_eq!(config.auth_mode(), AuthMode::OAuth);
        assert_eq!(config.api_version(), "9.2");
        assert_eq!(config.authority_url(), DEFAULT_AUTHORITY_URL);
    }

    #[test]
    fn test_from_env_api_key_mode() {
        let config = ConnectionConfig::from_lookup(lookup_from(&[
            ("DATAVERSE_URL", ORG),
            ("DATAVERSE_AUTH_TYPE", "key"),
            ("DATAVERSE_API_KEY", "k-123"),
            ("DATAVERSE_API_VERSION", "9.1"),
        ]))
        .unwrap();

        assert_eq!(config.auth_mode(), AuthMode::ApiKey);
        assert_eq!(config.web_api_url(), "https://org.crm.dynamics.com/api/data/v9.1");
    }

    #[test]
    fn test_from_env_missing_url() {
        let err = ConnectionConfig::from_lookup(lookup_from(&[])).unwrap_err();
        assert!(matches!(err.kind, ErrorKind::EnvVar(ref name) if name == "DATAVERSE_URL"));
    }

    #[test]
    fn test_from_env_unknown_mode_fails_fast() {
        let err = ConnectionConfig::from_lookup(lookup_from(&[
            ("DATAVERSE_URL", ORG),
            ("DATAVERSE_AUTH_TYPE", "certificate"),
            ("DATAVERSE_API_KEY", "k"),
        ]))
        .unwrap_err();
        assert!(err.is_config_error());
    }
}
