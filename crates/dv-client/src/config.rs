//! HTTP settings shared by the token exchange and record calls.

use std::time::Duration;

/// Request timeout applied when nothing else is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Connect timeout applied when nothing else is configured.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Settings for [`DvHttpClient`](crate::DvHttpClient).
///
/// Every outbound call is bounded by `timeout`; a zero duration is replaced
/// by [`DEFAULT_TIMEOUT`] when the config is built.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Whole-request timeout, connect included.
    pub timeout: Duration,
    /// TCP/TLS connect timeout.
    pub connect_timeout: Duration,
    /// How long an idle pooled connection is kept.
    pub pool_idle_timeout: Duration,
    /// Idle connections kept per host.
    pub pool_max_idle_per_host: usize,
    pub user_agent: String,
    /// Send `Accept-Encoding: gzip, deflate` and decode compressed bodies.
    pub accept_compressed: bool,
    /// Emit debug/info events per request.
    pub enable_tracing: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            pool_idle_timeout: Duration::from_secs(90),
            pool_max_idle_per_host: 10,
            user_agent: crate::USER_AGENT.to_string(),
            accept_compressed: true,
            enable_tracing: true,
        }
    }
}

impl ClientConfig {
    /// Start from the defaults.
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::default()
    }

    /// Defaults, with the request timeout taken from `DATAVERSE_TIMEOUT_SECS`
    /// when it holds a positive integer.
    pub fn from_env() -> Self {
        let timeout = std::env::var("DATAVERSE_TIMEOUT_SECS")
            .ok()
            .and_then(|v| parse_secs(&v));

        match timeout {
            Some(timeout) => Self::builder().with_timeout(timeout).build(),
            None => Self::default(),
        }
    }
}

fn parse_secs(value: &str) -> Option<Duration> {
    match value.trim().parse::<u64>() {
        Ok(0) | Err(_) => None,
        Ok(secs) => Some(Duration::from_secs(secs)),
    }
}

/// Builder for [`ClientConfig`].
#[derive(Debug, Default)]
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.config.connect_timeout = timeout;
        self
    }

    pub fn with_pool_idle_timeout(mut self, timeout: Duration) -> Self {
        self.config.pool_idle_timeout = timeout;
        self
    }

    pub fn with_pool_max_idle(mut self, max: usize) -> Self {
        self.config.pool_max_idle_per_host = max;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = user_agent.into();
        self
    }

    /// Accept or refuse compressed responses.
    pub fn with_compression(mut self, enabled: bool) -> Self {
        self.config.accept_compressed = enabled;
        self
    }

    /// Turn per-request tracing events on or off.
    pub fn with_tracing(mut self, enabled: bool) -> Self {
        self.config.enable_tracing = enabled;
        self
    }

    pub fn build(mut self) -> ClientConfig {
        if self.config.timeout.is_zero() {
            self.config.timeout = DEFAULT_TIMEOUT;
        }
        if self.config.connect_timeout.is_zero() {
            self.config.connect_timeout = DEFAULT_CONNECT_TIMEOUT;
        }
        self.config
    }
}
