//! Bearer-token acquisition, caching and request headers.

use std::fmt;

use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

use conductor_dv_client::{DvHttpClient, RequestHeaders, ResponseExt, ODATA_VERSION};

use crate::credentials::{AuthMode, ConnectionConfig};
use crate::error::{Error, ErrorKind, Result};

/// A cached token is refreshed once fewer than this many seconds remain.
pub const REFRESH_MARGIN_SECS: i64 = 60;

/// Longest token lifetime accepted from the identity provider (one day).
const MAX_EXPIRES_IN_SECS: i64 = 86_400;

/// A cached access token and its absolute expiry.
#[derive(Clone, PartialEq, Eq)]
pub struct TokenState {
    access_token: String,
    expires_at: i64,
}

impl fmt::Debug for TokenState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenState")
            .field("access_token", &"[REDACTED]")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

impl TokenState {
    /// Create a token state expiring at `expires_at` (Unix seconds).
    pub fn new(access_token: impl Into<String>, expires_at: i64) -> Self {
        Self {
            access_token: access_token.into(),
            expires_at,
        }
    }

    /// The bearer token.
    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    /// Expiry as Unix seconds.
    pub fn expires_at(&self) -> i64 {
        self.expires_at
    }

    /// Returns true if the token must be refreshed before use at `now`.
    pub fn needs_refresh_at(&self, now: i64) -> bool {
        now > self.expires_at.saturating_sub(REFRESH_MARGIN_SECS)
    }
}

/// Token endpoint payload. Only the fields we use are declared.
#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: ExpiresIn,
}

/// The v1 endpoint returns `expires_in` as a string, v2 as a number.
#[derive(Deserialize)]
#[serde(untagged)]
enum ExpiresIn {
    Seconds(i64),
    Text(String),
}

impl ExpiresIn {
    /// Lifetime in seconds, rejected unless within `1..=MAX_EXPIRES_IN_SECS`.
    fn seconds(&self) -> Result<i64> {
        let secs = match self {
            ExpiresIn::Seconds(secs) => *secs,
            ExpiresIn::Text(text) => text.trim().parse::<i64>().map_err(|_| {
                Error::new(ErrorKind::Json(format!(
                    "expires_in is not a number: {:?}",
                    text
                )))
            })?,
        };

        if !(1..=MAX_EXPIRES_IN_SECS).contains(&secs) {
            return Err(Error::new(ErrorKind::Json(format!(
                "expires_in out of range: {}",
                secs
            ))));
        }
        Ok(secs)
    }
}

/// Supplies authorization headers for one Dataverse environment.
///
/// In OAuth mode the manager owns the cached token and refreshes it inline
/// when it is within [`REFRESH_MARGIN_SECS`] of expiry. Refreshes are
/// serialized: concurrent callers sharing a manager wait on the same lock and
/// reuse the token the first caller obtained.
pub struct TokenManager {
    config: ConnectionConfig,
    http: DvHttpClient,
    state: Mutex<Option<TokenState>>,
}

impl fmt::Debug for TokenManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenManager")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl TokenManager {
    /// Create a manager with a default HTTP client.
    pub fn new(config: ConnectionConfig) -> Result<Self> {
        let http = DvHttpClient::default_client()?;
        Ok(Self::with_http_client(config, http))
    }

    /// Create a manager that sends the token exchange through `http`.
    pub fn with_http_client(config: ConnectionConfig, http: DvHttpClient) -> Self {
        Self {
            config,
            http,
            state: Mutex::new(None),
        }
    }

    /// The validated connection configuration.
    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    /// Snapshot of the cached token, if any.
    pub async fn token_state(&self) -> Option<TokenState> {
        self.state.lock().await.clone()
    }

    /// Establish the connection.
    ///
    /// OAuth mode always performs a fresh client-credentials exchange and
    /// replaces the cached token. API-key mode has nothing to exchange and
    /// succeeds immediately. On failure the cached state is left unchanged.
    #[instrument(skip(self), fields(auth_mode = %self.config.auth_mode()))]
    pub async fn connect(&self) -> Result<()> {
        match self.config.auth_mode() {
            AuthMode::ApiKey => {
                debug!("API key authentication, no token exchange needed");
                Ok(())
            }
            AuthMode::OAuth => {
                let mut state = self.state.lock().await;
                let token = self.exchange().await?;
                *state = Some(token);
                info!("Connected to Dataverse");
                Ok(())
            }
        }
    }

    /// Headers for one Web API call, refreshing the token first if needed.
    #[instrument(skip(self))]
    pub async fn headers(&self) -> Result<RequestHeaders> {
        let bearer = match self.config.auth_mode() {
            AuthMode::ApiKey => self
                .config
                .api_key_value()
                .ok_or_else(|| {
                    Error::new(ErrorKind::InvalidConfig("api_key is not set".to_string()))
                })?
                .to_string(),
            AuthMode::OAuth => self.current_token().await?,
        };

        Ok(RequestHeaders::new()
            .with("Authorization", format!("Bearer {}", bearer))
            .with("Content-Type", "application/json")
            .with("Accept", "application/json")
            .with("OData-MaxVersion", ODATA_VERSION)
            .with("OData-Version", ODATA_VERSION))
    }

    async fn current_token(&self) -> Result<String> {
        let mut state = self.state.lock().await;
        let now = chrono::Utc::now().timestamp();

        match state.as_ref() {
            Some(token) if !token.needs_refresh_at(now) => Ok(token.access_token.clone()),
            cached => {
                if cached.is_some() {
                    debug!("Access token near expiry, refreshing");
                } else {
                    debug!("No access token cached, exchanging credentials");
                }
                let token = self.exchange().await?;
                let access_token = token.access_token.clone();
                *state = Some(token);
                Ok(access_token)
            }
        }
    }

    /// Run the client-credentials exchange. Callers hold the state lock.
    #[instrument(skip(self), fields(tenant_id = self.config.tenant_id().unwrap_or_default()))]
    async fn exchange(&self) -> Result<TokenState> {
        let (Some(client_id), Some(client_secret), Some(token_url)) = (
            self.config.client_id(),
            self.config.client_secret(),
            self.config.token_url(),
        ) else {
            return Err(Error::new(ErrorKind::InvalidConfig(
                "OAuth credentials are incomplete".to_string(),
            )));
        };

        let request = self
            .http
            .post(token_url)
            .header("Accept", "application/json")
            .form([
                ("client_id", client_id),
                ("client_secret", client_secret),
                ("resource", self.config.base_url()),
                ("grant_type", "client_credentials"),
            ]);

        let response = match self.http.execute(request).await?.expect_status(200).await {
            Ok(response) => response,
            Err(e) => {
                warn!(status = e.status(), "Token exchange rejected");
                return Err(e.into());
            }
        };

        let token: TokenResponse = response.json().await?;
        let expires_in = token.expires_in.seconds()?;
        let expires_at = chrono::Utc::now().timestamp().saturating_add(expires_in);

        debug!(expires_in, "Access token obtained");
        Ok(TokenState::new(token.access_token, expires_at))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const ORG: &str = "https://org.crm.dynamics.com";

    fn quiet_http() -> DvHttpClient {
        DvHttpClient::new(
            conductor_dv_client::ClientConfig::builder()
                .with_tracing(false)
                .build(),
        )
        .unwrap()
    }

    fn oauth_manager(authority: &str) -> TokenManager {
        let config = ConnectionConfig::builder(ORG)
            .with_oauth("client-id", "client-secret", "tenant-id")
            .with_authority_url(authority)
            .build()
            .unwrap();
        TokenManager::with_http_client(config, quiet_http())
    }

    fn now() -> i64 {
        chrono::Utc::now().timestamp()
    }

    async fn mount_token_endpoint(server: &MockServer, token: &str, expected_calls: u64) {
        Mock::given(method("POST"))
            .and(path("/tenant-id/oauth2/token"))
            .and(body_string_contains("grant_type=client_credentials"))
            .and(body_string_contains("client_id=client-id"))
            .and(body_string_contains("resource=https%3A%2F%2Forg.crm.dynamics.com"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "token_type": "Bearer",
                "expires_in": "3599",
                "access_token": token,
            })))
            .expect(expected_calls)
            .mount(server)
            .await;
    }

    #[test]
    fn test_needs_refresh_boundary() {
        let token = TokenState::new("t", 1_000);
        assert!(!token.needs_refresh_at(940));
        assert!(token.needs_refresh_at(941));
    }

    #[test]
    fn test_needs_refresh_at_extreme_expiry() {
        let token = TokenState::new("t", i64::MIN);
        assert!(token.needs_refresh_at(0));

        let token = TokenState::new("t", i64::MAX);
        assert!(!token.needs_refresh_at(i64::MAX - REFRESH_MARGIN_SECS));
        assert!(token.needs_refresh_at(i64::MAX));
    }

    #[test]
    fn test_token_state_debug_redacts_token() {
        let token = TokenState::new("super_secret_token", 1);
        let debug_output = format!("{:?}", token);
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("super_secret_token"));
    }

    #[test]
    fn test_expires_in_accepts_number_or_string() {
        let parsed: TokenResponse =
            serde_json::from_str(r#"{"access_token":"a","expires_in":3600}"#).unwrap();
        assert_eq!(parsed.expires_in.seconds().unwrap(), 3600);

        let parsed: TokenResponse =
            serde_json::from_str(r#"{"access_token":"a","expires_in":"3599"}"#).unwrap();
        assert_eq!(parsed.expires_in.seconds().unwrap(), 3599);

        let parsed: TokenResponse =
            serde_json::from_str(r#"{"access_token":"a","expires_in":"soon"}"#).unwrap();
        assert!(parsed.expires_in.seconds().is_err());
    }

    #[test]
    fn test_expires_in_out_of_range_is_rejected() {
        for raw in [
            r#"{"access_token":"a","expires_in":0}"#,
            r#"{"access_token":"a","expires_in":-5}"#,
            r#"{"access_token":"a","expires_in":"86401"}"#,
            r#"{"access_token":"a","expires_in":9223372036854775807}"#,
        ] {
            let parsed: TokenResponse = serde_json::from_str(raw).unwrap();
            let err = parsed.expires_in.seconds().unwrap_err();
            assert!(matches!(err.kind, ErrorKind::Json(_)), "{raw}: {err:?}");
        }
    }

    #[tokio::test]
    async fn test_connect_caches_token() {
        let server = MockServer::start().await;
        mount_token_endpoint(&server, "fresh-token", 1).await;

        let manager = oauth_manager(&server.uri());
        assert!(manager.token_state().await.is_none());

        manager.connect().await.unwrap();

        let state = manager.token_state().await.unwrap();
        assert_eq!(state.access_token(), "fresh-token");
        let remaining = state.expires_at() - now();
        assert!((3590..=3599).contains(&remaining), "remaining = {remaining}");

        let headers = manager.headers().await.unwrap();
        assert_eq!(headers.get("Authorization"), Some("Bearer fresh-token"));
    }

    #[tokio::test]
    async fn test_token_near_expiry_is_refreshed() {
        let server = MockServer::start().await;
        mount_token_endpoint(&server, "refreshed-token", 1).await;

        let manager = oauth_manager(&server.uri());
        *manager.state.lock().await = Some(TokenState::new("old-token", now() + 30));

        let headers = manager.headers().await.unwrap();
        assert_eq!(headers.get("Authorization"), Some("Bearer refreshed-token"));
    }

    #[tokio::test]
    async fn test_token_with_time_left_is_reused() {
        let server = MockServer::start().await;
        mount_token_endpoint(&server, "unused-token", 0).await;

        let manager = oauth_manager(&server.uri());
        *manager.state.lock().await = Some(TokenState::new("cached-token", now() + 120));

        let headers = manager.headers().await.unwrap();
        assert_eq!(headers.get("Authorization"), Some("Bearer cached-token"));
    }

    #[tokio::test]
    async fn test_headers_without_token_exchanges_first() {
        let server = MockServer::start().await;
        mount_token_endpoint(&server, "lazy-token", 1).await;

        let manager = oauth_manager(&server.uri());
        let headers = manager.headers().await.unwrap();

        assert_eq!(headers.get("Authorization"), Some("Bearer lazy-token"));
        assert_eq!(headers.get("OData-Version"), Some("4.0"));
    }

    #[tokio::test]
    async fn test_rejected_exchange_keeps_status_body_and_state() {
        let server = MockServer::start().await;
        let body = r#"{"error":"invalid_client","error_description":"AADSTS7000215"}"#;

        Mock::given(method("POST"))
            .and(path("/tenant-id/oauth2/token"))
            .respond_with(ResponseTemplate::new(401).set_body_string(body))
            .expect(1)
            .mount(&server)
            .await;

        let manager = oauth_manager(&server.uri());
        let previous = TokenState::new("old-token", now() - 10);
        *manager.state.lock().await = Some(previous.clone());

        let err = manager.connect().await.unwrap_err();
        assert!(err.is_auth_error());
        match err.kind {
            ErrorKind::TokenExchange { status, body: ref got } => {
                assert_eq!(status, 401);
                assert_eq!(got, body);
            }
            ref other => panic!("unexpected kind {other:?}"),
        }

        assert_eq!(manager.token_state().await, Some(previous));
    }

    #[tokio::test]
    async fn test_huge_expires_in_fails_without_caching() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/tenant-id/oauth2/token"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"{"access_token":"t","expires_in":9223372036854775807}"#,
            ))
            .expect(1)
            .mount(&server)
            .await;

        let manager = oauth_manager(&server.uri());
        let err = manager.connect().await.unwrap_err();

        assert!(err.is_auth_error());
        assert!(matches!(err.kind, ErrorKind::Json(_)), "got {err:?}");
        assert!(manager.token_state().await.is_none());
    }

    #[tokio::test]
    async fn test_exchange_timeout_is_auth_timeout() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/tenant-id/oauth2/token"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(500)))
            .mount(&server)
            .await;

        let config = ConnectionConfig::builder(ORG)
            .with_oauth("client-id", "client-secret", "tenant-id")
            .with_authority_url(server.uri())
            .build()
            .unwrap();
        let http = DvHttpClient::new(
            conductor_dv_client::ClientConfig::builder()
                .with_timeout(Duration::from_millis(50))
                .with_tracing(false)
                .build(),
        )
        .unwrap();
        let manager = TokenManager::with_http_client(config, http);

        let err = manager.connect().await.unwrap_err();
        assert!(err.is_timeout(), "expected timeout, got {err:?}");
        assert!(manager.token_state().await.is_none());
    }

    #[tokio::test]
    async fn test_api_key_headers() {
        let config = ConnectionConfig::api_key(ORG, "k-123").unwrap();
        let manager = TokenManager::with_http_client(config, quiet_http());

        manager.connect().await.unwrap();
        assert!(manager.token_state().await.is_none());

        let headers = manager.headers().await.unwrap();
        let pairs: Vec<(&str, &str)> = headers.iter().collect();
        assert_eq!(
            pairs,
            vec![
                ("Authorization", "Bearer k-123"),
                ("Content-Type", "application/json"),
                ("Accept", "application/json"),
                ("OData-MaxVersion", "4.0"),
                ("OData-Version", "4.0"),
            ]
        );
    }

    #[tokio::test]
    async fn test_concurrent_callers_share_one_exchange() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/tenant-id/oauth2/token"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({
                        "access_token": "shared-token",
                        "expires_in": 3600,
                    }))
                    .set_delay(Duration::from_millis(100)),
            )
            .expect(1)
            .mount(&server)
            .await;

        let manager = Arc::new(oauth_manager(&server.uri()));
        let tasks: Vec<_> = (0..8)
            .map(|_| {
                let manager = Arc::clone(&manager);
                tokio::spawn(async move { manager.headers().await })
            })
            .collect();

        for task in tasks {
            let headers = task.await.unwrap().unwrap();
            assert_eq!(headers.get("Authorization"), Some("Bearer shared-token"));
        }
    }
}
