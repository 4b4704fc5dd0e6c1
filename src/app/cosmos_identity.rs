//! # Cosmos DB Session Authentication
//!
//! OAuth2 client-credentials authentication for one Cosmos DB account,
//! driven by a stored [`ConnectionProfile`](crate::app::connection_profiles::ConnectionProfile).
//!
//! ## Core Functionality
//!
//! - **Client-Credentials Exchange**: POSTs the profile's grant parameters to
//!   the configured token service and caches the resulting bearer token
//! - **Memory-Only Secrets**: the bearer token exists only in memory and is
//!   cleared on disconnect or application exit; it is never written to disk
//! - **Expiration Tracking**: token expiry is tracked with a short slack so a
//!   nearly-expired token is treated as expired rather than failing mid-fetch
//!
//! ## Architecture and Integration
//!
//! Public methods are synchronous for compatibility with the egui update
//! loop; network work is bridged onto an isolated Tokio runtime internally.
//! Callers run `connect` on a background thread and surface state changes
//! through the sidebar status line via [`ConnectionState`].
//!
//! All fallible operations return [`AccessError`], the taxonomy shared with
//! the document client: authentication failures are distinguished from
//! transient connectivity problems so the UI can suggest the right recovery.

use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use thiserror::Error;
use tokio::runtime::Runtime;
use tracing::{info, warn};

use crate::app::connection_profiles::ConnectionProfile;

/// Treat a token within this many seconds of expiry as already expired.
const TOKEN_EXPIRY_SLACK_SECS: i64 = 60;

/// Errors surfaced by the Cosmos access layer.
///
/// Connectivity failures are retryable by an explicit user action (Connect or
/// Refresh again); there is no automatic retry loop.
#[derive(Debug, Error)]
pub enum AccessError {
    /// Bad credentials, or a missing/expired token. HTTP 401/403.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// Network or service trouble. Retry is user-initiated only.
    #[error("connection failed: {0}")]
    Connectivity(String),

    /// The referenced database or container no longer exists. HTTP 404.
    #[error("not found: {0}")]
    NotFound(String),

    /// Malformed connection profile fields.
    #[error("invalid connection profile: {0}")]
    Validation(String),
}

/// Connection lifecycle for the active profile session.
#[derive(Debug, Clone, PartialEq)]
pub enum ConnectionState {
    NotConnected,
    Connecting,
    /// Connected and holding a usable token
    Connected,
    Error(String),
}

/// A cached OAuth2 bearer token.
///
/// The token string grants read access to the account and must never be
/// logged or persisted.
#[derive(Clone)]
pub struct BearerToken {
    secret: String,
    expires_at: Option<DateTime<Utc>>,
}

impl BearerToken {
    pub fn new(secret: String, expires_at: Option<DateTime<Utc>>) -> Self {
        Self { secret, expires_at }
    }

    pub fn is_expired(&self) -> bool {
        match self.expires_at {
            Some(expires_at) => {
                Utc::now() + Duration::seconds(TOKEN_EXPIRY_SLACK_SECS) >= expires_at
            }
            None => false,
        }
    }
}

/// Authentication state for one connection profile.
pub struct CosmosIdentity {
    profile: ConnectionProfile,
    token: Option<BearerToken>,
    pub connection_state: ConnectionState,
}

impl CosmosIdentity {
    pub fn new(profile: ConnectionProfile) -> Self {
        Self {
            profile,
            token: None,
            connection_state: ConnectionState::NotConnected,
        }
    }

    pub fn profile(&self) -> &ConnectionProfile {
        &self.profile
    }

    /// The account endpoint documents are fetched from, without a trailing slash.
    pub fn endpoint(&self) -> String {
        self.profile.cosmos_endpoint.trim_end_matches('/').to_string()
    }

    pub fn is_connected(&self) -> bool {
        self.connection_state == ConnectionState::Connected
    }

    /// Exchange the profile's client credentials for a bearer token.
    ///
    /// Blocks until the token service responds; run this on a background
    /// thread, not in the egui update loop.
    pub fn connect(&mut self) -> Result<(), AccessError> {
        if let Err(e) = self.profile.validate() {
            let error = AccessError::Validation(e.to_string());
            self.connection_state = ConnectionState::Error(error.to_string());
            return Err(error);
        }

        self.connection_state = ConnectionState::Connecting;
        info!("Requesting access token for profile '{}'", self.profile.name);

        let runtime = Runtime::new()
            .map_err(|e| AccessError::Connectivity(format!("failed to create runtime: {}", e)))?;

        match runtime.block_on(request_token(&self.profile)) {
            Ok(token) => {
                self.token = Some(token);
                self.connection_state = ConnectionState::Connected;
                info!("Token acquired for profile '{}'", self.profile.name);
                Ok(())
            }
            Err(e) => {
                warn!(
                    "Token acquisition failed for profile '{}': {}",
                    self.profile.name, e
                );
                self.token = None;
                self.connection_state = ConnectionState::Error(e.to_string());
                Err(e)
            }
        }
    }

    /// The current bearer token, if one is held and not expired.
    pub fn bearer_token(&self) -> Result<String, AccessError> {
        match &self.token {
            Some(token) if !token.is_expired() => Ok(token.secret.clone()),
            Some(_) => Err(AccessError::Auth(
                "access token has expired; connect again".to_string(),
            )),
            None => Err(AccessError::Auth("not connected".to_string())),
        }
    }

    /// Drop the token and return to the disconnected state.
    pub fn disconnect(&mut self) {
        self.token = None;
        self.connection_state = ConnectionState::NotConnected;
        info!("Disconnected profile '{}'", self.profile.name);
    }
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    // Azure AD v1 token endpoints return expires_in as a string
    expires_in: Option<serde_json::Value>,
}

async fn request_token(profile: &ConnectionProfile) -> Result<BearerToken, AccessError> {
    let token_url = format!(
        "{}/oauth2/token",
        profile.service_url.trim_end_matches('/')
    );

    let params = [
        ("grant_type", profile.grant_type.as_str()),
        ("client_id", profile.client_id.as_str()),
        ("client_secret", profile.client_secret.as_str()),
        ("resource", profile.resource.as_str()),
    ];

    let client = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(30))
        .build()
        .map_err(|e| AccessError::Connectivity(format!("failed to build HTTP client: {}", e)))?;

    let response = client
        .post(&token_url)
        .form(&params)
        .send()
        .await
        .map_err(|e| AccessError::Connectivity(format!("token request failed: {}", e)))?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        let detail = summarize_error_body(&body);
        return if status.as_u16() == 400 || status.as_u16() == 401 || status.as_u16() == 403 {
            Err(AccessError::Auth(format!(
                "token request rejected ({}): {}",
                status, detail
            )))
        } else {
            Err(AccessError::Connectivity(format!(
                "token service returned {}: {}",
                status, detail
            )))
        };
    }

    let token_data: TokenResponse = response
        .json()
        .await
        .map_err(|e| AccessError::Auth(format!("malformed token response: {}", e)))?;

    let secret = token_data
        .access_token
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AccessError::Auth("no access token in response".to_string()))?;

    let expires_at = token_data
        .expires_in
        .as_ref()
        .and_then(parse_expires_in)
        .map(|seconds| Utc::now() + Duration::seconds(seconds));

    Ok(BearerToken::new(secret, expires_at))
}

fn parse_expires_in(value: &serde_json::Value) -> Option<i64> {
    match value {
        serde_json::Value::Number(n) => n.as_i64(),
        serde_json::Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

/// Keep error payloads short enough for a notification line.
fn summarize_error_body(body: &str) -> String {
    // Token endpoints return JSON with an error_description field
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        if let Some(description) = value.get("error_description").and_then(|d| d.as_str()) {
            if let Some(first_line) = description.lines().next() {
                return first_line.to_string();
            }
        }
        if let Some(error) = value.get("error").and_then(|e| e.as_str()) {
            return error.to_string();
        }
    }
    let mut summary: String = body.chars().take(200).collect();
    if summary.is_empty() {
        summary = "no response body".to_string();
    }
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::connection_profiles::ConnectionProfile;

    fn profile() -> ConnectionProfile {
        ConnectionProfile {
            name: "Dev".to_string(),
            cosmos_endpoint: "https://dev.documents.azure.com:443/".to_string(),
            service_url: "https://login.example.com/tenant".to_string(),
            client_id: "client".to_string(),
            client_secret: "secret".to_string(),
            resource: "https://cosmos.azure.com".to_string(),
            grant_type: "client_credentials".to_string(),
        }
    }

    #[test]
    fn test_initial_state() {
        let identity = CosmosIdentity::new(profile());
        assert_eq!(identity.connection_state, ConnectionState::NotConnected);
        assert!(!identity.is_connected());
        assert!(identity.bearer_token().is_err());
    }

    #[test]
    fn test_endpoint_strips_trailing_slash() {
        let identity = CosmosIdentity::new(profile());
        assert_eq!(identity.endpoint(), "https://dev.documents.azure.com:443");
    }

    #[test]
    fn test_connect_rejects_invalid_profile() {
        let mut bad = profile();
        bad.cosmos_endpoint.clear();

        let mut identity = CosmosIdentity::new(bad);
        match identity.connect() {
            Err(AccessError::Validation(_)) => {}
            other => panic!("expected validation error, got {:?}", other.err()),
        }
        assert!(matches!(
            identity.connection_state,
            ConnectionState::Error(_)
        ));
    }

    #[test]
    fn test_token_expiry_slack() {
        let fresh = BearerToken::new(
            "t".to_string(),
            Some(Utc::now() + Duration::seconds(3600)),
        );
        assert!(!fresh.is_expired());

        let nearly_expired =
            BearerToken::new("t".to_string(), Some(Utc::now() + Duration::seconds(30)));
        assert!(nearly_expired.is_expired());

        let no_expiry = BearerToken::new("t".to_string(), None);
        assert!(!no_expiry.is_expired());
    }

    #[test]
    fn test_disconnect_clears_token() {
        let mut identity = CosmosIdentity::new(profile());
        identity.token = Some(BearerToken::new("t".to_string(), None));
        identity.connection_state = ConnectionState::Connected;

        identity.disconnect();
        assert_eq!(identity.connection_state, ConnectionState::NotConnected);
        assert!(identity.bearer_token().is_err());
    }

    #[test]
    fn test_parse_expires_in_variants() {
        assert_eq!(parse_expires_in(&serde_json::json!(3599)), Some(3599));
        assert_eq!(parse_expires_in(&serde_json::json!("3599")), Some(3599));
        assert_eq!(parse_expires_in(&serde_json::json!(true)), None);
    }

    #[test]
    fn test_summarize_error_body() {
        let json = r#"{"error":"invalid_client","error_description":"AADSTS7000215: Invalid client secret provided.\r\nTrace ID: abc"}"#;
        assert_eq!(
            summarize_error_body(json),
            "AADSTS7000215: Invalid client secret provided."
        );
        assert_eq!(summarize_error_body(""), "no response body");
    }
}
