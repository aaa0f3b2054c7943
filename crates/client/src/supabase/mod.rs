//! Client for the hosted store, auth and storage project.
//!
//! Provides access to the project's REST endpoint (tables) and its auth
//! endpoint (sessions). Payment functions live on the same host but are
//! called through [`crate::services::payments`].
//!
//! # API Reference
//!
//! - Tables: `<project>/rest/v1/<table>` with `col=eq.value` filters
//! - Auth: `<project>/auth/v1/{signup,token,logout}`
//! - Authentication: `apikey: <anon key>` on every request, plus
//!   `Authorization: Bearer <token>` where the token is the signed-in
//!   user's access token, or the anon key when nobody is signed in

mod auth;
mod query;

pub use auth::{AuthEvent, AuthSubscription, AuthUser, Session};
pub use query::{Direction, Query};

use std::sync::Arc;

use reqwest::header::{HeaderMap, HeaderValue};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use thiserror::Error;
use tokio::sync::{RwLock, broadcast};
use url::Url;

use crate::config::ClientConfig;

/// Capacity of the session-change channel. Slow subscribers skip ahead.
const AUTH_EVENT_CAPACITY: usize = 16;

/// Errors that can occur when talking to the remote project.
#[derive(Debug, Error)]
pub enum SupabaseError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Rate limited by the project.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Credentials or token rejected.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Failed to parse response.
    #[error("Parse error: {0}")]
    Parse(String),

    /// A request URL could not be built.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The operation needs a signed-in user.
    #[error("No active session - sign in required")]
    NoSession,
}

/// Error body shapes returned by the REST endpoint (`message`, `details`,
/// `hint`, `code`) and the auth endpoint (`error`, `error_description`,
/// `msg`).
#[derive(Debug, Default, Deserialize)]
struct RemoteErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    msg: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

impl RemoteErrorBody {
    fn into_message(self) -> Option<String> {
        self.error_description
            .or(self.msg)
            .or(self.message)
            .or(self.error)
            .filter(|m| !m.is_empty())
    }
}

/// Client for the remote project.
///
/// Cheaply cloneable; all clones share the HTTP connection pool, the current
/// session and the session-change channel.
#[derive(Clone)]
pub struct SupabaseClient {
    inner: Arc<SupabaseClientInner>,
}

struct SupabaseClientInner {
    client: reqwest::Client,
    rest_url: Url,
    auth_url: Url,
    anon_key: SecretString,
    /// Current auth session, if signed in
    session: RwLock<Option<Session>>,
    events: broadcast::Sender<AuthEvent>,
}

impl SupabaseClient {
    /// Create a new client.
    ///
    /// # Errors
    ///
    /// Returns error if the anon key is not a valid header value, the
    /// endpoint URLs cannot be derived, or the HTTP client fails to build.
    pub fn new(config: &ClientConfig) -> Result<Self, SupabaseError> {
        let mut headers = HeaderMap::new();

        let api_key = HeaderValue::from_str(config.anon_key())
            .map_err(|e| SupabaseError::Parse(format!("Invalid API key format: {e}")))?;
        headers.insert("apikey", api_key);
        headers.insert("Content-Type", HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.request_timeout)
            .build()?;

        let (events, _) = broadcast::channel(AUTH_EVENT_CAPACITY);

        Ok(Self {
            inner: Arc::new(SupabaseClientInner {
                client,
                rest_url: config.supabase_url.join("rest/v1/")?,
                auth_url: config.supabase_url.join("auth/v1/")?,
                anon_key: config.anon_key.clone(),
                session: RwLock::new(None),
                events,
            }),
        })
    }

    /// Start a query against `table`.
    #[must_use]
    pub fn from(&self, table: &str) -> Query {
        Query::new(self.clone(), table)
    }

    /// The underlying HTTP client.
    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.inner.client
    }

    /// URL of a table endpoint.
    pub(crate) fn table_url(&self, table: &str) -> Result<Url, SupabaseError> {
        Ok(self.inner.rest_url.join(table)?)
    }

    /// URL of an auth endpoint.
    pub(crate) fn auth_url(&self, path: &str) -> Result<Url, SupabaseError> {
        Ok(self.inner.auth_url.join(path)?)
    }

    /// Bearer token for the next request: the session's access token when
    /// signed in, the anon key otherwise.
    pub(crate) async fn bearer_token(&self) -> String {
        self.inner.session.read().await.as_ref().map_or_else(
            || self.inner.anon_key.expose_secret().to_string(),
            |session| session.access_token.expose_secret().to_string(),
        )
    }

    /// Handle API response and parse JSON.
    pub(crate) async fn handle_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, SupabaseError> {
        let status = response.status();

        if status.is_success() {
            return response
                .json()
                .await
                .map_err(|e| SupabaseError::Parse(format!("Failed to parse response: {e}")));
        }

        Err(Self::parse_error(response).await)
    }

    /// Handle a response whose body is not needed.
    pub(crate) async fn handle_empty_response(
        response: reqwest::Response,
    ) -> Result<(), SupabaseError> {
        if response.status().is_success() {
            return Ok(());
        }
        Err(Self::parse_error(response).await)
    }

    /// Parse error response from the project.
    pub(crate) async fn parse_error(response: reqwest::Response) -> SupabaseError {
        let status = response.status();

        // Check for rate limiting
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse().ok())
                .unwrap_or(60);
            return SupabaseError::RateLimited(retry_after);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<RemoteErrorBody>(&body)
            .ok()
            .and_then(RemoteErrorBody::into_message)
            .or_else(|| (!body.trim().is_empty()).then(|| body.trim().to_string()))
            .unwrap_or_else(|| {
                status
                    .canonical_reason()
                    .unwrap_or("Unknown error")
                    .to_string()
            });

        match status.as_u16() {
            401 | 403 => SupabaseError::Unauthorized(message),
            404 => SupabaseError::NotFound(message),
            code => SupabaseError::Api {
                status: code,
                message,
            },
        }
    }
}

impl std::fmt::Debug for SupabaseClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SupabaseClient")
            .field("rest_url", &self.inner.rest_url.as_str())
            .field("auth_url", &self.inner.auth_url.as_str())
            .finish_non_exhaustive()
    }
}
