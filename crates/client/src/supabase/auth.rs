//! Session management against the auth endpoint.
//!
//! Every session change is published on a broadcast channel so that
//! listeners (the identity synchronizer) can mirror it locally.

use bread_core::UserId;
use chrono::{DateTime, Duration, TimeZone, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::{debug, instrument, warn};

use super::{SupabaseClient, SupabaseError};

/// Identity attached to a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: UserId,
    #[serde(default)]
    pub email: Option<String>,
}

/// An authenticated session.
#[derive(Debug, Clone)]
pub struct Session {
    pub access_token: SecretString,
    pub refresh_token: SecretString,
    pub expires_at: DateTime<Utc>,
    pub user: AuthUser,
}

/// A change to the current session.
#[derive(Debug, Clone)]
pub enum AuthEvent {
    SignedIn(Session),
    SignedOut,
    TokenRefreshed(Session),
}

impl AuthEvent {
    /// The session after the change, if any.
    #[must_use]
    pub const fn session(&self) -> Option<&Session> {
        match self {
            Self::SignedIn(session) | Self::TokenRefreshed(session) => Some(session),
            Self::SignedOut => None,
        }
    }
}

/// Receiving end of the session-change feed.
#[derive(Debug)]
pub struct AuthSubscription {
    receiver: broadcast::Receiver<AuthEvent>,
}

impl AuthSubscription {
    /// Wait for the next session change.
    ///
    /// Returns `None` once the client has been dropped. A subscriber that
    /// falls behind skips the missed events and resumes with the newest.
    pub async fn recv(&mut self) -> Option<AuthEvent> {
        loop {
            match self.receiver.recv().await {
                Ok(event) => return Some(event),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "Auth subscriber lagged behind session changes");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}

#[derive(Serialize)]
struct PasswordCredentials<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
struct SignUpRequest<'a> {
    email: &'a str,
    password: &'a str,
    data: SignUpMetadata<'a>,
}

#[derive(Serialize)]
struct SignUpMetadata<'a> {
    name: &'a str,
}

#[derive(Serialize)]
struct RefreshRequest<'a> {
    refresh_token: &'a str,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    expires_at: Option<i64>,
    user: AuthUser,
}

impl TokenResponse {
    fn into_session(self) -> Session {
        let expires_at = self
            .expires_at
            .and_then(|secs| Utc.timestamp_opt(secs, 0).single())
            .unwrap_or_else(|| Utc::now() + Duration::seconds(self.expires_in.unwrap_or(3600)));
        Session {
            access_token: SecretString::from(self.access_token),
            refresh_token: SecretString::from(self.refresh_token),
            expires_at,
            user: self.user,
        }
    }
}

/// Signup answers with a session when email confirmation is off and with
/// the bare user when it is on.
#[derive(Deserialize)]
#[serde(untagged)]
enum SignUpResponse {
    Session(TokenResponse),
    User(AuthUser),
}

impl SupabaseClient {
    /// Subscribe to session changes.
    #[must_use]
    pub fn on_auth_state_change(&self) -> AuthSubscription {
        AuthSubscription {
            receiver: self.inner.events.subscribe(),
        }
    }

    /// The current session, if signed in.
    pub async fn session(&self) -> Option<Session> {
        self.inner.session.read().await.clone()
    }

    /// Sign in with email and password.
    ///
    /// # Errors
    ///
    /// Returns `SupabaseError::Unauthorized` or `SupabaseError::Api` with the
    /// auth endpoint's message when the credentials are rejected.
    #[instrument(skip(self, password))]
    pub async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Session, SupabaseError> {
        let mut url = self.auth_url("token")?;
        url.query_pairs_mut().append_pair("grant_type", "password");

        let response = self
            .http()
            .post(url)
            .bearer_auth(self.inner.anon_key.expose_secret())
            .json(&PasswordCredentials { email, password })
            .send()
            .await?;
        let token: TokenResponse = Self::handle_response(response).await?;
        let session = token.into_session();

        self.install_session(session.clone(), AuthEvent::SignedIn(session.clone()))
            .await;
        debug!(user_id = %session.user.id, "Signed in");
        Ok(session)
    }

    /// Register a new account. The display name is stored as user metadata.
    ///
    /// Returns the new user's identity and, when the project does not require
    /// email confirmation, the session it was signed in with. That session is
    /// installed so follow-up requests run as the new user, but `SignedIn` is
    /// not published. Listeners would otherwise look up a profile row that
    /// has not been written yet; [`AuthService::signup`] publishes it after
    /// the insert.
    ///
    /// [`AuthService::signup`]: crate::services::AuthService::signup
    ///
    /// # Errors
    ///
    /// Returns `SupabaseError` with the auth endpoint's message when the
    /// signup is rejected.
    #[instrument(skip(self, password))]
    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
        name: &str,
    ) -> Result<(AuthUser, Option<Session>), SupabaseError> {
        let url = self.auth_url("signup")?;
        let response = self
            .http()
            .post(url)
            .bearer_auth(self.inner.anon_key.expose_secret())
            .json(&SignUpRequest {
                email,
                password,
                data: SignUpMetadata { name },
            })
            .send()
            .await?;

        match Self::handle_response::<SignUpResponse>(response).await? {
            SignUpResponse::Session(token) => {
                let session = token.into_session();
                *self.inner.session.write().await = Some(session.clone());
                debug!(user_id = %session.user.id, "Signed up, sign-in not yet announced");
                Ok((session.user.clone(), Some(session)))
            }
            SignUpResponse::User(user) => Ok((user, None)),
        }
    }

    /// Exchange the refresh token for a new session.
    ///
    /// # Errors
    ///
    /// Returns `SupabaseError::NoSession` when not signed in, otherwise the
    /// auth endpoint's rejection.
    #[instrument(skip(self))]
    pub async fn refresh_session(&self) -> Result<Session, SupabaseError> {
        let refresh_token = self
            .inner
            .session
            .read()
            .await
            .as_ref()
            .map(|s| s.refresh_token.expose_secret().to_string())
            .ok_or(SupabaseError::NoSession)?;

        let mut url = self.auth_url("token")?;
        url.query_pairs_mut().append_pair("grant_type", "refresh_token");

        let response = self
            .http()
            .post(url)
            .bearer_auth(self.inner.anon_key.expose_secret())
            .json(&RefreshRequest {
                refresh_token: &refresh_token,
            })
            .send()
            .await?;
        let token: TokenResponse = Self::handle_response(response).await?;
        let session = token.into_session();

        self.install_session(session.clone(), AuthEvent::TokenRefreshed(session.clone()))
            .await;
        Ok(session)
    }

    /// Sign out. The local session is dropped even when the remote call
    /// fails, and `SignedOut` is always published.
    ///
    /// # Errors
    ///
    /// Returns the remote failure, except for an already invalid token.
    #[instrument(skip(self))]
    pub async fn sign_out(&self) -> Result<(), SupabaseError> {
        let previous = self.inner.session.write().await.take();

        let result = match previous {
            Some(session) => self.revoke(&session).await,
            None => Ok(()),
        };

        self.announce(AuthEvent::SignedOut);

        match result {
            Err(SupabaseError::Unauthorized(_) | SupabaseError::NotFound(_)) => Ok(()),
            other => other,
        }
    }

    async fn revoke(&self, session: &Session) -> Result<(), SupabaseError> {
        let response = self
            .http()
            .post(self.auth_url("logout")?)
            .bearer_auth(session.access_token.expose_secret())
            .send()
            .await?;
        Self::handle_empty_response(response).await
    }

    /// Publish `event` to every subscriber without touching the session.
    pub(crate) fn announce(&self, event: AuthEvent) {
        // Sending only fails when nobody is subscribed.
        let _ = self.inner.events.send(event);
    }

    async fn install_session(&self, session: Session, event: AuthEvent) {
        *self.inner.session.write().await = Some(session);
        self.announce(event);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_token_response_prefers_absolute_expiry() {
        let token: TokenResponse = serde_json::from_str(
            r#"{
                "access_token": "at",
                "token_type": "bearer",
                "expires_in": 3600,
                "expires_at": 1767225600,
                "refresh_token": "rt",
                "user": {"id": "6f1c2a4e-8d3b-4a57-9e21-3c5d7b9f0a12", "email": "baker@bread.io"}
            }"#,
        )
        .unwrap();
        let session = token.into_session();
        assert_eq!(session.expires_at.timestamp(), 1_767_225_600);
        assert_eq!(session.user.email.as_deref(), Some("baker@bread.io"));
        assert_eq!(session.access_token.expose_secret(), "at");
    }

    #[test]
    fn test_token_response_relative_expiry() {
        let token: TokenResponse = serde_json::from_str(
            r#"{"access_token":"at","refresh_token":"rt","expires_in":60,
                "user":{"id":"6f1c2a4e-8d3b-4a57-9e21-3c5d7b9f0a12"}}"#,
        )
        .unwrap();
        let before = Utc::now();
        let session = token.into_session();
        assert!(session.expires_at >= before + Duration::seconds(60));
        assert!(session.expires_at <= Utc::now() + Duration::seconds(60));
    }

    #[test]
    fn test_signup_response_without_session() {
        let parsed: SignUpResponse = serde_json::from_str(
            r#"{"id":"6f1c2a4e-8d3b-4a57-9e21-3c5d7b9f0a12","email":"new@bread.io",
                "confirmation_sent_at":"2026-01-01T00:00:00Z"}"#,
        )
        .unwrap();
        assert!(matches!(parsed, SignUpResponse::User(_)));
    }

    #[test]
    fn test_event_session_accessor() {
        assert!(AuthEvent::SignedOut.session().is_none());
    }

    #[tokio::test]
    async fn test_announce_reaches_subscribers_without_a_session() {
        let config = crate::config::ClientConfig::new(
            url::Url::parse("http://127.0.0.1:9").unwrap(),
            SecretString::from("anon-test-key"),
        )
        .unwrap();
        let client = SupabaseClient::new(&config).unwrap();
        let mut events = client.on_auth_state_change();

        client.announce(AuthEvent::SignedOut);

        assert!(matches!(events.recv().await, Some(AuthEvent::SignedOut)));
        assert!(client.session().await.is_none());
    }
}
