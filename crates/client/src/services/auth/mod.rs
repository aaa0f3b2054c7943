//! Authentication service.
//!
//! Keeps the current identity in step with the remote session. The cached
//! identity is loaded at construction so it is available immediately; from
//! then on every session change (sign-in, refresh, sign-out) re-reads the
//! profile row and rewrites both the in-memory identity and the cache.

mod error;

pub use error::{AuthError, AuthResponse};

use std::sync::{Arc, PoisonError, RwLock};

use bread_core::{Email, NewProfile, User, UserRole};
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

use crate::services::ProfileService;
use crate::storage::IdentityStore;
use crate::supabase::{AuthEvent, Session, SupabaseClient};

/// Authentication service.
///
/// Cheaply cloneable; clones share the same identity.
#[derive(Debug, Clone)]
pub struct AuthService {
    inner: Arc<AuthServiceInner>,
}

#[derive(Debug)]
struct AuthServiceInner {
    client: SupabaseClient,
    profiles: ProfileService,
    cache: Arc<dyn IdentityStore>,
    current: RwLock<Option<User>>,
}

impl AuthService {
    /// Create the service, loading any cached identity.
    ///
    /// An unreadable cache is logged and treated as empty.
    #[must_use]
    pub fn new(client: SupabaseClient, cache: Arc<dyn IdentityStore>) -> Self {
        let current = cache.load().unwrap_or_else(|e| {
            warn!(error = %e, "Ignoring unreadable identity cache");
            None
        });

        Self {
            inner: Arc::new(AuthServiceInner {
                profiles: ProfileService::new(client.clone()),
                client,
                cache,
                current: RwLock::new(current),
            }),
        }
    }

    /// Follow session changes until the returned listener is stopped or
    /// dropped.
    ///
    /// Must be called from within a tokio runtime.
    #[must_use]
    pub fn start_listening(&self) -> SessionListener {
        let mut subscription = self.inner.client.on_auth_state_change();
        let service = self.clone();

        let task = tokio::spawn(async move {
            while let Some(event) = subscription.recv().await {
                debug!(?event, "Session changed");
                service.sync_session(event.session()).await;
            }
        });

        SessionListener { task }
    }

    /// Bring the identity in line with `session`.
    ///
    /// With a session, the profile row is fetched by the session's user id.
    /// If it exists it becomes the current identity; if it is missing or the
    /// fetch fails the identity is cleared. Without a session the identity
    /// is always cleared.
    #[instrument(skip_all)]
    pub async fn sync_session(&self, session: Option<&Session>) {
        let Some(session) = session else {
            self.clear_identity();
            return;
        };

        match self.inner.profiles.get_by_id(session.user.id).await {
            Some(user) => self.set_identity(user),
            None => {
                warn!(user_id = %session.user.id, "No profile for session user");
                self.clear_identity();
            }
        }
    }

    /// Sign in with email and password.
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> AuthResponse {
        self.try_login(email, password).await.into()
    }

    /// Create an account and its profile row (role `user`).
    ///
    /// When the account is signed in straight away, `SignedIn` is published
    /// after the profile insert, so the identity is never cleared by a
    /// lookup racing the insert.
    #[instrument(skip(self, password))]
    pub async fn signup(&self, email: &str, password: &str, name: &str) -> AuthResponse {
        self.try_signup(email, password, name).await.into()
    }

    /// Sign out. The local identity is cleared even if the remote call
    /// fails.
    #[instrument(skip(self))]
    pub async fn logout(&self) -> AuthResponse {
        let result = self.inner.client.sign_out().await;
        self.clear_identity();
        result.map_err(AuthError::from).into()
    }

    /// Exchange the refresh token for a fresh session and re-read the
    /// profile.
    #[instrument(skip(self))]
    pub async fn refresh(&self) -> AuthResponse {
        match self.inner.client.refresh_session().await {
            Ok(session) => {
                self.sync_session(Some(&session)).await;
                AuthResponse::ok()
            }
            Err(e) => AuthResponse::failed(&e.into()),
        }
    }

    /// The current identity, if any.
    #[must_use]
    pub fn current_user(&self) -> Option<User> {
        self.inner
            .current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.inner
            .current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Whether the current identity has the admin role.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.inner
            .current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(User::is_admin)
    }

    async fn try_login(&self, email: &str, password: &str) -> Result<(), AuthError> {
        let email = Email::parse(email)?;
        let session = self
            .inner
            .client
            .sign_in_with_password(email.as_str(), password)
            .await?;
        self.sync_session(Some(&session)).await;
        info!(user_id = %session.user.id, "Logged in");
        Ok(())
    }

    async fn try_signup(&self, email: &str, password: &str, name: &str) -> Result<(), AuthError> {
        let email = Email::parse(email)?;
        let (auth_user, session) = self
            .inner
            .client
            .sign_up(email.as_str(), password, name)
            .await?;

        let profile = NewProfile {
            id: auth_user.id,
            email,
            name: name.to_string(),
            role: UserRole::Standard,
        };
        let created = self.inner.profiles.create(&profile).await;

        // The sign-in goes out only now that the profile row can be read
        // back; listeners syncing on it would otherwise find no row.
        if let Some(session) = session {
            if let Ok(user) = &created {
                self.set_identity(user.clone());
            }
            self.inner.client.announce(AuthEvent::SignedIn(session));
        }

        created.map_err(AuthError::Profile)?;
        info!(user_id = %auth_user.id, "Signed up");
        Ok(())
    }

    fn set_identity(&self, user: User) {
        if let Err(e) = self.inner.cache.store(&user) {
            warn!(error = %e, "Failed to write identity cache");
        }
        *self
            .inner
            .current
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(user);
    }

    fn clear_identity(&self) {
        if let Err(e) = self.inner.cache.clear() {
            warn!(error = %e, "Failed to clear identity cache");
        }
        *self
            .inner
            .current
            .write()
            .unwrap_or_else(PoisonError::into_inner) = None;
    }
}

/// Handle to the task following session changes.
///
/// The task is aborted by [`stop`](Self::stop) or when the handle is
/// dropped.
#[derive(Debug)]
pub struct SessionListener {
    task: JoinHandle<()>,
}

impl SessionListener {
    /// Stop following session changes.
    pub fn stop(self) {
        self.task.abort();
    }

    /// Whether the listener is still running.
    #[must_use]
    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }
}

impl Drop for SessionListener {
    fn drop(&mut self) {
        self.task.abort();
    }
}
