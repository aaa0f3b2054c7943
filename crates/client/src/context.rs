//! Application context built once at startup.

use std::sync::{Arc, Mutex, PoisonError};

use crate::config::{ClientConfig, ConfigError};
use crate::services::{
    AuctionService, AuthService, BookingService, FunnelService, LeadService, PaymentService,
    ProfileService, PurchaseService, SessionListener,
};
use crate::storage::{FileIdentityStore, IdentityStore};
use crate::supabase::{SupabaseClient, SupabaseError};

/// Error creating the application context.
#[derive(Debug, thiserror::Error)]
pub enum ContextError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("client error: {0}")]
    Client(#[from] SupabaseError),
}

/// Everything a front end needs: configuration, the remote client, the
/// services and the current identity.
///
/// This struct is cheaply cloneable via `Arc`. Session tracking runs between
/// [`start`](Self::start) and [`shutdown`](Self::shutdown).
#[derive(Clone)]
pub struct AppContext {
    inner: Arc<AppContextInner>,
}

struct AppContextInner {
    config: ClientConfig,
    client: SupabaseClient,
    auth: AuthService,
    leads: LeadService,
    bookings: BookingService,
    funnels: FunnelService,
    auctions: AuctionService,
    profiles: ProfileService,
    purchases: PurchaseService,
    payments: PaymentService,
    listener: Mutex<Option<SessionListener>>,
}

impl AppContext {
    /// Build the context from environment configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration is missing or invalid, or the HTTP
    /// clients cannot be built.
    pub fn from_env() -> Result<Self, ContextError> {
        Self::new(ClientConfig::from_env()?)
    }

    /// Build the context, caching the identity in the configured file.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP clients cannot be built.
    pub fn new(config: ClientConfig) -> Result<Self, ContextError> {
        let store = Arc::new(FileIdentityStore::new(config.identity_cache_path.clone()));
        Self::with_identity_store(config, store)
    }

    /// Build the context with a specific identity cache.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP clients cannot be built.
    pub fn with_identity_store(
        config: ClientConfig,
        identity_store: Arc<dyn IdentityStore>,
    ) -> Result<Self, ContextError> {
        let client = SupabaseClient::new(&config)?;
        let payments = PaymentService::new(&config)?;

        Ok(Self {
            inner: Arc::new(AppContextInner {
                auth: AuthService::new(client.clone(), identity_store),
                leads: LeadService::new(client.clone()),
                bookings: BookingService::new(client.clone()),
                funnels: FunnelService::new(client.clone()),
                auctions: AuctionService::new(client.clone()),
                profiles: ProfileService::new(client.clone()),
                purchases: PurchaseService::new(client.clone()),
                payments,
                client,
                config,
                listener: Mutex::new(None),
            }),
        })
    }

    /// Start following session changes. Calling it again is a no-op.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(&self) {
        let mut listener = self
            .inner
            .listener
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if listener.is_none() {
            *listener = Some(self.inner.auth.start_listening());
        }
    }

    /// Stop following session changes.
    pub fn shutdown(&self) {
        let listener = self
            .inner
            .listener
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(listener) = listener {
            listener.stop();
        }
    }

    /// Whether session changes are being followed.
    #[must_use]
    pub fn is_started(&self) -> bool {
        self.inner
            .listener
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(SessionListener::is_running)
    }

    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    /// The remote client, for calls no service covers.
    #[must_use]
    pub fn client(&self) -> &SupabaseClient {
        &self.inner.client
    }

    #[must_use]
    pub fn auth(&self) -> &AuthService {
        &self.inner.auth
    }

    #[must_use]
    pub fn leads(&self) -> &LeadService {
        &self.inner.leads
    }

    #[must_use]
    pub fn bookings(&self) -> &BookingService {
        &self.inner.bookings
    }

    #[must_use]
    pub fn funnels(&self) -> &FunnelService {
        &self.inner.funnels
    }

    #[must_use]
    pub fn auctions(&self) -> &AuctionService {
        &self.inner.auctions
    }

    #[must_use]
    pub fn profiles(&self) -> &ProfileService {
        &self.inner.profiles
    }

    #[must_use]
    pub fn purchases(&self) -> &PurchaseService {
        &self.inner.purchases
    }

    #[must_use]
    pub fn payments(&self) -> &PaymentService {
        &self.inner.payments
    }
}

impl std::fmt::Debug for AppContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppContext")
            .field("config", &self.inner.config)
            .field("started", &self.is_started())
            .finish_non_exhaustive()
    }
}
