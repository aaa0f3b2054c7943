//! Integration tests for Bread Made Easy.
//!
//! Every test runs the real client against an `httpmock` server standing in
//! for the remote project, so no credentials or network are needed.
//!
//! ```bash
//! cargo test -p bread-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `resources` - resource service read and write policies
//! - `auth_sync` - identity kept in step with the session
//! - `payments` - payment function envelopes

#![allow(clippy::missing_panics_doc, clippy::unwrap_used)]

use std::sync::Arc;

use bread_client::storage::{IdentityStore, MemoryIdentityStore};
use bread_client::{AppContext, ClientConfig};
use httpmock::MockServer;
use secrecy::SecretString;
use serde_json::{Value, json};
use url::Url;

/// Anon key the mock server expects in `apikey`.
pub const ANON_KEY: &str = "test-anon-key";

/// Client configuration pointing at `server`.
#[must_use]
pub fn config_for(server: &MockServer) -> ClientConfig {
    let base = Url::parse(&server.base_url()).unwrap();
    ClientConfig::new(base, SecretString::from(ANON_KEY)).unwrap()
}

/// A started context backed by an in-memory identity cache.
#[must_use]
pub fn context_for(server: &MockServer) -> (AppContext, Arc<MemoryIdentityStore>) {
    let store = Arc::new(MemoryIdentityStore::default());
    let ctx = AppContext::with_identity_store(
        config_for(server),
        Arc::clone(&store) as Arc<dyn IdentityStore>,
    )
    .unwrap();
    ctx.start();
    (ctx, store)
}

/// A `profiles` row as the store returns it.
#[must_use]
pub fn profile_json(id: &str, email: &str, role: &str) -> Value {
    json!({
        "id": id,
        "email": email,
        "name": "Test Baker",
        "role": role,
        "created_at": "2026-03-01T09:00:00+00:00",
        "updated_at": "2026-03-01T09:00:00+00:00"
    })
}

/// A token grant for `user_id`.
#[must_use]
pub fn token_json(user_id: &str, email: &str) -> Value {
    json!({
        "access_token": "access-token",
        "refresh_token": "refresh-token",
        "token_type": "bearer",
        "expires_in": 3600,
        "user": { "id": user_id, "email": email }
    })
}

/// Poll `check` until it holds or a second has passed.
pub async fn eventually(mut check: impl FnMut() -> bool) -> bool {
    for _ in 0..100 {
        if check() {
            return true;
        }
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    }
    check()
}
