use bread_core::{NewProfile, ProfileUpdate, User, UserId};
use tracing::instrument;

use crate::error::ServiceError;
use crate::schema::{ProfileRow, Row};
use crate::supabase::SupabaseClient;

/// Reads and writes the `profiles` table. Profiles are never deleted.
#[derive(Debug, Clone)]
pub struct ProfileService {
    client: SupabaseClient,
}

impl ProfileService {
    #[must_use]
    pub const fn new(client: SupabaseClient) -> Self {
        Self { client }
    }

    #[instrument(skip(self))]
    pub async fn list(&self) -> Vec<User> {
        super::list_rows::<ProfileRow>(super::newest_first::<ProfileRow>(&self.client)).await
    }

    /// The profile keyed by an auth user id.
    #[instrument(skip(self))]
    pub async fn get_by_id(&self, id: UserId) -> Option<User> {
        super::get_row::<ProfileRow>(self.client.from(ProfileRow::TABLE).eq("id", id)).await
    }

    /// # Errors
    ///
    /// Returns `ServiceError` with the store's message if the insert fails.
    #[instrument(skip(self, profile), fields(user_id = %profile.id))]
    pub async fn create(&self, profile: &NewProfile) -> Result<User, ServiceError> {
        super::insert_row::<ProfileRow>(&self.client, profile).await
    }

    /// # Errors
    ///
    /// Returns `ServiceError` with the store's message if the update fails.
    #[instrument(skip(self, changes))]
    pub async fn update(&self, id: UserId, changes: &ProfileUpdate) -> Result<User, ServiceError> {
        super::update_row::<ProfileRow>(&self.client, id, changes).await
    }
}
