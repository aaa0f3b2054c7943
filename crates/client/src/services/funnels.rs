use bread_core::{Funnel, FunnelId, FunnelUpdate, NewFunnel};
use tracing::instrument;

use crate::error::ServiceError;
use crate::schema::{FunnelRow, Row};
use crate::supabase::SupabaseClient;

/// Reads and writes the `funnels` table. Writes are admin-only at the store.
#[derive(Debug, Clone)]
pub struct FunnelService {
    client: SupabaseClient,
}

impl FunnelService {
    #[must_use]
    pub const fn new(client: SupabaseClient) -> Self {
        Self { client }
    }

    #[instrument(skip(self))]
    pub async fn list(&self) -> Vec<Funnel> {
        super::list_rows::<FunnelRow>(super::newest_first::<FunnelRow>(&self.client)).await
    }

    #[instrument(skip(self))]
    pub async fn get_by_id(&self, id: FunnelId) -> Option<Funnel> {
        super::get_row::<FunnelRow>(self.client.from(FunnelRow::TABLE).eq("id", id)).await
    }

    /// Look up the funnel a public page is served from.
    #[instrument(skip(self))]
    pub async fn get_by_slug(&self, slug: &str) -> Option<Funnel> {
        super::get_row::<FunnelRow>(self.client.from(FunnelRow::TABLE).eq("slug", slug)).await
    }

    /// # Errors
    ///
    /// Returns `ServiceError` with the store's message if the insert fails.
    #[instrument(skip(self, funnel))]
    pub async fn create(&self, funnel: &NewFunnel) -> Result<Funnel, ServiceError> {
        super::insert_row::<FunnelRow>(&self.client, funnel).await
    }

    /// # Errors
    ///
    /// Returns `ServiceError` with the store's message if the update fails.
    #[instrument(skip(self, changes))]
    pub async fn update(&self, id: FunnelId, changes: &FunnelUpdate) -> Result<Funnel, ServiceError> {
        super::update_row::<FunnelRow>(&self.client, id, changes).await
    }

    /// # Errors
    ///
    /// Returns `ServiceError` with the store's message if the delete fails.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: FunnelId) -> Result<(), ServiceError> {
        Ok(super::delete_row::<FunnelRow>(&self.client, id).await?)
    }
}
