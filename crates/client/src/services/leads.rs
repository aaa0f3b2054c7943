//! Lead capture and the admin leads dashboard.

use bread_core::{Lead, LeadId, LeadUpdate, NewLead};
use tracing::instrument;

use crate::error::ServiceError;
use crate::schema::{LeadRow, Row};
use crate::supabase::{SupabaseClient, SupabaseError};

/// Reads and writes the `leads` table.
#[derive(Debug, Clone)]
pub struct LeadService {
    client: SupabaseClient,
}

impl LeadService {
    #[must_use]
    pub const fn new(client: SupabaseClient) -> Self {
        Self { client }
    }

    /// All leads, newest first. Empty on failure.
    #[instrument(skip(self))]
    pub async fn list(&self) -> Vec<Lead> {
        super::list_rows::<LeadRow>(super::newest_first::<LeadRow>(&self.client)).await
    }

    /// One lead, or `None` if missing or the fetch failed.
    #[instrument(skip(self))]
    pub async fn get_by_id(&self, id: LeadId) -> Option<Lead> {
        super::get_row::<LeadRow>(self.client.from(LeadRow::TABLE).eq("id", id)).await
    }

    /// Capture a lead.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError` with the store's message if the insert fails
    /// (for example a duplicate email).
    #[instrument(skip(self, lead))]
    pub async fn create(&self, lead: &NewLead) -> Result<Lead, ServiceError> {
        super::insert_row::<LeadRow>(&self.client, lead).await
    }

    /// Apply a partial update.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError` with the store's message if the update fails.
    #[instrument(skip(self, changes))]
    pub async fn update(&self, id: LeadId, changes: &LeadUpdate) -> Result<Lead, ServiceError> {
        super::update_row::<LeadRow>(&self.client, id, changes).await
    }

    /// Delete a lead.
    ///
    /// # Errors
    ///
    /// Returns the store's error unchanged.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: LeadId) -> Result<(), SupabaseError> {
        super::delete_row::<LeadRow>(&self.client, id).await
    }
}
