//! Auction listings.

use bread_core::{Auction, AuctionId, AuctionStatus, AuctionUpdate, NewAuction};
use tracing::instrument;

use crate::error::ServiceError;
use crate::schema::{AuctionRow, Row};
use crate::supabase::{Direction, SupabaseClient};

/// Reads and writes the `auctions` table.
#[derive(Debug, Clone)]
pub struct AuctionService {
    client: SupabaseClient,
}

impl AuctionService {
    #[must_use]
    pub const fn new(client: SupabaseClient) -> Self {
        Self { client }
    }

    #[instrument(skip(self))]
    pub async fn list(&self) -> Vec<Auction> {
        super::list_rows::<AuctionRow>(super::newest_first::<AuctionRow>(&self.client)).await
    }

    #[instrument(skip(self))]
    pub async fn list_by_category(&self, category: &str) -> Vec<Auction> {
        super::list_rows::<AuctionRow>(
            super::newest_first::<AuctionRow>(&self.client).eq("category", category),
        )
        .await
    }

    /// Active auctions, closing soonest first.
    #[instrument(skip(self))]
    pub async fn list_active(&self) -> Vec<Auction> {
        super::list_rows::<AuctionRow>(
            self.client
                .from(AuctionRow::TABLE)
                .eq("status", AuctionStatus::Active)
                .order("ends_at", Direction::Asc),
        )
        .await
    }

    #[instrument(skip(self))]
    pub async fn get_by_id(&self, id: AuctionId) -> Option<Auction> {
        super::get_row::<AuctionRow>(self.client.from(AuctionRow::TABLE).eq("id", id)).await
    }

    /// # Errors
    ///
    /// Returns `ServiceError` with the store's message if the insert fails.
    #[instrument(skip(self, auction))]
    pub async fn create(&self, auction: &NewAuction) -> Result<Auction, ServiceError> {
        super::insert_row::<AuctionRow>(&self.client, auction).await
    }

    /// # Errors
    ///
    /// Returns `ServiceError` with the store's message if the update fails.
    #[instrument(skip(self, changes))]
    pub async fn update(
        &self,
        id: AuctionId,
        changes: &AuctionUpdate,
    ) -> Result<Auction, ServiceError> {
        super::update_row::<AuctionRow>(&self.client, id, changes).await
    }

    /// # Errors
    ///
    /// Returns `ServiceError` with the store's message if the delete fails.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: AuctionId) -> Result<(), ServiceError> {
        Ok(super::delete_row::<AuctionRow>(&self.client, id).await?)
    }
}
