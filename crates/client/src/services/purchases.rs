//! Purchases recorded after a successful payment.

use bread_core::{NewPurchase, Purchase, PurchaseId, UserId};
use tracing::instrument;

use crate::error::ServiceError;
use crate::schema::{PurchaseRow, Row};
use crate::supabase::SupabaseClient;

/// Reads and writes the `purchases` table.
///
/// A purchase is immutable once recorded, so there is no `update`.
#[derive(Debug, Clone)]
pub struct PurchaseService {
    client: SupabaseClient,
}

impl PurchaseService {
    #[must_use]
    pub const fn new(client: SupabaseClient) -> Self {
        Self { client }
    }

    #[instrument(skip(self))]
    pub async fn list(&self) -> Vec<Purchase> {
        super::list_rows::<PurchaseRow>(super::newest_first::<PurchaseRow>(&self.client)).await
    }

    #[instrument(skip(self))]
    pub async fn list_for_user(&self, user_id: UserId) -> Vec<Purchase> {
        super::list_rows::<PurchaseRow>(
            super::newest_first::<PurchaseRow>(&self.client).eq("user_id", user_id),
        )
        .await
    }

    #[instrument(skip(self))]
    pub async fn get_by_id(&self, id: PurchaseId) -> Option<Purchase> {
        super::get_row::<PurchaseRow>(self.client.from(PurchaseRow::TABLE).eq("id", id)).await
    }

    /// The purchase created from a payment intent, if it was recorded.
    ///
    /// A retried confirmation can record the same intent twice; the newest
    /// row wins.
    #[instrument(skip(self))]
    pub async fn get_by_payment_intent(&self, payment_intent_id: &str) -> Option<Purchase> {
        super::get_row::<PurchaseRow>(
            super::newest_first::<PurchaseRow>(&self.client)
                .eq("payment_intent_id", payment_intent_id)
                .limit(1),
        )
        .await
    }

    /// Record a purchase for a confirmed payment intent.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError` with the store's message if the insert fails.
    #[instrument(skip(self, purchase), fields(payment_intent_id = %purchase.payment_intent_id))]
    pub async fn create(&self, purchase: &NewPurchase) -> Result<Purchase, ServiceError> {
        super::insert_row::<PurchaseRow>(&self.client, purchase).await
    }

    /// # Errors
    ///
    /// Returns `ServiceError` with the store's message if the delete fails.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: PurchaseId) -> Result<(), ServiceError> {
        Ok(super::delete_row::<PurchaseRow>(&self.client, id).await?)
    }
}
