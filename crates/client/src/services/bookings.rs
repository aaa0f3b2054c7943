//! Strategy call bookings.

use bread_core::{BookingId, BookingUpdate, NewBooking, StrategyCallBooking, UserId};
use tracing::instrument;

use crate::error::ServiceError;
use crate::schema::{BookingRow, Row};
use crate::supabase::SupabaseClient;

/// Reads and writes the `strategy_call_bookings` table.
#[derive(Debug, Clone)]
pub struct BookingService {
    client: SupabaseClient,
}

impl BookingService {
    #[must_use]
    pub const fn new(client: SupabaseClient) -> Self {
        Self { client }
    }

    /// Every booking, newest first (admin view).
    #[instrument(skip(self))]
    pub async fn list(&self) -> Vec<StrategyCallBooking> {
        super::list_rows::<BookingRow>(super::newest_first::<BookingRow>(&self.client)).await
    }

    /// Bookings made by one user, newest first.
    #[instrument(skip(self))]
    pub async fn list_for_user(&self, user_id: UserId) -> Vec<StrategyCallBooking> {
        super::list_rows::<BookingRow>(
            super::newest_first::<BookingRow>(&self.client).eq("user_id", user_id),
        )
        .await
    }

    #[instrument(skip(self))]
    pub async fn get_by_id(&self, id: BookingId) -> Option<StrategyCallBooking> {
        super::get_row::<BookingRow>(self.client.from(BookingRow::TABLE).eq("id", id)).await
    }

    /// Request a call.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError` with the store's message if the insert fails.
    #[instrument(skip(self, booking))]
    pub async fn create(&self, booking: &NewBooking) -> Result<StrategyCallBooking, ServiceError> {
        super::insert_row::<BookingRow>(&self.client, booking).await
    }

    /// Reschedule, annotate or change the status of a booking.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError` with the store's message if the update fails.
    #[instrument(skip(self, changes))]
    pub async fn update(
        &self,
        id: BookingId,
        changes: &BookingUpdate,
    ) -> Result<StrategyCallBooking, ServiceError> {
        super::update_row::<BookingRow>(&self.client, id, changes).await
    }

    /// # Errors
    ///
    /// Returns `ServiceError` with the store's message if the delete fails.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: BookingId) -> Result<(), ServiceError> {
        Ok(super::delete_row::<BookingRow>(&self.client, id).await?)
    }
}
