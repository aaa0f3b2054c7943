//! Resource services.
//!
//! Every service follows the same two policies:
//!
//! - Reads (`list*`, `get_*`) never fail. A remote or schema failure is
//!   logged and the caller gets an empty vector or `None`.
//! - Writes (`create`, `update`, `delete`) return the failure, carrying the
//!   remote store's message, so the caller can show it.

pub mod auctions;
pub mod auth;
pub mod bookings;
pub mod funnels;
pub mod leads;
pub mod payments;
pub mod profiles;
pub mod purchases;

pub use auctions::AuctionService;
pub use auth::{AuthError, AuthResponse, AuthService, SessionListener};
pub use bookings::BookingService;
pub use funnels::FunnelService;
pub use leads::LeadService;
pub use payments::PaymentService;
pub use profiles::ProfileService;
pub use purchases::PurchaseService;

use std::fmt::Display;

use serde::Serialize;
use tracing::error;

use crate::error::ServiceError;
use crate::schema::Row;
use crate::supabase::{Direction, Query, SupabaseClient, SupabaseError};

/// Newest rows first, the order every list view uses.
fn newest_first<R: Row>(client: &SupabaseClient) -> Query {
    client.from(R::TABLE).order("created_at", Direction::Desc)
}

/// Convert a row, logging and dropping it if it does not parse.
fn convert_or_log<R: Row>(row: R) -> Option<R::Entity> {
    row.into_entity()
        .map_err(|e| error!(table = R::TABLE, error = %e, "Skipping unreadable row"))
        .ok()
}

async fn list_rows<R: Row>(query: Query) -> Vec<R::Entity> {
    match query.execute::<R>().await {
        Ok(rows) => rows.into_iter().filter_map(convert_or_log).collect(),
        Err(e) => {
            error!(table = R::TABLE, error = %e, "Failed to list rows");
            Vec::new()
        }
    }
}

async fn get_row<R: Row>(query: Query) -> Option<R::Entity> {
    match query.single::<R>().await {
        Ok(row) => convert_or_log(row),
        Err(e) => {
            error!(table = R::TABLE, error = %e, "Failed to fetch row");
            None
        }
    }
}

async fn insert_row<R: Row>(
    client: &SupabaseClient,
    body: &(impl Serialize + Sync),
) -> Result<R::Entity, ServiceError> {
    let row: R = client.from(R::TABLE).insert(body).await?;
    Ok(row.into_entity()?)
}

async fn update_row<R: Row>(
    client: &SupabaseClient,
    id: impl Display,
    body: &(impl Serialize + Sync),
) -> Result<R::Entity, ServiceError> {
    let row: R = client.from(R::TABLE).eq("id", id).update(body).await?;
    Ok(row.into_entity()?)
}

async fn delete_row<R: Row>(client: &SupabaseClient, id: impl Display) -> Result<(), SupabaseError> {
    client.from(R::TABLE).eq("id", id).delete().await
}
