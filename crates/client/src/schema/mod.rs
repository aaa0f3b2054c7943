//! Row shapes as returned by the remote store.
//!
//! The store hands back timestamps as ISO-8601 strings and enums as plain
//! text. Each `*Row` struct mirrors one table exactly and converts into the
//! matching `bread_core` type, parsing every timestamp on the way. Nothing
//! leaves the client crate with a string where a date belongs.

mod auction;
mod booking;
mod funnel;
mod lead;
mod profile;
mod purchase;

pub use auction::AuctionRow;
pub use booking::BookingRow;
pub use funnel::FunnelRow;
pub use lead::LeadRow;
pub use profile::ProfileRow;
pub use purchase::PurchaseRow;

use bread_core::UnknownVariant;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::de::DeserializeOwned;
use thiserror::Error;

/// A row that failed to convert into its domain type.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("invalid timestamp in {field}: {value}")]
    InvalidTimestamp { field: &'static str, value: String },

    #[error("invalid date in {field}: {value}")]
    InvalidDate { field: &'static str, value: String },

    #[error(transparent)]
    UnknownVariant(#[from] UnknownVariant),
}

/// A table row that converts into a domain entity.
pub trait Row: DeserializeOwned {
    /// The domain type this row becomes.
    type Entity;

    /// Table the row is read from.
    const TABLE: &'static str;

    /// Convert into the domain type.
    ///
    /// # Errors
    ///
    /// Returns `SchemaError` if a timestamp, date or enum value does not
    /// parse.
    fn into_entity(self) -> Result<Self::Entity, SchemaError>;
}

/// Parse a timestamp column.
///
/// Accepts RFC 3339 (what `timestamptz` columns return) and falls back to a
/// zone-less form (`timestamp` columns), which is read as UTC.
pub(crate) fn parse_timestamp(field: &'static str, value: &str) -> Result<DateTime<Utc>, SchemaError> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Ok(parsed.with_timezone(&Utc));
    }

    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .map(|naive| naive.and_utc())
        .ok_or_else(|| SchemaError::InvalidTimestamp {
            field,
            value: value.to_string(),
        })
}

/// Parse a `date` column (`YYYY-MM-DD`).
pub(crate) fn parse_date(field: &'static str, value: &str) -> Result<NaiveDate, SchemaError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| SchemaError::InvalidDate {
        field,
        value: value.to_string(),
    })
}
