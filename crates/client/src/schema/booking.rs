use bread_core::{BookingId, BookingStatus, Email, StrategyCallBooking, UserId};
use serde::Deserialize;

use super::{Row, SchemaError, parse_date, parse_timestamp};

/// Row of the `strategy_call_bookings` table.
#[derive(Debug, Clone, Deserialize)]
pub struct BookingRow {
    pub id: BookingId,
    #[serde(default)]
    pub user_id: Option<UserId>,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    pub preferred_date: String,
    pub time_slot: String,
    pub timezone: String,
    #[serde(default)]
    pub notes: Option<String>,
    /// Older rows predate the status column.
    #[serde(default)]
    pub status: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl Row for BookingRow {
    type Entity = StrategyCallBooking;
    const TABLE: &'static str = "strategy_call_bookings";

    fn into_entity(self) -> Result<StrategyCallBooking, SchemaError> {
        Ok(StrategyCallBooking {
            id: self.id,
            user_id: self.user_id,
            name: self.name,
            email: Email::from_stored(self.email),
            phone: self.phone,
            company: self.company,
            preferred_date: parse_date("preferred_date", &self.preferred_date)?,
            time_slot: self.time_slot,
            timezone: self.timezone,
            notes: self.notes,
            status: self
                .status
                .as_deref()
                .map(str::parse::<BookingStatus>)
                .transpose()?
                .unwrap_or_default(),
            created_at: parse_timestamp("created_at", &self.created_at)?,
            updated_at: parse_timestamp("updated_at", &self.updated_at)?,
        })
    }
}
