use bread_core::{Auction, AuctionId, AuctionStatus, CurrencyCode};
use rust_decimal::Decimal;
use serde::Deserialize;

use super::{Row, SchemaError, parse_timestamp};

/// Row of the `auctions` table.
#[derive(Debug, Clone, Deserialize)]
pub struct AuctionRow {
    pub id: AuctionId,
    pub title: String,
    pub category: String,
    #[serde(default)]
    pub description: Option<String>,
    pub starting_price: Decimal,
    /// Null until the first bid lands.
    #[serde(default)]
    pub current_bid: Option<Decimal>,
    #[serde(default)]
    pub buy_now_price: Option<Decimal>,
    #[serde(default)]
    pub currency: Option<String>,
    pub ends_at: String,
    #[serde(default)]
    pub status: Option<String>,
    pub created_at: String,
}

impl Row for AuctionRow {
    type Entity = Auction;
    const TABLE: &'static str = "auctions";

    fn into_entity(self) -> Result<Auction, SchemaError> {
        let currency = match self.currency.as_deref() {
            Some(code) => code.parse()?,
            None => CurrencyCode::default(),
        };
        Ok(Auction {
            id: self.id,
            title: self.title,
            category: self.category,
            description: self.description,
            starting_price: self.starting_price,
            current_bid: self.current_bid.unwrap_or(self.starting_price),
            buy_now_price: self.buy_now_price,
            currency,
            ends_at: parse_timestamp("ends_at", &self.ends_at)?,
            status: self
                .status
                .as_deref()
                .map(str::parse::<AuctionStatus>)
                .transpose()?
                .unwrap_or_default(),
            created_at: parse_timestamp("created_at", &self.created_at)?,
        })
    }
}
