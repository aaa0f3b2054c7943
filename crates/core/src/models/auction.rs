//! Auctions and their bidding state.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{AuctionId, AuctionStatus, CurrencyCode, Price};

/// An auction listing as consumed by checkout and the countdown view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Auction {
    pub id: AuctionId,
    pub title: String,
    pub category: String,
    pub description: Option<String>,
    pub starting_price: Decimal,
    pub current_bid: Decimal,
    pub buy_now_price: Option<Decimal>,
    pub currency: CurrencyCode,
    pub ends_at: DateTime<Utc>,
    pub status: AuctionStatus,
    pub created_at: DateTime<Utc>,
}

impl Auction {
    /// Whether bids are still accepted at `now`.
    #[must_use]
    pub fn is_open_at(&self, now: DateTime<Utc>) -> bool {
        self.status == AuctionStatus::Active && self.ends_at > now
    }

    /// The amount a buyer pays right now: the buy-now price when set,
    /// otherwise the current bid.
    #[must_use]
    pub fn checkout_price(&self) -> Price {
        Price::new(
            self.buy_now_price.unwrap_or(self.current_bid),
            self.currency,
        )
    }
}

/// Fields for a new auction.
#[derive(Debug, Clone, Serialize)]
pub struct NewAuction {
    pub title: String,
    pub category: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub starting_price: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub buy_now_price: Option<Decimal>,
    pub currency: CurrencyCode,
    pub ends_at: DateTime<Utc>,
    pub status: AuctionStatus,
}

/// Partial auction update.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AuctionUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_bid: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub buy_now_price: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ends_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<AuctionStatus>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Duration;

    use super::*;

    fn auction(status: AuctionStatus, ends_in: Duration) -> Auction {
        let now = Utc::now();
        Auction {
            id: "6f1c2a4e-8d3b-4a57-9e21-3c5d7b9f0a12".parse().unwrap(),
            title: "Heritage sourdough starter".to_owned(),
            category: "starters".to_owned(),
            description: None,
            starting_price: Decimal::new(10, 0),
            current_bid: Decimal::new(2750, 2),
            buy_now_price: None,
            currency: CurrencyCode::USD,
            ends_at: now + ends_in,
            status,
            created_at: now,
        }
    }

    #[test]
    fn test_is_open_at() {
        let now = Utc::now();
        assert!(auction(AuctionStatus::Active, Duration::hours(1)).is_open_at(now));
        assert!(!auction(AuctionStatus::Active, Duration::hours(-1)).is_open_at(now));
        assert!(!auction(AuctionStatus::Ended, Duration::hours(1)).is_open_at(now));
    }

    #[test]
    fn test_checkout_price_prefers_buy_now() {
        let mut listing = auction(AuctionStatus::Active, Duration::hours(1));
        assert_eq!(listing.checkout_price().minor_units(), Some(2750));

        listing.buy_now_price = Some(Decimal::new(40, 0));
        assert_eq!(listing.checkout_price().minor_units(), Some(4000));
    }
}
