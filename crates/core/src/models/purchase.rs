//! Completed purchases.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{AuctionId, CurrencyCode, PurchaseId, UserId};

/// A purchase recorded after the payment processor confirmed a charge.
///
/// The payment intent id is the processor's reference; it is unique per
/// purchase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Purchase {
    pub id: PurchaseId,
    pub auction_id: AuctionId,
    pub user_id: UserId,
    pub payment_intent_id: String,
    pub amount: Decimal,
    pub currency: CurrencyCode,
    pub created_at: DateTime<Utc>,
}

/// Fields recorded for a new purchase.
#[derive(Debug, Clone, Serialize)]
pub struct NewPurchase {
    pub auction_id: AuctionId,
    pub user_id: UserId,
    pub payment_intent_id: String,
    pub amount: Decimal,
    pub currency: CurrencyCode,
}
