use bread_core::{AuctionId, Purchase, PurchaseId, UserId};
use rust_decimal::Decimal;
use serde::Deserialize;

use super::{Row, SchemaError, parse_timestamp};

/// Row of the `purchases` table.
#[derive(Debug, Clone, Deserialize)]
pub struct PurchaseRow {
    pub id: PurchaseId,
    pub auction_id: AuctionId,
    pub user_id: UserId,
    pub payment_intent_id: String,
    pub amount: Decimal,
    pub currency: String,
    pub created_at: String,
}

impl Row for PurchaseRow {
    type Entity = Purchase;
    const TABLE: &'static str = "purchases";

    fn into_entity(self) -> Result<Purchase, SchemaError> {
        Ok(Purchase {
            id: self.id,
            auction_id: self.auction_id,
            user_id: self.user_id,
            payment_intent_id: self.payment_intent_id,
            amount: self.amount,
            currency: self.currency.parse()?,
            created_at: parse_timestamp("created_at", &self.created_at)?,
        })
    }
}
