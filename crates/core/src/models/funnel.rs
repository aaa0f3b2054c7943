//! Admin-curated marketing pages.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::FunnelId;

/// A marketing/sales page tied to a product listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Funnel {
    pub id: FunnelId,
    pub title: String,
    /// URL identifier, unique per funnel.
    pub slug: String,
    pub description: String,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Fields for a new funnel.
#[derive(Debug, Clone, Serialize)]
pub struct NewFunnel {
    pub title: String,
    pub slug: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

/// Partial funnel update.
#[derive(Debug, Clone, Default, Serialize)]
pub struct FunnelUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}
