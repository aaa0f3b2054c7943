use bread_core::{Funnel, FunnelId};
use serde::Deserialize;

use super::{Row, SchemaError, parse_timestamp};

/// Row of the `funnels` table.
#[derive(Debug, Clone, Deserialize)]
pub struct FunnelRow {
    pub id: FunnelId,
    pub title: String,
    pub slug: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    pub created_at: String,
}

impl Row for FunnelRow {
    type Entity = Funnel;
    const TABLE: &'static str = "funnels";

    fn into_entity(self) -> Result<Funnel, SchemaError> {
        Ok(Funnel {
            id: self.id,
            title: self.title,
            slug: self.slug,
            description: self.description.unwrap_or_default(),
            image_url: self.image_url,
            created_at: parse_timestamp("created_at", &self.created_at)?,
        })
    }
}
