use bread_core::{Email, Lead, LeadId};
use serde::Deserialize;

use super::{Row, SchemaError, parse_timestamp};

/// Row of the `leads` table.
#[derive(Debug, Clone, Deserialize)]
pub struct LeadRow {
    pub id: LeadId,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl Row for LeadRow {
    type Entity = Lead;
    const TABLE: &'static str = "leads";

    fn into_entity(self) -> Result<Lead, SchemaError> {
        Ok(Lead {
            id: self.id,
            email: Email::from_stored(self.email),
            phone: self.phone,
            username: self.username,
            created_at: parse_timestamp("created_at", &self.created_at)?,
            updated_at: parse_timestamp("updated_at", &self.updated_at)?,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_lead_row_timestamps_become_dates() {
        let row: LeadRow = serde_json::from_str(
            r#"{
                "id": "0b6c1f7e-2d4a-4c8e-9a3f-5e7d1c2b4a60",
                "email": "crumb@bread.io",
                "phone": null,
                "username": "crumb",
                "created_at": "2026-02-10T08:00:00.000000+00:00",
                "updated_at": "2026-02-11T08:00:00.000000+00:00"
            }"#,
        )
        .unwrap();
        let lead = row.into_entity().unwrap();
        assert_eq!(lead.created_at.to_rfc3339(), "2026-02-10T08:00:00+00:00");
        assert!(lead.updated_at > lead.created_at);
        assert_eq!(lead.username.as_deref(), Some("crumb"));
        assert!(lead.phone.is_none());
    }

    #[test]
    fn test_lead_row_missing_optionals() {
        let row: LeadRow = serde_json::from_str(
            r#"{"id":"0b6c1f7e-2d4a-4c8e-9a3f-5e7d1c2b4a60","email":"crumb@bread.io",
                "created_at":"2026-02-10T08:00:00Z","updated_at":"2026-02-10T08:00:00Z"}"#,
        )
        .unwrap();
        assert!(row.into_entity().is_ok());
    }

    #[test]
    fn test_lead_row_keeps_free_text_email() {
        let row: LeadRow = serde_json::from_str(
            r#"{"id":"0b6c1f7e-2d4a-4c8e-9a3f-5e7d1c2b4a60","email":"Walk-in Customer",
                "created_at":"2026-02-10T08:00:00Z","updated_at":"2026-02-10T08:00:00Z"}"#,
        )
        .unwrap();
        assert_eq!(row.into_entity().unwrap().email.as_str(), "Walk-in Customer");
    }
}
