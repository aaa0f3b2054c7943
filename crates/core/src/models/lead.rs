//! Captured prospective-customer contacts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Email, LeadId};

/// A lead captured by one of the public forms.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lead {
    pub id: LeadId,
    pub email: Email,
    pub phone: Option<String>,
    pub username: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields submitted by a lead-capture form.
#[derive(Debug, Clone, Serialize)]
pub struct NewLead {
    pub email: Email,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

impl NewLead {
    /// A lead with only an email address.
    #[must_use]
    pub const fn with_email(email: Email) -> Self {
        Self {
            email,
            phone: None,
            username: None,
        }
    }
}

/// Partial lead update from the admin dashboard.
#[derive(Debug, Clone, Default, Serialize)]
pub struct LeadUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<Email>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

impl LeadUpdate {
    /// True when the update would not change anything.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.email.is_none() && self.phone.is_none() && self.username.is_none()
    }
}
