//! Authenticated user identity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Email, UserId, UserRole};

/// The normalized identity of the signed-in user.
///
/// Built from the auth session plus the matching `profiles` row. This is
/// also the value persisted to the local identity cache, so it round-trips
/// through serde.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Same identifier as the auth provider's user id.
    pub id: UserId,
    pub email: Email,
    /// Display name.
    pub name: String,
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Whether this user may use the admin dashboards.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}

/// Profile row written right after a successful signup.
#[derive(Debug, Clone, Serialize)]
pub struct NewProfile {
    pub id: UserId,
    pub email: Email,
    pub name: String,
    pub role: UserRole,
}

/// Partial profile update.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<UserRole>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_is_admin() {
        let now = Utc::now();
        let mut user = User {
            id: "0b8f4c2e-5d1a-4f6b-9c3e-7a2d1e8f9b40".parse().unwrap(),
            email: Email::parse("owner@bread.io").unwrap(),
            name: "Owner".to_owned(),
            role: UserRole::Admin,
            created_at: now,
            updated_at: now,
        };
        assert!(user.is_admin());

        user.role = UserRole::Standard;
        assert!(!user.is_admin());
    }

    #[test]
    fn test_profile_update_skips_unset_fields() {
        let update = ProfileUpdate {
            name: Some("Baker".to_owned()),
            role: None,
        };
        let json = serde_json::to_value(&update).unwrap();
        assert_eq!(json, serde_json::json!({ "name": "Baker" }));
    }
}
