use bread_core::{Email, User, UserId};
use serde::Deserialize;

use super::{Row, SchemaError, parse_timestamp};

/// Row of the `profiles` table, keyed by the auth user id.
#[derive(Debug, Clone, Deserialize)]
pub struct ProfileRow {
    pub id: UserId,
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
    pub role: String,
    pub created_at: String,
    pub updated_at: String,
}

impl Row for ProfileRow {
    type Entity = User;
    const TABLE: &'static str = "profiles";

    fn into_entity(self) -> Result<User, SchemaError> {
        Ok(User {
            id: self.id,
            email: Email::from_stored(self.email),
            name: self.name.unwrap_or_default(),
            role: self.role.parse()?,
            created_at: parse_timestamp("created_at", &self.created_at)?,
            updated_at: parse_timestamp("updated_at", &self.updated_at)?,
        })
    }
}
