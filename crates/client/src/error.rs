//! Error returned by the write paths of the resource services.

use thiserror::Error;

use crate::schema::SchemaError;
use crate::supabase::SupabaseError;

/// A failed create, update or delete.
///
/// The display string always contains the remote store's own message so the
/// caller can show it to the user as is.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The store rejected the request.
    #[error(transparent)]
    Remote(#[from] SupabaseError),

    /// The store accepted the write but returned a row we cannot read.
    #[error("Unexpected row from store: {0}")]
    Schema(#[from] SchemaError),
}

impl ServiceError {
    /// The message reported by the remote store, when there is one.
    #[must_use]
    pub fn remote_message(&self) -> Option<&str> {
        match self {
            Self::Remote(
                SupabaseError::Api { message, .. }
                | SupabaseError::NotFound(message)
                | SupabaseError::Unauthorized(message),
            ) => Some(message),
            _ => None,
        }
    }
}
