//! Authentication error and response types.

use serde::Serialize;
use thiserror::Error;

use crate::error::ServiceError;
use crate::supabase::SupabaseError;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Invalid email format.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] bread_core::EmailError),

    /// The auth endpoint refused the request; carries its message
    /// (for example "Invalid login credentials").
    #[error("{0}")]
    Rejected(String),

    /// The account was created but its profile row could not be written.
    #[error("could not create profile: {0}")]
    Profile(#[source] ServiceError),

    /// Transport or decoding failure.
    #[error(transparent)]
    Remote(SupabaseError),
}

impl From<SupabaseError> for AuthError {
    fn from(err: SupabaseError) -> Self {
        match err {
            SupabaseError::Api { message, .. } | SupabaseError::Unauthorized(message) => {
                Self::Rejected(message)
            }
            other => Self::Remote(other),
        }
    }
}

/// Outcome of `login`, `signup`, `logout` and `refresh`.
///
/// Failures are reported here rather than returned as errors, so a caller
/// only has to branch on `success`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AuthResponse {
    #[must_use]
    pub const fn ok() -> Self {
        Self {
            success: true,
            error: None,
        }
    }

    #[must_use]
    pub fn failed(error: &AuthError) -> Self {
        Self {
            success: false,
            error: Some(error.to_string()),
        }
    }
}

impl From<Result<(), AuthError>> for AuthResponse {
    fn from(result: Result<(), AuthError>) -> Self {
        match result {
            Ok(()) => Self::ok(),
            Err(e) => Self::failed(&e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejection_keeps_remote_message() {
        let err = AuthError::from(SupabaseError::Api {
            status: 400,
            message: "Invalid login credentials".to_string(),
        });
        let response = AuthResponse::failed(&err);
        assert!(!response.success);
        assert_eq!(response.error.as_deref(), Some("Invalid login credentials"));
    }

    #[test]
    fn test_from_result() {
        assert_eq!(AuthResponse::from(Ok(())), AuthResponse::ok());
        let response = AuthResponse::from(Err(AuthError::Remote(SupabaseError::NoSession)));
        assert_eq!(
            response.error.as_deref(),
            Some("No active session - sign in required")
        );
    }
}
