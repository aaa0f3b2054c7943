//! Subcommands. Each module renders one area of the storefront or the admin
//! dashboards.

pub mod auctions;
pub mod auth;
pub mod bookings;
pub mod funnels;
pub mod leads;
pub mod payments;
pub mod purchases;

use std::path::Path;

use bread_client::{ContextError, ServiceError, SupabaseError};
use thiserror::Error;

/// Errors that end a command with a non-zero exit.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Configuration or client setup failed.
    #[error(transparent)]
    Context(#[from] ContextError),

    /// A write was rejected; the message comes from the store.
    #[error(transparent)]
    Service(#[from] ServiceError),

    /// A raw remote failure.
    #[error(transparent)]
    Remote(#[from] SupabaseError),

    /// Sign-in, sign-up or sign-out failed.
    #[error("{0}")]
    Auth(String),

    /// A payment function reported failure.
    #[error("{0}")]
    Payment(String),

    /// The requested record does not exist or could not be read.
    #[error("{0} not found")]
    NotFound(String),

    /// The command needs a signed-in user.
    #[error("Sign in first (--email/--password or `bme auth login`)")]
    NotSignedIn,

    /// Writing an export failed.
    #[error("Could not write {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Print to stdout, or write to `output` when given.
pub(crate) fn emit(contents: &str, output: Option<&Path>) -> Result<(), CommandError> {
    match output {
        Some(path) => {
            std::fs::write(path, contents).map_err(|source| CommandError::Write {
                path: path.display().to_string(),
                source,
            })?;
            tracing::info!(path = %path.display(), "Export written");
        }
        None => print!("{contents}"),
    }
    Ok(())
}

/// `-` for absent optional text.
pub(crate) fn or_dash(value: Option<&str>) -> &str {
    value.filter(|v| !v.is_empty()).unwrap_or("-")
}
