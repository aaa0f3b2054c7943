//! Bread Made Easy data-access library.
//!
//! Talks to the hosted store, auth provider and payment functions, and keeps
//! the signed-in identity in step with the remote session. Front ends build
//! one [`AppContext`] and reach everything through it.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod context;
pub mod countdown;
pub mod error;
pub mod export;
pub mod schema;
pub mod services;
pub mod storage;
pub mod supabase;

pub use config::{ClientConfig, ConfigError};
pub use context::{AppContext, ContextError};
pub use error::ServiceError;
pub use supabase::{SupabaseClient, SupabaseError};
