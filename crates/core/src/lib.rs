//! Bread Made Easy Core - Shared domain types.
//!
//! This crate provides the types used across all Bread Made Easy components:
//! - `client` - Remote store, auth and payment access plus the service layer
//! - `cli` - Terminal front end for admins and customers
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients. Every
//! identifier is assigned by the remote store; nothing here generates one.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for ids, prices, emails, roles and statuses
//! - [`models`] - Domain entities (users, leads, bookings, funnels, auctions, purchases)

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod models;
pub mod types;

pub use models::*;
pub use types::*;
