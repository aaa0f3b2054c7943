//! Domain entities.
//!
//! These are the validated shapes handed to callers after the client crate
//! has parsed a remote row. Timestamps are always structured values here;
//! the ISO-8601 strings never leave the service boundary.
//!
//! Each entity has companion input types: a `New*` struct for inserts and a
//! `*Update` struct whose `None` fields are left untouched by a partial
//! update.

pub mod auction;
pub mod booking;
pub mod funnel;
pub mod lead;
pub mod purchase;
pub mod user;

pub use auction::{Auction, AuctionUpdate, NewAuction};
pub use booking::{BookingUpdate, NewBooking, StrategyCallBooking};
pub use funnel::{Funnel, FunnelUpdate, NewFunnel};
pub use lead::{Lead, LeadUpdate, NewLead};
pub use purchase::{NewPurchase, Purchase};
pub use user::{NewProfile, ProfileUpdate, User};
