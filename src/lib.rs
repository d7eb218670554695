//! Nitro Cup tournament organizer core.
//!
//! State of record lives in a remote realtime document store reached through
//! the [`store::DocumentStore`] trait. The core keeps a read-only [`mirror`]
//! of that store, validates commands against the mirrored snapshot and issues
//! writes back; the next push notification is what makes a change visible.

pub mod bracket;
pub mod commands;
pub mod config;
pub mod error;
pub mod images;
pub mod mirror;
pub mod model;
pub mod rating;
pub mod session;
pub mod store;
