//! # courtside_core
//!
//! Core domain logic for Courtside: grant storage, ban registry, device
//! tracking, redemption codes, entitlement resolution, and the preview
//! projection.

pub mod bans;
pub mod catalog;
pub mod codes;
pub mod devices;
pub mod entitlement;
pub mod grants;
pub mod migrate;
pub mod models;
pub mod uuid;

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
