//! Catalog reads.
//!
//! Locator validation, package allowlist lookups, content tree assembly, and
//! the restricted preview projection. Everything here is a pure read; the
//! catalog is written elsewhere.

pub mod locate;
pub mod preview;
pub mod queries;
pub mod tree;

use thiserror::Error;

/// Catalog errors.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Absent row or content filtered out by a package allowlist; callers
    /// cannot tell the two apart.
    #[error("Content not found")]
    NotFound,

    #[error("Database error: {0}")]
    Db(#[from] sqlx::Error),
}
