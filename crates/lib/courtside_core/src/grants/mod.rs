//! Grant store.
//!
//! Active-grant lookups apply the time-window rule in SQL; issuance merges
//! into the existing grant for the same subject instead of stacking rows
//! (extending access keeps the earliest start and the widest end).

pub mod queries;

use thiserror::Error;

/// Grant store errors.
#[derive(Debug, Error)]
pub enum GrantError {
    #[error("Database error: {0}")]
    Db(#[from] sqlx::Error),
}
