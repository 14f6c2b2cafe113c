//! Ban registry.
//!
//! Existence + time-window checks against `device_bans` and `account_bans`.
//! The failure policy is asymmetric: device checks run before authentication
//! and fail open so a store hiccup never locks out anonymous browsing;
//! account checks gate privileged access and fail closed (callers treat an
//! error as banned).

pub mod queries;

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use thiserror::Error;
use tracing::warn;

use crate::models::moderation::{AccountBanRow, DeviceBanRow};

/// Ban registry errors.
#[derive(Debug, Error)]
pub enum BanError {
    #[error("Database error: {0}")]
    Db(#[from] sqlx::Error),
}

/// Ban window rule: enforced iff active and `banned_until` is unbounded or
/// still in the future.
fn enforced(active: bool, banned_until: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
    active && banned_until.is_none_or(|until| until > now)
}

impl DeviceBanRow {
    pub fn enforced(&self, now: DateTime<Utc>) -> bool {
        enforced(self.active, self.banned_until, now)
    }
}

impl AccountBanRow {
    pub fn enforced(&self, now: DateTime<Utc>) -> bool {
        enforced(self.active, self.banned_until, now)
    }
}

/// Whether an enforced device ban exists for `device_key`.
pub async fn device_ban_active(
    pool: &PgPool,
    device_key: &str,
    now: DateTime<Utc>,
) -> Result<bool, BanError> {
    let row = queries::device_ban(pool, device_key).await?;
    Ok(row.is_some_and(|ban| ban.enforced(now)))
}

/// Device-ban check for the pre-auth stage: a lookup failure is logged and
/// treated as not banned, so anonymous browsing degrades gracefully.
pub async fn device_banned_fail_open(pool: &PgPool, device_key: &str, now: DateTime<Utc>) -> bool {
    match device_ban_active(pool, device_key, now).await {
        Ok(banned) => banned,
        Err(e) => {
            warn!(error = %e, "device ban lookup failed, allowing request");
            false
        }
    }
}

/// Whether an enforced account ban exists for `account_id`.
///
/// Callers must treat `Err` as banned.
pub async fn account_ban_active(
    pool: &PgPool,
    account_id: uuid::Uuid,
    now: DateTime<Utc>,
) -> Result<bool, BanError> {
    let row = queries::account_ban(pool, account_id).await?;
    Ok(row.is_some_and(|ban| ban.enforced(now)))
}
