//! Device tracker.
//!
//! Records device-to-account associations on every authenticated request and
//! enforces the maximum-distinct-devices-per-account policy. Exceeding the
//! limit is a soft ban: the caller routes the account to the blocked state
//! without any `account_bans` row being written, so the condition heals
//! itself if associations are later pruned.

pub mod queries;

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

use crate::bans::{self, BanError};

/// Device tracking outcomes that must block the request.
#[derive(Debug, Error)]
pub enum TrackError {
    #[error("Account is banned")]
    Banned,

    #[error("Account exceeds the device limit")]
    TooManyDevices,

    #[error("Database error: {0}")]
    Db(#[from] sqlx::Error),
}

impl From<BanError> for TrackError {
    fn from(e: BanError) -> Self {
        match e {
            BanError::Db(e) => TrackError::Db(e),
        }
    }
}

/// Upsert the association for (`device_key`, `account_id`) and enforce the
/// distinct-device limit.
///
/// The ban check runs first; an account-ban lookup error fails closed. The
/// distinct count is read after the upsert commits, never cached, so two
/// simultaneous requests from the same device cannot undercount.
pub async fn track_device(
    pool: &PgPool,
    account_id: Uuid,
    device_key: &str,
    limit: i64,
    now: DateTime<Utc>,
) -> Result<(), TrackError> {
    match bans::account_ban_active(pool, account_id, now).await {
        Ok(false) => {}
        Ok(true) => return Err(TrackError::Banned),
        Err(e) => {
            warn!(%account_id, error = %e, "account ban lookup failed, blocking");
            return Err(TrackError::Banned);
        }
    }

    queries::upsert_association(pool, device_key, account_id, now).await?;

    let count = queries::count_distinct_devices(pool, account_id).await?;
    if count > limit {
        info!(%account_id, count, limit, "device limit exceeded");
        return Err(TrackError::TooManyDevices);
    }

    Ok(())
}
