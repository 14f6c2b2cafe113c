//! Ban registry database queries.

use sqlx::PgPool;
use uuid::Uuid;

use super::BanError;
use crate::models::moderation::{AccountBanRow, DeviceBanRow};

/// Fetch the ban row for a device key, if any.
pub async fn device_ban(pool: &PgPool, device_key: &str) -> Result<Option<DeviceBanRow>, BanError> {
    let row = sqlx::query_as::<_, DeviceBanRow>(
        "SELECT device_key, active, banned_until, reason, created_at \
         FROM device_bans WHERE device_key = $1",
    )
    .bind(device_key)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

/// Fetch the ban row for an account, if any.
pub async fn account_ban(
    pool: &PgPool,
    account_id: Uuid,
) -> Result<Option<AccountBanRow>, BanError> {
    let row = sqlx::query_as::<_, AccountBanRow>(
        "SELECT account_id, active, banned_until, reason, created_at \
         FROM account_bans WHERE account_id = $1",
    )
    .bind(account_id)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}
