//! Device association database queries.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::moderation::DeviceAssociationRow;

/// Insert or refresh the association for (`device_key`, `account_id`).
pub async fn upsert_association(
    pool: &PgPool,
    device_key: &str,
    account_id: Uuid,
    now: DateTime<Utc>,
) -> Result<DeviceAssociationRow, sqlx::Error> {
    sqlx::query_as::<_, DeviceAssociationRow>(
        "INSERT INTO device_associations (device_key, account_id, last_seen_at) \
         VALUES ($1, $2, $3) \
         ON CONFLICT (device_key, account_id) \
         DO UPDATE SET last_seen_at = EXCLUDED.last_seen_at \
         RETURNING device_key, account_id, last_seen_at",
    )
    .bind(device_key)
    .bind(account_id)
    .bind(now)
    .fetch_one(pool)
    .await
}

/// Count the distinct devices associated with an account.
pub async fn count_distinct_devices(pool: &PgPool, account_id: Uuid) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(DISTINCT device_key) FROM device_associations WHERE account_id = $1",
    )
    .bind(account_id)
    .fetch_one(pool)
    .await
}

/// Remove every association for a device (used when pruning a device so a
/// limit-blocked account can recover).
pub async fn prune_device(pool: &PgPool, device_key: &str) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM device_associations WHERE device_key = $1")
        .bind(device_key)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}
