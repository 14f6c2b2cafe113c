//! Ban and device-association domain models.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Database row for `device_bans`.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct DeviceBanRow {
    pub device_key: String,
    pub active: bool,
    pub banned_until: Option<DateTime<Utc>>,
    pub reason: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Database row for `account_bans`.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AccountBanRow {
    pub account_id: Uuid,
    pub active: bool,
    pub banned_until: Option<DateTime<Utc>>,
    pub reason: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Database row for `device_associations`.
///
/// Upserted on every authenticated request; enumerated per account for the
/// distinct-device limit and consulted when banning a device without banning
/// the account behind it.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct DeviceAssociationRow {
    pub device_key: String,
    pub account_id: Uuid,
    pub last_seen_at: DateTime<Utc>,
}
