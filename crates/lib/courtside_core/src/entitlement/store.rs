//! Postgres-backed implementation of the resolver's store seams.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::warn;
use uuid::Uuid;

use super::{BanChecker, CatalogLookup, ContentLocator, EntitlementError, GrantLookup};
use crate::models::grant::{Grant, GrantRow};
use crate::{bans, catalog, grants};

/// Backs all three resolver seams with the shared connection pool.
#[derive(Clone)]
pub struct PgEntitlementStore {
    pool: PgPool,
}

impl PgEntitlementStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Re-evaluate a fetched row through the domain model. The SQL already
/// filters on the window, but a row whose columns do not match its subject
/// kind must read as "no grant", not as access.
fn confirms_access(row: Option<GrantRow>, now: DateTime<Utc>) -> bool {
    match row {
        None => false,
        Some(row) => match Grant::from_row(&row) {
            Some(grant) => grant.is_active(now),
            None => {
                warn!(grant_id = %row.id, "grant row has inconsistent subject columns, ignoring");
                false
            }
        },
    }
}

#[async_trait]
impl BanChecker for PgEntitlementStore {
    async fn is_account_banned(
        &self,
        account_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<bool, EntitlementError> {
        Ok(bans::account_ban_active(&self.pool, account_id, now).await?)
    }
}

#[async_trait]
impl GrantLookup for PgEntitlementStore {
    async fn has_course_grant(
        &self,
        account_id: Uuid,
        course_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<bool, EntitlementError> {
        let row = grants::queries::active_course_grant(&self.pool, account_id, course_id, now).await?;
        Ok(confirms_access(row, now))
    }

    async fn has_card_grant(
        &self,
        account_id: Uuid,
        card_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<bool, EntitlementError> {
        let row = grants::queries::active_card_grant(&self.pool, account_id, card_id, now).await?;
        Ok(confirms_access(row, now))
    }

    async fn has_month_grant(
        &self,
        account_id: Uuid,
        course_id: Uuid,
        month_number: i32,
        now: DateTime<Utc>,
    ) -> Result<bool, EntitlementError> {
        let row =
            grants::queries::active_month_grant(&self.pool, account_id, course_id, month_number, now)
                .await?;
        Ok(confirms_access(row, now))
    }
}

#[async_trait]
impl CatalogLookup for PgEntitlementStore {
    async fn allowed_age_groups(
        &self,
        package_id: Uuid,
        course_id: Uuid,
    ) -> Result<Vec<Uuid>, EntitlementError> {
        Ok(catalog::queries::allowed_age_groups(&self.pool, package_id, course_id).await?)
    }

    async fn package_count(&self, course_id: Uuid) -> Result<i64, EntitlementError> {
        Ok(catalog::queries::package_count_for_course(&self.pool, course_id).await?)
    }

    async fn has_free_preview(&self, locator: &ContentLocator) -> Result<bool, EntitlementError> {
        Ok(catalog::queries::has_free_preview(
            &self.pool,
            locator.course_id,
            locator.package_id,
            locator.age_group_id,
            locator.month_number,
        )
        .await?)
    }
}
