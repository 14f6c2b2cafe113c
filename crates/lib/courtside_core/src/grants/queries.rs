//! Grant store database queries.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use super::GrantError;
use crate::models::grant::{GrantRow, NewGrant};
use crate::uuid::uuidv7;

/// Fetch the active course grant for (`account_id`, `course_id`), if any.
///
/// Course grants are only honored from a qualifying source; rows provisioned
/// through any other path never confer access.
pub async fn active_course_grant(
    pool: &PgPool,
    account_id: Uuid,
    course_id: Uuid,
    now: DateTime<Utc>,
) -> Result<Option<GrantRow>, GrantError> {
    let row = sqlx::query_as::<_, GrantRow>(
        "SELECT id, account_id, subject_type, course_id, card_id, month_number, \
                start_at, end_at, status, source_kind, created_at, updated_at \
         FROM grants \
         WHERE account_id = $1 AND subject_type = 'course' AND course_id = $2 \
           AND status = 'active' \
           AND (end_at IS NULL OR end_at > $3) \
           AND source_kind IN ('code', 'manual', 'admin')",
    )
    .bind(account_id)
    .bind(course_id)
    .bind(now)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

/// Fetch the active card grant for (`account_id`, `card_id`), if any.
pub async fn active_card_grant(
    pool: &PgPool,
    account_id: Uuid,
    card_id: Uuid,
    now: DateTime<Utc>,
) -> Result<Option<GrantRow>, GrantError> {
    let row = sqlx::query_as::<_, GrantRow>(
        "SELECT id, account_id, subject_type, course_id, card_id, month_number, \
                start_at, end_at, status, source_kind, created_at, updated_at \
         FROM grants \
         WHERE account_id = $1 AND subject_type = 'card' AND card_id = $2 \
           AND status = 'active' \
           AND (end_at IS NULL OR end_at > $3)",
    )
    .bind(account_id)
    .bind(card_id)
    .bind(now)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

/// Fetch the active month grant for (`account_id`, `course_id`,
/// `month_number`), if any. A month grant never unlocks sibling months.
pub async fn active_month_grant(
    pool: &PgPool,
    account_id: Uuid,
    course_id: Uuid,
    month_number: i32,
    now: DateTime<Utc>,
) -> Result<Option<GrantRow>, GrantError> {
    let row = sqlx::query_as::<_, GrantRow>(
        "SELECT id, account_id, subject_type, course_id, card_id, month_number, \
                start_at, end_at, status, source_kind, created_at, updated_at \
         FROM grants \
         WHERE account_id = $1 AND subject_type = 'month' \
           AND course_id = $2 AND month_number = $3 \
           AND status = 'active' \
           AND (end_at IS NULL OR end_at > $4)",
    )
    .bind(account_id)
    .bind(course_id)
    .bind(month_number)
    .bind(now)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

/// Issue a grant, merging into the existing row for the same subject.
///
/// Merge rule: `start_at` keeps the earliest value, `end_at` the latest
/// (unbounded wins), status returns to `active`, source takes the incoming
/// kind. Issuing identical bounds twice leaves the window unchanged.
///
/// Takes any executor so code redemption can run it inside its transaction.
pub async fn issue_or_merge<'e, E>(
    executor: E,
    grant: &NewGrant,
    now: DateTime<Utc>,
) -> Result<GrantRow, GrantError>
where
    E: sqlx::PgExecutor<'e>,
{
    let (subject_type, course_id, card_id, month_number) = grant.scope.columns();
    let row = sqlx::query_as::<_, GrantRow>(
        "INSERT INTO grants \
            (id, account_id, subject_type, course_id, card_id, month_number, \
             start_at, end_at, status, source_kind) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, 'active', $9) \
         ON CONFLICT (account_id, subject_type, course_id, card_id, month_number) \
         DO UPDATE SET \
            start_at = LEAST(grants.start_at, EXCLUDED.start_at), \
            end_at = CASE \
                WHEN grants.end_at IS NULL OR EXCLUDED.end_at IS NULL THEN NULL \
                ELSE GREATEST(grants.end_at, EXCLUDED.end_at) \
            END, \
            status = 'active', \
            source_kind = EXCLUDED.source_kind, \
            updated_at = $7 \
         RETURNING id, account_id, subject_type, course_id, card_id, month_number, \
                   start_at, end_at, status, source_kind, created_at, updated_at",
    )
    .bind(uuidv7())
    .bind(grant.account_id)
    .bind(subject_type)
    .bind(course_id)
    .bind(card_id)
    .bind(month_number)
    .bind(now)
    .bind(grant.end_at)
    .bind(grant.source)
    .fetch_one(executor)
    .await?;
    Ok(row)
}
