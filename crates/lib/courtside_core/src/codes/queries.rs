//! Redemption code database queries.

use uuid::Uuid;

use crate::models::code::{CodeScope, RedemptionCodeRow};
use crate::uuid::uuidv7;

/// Atomically consume one redemption if the budget allows.
///
/// The conditional increment is the guard against concurrent double-spend:
/// only one of two racing callers can move the counter past the budget, the
/// other affects no row and gets `None`.
pub async fn consume_code<'e, E>(
    executor: E,
    code: &str,
) -> Result<Option<RedemptionCodeRow>, sqlx::Error>
where
    E: sqlx::PgExecutor<'e>,
{
    sqlx::query_as::<_, RedemptionCodeRow>(
        "UPDATE redemption_codes \
         SET redemptions = redemptions + 1 \
         WHERE code = $1 AND redemptions < max_redemptions \
         RETURNING id, code, scope_type, course_id, package_id, card_id, \
                   duration_days, max_redemptions, redemptions, created_at",
    )
    .bind(code)
    .fetch_optional(executor)
    .await
}

/// Whether a code row exists at all (spent or not).
pub async fn code_exists<'e, E>(executor: E, code: &str) -> Result<bool, sqlx::Error>
where
    E: sqlx::PgExecutor<'e>,
{
    sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM redemption_codes WHERE code = $1)")
        .bind(code)
        .fetch_one(executor)
        .await
}

/// Insert a freshly minted code. A unique violation on the code column means
/// the random token collided; the caller retries with a new one.
pub async fn insert_code(
    pool: &sqlx::PgPool,
    code: &str,
    scope: CodeScope,
    duration_days: i32,
    max_redemptions: i32,
) -> Result<(), sqlx::Error> {
    let (scope_type, course_id, package_id, card_id) = scope.columns();
    sqlx::query(
        "INSERT INTO redemption_codes \
            (id, code, scope_type, course_id, package_id, card_id, \
             duration_days, max_redemptions) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
    )
    .bind(uuidv7())
    .bind(code)
    .bind(scope_type)
    .bind(course_id)
    .bind(package_id)
    .bind(card_id)
    .bind(duration_days)
    .bind(max_redemptions)
    .execute(pool)
    .await?;
    Ok(())
}

/// Fetch a code row by its string (admin inspection).
pub async fn code_by_string(
    pool: &sqlx::PgPool,
    code: &str,
) -> Result<Option<RedemptionCodeRow>, sqlx::Error> {
    sqlx::query_as::<_, RedemptionCodeRow>(
        "SELECT id, code, scope_type, course_id, package_id, card_id, \
                duration_days, max_redemptions, redemptions, created_at \
         FROM redemption_codes WHERE code = $1",
    )
    .bind(code)
    .fetch_optional(pool)
    .await
}

/// Fetch every code minted for a course (admin inspection).
pub async fn codes_for_course(
    pool: &sqlx::PgPool,
    course_id: Uuid,
) -> Result<Vec<RedemptionCodeRow>, sqlx::Error> {
    sqlx::query_as::<_, RedemptionCodeRow>(
        "SELECT id, code, scope_type, course_id, package_id, card_id, \
                duration_days, max_redemptions, redemptions, created_at \
         FROM redemption_codes WHERE course_id = $1 ORDER BY created_at",
    )
    .bind(course_id)
    .fetch_all(pool)
    .await
}
