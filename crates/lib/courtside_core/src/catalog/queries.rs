//! Catalog database queries.

use sqlx::PgPool;
use uuid::Uuid;

use super::CatalogError;
use crate::models::catalog::{
    AgeGroupRow, CourseRow, DayRow, MonthRow, PackageRow, PlayerCardRow, VideoRow,
};

/// Fetch a published course by slug.
pub async fn published_course_by_slug(
    pool: &PgPool,
    slug: &str,
) -> Result<Option<CourseRow>, CatalogError> {
    let row = sqlx::query_as::<_, CourseRow>(
        "SELECT id, slug, title, published, position \
         FROM courses WHERE slug = $1 AND published",
    )
    .bind(slug)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

/// Fetch an active package by slug.
pub async fn active_package_by_slug(
    pool: &PgPool,
    slug: &str,
) -> Result<Option<PackageRow>, CatalogError> {
    let row = sqlx::query_as::<_, PackageRow>(
        "SELECT id, slug, title, active, position \
         FROM packages WHERE slug = $1 AND active",
    )
    .bind(slug)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

/// Whether the package contains the course.
pub async fn package_contains_course(
    pool: &PgPool,
    package_id: Uuid,
    course_id: Uuid,
) -> Result<bool, CatalogError> {
    let exists = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(SELECT 1 FROM package_courses WHERE package_id = $1 AND course_id = $2)",
    )
    .bind(package_id)
    .bind(course_id)
    .fetch_one(pool)
    .await?;
    Ok(exists)
}

/// Active packages that contain the course, in storefront order.
pub async fn packages_for_course(
    pool: &PgPool,
    course_id: Uuid,
) -> Result<Vec<PackageRow>, CatalogError> {
    let rows = sqlx::query_as::<_, PackageRow>(
        "SELECT p.id, p.slug, p.title, p.active, p.position \
         FROM packages p \
         JOIN package_courses pc ON pc.package_id = p.id \
         WHERE pc.course_id = $1 AND p.active \
         ORDER BY p.position, p.slug",
    )
    .bind(course_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Count of active packages that contain the course.
pub async fn package_count_for_course(
    pool: &PgPool,
    course_id: Uuid,
) -> Result<i64, CatalogError> {
    let count = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM packages p \
         JOIN package_courses pc ON pc.package_id = p.id \
         WHERE pc.course_id = $1 AND p.active",
    )
    .bind(course_id)
    .fetch_one(pool)
    .await?;
    Ok(count)
}

/// Age groups the (package, course) allowlist exposes. Empty means every age
/// group of the course is visible.
pub async fn allowed_age_groups(
    pool: &PgPool,
    package_id: Uuid,
    course_id: Uuid,
) -> Result<Vec<Uuid>, CatalogError> {
    let rows = sqlx::query_scalar::<_, Uuid>(
        "SELECT age_group_id FROM package_course_age_groups \
         WHERE package_id = $1 AND course_id = $2",
    )
    .bind(package_id)
    .bind(course_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Fetch an age group by id.
pub async fn age_group(pool: &PgPool, id: Uuid) -> Result<Option<AgeGroupRow>, CatalogError> {
    let row = sqlx::query_as::<_, AgeGroupRow>(
        "SELECT id, course_id, title, position FROM age_groups WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

/// Fetch a player card by id.
pub async fn player_card(pool: &PgPool, id: Uuid) -> Result<Option<PlayerCardRow>, CatalogError> {
    let row = sqlx::query_as::<_, PlayerCardRow>(
        "SELECT id, age_group_id, title, min_age, max_age, min_height_cm, max_height_cm, \
                min_weight_kg, max_weight_kg, position \
         FROM player_cards WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

/// Whether the age group has the given month.
pub async fn month_exists(
    pool: &PgPool,
    age_group_id: Uuid,
    month_number: i32,
) -> Result<bool, CatalogError> {
    let exists = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(SELECT 1 FROM months WHERE age_group_id = $1 AND month_number = $2)",
    )
    .bind(age_group_id)
    .bind(month_number)
    .fetch_one(pool)
    .await?;
    Ok(exists)
}

/// Age groups of a course, in display order.
pub async fn age_groups_for_course(
    pool: &PgPool,
    course_id: Uuid,
) -> Result<Vec<AgeGroupRow>, CatalogError> {
    let rows = sqlx::query_as::<_, AgeGroupRow>(
        "SELECT id, course_id, title, position \
         FROM age_groups WHERE course_id = $1 ORDER BY position, title",
    )
    .bind(course_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Player cards of the given age groups, in display order.
pub async fn cards_for_age_groups(
    pool: &PgPool,
    age_group_ids: &[Uuid],
) -> Result<Vec<PlayerCardRow>, CatalogError> {
    let rows = sqlx::query_as::<_, PlayerCardRow>(
        "SELECT id, age_group_id, title, min_age, max_age, min_height_cm, max_height_cm, \
                min_weight_kg, max_weight_kg, position \
         FROM player_cards WHERE age_group_id = ANY($1) ORDER BY position, title",
    )
    .bind(age_group_ids)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Months of the given age groups, in calendar order.
pub async fn months_for_age_groups(
    pool: &PgPool,
    age_group_ids: &[Uuid],
) -> Result<Vec<MonthRow>, CatalogError> {
    let rows = sqlx::query_as::<_, MonthRow>(
        "SELECT id, age_group_id, month_number, title \
         FROM months WHERE age_group_id = ANY($1) ORDER BY month_number",
    )
    .bind(age_group_ids)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Days of the given months, in calendar order.
pub async fn days_for_months(
    pool: &PgPool,
    month_ids: &[Uuid],
) -> Result<Vec<DayRow>, CatalogError> {
    let rows = sqlx::query_as::<_, DayRow>(
        "SELECT id, month_id, day_number, title \
         FROM days WHERE month_id = ANY($1) ORDER BY day_number",
    )
    .bind(month_ids)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Videos of the given days, in display order.
pub async fn videos_for_days(
    pool: &PgPool,
    day_ids: &[Uuid],
) -> Result<Vec<VideoRow>, CatalogError> {
    let rows = sqlx::query_as::<_, VideoRow>(
        "SELECT id, day_id, title, details, playback_url, thumbnail_url, is_free_preview, position \
         FROM videos WHERE day_id = ANY($1) ORDER BY position, title",
    )
    .bind(day_ids)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Whether any free-preview video exists on the locator's path: under the
/// course, within the package's allowlist when a package is in scope, and
/// optionally narrowed to one age group and one month.
pub async fn has_free_preview(
    pool: &PgPool,
    course_id: Uuid,
    package_id: Option<Uuid>,
    age_group_id: Option<Uuid>,
    month_number: Option<i32>,
) -> Result<bool, CatalogError> {
    let exists = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS( \
            SELECT 1 FROM videos v \
            JOIN days d ON d.id = v.day_id \
            JOIN months m ON m.id = d.month_id \
            JOIN age_groups g ON g.id = m.age_group_id \
            WHERE g.course_id = $1 \
              AND v.is_free_preview \
              AND ($2::uuid IS NULL \
                   OR NOT EXISTS( \
                       SELECT 1 FROM package_course_age_groups a \
                       WHERE a.package_id = $2 AND a.course_id = $1) \
                   OR EXISTS( \
                       SELECT 1 FROM package_course_age_groups a \
                       WHERE a.package_id = $2 AND a.course_id = $1 \
                         AND a.age_group_id = g.id)) \
              AND ($3::uuid IS NULL OR g.id = $3) \
              AND ($4::int IS NULL OR m.month_number = $4) \
         )",
    )
    .bind(course_id)
    .bind(package_id)
    .bind(age_group_id)
    .bind(month_number)
    .fetch_one(pool)
    .await?;
    Ok(exists)
}
