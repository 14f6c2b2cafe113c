//! Catalog read tests: locator validation, tree assembly, allowlist
//! filtering, preview probe.

use sqlx::PgPool;
use uuid::Uuid;

use courtside_core::catalog::locate::{LocatorParams, resolve_locator};
use courtside_core::catalog::{CatalogError, preview, queries, tree};

struct Fixture {
    course_id: Uuid,
    package_id: Uuid,
    u12_id: Uuid,
    u16_id: Uuid,
    card_id: Uuid,
}

/// One published course in one package, two age groups, a card, and a
/// two-video day (one free preview).
async fn seed(pool: &PgPool) -> Fixture {
    let course_id = sqlx::query_scalar::<_, Uuid>(
        "INSERT INTO courses (slug, title, published) VALUES ('ballhandling', 'Ball Handling', true) RETURNING id",
    )
    .fetch_one(pool)
    .await
    .expect("course");

    let package_id = sqlx::query_scalar::<_, Uuid>(
        "INSERT INTO packages (slug, title, active) VALUES ('starter', 'Starter', true) RETURNING id",
    )
    .fetch_one(pool)
    .await
    .expect("package");

    sqlx::query("INSERT INTO package_courses (package_id, course_id) VALUES ($1, $2)")
        .bind(package_id)
        .bind(course_id)
        .execute(pool)
        .await
        .expect("package_courses");

    let u12_id = sqlx::query_scalar::<_, Uuid>(
        "INSERT INTO age_groups (course_id, title) VALUES ($1, 'U12') RETURNING id",
    )
    .bind(course_id)
    .fetch_one(pool)
    .await
    .expect("u12");

    let u16_id = sqlx::query_scalar::<_, Uuid>(
        "INSERT INTO age_groups (course_id, title) VALUES ($1, 'U16') RETURNING id",
    )
    .bind(course_id)
    .fetch_one(pool)
    .await
    .expect("u16");

    let card_id = sqlx::query_scalar::<_, Uuid>(
        "INSERT INTO player_cards (age_group_id, title, min_height_cm, max_height_cm) \
         VALUES ($1, '140-150cm', 140, 150) RETURNING id",
    )
    .bind(u12_id)
    .fetch_one(pool)
    .await
    .expect("card");

    let month_id = sqlx::query_scalar::<_, Uuid>(
        "INSERT INTO months (age_group_id, month_number, title) VALUES ($1, 1, 'Basics') RETURNING id",
    )
    .bind(u12_id)
    .fetch_one(pool)
    .await
    .expect("month");

    let day_id = sqlx::query_scalar::<_, Uuid>(
        "INSERT INTO days (month_id, day_number, title) VALUES ($1, 1, 'Day one') RETURNING id",
    )
    .bind(month_id)
    .fetch_one(pool)
    .await
    .expect("day");

    sqlx::query(
        "INSERT INTO videos (day_id, title, playback_url, is_free_preview, position) VALUES \
            ($1, 'Intro', 'https://cdn.example/intro.m3u8', true, 0), \
            ($1, 'Crossover drill', 'https://cdn.example/crossover.m3u8', false, 1)",
    )
    .bind(day_id)
    .execute(pool)
    .await
    .expect("videos");

    Fixture {
        course_id,
        package_id,
        u12_id,
        u16_id,
        card_id,
    }
}

fn params(course: &str) -> LocatorParams {
    LocatorParams {
        course_slug: course.to_string(),
        ..LocatorParams::default()
    }
}

#[sqlx::test]
async fn locator_resolves_and_derives_the_card_age_group(pool: PgPool) {
    let fx = seed(&pool).await;

    let locator = resolve_locator(
        &pool,
        &LocatorParams {
            card_id: Some(fx.card_id),
            ..params("ballhandling")
        },
    )
    .await
    .expect("locator");

    assert_eq!(fx.course_id, locator.course_id);
    assert_eq!(Some(fx.u12_id), locator.age_group_id);
    assert_eq!(Some(fx.card_id), locator.card_id);
}

#[sqlx::test]
async fn unpublished_course_is_not_found(pool: PgPool) {
    seed(&pool).await;
    sqlx::query("UPDATE courses SET published = false WHERE slug = 'ballhandling'")
        .execute(&pool)
        .await
        .expect("unpublish");

    let err = resolve_locator(&pool, &params("ballhandling")).await.unwrap_err();
    assert!(matches!(err, CatalogError::NotFound));
}

#[sqlx::test]
async fn foreign_age_group_is_not_found(pool: PgPool) {
    let fx = seed(&pool).await;
    let other_course = sqlx::query_scalar::<_, Uuid>(
        "INSERT INTO courses (slug, title, published) VALUES ('other', 'Other', true) RETURNING id",
    )
    .fetch_one(&pool)
    .await
    .expect("other course");
    let foreign_group = sqlx::query_scalar::<_, Uuid>(
        "INSERT INTO age_groups (course_id, title) VALUES ($1, 'U18') RETURNING id",
    )
    .bind(other_course)
    .fetch_one(&pool)
    .await
    .expect("foreign group");

    let err = resolve_locator(
        &pool,
        &LocatorParams {
            age_group_id: Some(foreign_group),
            ..params("ballhandling")
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, CatalogError::NotFound));
    let _ = fx;
}

#[sqlx::test]
async fn allowlist_drops_excluded_age_groups_from_the_tree(pool: PgPool) {
    let fx = seed(&pool).await;
    sqlx::query(
        "INSERT INTO package_course_age_groups (package_id, course_id, age_group_id) \
         VALUES ($1, $2, $3)",
    )
    .bind(fx.package_id)
    .bind(fx.course_id)
    .bind(fx.u12_id)
    .execute(&pool)
    .await
    .expect("allowlist");

    let locator = resolve_locator(
        &pool,
        &LocatorParams {
            package_slug: Some("starter".to_string()),
            ..params("ballhandling")
        },
    )
    .await
    .expect("locator");

    let built = tree::build_course_tree(&pool, &locator).await.expect("tree");
    let ids: Vec<&str> = built.age_groups.iter().map(|g| g.id.as_str()).collect();
    assert_eq!(vec![fx.u12_id.to_string().as_str()], ids);
    let _ = fx.u16_id;
}

#[sqlx::test]
async fn tree_projection_withholds_locked_urls(pool: PgPool) {
    let fx = seed(&pool).await;

    let locator = resolve_locator(&pool, &params("ballhandling")).await.expect("locator");
    let full = tree::build_course_tree(&pool, &locator).await.expect("tree");

    let full_json = serde_json::to_string(&full).expect("json");
    assert!(full_json.contains("crossover.m3u8"));

    let projected = preview::project(full);
    let preview_json = serde_json::to_string(&projected).expect("json");
    assert!(!preview_json.contains("crossover.m3u8"));
    assert!(preview_json.contains("intro.m3u8"));
    assert!(preview_json.contains("Crossover drill"));
    let _ = fx;
}

#[sqlx::test]
async fn free_preview_probe_respects_narrowing(pool: PgPool) {
    let fx = seed(&pool).await;

    assert!(
        queries::has_free_preview(&pool, fx.course_id, None, None, None)
            .await
            .expect("probe")
    );
    assert!(
        queries::has_free_preview(&pool, fx.course_id, None, Some(fx.u12_id), Some(1))
            .await
            .expect("probe")
    );
    // The U16 group has no content at all.
    assert!(
        !queries::has_free_preview(&pool, fx.course_id, None, Some(fx.u16_id), None)
            .await
            .expect("probe")
    );
}

#[sqlx::test]
async fn free_preview_probe_honors_the_package_allowlist(pool: PgPool) {
    let fx = seed(&pool).await;

    // Empty allowlist: the package exposes everything, including the free video.
    assert!(
        queries::has_free_preview(&pool, fx.course_id, Some(fx.package_id), None, None)
            .await
            .expect("probe")
    );

    // Allowlist the empty U16 group only: the free video sits outside it.
    sqlx::query(
        "INSERT INTO package_course_age_groups (package_id, course_id, age_group_id) \
         VALUES ($1, $2, $3)",
    )
    .bind(fx.package_id)
    .bind(fx.course_id)
    .bind(fx.u16_id)
    .execute(&pool)
    .await
    .expect("allowlist");

    assert!(
        !queries::has_free_preview(&pool, fx.course_id, Some(fx.package_id), None, None)
            .await
            .expect("probe")
    );
    // Without the package context the free video is still reachable.
    assert!(
        queries::has_free_preview(&pool, fx.course_id, None, None, None)
            .await
            .expect("probe")
    );
}

#[sqlx::test]
async fn package_picker_lists_active_packages_in_order(pool: PgPool) {
    let fx = seed(&pool).await;
    let second = sqlx::query_scalar::<_, Uuid>(
        "INSERT INTO packages (slug, title, active, position) VALUES ('pro', 'Pro', true, 1) RETURNING id",
    )
    .fetch_one(&pool)
    .await
    .expect("pro package");
    sqlx::query("INSERT INTO package_courses (package_id, course_id) VALUES ($1, $2)")
        .bind(second)
        .bind(fx.course_id)
        .execute(&pool)
        .await
        .expect("membership");

    let packages = queries::packages_for_course(&pool, fx.course_id).await.expect("list");
    let slugs: Vec<&str> = packages.iter().map(|p| p.slug.as_str()).collect();
    assert_eq!(vec!["starter", "pro"], slugs);

    assert_eq!(2, queries::package_count_for_course(&pool, fx.course_id).await.expect("count"));
}
