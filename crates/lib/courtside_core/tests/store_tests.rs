//! Store-level tests against a live Postgres database.
//!
//! `#[sqlx::test]` provisions an isolated database per test and applies the
//! crate's migrations before the test body runs.

use chrono::{Duration, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use courtside_core::models::code::CodeScope;
use courtside_core::models::grant::{GrantScope, GrantSource, NewGrant};
use courtside_core::{bans, codes, devices, grants};

/// Insert a published course and return its id.
async fn seed_course(pool: &PgPool, slug: &str) -> Uuid {
    sqlx::query_scalar::<_, Uuid>(
        "INSERT INTO courses (slug, title, published) VALUES ($1, $2, true) RETURNING id",
    )
    .bind(slug)
    .bind(format!("Course {slug}"))
    .fetch_one(pool)
    .await
    .expect("seed course")
}

#[sqlx::test]
async fn issue_then_lookup_honors_the_window(pool: PgPool) {
    let now = Utc::now();
    let account = Uuid::new_v4();
    let course = seed_course(&pool, "dribbling").await;

    grants::queries::issue_or_merge(
        &pool,
        &NewGrant {
            account_id: account,
            scope: GrantScope::Course(course),
            end_at: Some(now + Duration::days(30)),
            source: GrantSource::Manual,
        },
        now,
    )
    .await
    .expect("issue grant");

    let active = grants::queries::active_course_grant(&pool, account, course, now)
        .await
        .expect("lookup");
    assert!(active.is_some());

    // Past the window nothing is active.
    let later = now + Duration::days(31);
    let active = grants::queries::active_course_grant(&pool, account, course, later)
        .await
        .expect("lookup");
    assert!(active.is_none());
}

#[sqlx::test]
async fn merge_widens_the_window_and_is_idempotent(pool: PgPool) {
    let now = Utc::now();
    let account = Uuid::new_v4();
    let course = seed_course(&pool, "shooting").await;

    let first = grants::queries::issue_or_merge(
        &pool,
        &NewGrant {
            account_id: account,
            scope: GrantScope::Course(course),
            end_at: Some(now + Duration::days(10)),
            source: GrantSource::Code,
        },
        now,
    )
    .await
    .expect("first issue");

    // Re-issuing identical bounds changes nothing.
    let repeat = grants::queries::issue_or_merge(
        &pool,
        &NewGrant {
            account_id: account,
            scope: GrantScope::Course(course),
            end_at: Some(now + Duration::days(10)),
            source: GrantSource::Code,
        },
        now,
    )
    .await
    .expect("repeat issue");
    assert_eq!(first.id, repeat.id);
    assert_eq!(first.start_at, repeat.start_at);
    assert_eq!(first.end_at, repeat.end_at);

    // A longer extension moves end_at forward, keeps start_at.
    let extended = grants::queries::issue_or_merge(
        &pool,
        &NewGrant {
            account_id: account,
            scope: GrantScope::Course(course),
            end_at: Some(now + Duration::days(40)),
            source: GrantSource::Manual,
        },
        now + Duration::days(5),
    )
    .await
    .expect("extend");
    assert_eq!(first.id, extended.id);
    assert_eq!(first.start_at, extended.start_at);
    assert!(extended.end_at > first.end_at);

    // An unbounded reissue makes the grant unbounded.
    let unbounded = grants::queries::issue_or_merge(
        &pool,
        &NewGrant {
            account_id: account,
            scope: GrantScope::Course(course),
            end_at: None,
            source: GrantSource::Admin,
        },
        now + Duration::days(6),
    )
    .await
    .expect("unbounded");
    assert_eq!(first.id, unbounded.id);
    assert!(unbounded.end_at.is_none());
}

#[sqlx::test]
async fn import_sourced_course_enrollment_does_not_grant_access(pool: PgPool) {
    let now = Utc::now();
    let account = Uuid::new_v4();
    let course = seed_course(&pool, "defense").await;

    grants::queries::issue_or_merge(
        &pool,
        &NewGrant {
            account_id: account,
            scope: GrantScope::Course(course),
            end_at: None,
            source: GrantSource::Import,
        },
        now,
    )
    .await
    .expect("issue import grant");

    let active = grants::queries::active_course_grant(&pool, account, course, now)
        .await
        .expect("lookup");
    assert!(active.is_none());
}

#[sqlx::test]
async fn month_grants_are_scoped_per_month(pool: PgPool) {
    let now = Utc::now();
    let account = Uuid::new_v4();
    let course = seed_course(&pool, "conditioning").await;

    grants::queries::issue_or_merge(
        &pool,
        &NewGrant {
            account_id: account,
            scope: GrantScope::Month {
                course_id: course,
                month_number: 3,
            },
            end_at: None,
            source: GrantSource::Code,
        },
        now,
    )
    .await
    .expect("issue month grant");

    let month_3 = grants::queries::active_month_grant(&pool, account, course, 3, now)
        .await
        .expect("lookup");
    assert!(month_3.is_some());

    let month_4 = grants::queries::active_month_grant(&pool, account, course, 4, now)
        .await
        .expect("lookup");
    assert!(month_4.is_none());
}

#[sqlx::test]
async fn redemption_stops_exactly_at_the_budget(pool: PgPool) {
    let now = Utc::now();
    let course = seed_course(&pool, "footwork").await;

    let minted = codes::generate(&pool, CodeScope::Course { course_id: course }, 1, 30, 2)
        .await
        .expect("generate");
    let code = &minted[0];

    codes::redeem(&pool, code, Uuid::new_v4(), now).await.expect("first");
    codes::redeem(&pool, code, Uuid::new_v4(), now).await.expect("second");

    let err = codes::redeem(&pool, code, Uuid::new_v4(), now).await.unwrap_err();
    assert!(matches!(err, codes::RedeemError::Exhausted));

    let row = codes::queries::code_by_string(&pool, code)
        .await
        .expect("inspect")
        .expect("row");
    assert_eq!(2, row.redemptions);
}

#[sqlx::test]
async fn unknown_code_is_not_found(pool: PgPool) {
    let err = codes::redeem(&pool, "NO-SUCH-CODE", Uuid::new_v4(), Utc::now()).await.unwrap_err();
    assert!(matches!(err, codes::RedeemError::NotFound));
}

#[sqlx::test]
async fn concurrent_redemption_has_exactly_one_winner(pool: PgPool) {
    let now = Utc::now();
    let course = seed_course(&pool, "passing").await;

    let minted = codes::generate(&pool, CodeScope::Course { course_id: course }, 1, 30, 1)
        .await
        .expect("generate");
    let code = minted[0].clone();

    let a = tokio::spawn({
        let pool = pool.clone();
        let code = code.clone();
        async move { codes::redeem(&pool, &code, Uuid::new_v4(), now).await }
    });
    let b = tokio::spawn({
        let pool = pool.clone();
        let code = code.clone();
        async move { codes::redeem(&pool, &code, Uuid::new_v4(), now).await }
    });

    let results = [a.await.expect("join"), b.await.expect("join")];
    let winners = results.iter().filter(|r| r.is_ok()).count();
    let exhausted = results
        .iter()
        .filter(|r| matches!(r, Err(codes::RedeemError::Exhausted)))
        .count();
    assert_eq!(1, winners);
    assert_eq!(1, exhausted);

    let row = codes::queries::code_by_string(&pool, &code)
        .await
        .expect("inspect")
        .expect("row");
    assert_eq!(1, row.redemptions);
}

#[sqlx::test]
async fn redeeming_a_card_code_issues_a_card_grant(pool: PgPool) {
    let now = Utc::now();
    let account = Uuid::new_v4();
    let course = seed_course(&pool, "goalkeeping").await;
    let group = sqlx::query_scalar::<_, Uuid>(
        "INSERT INTO age_groups (course_id, title) VALUES ($1, 'U14') RETURNING id",
    )
    .bind(course)
    .fetch_one(&pool)
    .await
    .expect("seed age group");
    let card = sqlx::query_scalar::<_, Uuid>(
        "INSERT INTO player_cards (age_group_id, title) VALUES ($1, '150-160cm') RETURNING id",
    )
    .bind(group)
    .fetch_one(&pool)
    .await
    .expect("seed card");

    let minted = codes::generate(&pool, CodeScope::Card { card_id: card }, 1, 14, 1)
        .await
        .expect("generate");

    let summary = codes::redeem(&pool, &minted[0], account, now).await.expect("redeem");
    assert!(matches!(summary.scope, CodeScope::Card { card_id: c } if c == card));
    assert!(summary.expires_at.is_some());

    let active = grants::queries::active_card_grant(&pool, account, card, now)
        .await
        .expect("lookup");
    assert!(active.is_some());
}

#[sqlx::test]
async fn device_limit_blocks_and_self_heals(pool: PgPool) {
    let now = Utc::now();
    let account = Uuid::new_v4();
    let limit = 3;

    for key in ["dev-1", "dev-2", "dev-3"] {
        devices::track_device(&pool, account, key, limit, now)
            .await
            .expect("within limit");
    }

    let err = devices::track_device(&pool, account, "dev-4", limit, now).await.unwrap_err();
    assert!(matches!(err, devices::TrackError::TooManyDevices));

    // No account ban row was written; the state heals once a device is pruned.
    let banned = bans::account_ban_active(&pool, account, now).await.expect("ban check");
    assert!(!banned);

    devices::queries::prune_device(&pool, "dev-1").await.expect("prune");
    devices::track_device(&pool, account, "dev-4", limit, now)
        .await
        .expect("healed");
}

#[sqlx::test]
async fn re_tracking_a_known_device_is_idempotent(pool: PgPool) {
    let now = Utc::now();
    let account = Uuid::new_v4();

    for _ in 0..5 {
        devices::track_device(&pool, account, "same-device", 3, now)
            .await
            .expect("track");
    }

    let count = devices::queries::count_distinct_devices(&pool, account)
        .await
        .expect("count");
    assert_eq!(1, count);
}

#[sqlx::test]
async fn banned_account_cannot_track_devices(pool: PgPool) {
    let now = Utc::now();
    let account = Uuid::new_v4();
    sqlx::query("INSERT INTO account_bans (account_id, active, reason) VALUES ($1, true, 'abuse')")
        .bind(account)
        .execute(&pool)
        .await
        .expect("seed ban");

    let err = devices::track_device(&pool, account, "dev-1", 3, now).await.unwrap_err();
    assert!(matches!(err, devices::TrackError::Banned));
}

#[sqlx::test]
async fn expired_bans_are_not_enforced(pool: PgPool) {
    let now = Utc::now();
    let account = Uuid::new_v4();
    sqlx::query(
        "INSERT INTO account_bans (account_id, active, banned_until, reason) \
         VALUES ($1, true, $2, 'cooldown')",
    )
    .bind(account)
    .bind(now - Duration::hours(1))
    .execute(&pool)
    .await
    .expect("seed ban");

    let banned = bans::account_ban_active(&pool, account, now).await.expect("check");
    assert!(!banned);

    sqlx::query("INSERT INTO device_bans (device_key, active, reason) VALUES ('bad-dev', false, 'lifted')")
        .execute(&pool)
        .await
        .expect("seed device ban");
    let banned = bans::device_ban_active(&pool, "bad-dev", now).await.expect("check");
    assert!(!banned);
}
