//! Content resolution service.
//!
//! One call per page/video request: device-ban fail-fast, device tracking
//! for authenticated callers, locator validation, entitlement resolution,
//! then the full tree, the preview projection, or a denied payload.

use chrono::Utc;
use tracing::debug;

use courtside_core::catalog::locate::{LocatorParams, resolve_locator};
use courtside_core::catalog::{preview, queries, tree};
use courtside_core::entitlement::store::PgEntitlementStore;
use courtside_core::entitlement::{Decision, Identity, resolver};
use courtside_core::{bans, devices};

use crate::AppState;
use crate::error::{AppError, AppResult};
use crate::models::{ContentResponse, PackageListResponse};

/// Resolve a content request end to end.
///
/// Administrators skip the ban and device gates entirely; their override in
/// the resolver would make a block here contradictory.
pub async fn fetch_content(
    state: &AppState,
    identity: Identity,
    device_key: Option<&str>,
    params: LocatorParams,
) -> AppResult<ContentResponse> {
    let now = Utc::now();

    if !identity.is_admin {
        let device_key = device_key
            .ok_or_else(|| AppError::Validation("Missing X-Device-Id header".into()))?;

        if bans::device_banned_fail_open(&state.pool, device_key, now).await {
            return Err(AppError::Blocked("Device is blocked".into()));
        }

        if let Some(account_id) = identity.account_id {
            devices::track_device(&state.pool, account_id, device_key, state.config.device_limit, now)
                .await?;
        }
    }

    let locator = resolve_locator(&state.pool, &params).await?;

    let store = PgEntitlementStore::new(state.pool.clone());
    let resolution = resolver::resolve(&identity, &locator, &store, &store, &store, now).await?;

    debug!(
        course_id = %locator.course_id,
        decision = ?resolution.decision,
        "content request resolved"
    );

    let content = match resolution.decision {
        Decision::FullAccess => Some(tree::build_course_tree(&state.pool, &locator).await?),
        Decision::PreviewOnly => {
            let full = tree::build_course_tree(&state.pool, &locator).await?;
            Some(preview::project(full))
        }
        Decision::Denied => None,
    };

    Ok(ContentResponse {
        decision: resolution.decision,
        requires_package_selection: resolution.requires_package_selection,
        reason: resolution.reason,
        content,
    })
}

/// Package picker payload for a course.
pub async fn list_packages(state: &AppState, course_slug: &str) -> AppResult<PackageListResponse> {
    let course = queries::published_course_by_slug(&state.pool, course_slug)
        .await?
        .ok_or_else(|| AppError::NotFound("content not found".into()))?;

    let packages = queries::packages_for_course(&state.pool, course.id).await?;
    Ok(PackageListResponse {
        packages: packages.iter().map(Into::into).collect(),
    })
}
