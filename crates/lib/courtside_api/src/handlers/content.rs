//! Content request handlers.

use axum::extract::{Extension, Path, Query, State};
use axum::Json;

use courtside_core::catalog::locate::LocatorParams;

use crate::AppState;
use crate::error::AppResult;
use crate::middleware::identity::{CurrentIdentity, RequestDeviceKey};
use crate::models::{ContentQuery, ContentResponse, PackageListResponse};
use crate::services::content;

/// `GET /api/content/{course_slug}` — resolve a content request and return
/// the full tree, the preview projection, or a denied payload.
pub async fn get_content_handler(
    State(state): State<AppState>,
    Extension(CurrentIdentity(identity)): Extension<CurrentIdentity>,
    Extension(RequestDeviceKey(device_key)): Extension<RequestDeviceKey>,
    Path(course_slug): Path<String>,
    Query(query): Query<ContentQuery>,
) -> AppResult<Json<ContentResponse>> {
    let params = LocatorParams {
        course_slug,
        package_slug: query.package,
        age_group_id: query.age_group,
        card_id: query.card,
        month_number: query.month,
    };
    let resp = content::fetch_content(&state, identity, device_key.as_deref(), params).await?;
    Ok(Json(resp))
}

/// `GET /api/courses/{course_slug}/packages` — package picker payload.
pub async fn list_packages_handler(
    State(state): State<AppState>,
    Path(course_slug): Path<String>,
) -> AppResult<Json<PackageListResponse>> {
    let resp = content::list_packages(&state, &course_slug).await?;
    Ok(Json(resp))
}
