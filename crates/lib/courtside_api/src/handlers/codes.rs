//! Redemption code request handlers.

use axum::Json;
use axum::extract::{Extension, Path, State};
use uuid::Uuid;

use courtside_core::codes::GrantSummary;

use crate::AppState;
use crate::error::AppResult;
use crate::middleware::identity::{CurrentIdentity, RequestDeviceKey};
use crate::models::{CodeListResponse, GenerateCodesRequest, GenerateCodesResponse, RedeemRequest};
use crate::services::codes;

/// `POST /api/codes/redeem` — consume a code and mint its grant.
pub async fn redeem_handler(
    State(state): State<AppState>,
    Extension(CurrentIdentity(identity)): Extension<CurrentIdentity>,
    Extension(RequestDeviceKey(device_key)): Extension<RequestDeviceKey>,
    Json(body): Json<RedeemRequest>,
) -> AppResult<Json<GrantSummary>> {
    let summary = codes::redeem(&state, identity, device_key.as_deref(), &body.code).await?;
    Ok(Json(summary))
}

/// `POST /api/admin/codes` — mint a batch of codes. Admin-gated.
pub async fn generate_codes_handler(
    State(state): State<AppState>,
    Json(body): Json<GenerateCodesRequest>,
) -> AppResult<Json<GenerateCodesResponse>> {
    let resp = codes::generate(&state, &body).await?;
    Ok(Json(resp))
}

/// `GET /api/admin/courses/{course_id}/codes` — list a course's codes.
/// Admin-gated.
pub async fn list_course_codes_handler(
    State(state): State<AppState>,
    Path(course_id): Path<Uuid>,
) -> AppResult<Json<CodeListResponse>> {
    let resp = codes::list_for_course(&state, course_id).await?;
    Ok(Json(resp))
}
