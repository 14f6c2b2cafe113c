//! Redemption code service glue.

use chrono::Utc;
use uuid::Uuid;

use courtside_core::codes::{self, GrantSummary};
use courtside_core::entitlement::Identity;
use courtside_core::{bans, devices};

use crate::AppState;
use crate::error::{AppError, AppResult};
use crate::models::{CodeListResponse, GenerateCodesRequest, GenerateCodesResponse};

/// Redeem a code for the authenticated caller.
///
/// Redemption is a privileged write, so the same ban and device gates as the
/// content path apply before the code is consumed.
pub async fn redeem(
    state: &AppState,
    identity: Identity,
    device_key: Option<&str>,
    code: &str,
) -> AppResult<GrantSummary> {
    let account_id = identity
        .account_id
        .ok_or_else(|| AppError::Unauthorized("Sign in to redeem a code".into()))?;
    let now = Utc::now();

    let device_key =
        device_key.ok_or_else(|| AppError::Validation("Missing X-Device-Id header".into()))?;

    if bans::device_banned_fail_open(&state.pool, device_key, now).await {
        return Err(AppError::Blocked("Device is blocked".into()));
    }
    devices::track_device(&state.pool, account_id, device_key, state.config.device_limit, now)
        .await?;

    Ok(codes::redeem(&state.pool, code, account_id, now).await?)
}

/// Mint a batch of codes (administrator operation).
pub async fn generate(
    state: &AppState,
    req: &GenerateCodesRequest,
) -> AppResult<GenerateCodesResponse> {
    let codes = codes::generate(
        &state.pool,
        req.scope,
        req.count,
        req.duration_days,
        req.max_redemptions,
    )
    .await?;
    Ok(GenerateCodesResponse { codes })
}

/// List every code minted for a course (administrator operation).
pub async fn list_for_course(state: &AppState, course_id: Uuid) -> AppResult<CodeListResponse> {
    let rows = codes::queries::codes_for_course(&state.pool, course_id).await?;
    Ok(CodeListResponse {
        codes: rows.iter().map(Into::into).collect(),
    })
}
