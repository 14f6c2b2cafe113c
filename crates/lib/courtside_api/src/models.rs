//! API request/response models.
//!
//! Wire shapes with camelCase renames, kept separate from the domain models
//! in `courtside_core`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use courtside_core::catalog::tree::CourseTree;
use courtside_core::entitlement::Decision;
use courtside_core::models::catalog::PackageSummary;
use courtside_core::models::code::{CodeScope, RedemptionCodeRow};

/// Error body for every non-2xx response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

/// `GET /api/health` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub db_connected: bool,
    pub version: String,
}

/// `GET /api/courses/{slug}/packages` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageListResponse {
    pub packages: Vec<PackageSummary>,
}

/// Query parameters narrowing a content request.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentQuery {
    /// Package slug scoping the request.
    pub package: Option<String>,
    pub age_group: Option<Uuid>,
    pub card: Option<Uuid>,
    pub month: Option<i32>,
}

/// `GET /api/content/{slug}` response.
///
/// `content` is the full tree on `fullAccess`, the locked-placeholder
/// projection on `previewOnly`, and absent on `denied`. A denied response is
/// still HTTP 200: the caller renders a package picker or an upgrade prompt,
/// never an error page.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentResponse {
    pub decision: Decision,
    pub requires_package_selection: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<CourseTree>,
}

/// `POST /api/codes/redeem` request.
#[derive(Debug, Clone, Deserialize)]
pub struct RedeemRequest {
    pub code: String,
}

/// `POST /api/admin/codes` request.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateCodesRequest {
    #[serde(flatten)]
    pub scope: CodeScope,
    pub count: u32,
    pub duration_days: i32,
    pub max_redemptions: i32,
}

/// `POST /api/admin/codes` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateCodesResponse {
    pub codes: Vec<String>,
}

/// Admin view of a minted code.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeView {
    pub code: String,
    #[serde(flatten)]
    pub scope: Option<CodeScope>,
    pub duration_days: i32,
    pub max_redemptions: i32,
    pub redemptions: i32,
    pub created_at: DateTime<Utc>,
}

impl From<&RedemptionCodeRow> for CodeView {
    fn from(row: &RedemptionCodeRow) -> Self {
        Self {
            code: row.code.clone(),
            scope: CodeScope::from_columns(row.scope_type, row.course_id, row.package_id, row.card_id),
            duration_days: row.duration_days,
            max_redemptions: row.max_redemptions,
            redemptions: row.redemptions,
            created_at: row.created_at,
        }
    }
}

/// `GET /api/admin/courses/{id}/codes` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CodeListResponse {
    pub codes: Vec<CodeView>,
}

/// Claims in the external identity provider's access tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityClaims {
    /// Subject — account ID (standard JWT `sub` claim).
    pub sub: String,
    /// Roles (e.g. `["admin"]`).
    #[serde(default)]
    pub roles: Vec<String>,
    /// Expiry (unix timestamp).
    pub exp: i64,
    /// Issued at (unix timestamp).
    pub iat: i64,
}
