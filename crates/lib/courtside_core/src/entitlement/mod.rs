//! Entitlement resolution.
//!
//! The resolver is a pure decision state machine over three narrow store
//! seams (bans, grants, catalog structure), so the access logic is
//! unit-testable without a database. `PgEntitlementStore` backs all three
//! seams with Postgres for production use.

pub mod resolver;
pub mod store;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::bans::BanError;
use crate::catalog::CatalogError;
use crate::grants::GrantError;

/// Entitlement errors.
#[derive(Debug, Error)]
pub enum EntitlementError {
    /// The locator references content that is absent or filtered out by a
    /// package allowlist. Deliberately indistinguishable from "exists but
    /// hidden" so catalog structure never leaks to unauthorized callers.
    #[error("Content not found")]
    NotFound,

    #[error("Store error: {0}")]
    Store(#[from] sqlx::Error),
}

impl From<BanError> for EntitlementError {
    fn from(e: BanError) -> Self {
        match e {
            BanError::Db(e) => EntitlementError::Store(e),
        }
    }
}

impl From<GrantError> for EntitlementError {
    fn from(e: GrantError) -> Self {
        match e {
            GrantError::Db(e) => EntitlementError::Store(e),
        }
    }
}

impl From<CatalogError> for EntitlementError {
    fn from(e: CatalogError) -> Self {
        match e {
            CatalogError::NotFound => EntitlementError::NotFound,
            CatalogError::Db(e) => EntitlementError::Store(e),
        }
    }
}

/// The caller's identity as handed over by the external identity provider.
///
/// The resolver trusts both fields; authenticating credentials and deriving
/// the admin flag happen upstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Identity {
    pub account_id: Option<Uuid>,
    pub is_admin: bool,
}

impl Identity {
    pub fn anonymous() -> Self {
        Self {
            account_id: None,
            is_admin: false,
        }
    }
}

/// Identifies the requested content: a course, optionally scoped by a
/// package, optionally narrowed to an age group and further to a player card
/// or a month.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContentLocator {
    pub course_id: Uuid,
    pub package_id: Option<Uuid>,
    pub age_group_id: Option<Uuid>,
    pub card_id: Option<Uuid>,
    pub month_number: Option<i32>,
}

impl ContentLocator {
    pub fn course(course_id: Uuid) -> Self {
        Self {
            course_id,
            package_id: None,
            age_group_id: None,
            card_id: None,
            month_number: None,
        }
    }
}

/// The access decision for a content request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Decision {
    FullAccess,
    PreviewOnly,
    Denied,
}

/// A decision plus the caller-facing context around it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub decision: Decision,
    /// The course has packages but none was selected; the caller must render
    /// a package picker rather than a generic deny.
    pub requires_package_selection: bool,
    pub reason: Option<String>,
}

impl Resolution {
    pub fn full() -> Self {
        Self {
            decision: Decision::FullAccess,
            requires_package_selection: false,
            reason: None,
        }
    }

    pub fn preview() -> Self {
        Self {
            decision: Decision::PreviewOnly,
            requires_package_selection: false,
            reason: None,
        }
    }

    pub fn denied(reason: &str) -> Self {
        Self {
            decision: Decision::Denied,
            requires_package_selection: false,
            reason: Some(reason.to_string()),
        }
    }

    pub fn package_selection_required() -> Self {
        Self {
            decision: Decision::Denied,
            requires_package_selection: true,
            reason: Some("package_selection_required".to_string()),
        }
    }
}

/// Account-ban seam consulted by the resolver.
#[async_trait]
pub trait BanChecker: Send + Sync {
    async fn is_account_banned(
        &self,
        account_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<bool, EntitlementError>;
}

/// Grant seam consulted by the resolver.
#[async_trait]
pub trait GrantLookup: Send + Sync {
    async fn has_course_grant(
        &self,
        account_id: Uuid,
        course_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<bool, EntitlementError>;

    async fn has_card_grant(
        &self,
        account_id: Uuid,
        card_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<bool, EntitlementError>;

    async fn has_month_grant(
        &self,
        account_id: Uuid,
        course_id: Uuid,
        month_number: i32,
        now: DateTime<Utc>,
    ) -> Result<bool, EntitlementError>;
}

/// Catalog-structure seam consulted by the resolver: the package allowlist
/// plus the two structural probes the algorithm needs.
#[async_trait]
pub trait CatalogLookup: Send + Sync {
    /// Age groups the package exposes for the course. Empty means
    /// unrestricted.
    async fn allowed_age_groups(
        &self,
        package_id: Uuid,
        course_id: Uuid,
    ) -> Result<Vec<Uuid>, EntitlementError>;

    /// Number of active packages that contain the course.
    async fn package_count(&self, course_id: Uuid) -> Result<i64, EntitlementError>;

    /// Whether any free-preview video exists on the locator's path.
    async fn has_free_preview(&self, locator: &ContentLocator) -> Result<bool, EntitlementError>;
}
