//! Redemption codes.
//!
//! Consumption runs as one transaction around an atomic compare-and-
//! increment, so two concurrent redemptions of the last use cannot both
//! succeed and a consumed code never exists without its grant. Generation is
//! an administrator operation outside the access-decision path.

pub mod queries;

use chrono::{DateTime, Duration, Utc};
use rand::distr::Alphanumeric;
use rand::{Rng, rng};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use crate::grants::{self, GrantError};
use crate::models::code::CodeScope;
use crate::models::grant::{GrantScope, GrantSource, NewGrant};

/// Length of a generated code string.
const CODE_LENGTH: usize = 16;

/// Attempts before giving up on a code-string collision.
const GENERATION_RETRIES: usize = 5;

/// Redemption errors.
#[derive(Debug, Error)]
pub enum RedeemError {
    #[error("Code not found")]
    NotFound,

    #[error("Code has no redemptions left")]
    Exhausted,

    #[error("Code {0} has an inconsistent scope")]
    InconsistentScope(String),

    #[error("Database error: {0}")]
    Db(#[from] sqlx::Error),
}

impl From<GrantError> for RedeemError {
    fn from(e: GrantError) -> Self {
        match e {
            GrantError::Db(e) => RedeemError::Db(e),
        }
    }
}

/// Code generation errors.
#[derive(Debug, Error)]
pub enum CodeError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Could not mint a unique code after {0} attempts")]
    Collision(usize),

    #[error("Database error: {0}")]
    Db(#[from] sqlx::Error),
}

/// What a successful redemption unlocked, for confirmation rendering.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GrantSummary {
    #[serde(flatten)]
    pub scope: CodeScope,
    /// Expiry of the resulting (possibly merged) grant. `None` when the
    /// merge landed on an unbounded grant.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

/// Redeem `code` for `account_id`.
///
/// One transaction: conditional increment, scope decode, grant issue-or-
/// merge, commit. The losing side of a concurrent race on the last
/// redemption observes `Exhausted`, which is the expected outcome rather
/// than an error condition.
pub async fn redeem(
    pool: &PgPool,
    code: &str,
    account_id: Uuid,
    now: DateTime<Utc>,
) -> Result<GrantSummary, RedeemError> {
    let mut tx = pool.begin().await?;

    let Some(row) = queries::consume_code(&mut *tx, code).await? else {
        // No row affected: either the code never existed or it is spent.
        let exists = queries::code_exists(&mut *tx, code).await?;
        return Err(if exists {
            RedeemError::Exhausted
        } else {
            RedeemError::NotFound
        });
    };

    let scope = CodeScope::from_columns(row.scope_type, row.course_id, row.package_id, row.card_id)
        .ok_or_else(|| RedeemError::InconsistentScope(code.to_string()))?;

    let grant_scope = match scope {
        CodeScope::Course { course_id } | CodeScope::PackageCourse { course_id, .. } => {
            GrantScope::Course(course_id)
        }
        CodeScope::Card { card_id } => GrantScope::Card(card_id),
    };

    let end_at = now + Duration::days(i64::from(row.duration_days));
    let granted = grants::queries::issue_or_merge(
        &mut *tx,
        &NewGrant {
            account_id,
            scope: grant_scope,
            end_at: Some(end_at),
            source: GrantSource::Code,
        },
        now,
    )
    .await?;

    tx.commit().await?;

    info!(%account_id, code, "redemption code consumed");

    Ok(GrantSummary {
        scope,
        expires_at: granted.end_at,
    })
}

/// Mint `count` codes for `scope`, retrying individual collisions against
/// the unique code column.
pub async fn generate(
    pool: &PgPool,
    scope: CodeScope,
    count: u32,
    duration_days: i32,
    max_redemptions: i32,
) -> Result<Vec<String>, CodeError> {
    if count == 0 || count > 500 {
        return Err(CodeError::Validation(
            "count must be between 1 and 500".into(),
        ));
    }
    if duration_days < 1 {
        return Err(CodeError::Validation("durationDays must be at least 1".into()));
    }
    if max_redemptions < 1 {
        return Err(CodeError::Validation(
            "maxRedemptions must be at least 1".into(),
        ));
    }

    let mut codes = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let mut attempts = 0;
        loop {
            let code = generate_code_string();
            match queries::insert_code(pool, &code, scope, duration_days, max_redemptions).await {
                Ok(()) => {
                    codes.push(code);
                    break;
                }
                Err(e) if is_unique_violation(&e) => {
                    attempts += 1;
                    if attempts >= GENERATION_RETRIES {
                        return Err(CodeError::Collision(attempts));
                    }
                }
                Err(e) => return Err(CodeError::Db(e)),
            }
        }
    }

    info!(count = codes.len(), "generated redemption codes");
    Ok(codes)
}

/// Opaque random token: 16 alphanumeric chars.
fn generate_code_string() -> String {
    rng()
        .sample_iter(&Alphanumeric)
        .take(CODE_LENGTH)
        .map(char::from)
        .collect()
}

fn is_unique_violation(e: &sqlx::Error) -> bool {
    matches!(e, sqlx::Error::Database(db) if db.is_unique_violation())
}
