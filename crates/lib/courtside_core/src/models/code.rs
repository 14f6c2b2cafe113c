//! Redemption code domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Scope kind of a redemption code, mirrors the `code_scope` PG enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "code_scope")]
#[serde(rename_all = "camelCase")]
pub enum CodeScopeType {
    #[sqlx(rename = "course")]
    Course,
    #[sqlx(rename = "package_course")]
    PackageCourse,
    #[sqlx(rename = "card")]
    Card,
}

/// What a redemption code unlocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "scopeType", rename_all = "camelCase")]
pub enum CodeScope {
    #[serde(rename_all = "camelCase")]
    Course { course_id: Uuid },
    #[serde(rename_all = "camelCase")]
    PackageCourse { package_id: Uuid, course_id: Uuid },
    #[serde(rename_all = "camelCase")]
    Card { card_id: Uuid },
}

impl CodeScope {
    /// Decompose into the column values the `redemption_codes` table stores.
    pub fn columns(self) -> (CodeScopeType, Option<Uuid>, Option<Uuid>, Option<Uuid>) {
        match self {
            CodeScope::Course { course_id } => {
                (CodeScopeType::Course, Some(course_id), None, None)
            }
            CodeScope::PackageCourse {
                package_id,
                course_id,
            } => (CodeScopeType::PackageCourse, Some(course_id), Some(package_id), None),
            CodeScope::Card { card_id } => (CodeScopeType::Card, None, None, Some(card_id)),
        }
    }

    /// Rebuild the scope from stored columns, rejecting inconsistent rows.
    pub fn from_columns(
        scope_type: CodeScopeType,
        course_id: Option<Uuid>,
        package_id: Option<Uuid>,
        card_id: Option<Uuid>,
    ) -> Option<CodeScope> {
        match scope_type {
            CodeScopeType::Course => Some(CodeScope::Course {
                course_id: course_id?,
            }),
            CodeScopeType::PackageCourse => Some(CodeScope::PackageCourse {
                package_id: package_id?,
                course_id: course_id?,
            }),
            CodeScopeType::Card => Some(CodeScope::Card { card_id: card_id? }),
        }
    }
}

/// Database row for `redemption_codes`.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct RedemptionCodeRow {
    pub id: Uuid,
    pub code: String,
    pub scope_type: CodeScopeType,
    pub course_id: Option<Uuid>,
    pub package_id: Option<Uuid>,
    pub card_id: Option<Uuid>,
    pub duration_days: i32,
    pub max_redemptions: i32,
    pub redemptions: i32,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scope_columns_round_trip() {
        let scope = CodeScope::PackageCourse {
            package_id: Uuid::new_v4(),
            course_id: Uuid::new_v4(),
        };
        let (ty, course, package, card) = scope.columns();
        assert_eq!(Some(scope), CodeScope::from_columns(ty, course, package, card));
    }

    #[test]
    fn from_columns_rejects_missing_course() {
        assert!(CodeScope::from_columns(CodeScopeType::Course, None, None, None).is_none());
    }

    #[test]
    fn scope_serializes_with_tag() {
        let scope = CodeScope::Card {
            card_id: Uuid::nil(),
        };
        let json = serde_json::to_value(&scope).unwrap();
        assert_eq!(json["scopeType"], "card");
        assert_eq!(json["cardId"], Uuid::nil().to_string());
    }
}
