//! Catalog domain models.
//!
//! Row structs for the catalog tables. The catalog is written by the admin
//! storefront screens; this crate only reads it.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Database row for `packages`.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PackageRow {
    pub id: Uuid,
    pub slug: String,
    pub title: String,
    pub active: bool,
    pub position: i32,
}

/// Database row for `courses`.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CourseRow {
    pub id: Uuid,
    pub slug: String,
    pub title: String,
    pub published: bool,
    pub position: i32,
}

/// Database row for `age_groups`.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AgeGroupRow {
    pub id: Uuid,
    pub course_id: Uuid,
    pub title: String,
    pub position: i32,
}

/// Database row for `player_cards`.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PlayerCardRow {
    pub id: Uuid,
    pub age_group_id: Uuid,
    pub title: String,
    pub min_age: Option<i32>,
    pub max_age: Option<i32>,
    pub min_height_cm: Option<i32>,
    pub max_height_cm: Option<i32>,
    pub min_weight_kg: Option<i32>,
    pub max_weight_kg: Option<i32>,
    pub position: i32,
}

/// Database row for `months`.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct MonthRow {
    pub id: Uuid,
    pub age_group_id: Uuid,
    pub month_number: i32,
    pub title: String,
}

/// Database row for `days`.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct DayRow {
    pub id: Uuid,
    pub month_id: Uuid,
    pub day_number: i32,
    pub title: String,
}

/// Database row for `videos`.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct VideoRow {
    pub id: Uuid,
    pub day_id: Uuid,
    pub title: String,
    pub details: Option<String>,
    pub playback_url: String,
    pub thumbnail_url: Option<String>,
    pub is_free_preview: bool,
    pub position: i32,
}

/// Package picker entry (served when a caller must select a package).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageSummary {
    pub id: String,
    pub slug: String,
    pub title: String,
}

impl From<&PackageRow> for PackageSummary {
    fn from(row: &PackageRow) -> Self {
        Self {
            id: row.id.to_string(),
            slug: row.slug.clone(),
            title: row.title.clone(),
        }
    }
}
