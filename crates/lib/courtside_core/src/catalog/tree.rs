//! Content tree assembly.
//!
//! Builds the card/calendar tree for a locator: age groups (allowlist-
//! filtered when a package is in scope), player cards, and the month → day →
//! video calendar. The full tree carries playable URLs; the preview
//! projection (`preview::project`) strips them.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use super::{CatalogError, queries};
use crate::entitlement::ContentLocator;

/// Course node returned to content-serving code.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseTree {
    pub course_id: String,
    pub age_groups: Vec<AgeGroupNode>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgeGroupNode {
    pub id: String,
    pub title: String,
    pub cards: Vec<CardNode>,
    pub months: Vec<MonthNode>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardNode {
    pub id: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_age: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_age: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_height_cm: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_height_cm: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_weight_kg: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_weight_kg: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthNode {
    pub id: String,
    pub month_number: i32,
    pub title: String,
    pub days: Vec<DayNode>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayNode {
    pub id: String,
    pub day_number: i32,
    pub title: String,
    pub videos: Vec<VideoNode>,
}

/// Leaf video node. `playback_url` is `None` and `locked` is set on videos a
/// restricted projection withholds; the title and thumbnail stay visible so
/// the UI renders "locked" rather than "missing".
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoNode {
    pub id: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub playback_url: Option<String>,
    pub is_free_preview: bool,
    pub locked: bool,
}

/// Assemble the content tree for a validated locator.
///
/// Narrowing: an age-group locator keeps one age group; a card locator keeps
/// one card within it; a month locator keeps one month. The package
/// allowlist (when a package is in scope and the allowlist is non-empty)
/// drops excluded age groups entirely.
pub async fn build_course_tree(
    pool: &PgPool,
    locator: &ContentLocator,
) -> Result<CourseTree, CatalogError> {
    let mut groups = queries::age_groups_for_course(pool, locator.course_id).await?;

    if let Some(package_id) = locator.package_id {
        let allowed = queries::allowed_age_groups(pool, package_id, locator.course_id).await?;
        if !allowed.is_empty() {
            groups.retain(|g| allowed.contains(&g.id));
        }
    }

    if let Some(age_group_id) = locator.age_group_id {
        groups.retain(|g| g.id == age_group_id);
        if groups.is_empty() {
            return Err(CatalogError::NotFound);
        }
    }

    let group_ids: Vec<Uuid> = groups.iter().map(|g| g.id).collect();

    let mut cards = queries::cards_for_age_groups(pool, &group_ids).await?;
    if let Some(card_id) = locator.card_id {
        cards.retain(|c| c.id == card_id);
        if cards.is_empty() {
            return Err(CatalogError::NotFound);
        }
    }

    let mut months = queries::months_for_age_groups(pool, &group_ids).await?;
    if let Some(month_number) = locator.month_number {
        months.retain(|m| m.month_number == month_number);
    }

    let month_ids: Vec<Uuid> = months.iter().map(|m| m.id).collect();
    let days = queries::days_for_months(pool, &month_ids).await?;

    let day_ids: Vec<Uuid> = days.iter().map(|d| d.id).collect();
    let videos = queries::videos_for_days(pool, &day_ids).await?;

    // Group children under their parents, preserving query order.
    let mut videos_by_day: HashMap<Uuid, Vec<VideoNode>> = HashMap::new();
    for v in videos {
        videos_by_day.entry(v.day_id).or_default().push(VideoNode {
            id: v.id.to_string(),
            title: v.title,
            details: v.details,
            thumbnail_url: v.thumbnail_url,
            playback_url: Some(v.playback_url),
            is_free_preview: v.is_free_preview,
            locked: false,
        });
    }

    let mut days_by_month: HashMap<Uuid, Vec<DayNode>> = HashMap::new();
    for d in days {
        days_by_month.entry(d.month_id).or_default().push(DayNode {
            id: d.id.to_string(),
            day_number: d.day_number,
            title: d.title,
            videos: videos_by_day.remove(&d.id).unwrap_or_default(),
        });
    }

    let mut months_by_group: HashMap<Uuid, Vec<MonthNode>> = HashMap::new();
    for m in months {
        months_by_group.entry(m.age_group_id).or_default().push(MonthNode {
            id: m.id.to_string(),
            month_number: m.month_number,
            title: m.title,
            days: days_by_month.remove(&m.id).unwrap_or_default(),
        });
    }

    let mut cards_by_group: HashMap<Uuid, Vec<CardNode>> = HashMap::new();
    for c in cards {
        cards_by_group.entry(c.age_group_id).or_default().push(CardNode {
            id: c.id.to_string(),
            title: c.title,
            min_age: c.min_age,
            max_age: c.max_age,
            min_height_cm: c.min_height_cm,
            max_height_cm: c.max_height_cm,
            min_weight_kg: c.min_weight_kg,
            max_weight_kg: c.max_weight_kg,
        });
    }

    let age_groups = groups
        .into_iter()
        .map(|g| AgeGroupNode {
            id: g.id.to_string(),
            title: g.title,
            cards: cards_by_group.remove(&g.id).unwrap_or_default(),
            months: months_by_group.remove(&g.id).unwrap_or_default(),
        })
        .collect();

    Ok(CourseTree {
        course_id: locator.course_id.to_string(),
        age_groups,
    })
}
