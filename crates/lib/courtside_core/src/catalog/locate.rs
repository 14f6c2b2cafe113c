//! Locator resolution — turns request parameters into a validated
//! `ContentLocator`.
//!
//! Every referent is checked for existence and for belonging to the right
//! parent; any mismatch is `NotFound`, never a distinct error, so probing
//! requests learn nothing about catalog structure.

use sqlx::PgPool;
use uuid::Uuid;

use super::{CatalogError, queries};
use crate::entitlement::ContentLocator;

/// Raw request parameters before validation.
#[derive(Debug, Clone, Default)]
pub struct LocatorParams {
    pub course_slug: String,
    pub package_slug: Option<String>,
    pub age_group_id: Option<Uuid>,
    pub card_id: Option<Uuid>,
    pub month_number: Option<i32>,
}

/// Validate `params` against the catalog and build the locator.
///
/// The card's age group is derived when the caller names a card without an
/// age group. A month narrowing requires an age group, since month numbers
/// only exist within one.
pub async fn resolve_locator(
    pool: &PgPool,
    params: &LocatorParams,
) -> Result<ContentLocator, CatalogError> {
    let course = queries::published_course_by_slug(pool, &params.course_slug)
        .await?
        .ok_or(CatalogError::NotFound)?;

    let package_id = match &params.package_slug {
        None => None,
        Some(slug) => {
            let package = queries::active_package_by_slug(pool, slug)
                .await?
                .ok_or(CatalogError::NotFound)?;
            if !queries::package_contains_course(pool, package.id, course.id).await? {
                return Err(CatalogError::NotFound);
            }
            Some(package.id)
        }
    };

    let mut age_group_id = params.age_group_id;
    if let Some(id) = age_group_id {
        let group = queries::age_group(pool, id).await?.ok_or(CatalogError::NotFound)?;
        if group.course_id != course.id {
            return Err(CatalogError::NotFound);
        }
    }

    if let Some(card_id) = params.card_id {
        let card = queries::player_card(pool, card_id)
            .await?
            .ok_or(CatalogError::NotFound)?;
        match age_group_id {
            Some(id) if id != card.age_group_id => return Err(CatalogError::NotFound),
            Some(_) => {}
            None => {
                let group = queries::age_group(pool, card.age_group_id)
                    .await?
                    .ok_or(CatalogError::NotFound)?;
                if group.course_id != course.id {
                    return Err(CatalogError::NotFound);
                }
                age_group_id = Some(card.age_group_id);
            }
        }
    }

    if let Some(month_number) = params.month_number {
        let group_id = age_group_id.ok_or(CatalogError::NotFound)?;
        if !queries::month_exists(pool, group_id, month_number).await? {
            return Err(CatalogError::NotFound);
        }
    }

    Ok(ContentLocator {
        course_id: course.id,
        package_id,
        age_group_id,
        card_id: params.card_id,
        month_number: params.month_number,
    })
}
