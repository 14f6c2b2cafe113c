//! The entitlement decision state machine.
//!
//! Evaluated top-down with short-circuiting: structural allowlist filter,
//! admin override, package-selection tie-break, anonymous preview, ban,
//! then course → card → month grants. Bans override grants; the allowlist
//! overrides everything including grants.

use chrono::{DateTime, Utc};
use tracing::warn;

use super::{
    BanChecker, CatalogLookup, ContentLocator, EntitlementError, GrantLookup, Identity, Resolution,
};

/// Compute the access decision for `identity` requesting `locator`.
///
/// Pure read: issues independent lookups against the three store seams and
/// combines their boolean outcomes. Safe for unbounded parallel invocation.
pub async fn resolve<B, G, C>(
    identity: &Identity,
    locator: &ContentLocator,
    bans: &B,
    grants: &G,
    catalog: &C,
    now: DateTime<Utc>,
) -> Result<Resolution, EntitlementError>
where
    B: BanChecker + ?Sized,
    G: GrantLookup + ?Sized,
    C: CatalogLookup + ?Sized,
{
    // Structural filter, not an access decision: content outside the
    // package's allowlist is not found, no matter what grants exist.
    if let (Some(package_id), Some(age_group_id)) = (locator.package_id, locator.age_group_id) {
        let allowed = catalog.allowed_age_groups(package_id, locator.course_id).await?;
        if !allowed.is_empty() && !allowed.contains(&age_group_id) {
            return Err(EntitlementError::NotFound);
        }
    }

    // Administrators bypass every other rule, bans included.
    if identity.is_admin {
        return Ok(Resolution::full());
    }

    // A course with packages cannot resolve without a package context; the
    // caller prompts for a selection instead of showing a generic deny.
    if locator.package_id.is_none() && catalog.package_count(locator.course_id).await? > 0 {
        return Ok(Resolution::package_selection_required());
    }

    let Some(account_id) = identity.account_id else {
        return if catalog.has_free_preview(locator).await? {
            Ok(Resolution::preview())
        } else {
            Ok(Resolution::denied("no_preview_content"))
        };
    };

    // Bans win over grants. A failed lookup fails closed: this is the
    // authenticated path, so a store error must not widen access.
    match bans.is_account_banned(account_id, now).await {
        Ok(false) => {}
        Ok(true) => return Ok(Resolution::denied("account_banned")),
        Err(e) => {
            warn!(%account_id, error = %e, "account ban lookup failed, denying");
            return Ok(Resolution::denied("account_banned"));
        }
    }

    if grants.has_course_grant(account_id, locator.course_id, now).await? {
        return Ok(Resolution::full());
    }

    if let Some(card_id) = locator.card_id
        && grants.has_card_grant(account_id, card_id, now).await?
    {
        return Ok(Resolution::full());
    }

    // A month grant unlocks exactly the requested month; the locator is
    // already month-scoped, so the decision is too.
    if let Some(month_number) = locator.month_number
        && grants
            .has_month_grant(account_id, locator.course_id, month_number, now)
            .await?
    {
        return Ok(Resolution::full());
    }

    Ok(Resolution::preview())
}
