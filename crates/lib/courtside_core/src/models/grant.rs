//! Grant domain models.
//!
//! A grant links an account to a scope (course, card, or month) for a time
//! window. The table stores one row shape for all three subject kinds; the
//! domain model is the tagged `Grant` enum so only the meaningful fields of
//! each kind exist at all.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Grant subject kind, mirrors the `grant_subject` PG enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "grant_subject", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum GrantSubject {
    Course,
    Card,
    Month,
}

/// Grant lifecycle status, mirrors the `grant_status` PG enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "grant_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum GrantStatus {
    Active,
    Revoked,
    Pending,
}

/// Where a grant came from, mirrors the `grant_source` PG enum.
///
/// `Import` models partially-provisioned rows (e.g. a half-finished data
/// migration) and never qualifies for course access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "grant_source", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum GrantSource {
    Code,
    Manual,
    Admin,
    Import,
}

impl GrantSource {
    /// Whether a course grant from this source is honored as full access.
    pub fn qualifies_for_course_access(self) -> bool {
        matches!(self, GrantSource::Code | GrantSource::Manual | GrantSource::Admin)
    }
}

/// Database row for `grants`.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct GrantRow {
    pub id: Uuid,
    pub account_id: Uuid,
    pub subject_type: GrantSubject,
    pub course_id: Option<Uuid>,
    pub card_id: Option<Uuid>,
    pub month_number: Option<i32>,
    pub start_at: DateTime<Utc>,
    pub end_at: Option<DateTime<Utc>>,
    pub status: GrantStatus,
    pub source_kind: GrantSource,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The shared time-window shape of every grant kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GrantWindow {
    pub start_at: DateTime<Utc>,
    /// `None` means unbounded.
    pub end_at: Option<DateTime<Utc>>,
    pub status: GrantStatus,
    pub source: GrantSource,
}

impl GrantWindow {
    /// Window rule: active iff status is `active` and `end_at` is unbounded
    /// or still in the future.
    pub fn is_open(&self, now: DateTime<Utc>) -> bool {
        self.status == GrantStatus::Active && self.end_at.is_none_or(|end| end > now)
    }
}

/// A grant with only the fields meaningful for its subject kind.
#[derive(Debug, Clone)]
pub enum Grant {
    Course {
        account_id: Uuid,
        course_id: Uuid,
        window: GrantWindow,
    },
    Card {
        account_id: Uuid,
        card_id: Uuid,
        window: GrantWindow,
    },
    Month {
        account_id: Uuid,
        course_id: Uuid,
        month_number: i32,
        window: GrantWindow,
    },
}

impl Grant {
    /// Build the tagged grant from a row, rejecting rows whose nullable
    /// columns do not match their subject kind.
    pub fn from_row(row: &GrantRow) -> Option<Grant> {
        let window = GrantWindow {
            start_at: row.start_at,
            end_at: row.end_at,
            status: row.status,
            source: row.source_kind,
        };
        match row.subject_type {
            GrantSubject::Course => Some(Grant::Course {
                account_id: row.account_id,
                course_id: row.course_id?,
                window,
            }),
            GrantSubject::Card => Some(Grant::Card {
                account_id: row.account_id,
                card_id: row.card_id?,
                window,
            }),
            GrantSubject::Month => Some(Grant::Month {
                account_id: row.account_id,
                course_id: row.course_id?,
                month_number: row.month_number?,
                window,
            }),
        }
    }

    pub fn window(&self) -> &GrantWindow {
        match self {
            Grant::Course { window, .. } | Grant::Card { window, .. } | Grant::Month { window, .. } => {
                window
            }
        }
    }

    /// Whether this grant confers access at `now`.
    ///
    /// Course grants additionally require a qualifying source; card and month
    /// grants are honored from any source.
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        let window = self.window();
        if !window.is_open(now) {
            return false;
        }
        match self {
            Grant::Course { .. } => window.source.qualifies_for_course_access(),
            Grant::Card { .. } | Grant::Month { .. } => true,
        }
    }
}

/// The scope a new grant targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrantScope {
    Course(Uuid),
    Card(Uuid),
    Month { course_id: Uuid, month_number: i32 },
}

impl GrantScope {
    /// Decompose into the column values the `grants` table stores.
    pub fn columns(self) -> (GrantSubject, Option<Uuid>, Option<Uuid>, Option<i32>) {
        match self {
            GrantScope::Course(course_id) => (GrantSubject::Course, Some(course_id), None, None),
            GrantScope::Card(card_id) => (GrantSubject::Card, None, Some(card_id), None),
            GrantScope::Month {
                course_id,
                month_number,
            } => (GrantSubject::Month, Some(course_id), None, Some(month_number)),
        }
    }
}

/// A grant to be issued (or merged into an existing one).
#[derive(Debug, Clone)]
pub struct NewGrant {
    pub account_id: Uuid,
    pub scope: GrantScope,
    /// `None` issues an unbounded grant.
    pub end_at: Option<DateTime<Utc>>,
    pub source: GrantSource,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn window(status: GrantStatus, source: GrantSource, end_at: Option<DateTime<Utc>>) -> GrantWindow {
        GrantWindow {
            start_at: Utc::now() - Duration::days(1),
            end_at,
            status,
            source,
        }
    }

    #[test]
    fn unbounded_active_window_is_open() {
        let now = Utc::now();
        let w = window(GrantStatus::Active, GrantSource::Manual, None);
        assert!(w.is_open(now));
    }

    #[test]
    fn expired_window_is_closed() {
        let now = Utc::now();
        let w = window(
            GrantStatus::Active,
            GrantSource::Manual,
            Some(now - Duration::seconds(1)),
        );
        assert!(!w.is_open(now));
    }

    #[test]
    fn end_at_exactly_now_is_closed() {
        let now = Utc::now();
        let w = window(GrantStatus::Active, GrantSource::Manual, Some(now));
        assert!(!w.is_open(now));
    }

    #[test]
    fn revoked_window_is_closed_even_when_unexpired() {
        let now = Utc::now();
        let w = window(
            GrantStatus::Revoked,
            GrantSource::Manual,
            Some(now + Duration::days(30)),
        );
        assert!(!w.is_open(now));
    }

    #[test]
    fn course_grant_from_import_source_is_not_active() {
        let now = Utc::now();
        let grant = Grant::Course {
            account_id: Uuid::new_v4(),
            course_id: Uuid::new_v4(),
            window: window(GrantStatus::Active, GrantSource::Import, None),
        };
        assert!(!grant.is_active(now));
    }

    #[test]
    fn card_grant_from_import_source_is_active() {
        let now = Utc::now();
        let grant = Grant::Card {
            account_id: Uuid::new_v4(),
            card_id: Uuid::new_v4(),
            window: window(GrantStatus::Active, GrantSource::Import, None),
        };
        assert!(grant.is_active(now));
    }

    #[test]
    fn course_grant_qualifying_sources() {
        assert!(GrantSource::Code.qualifies_for_course_access());
        assert!(GrantSource::Manual.qualifies_for_course_access());
        assert!(GrantSource::Admin.qualifies_for_course_access());
        assert!(!GrantSource::Import.qualifies_for_course_access());
    }

    #[test]
    fn from_row_rejects_mismatched_columns() {
        let row = GrantRow {
            id: Uuid::new_v4(),
            account_id: Uuid::new_v4(),
            subject_type: GrantSubject::Month,
            course_id: Some(Uuid::new_v4()),
            card_id: None,
            month_number: None, // month grant without a month number
            start_at: Utc::now(),
            end_at: None,
            status: GrantStatus::Active,
            source_kind: GrantSource::Manual,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert!(Grant::from_row(&row).is_none());
    }
}
