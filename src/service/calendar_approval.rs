use std::collections::{BTreeSet, HashMap};

use chrono::{Datelike, NaiveDate, Utc};
use serde::Serialize;
use serde_json::json;
use utoipa::ToSchema;

use crate::auth::auth::AuthUser;
use crate::error::AppError;
use crate::model::activity::{CALENDAR_APPROVED, CALENDAR_REJECTED};
use crate::model::calendar_entry::{CalendarEntry, EntryStatus, ReviewStamp};
use crate::model::holiday::PublicHoliday;
use crate::service::activity_log::Activity;
use crate::service::branch_calendar::EntryView;
use crate::state::AppState;
use crate::store::ReviewOutcome;

/// A pending entry with its branch resolved for display.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PendingEntry {
    #[serde(flatten)]
    pub entry: CalendarEntry,
    #[schema(example = "Makati Branch")]
    pub branch_name: String,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum HolidayMatch {
    Holiday,
    NotHoliday,
    /// The holiday list for that year could not be loaded.
    Unavailable,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct EntryVerification {
    pub entry_id: String,
    #[schema(example = "2025-12-25", format = "date", value_type = String)]
    pub date: NaiveDate,
    pub result: HolidayMatch,
    #[schema(nullable = true)]
    pub holiday: Option<PublicHoliday>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct VerificationReport {
    #[schema(example = "PH")]
    pub country: String,
    pub entries: Vec<EntryVerification>,
}

/// Resolves branch names for a snapshot, keeping its order.
pub async fn annotate(state: &AppState, entries: Vec<CalendarEntry>) -> Vec<PendingEntry> {
    let names = futures::future::join_all(
        entries.iter().map(|e| state.branch_names.name(&e.branch_id)),
    )
    .await;

    entries
        .into_iter()
        .zip(names)
        .map(|(entry, branch_name)| PendingEntry { entry, branch_name })
        .collect()
}

pub async fn pending_entries(
    state: &AppState,
    actor: &AuthUser,
) -> Result<Vec<PendingEntry>, AppError> {
    actor.require_operational()?;
    let entries = state.calendar.list_pending().await?;
    Ok(annotate(state, entries).await)
}

/// Checks every pending entry against the public holidays of its year.
pub async fn verify_pending(
    state: &AppState,
    actor: &AuthUser,
    country: Option<&str>,
    refresh: bool,
) -> Result<VerificationReport, AppError> {
    actor.require_operational()?;
    let country = country
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .unwrap_or(&state.default_country)
        .to_uppercase();

    let entries = state.calendar.list_pending().await?;
    let years: BTreeSet<i32> = entries.iter().map(|e| e.date.year()).collect();

    if refresh {
        for year in &years {
            state.holidays.invalidate(*year, &country).await;
        }
    }

    let mut by_year: HashMap<i32, Option<HashMap<NaiveDate, PublicHoliday>>> = HashMap::new();
    for year in years {
        let loaded = match state.holidays.try_holidays(year, &country).await {
            Ok(holidays) => Some(holidays.iter().map(|h| (h.date, h.clone())).collect()),
            Err(e) => {
                tracing::warn!(error = %e, year, country = %country, "Holiday verification unavailable");
                None
            }
        };
        by_year.insert(year, loaded);
    }

    let entries = entries
        .into_iter()
        .map(|entry| {
            let (result, holiday) = match by_year.get(&entry.date.year()) {
                Some(Some(holidays)) => match holidays.get(&entry.date) {
                    Some(h) => (HolidayMatch::Holiday, Some(h.clone())),
                    None => (HolidayMatch::NotHoliday, None),
                },
                _ => (HolidayMatch::Unavailable, None),
            };
            EntryVerification {
                entry_id: entry.id,
                date: entry.date,
                result,
                holiday,
            }
        })
        .collect();

    Ok(VerificationReport { country, entries })
}

pub async fn approve_entry(
    state: &AppState,
    actor: &AuthUser,
    entry_id: &str,
) -> Result<EntryView, AppError> {
    let stamp = ReviewStamp::approve(&actor.actor(), Utc::now());
    review(state, actor, entry_id, stamp).await
}

/// The reason is stored as given, empty included.
pub async fn reject_entry(
    state: &AppState,
    actor: &AuthUser,
    entry_id: &str,
    reason: String,
) -> Result<EntryView, AppError> {
    let stamp = ReviewStamp::reject(&actor.actor(), reason, Utc::now());
    review(state, actor, entry_id, stamp).await
}

async fn review(
    state: &AppState,
    actor: &AuthUser,
    entry_id: &str,
    stamp: ReviewStamp,
) -> Result<EntryView, AppError> {
    actor.require_operational()?;

    let entry = match state.calendar.review(entry_id, &stamp).await? {
        ReviewOutcome::Applied(entry) => entry,
        ReviewOutcome::AlreadyReviewed(status) => {
            return Err(AppError::conflict(format!(
                "Calendar entry was already reviewed ({status})"
            )));
        }
        ReviewOutcome::NotFound => {
            return Err(AppError::NotFound("Calendar entry not found".into()));
        }
    };

    let action = match stamp.status {
        EntryStatus::Rejected => CALENDAR_REJECTED,
        _ => CALENDAR_APPROVED,
    };
    tracing::info!(entry_id, status = %stamp.status, reviewer = %actor.id, "Calendar entry reviewed");

    state
        .activity
        .record(Activity {
            action,
            performed_by: &actor.id,
            branch_id: Some(&entry.branch_id),
            target_id: Some(&entry.id),
            details: json!({
                "date": entry.date,
                "title": entry.title,
                "rejection_reason": entry.rejection_reason,
            }),
        })
        .await;

    Ok(EntryView::from(entry))
}
