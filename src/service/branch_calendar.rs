use chrono::{NaiveDate, Utc};
use serde::Serialize;
use serde_json::json;
use utoipa::ToSchema;

use crate::auth::auth::AuthUser;
use crate::error::AppError;
use crate::model::activity::{CALENDAR_DELETED, CALENDAR_REQUESTED, CALENDAR_UPDATED};
use crate::model::calendar_entry::{CalendarEntry, EntryDraft, EntryStatus, EntryType};
use crate::service::activity_log::Activity;
use crate::state::AppState;

#[derive(Debug, Serialize, ToSchema)]
pub struct EntryTypeInfo {
    #[schema(example = "special_hours")]
    pub value: EntryType,
    #[schema(example = "Special Hours")]
    pub label: &'static str,
}

/// An entry as shown to branch staff.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct EntryView {
    #[serde(flatten)]
    pub entry: CalendarEntry,
    #[schema(example = "no reason given", nullable = true)]
    pub rejection_reason_display: Option<String>,
}

impl From<CalendarEntry> for EntryView {
    fn from(entry: CalendarEntry) -> Self {
        Self {
            rejection_reason_display: entry.rejection_reason_display().map(str::to_string),
            entry,
        }
    }
}

pub fn entry_types() -> Vec<EntryTypeInfo> {
    EntryType::ALL
        .iter()
        .map(|t| EntryTypeInfo {
            value: *t,
            label: t.label(),
        })
        .collect()
}

pub(crate) fn ensure_can_view(actor: &AuthUser, branch_id: &str) -> Result<(), AppError> {
    if actor.manages_branch(branch_id) || actor.branch_id.as_deref() == Some(branch_id) {
        Ok(())
    } else {
        Err(AppError::Forbidden("You cannot view this branch calendar".into()))
    }
}

/// Every entry of the branch regardless of status, by date.
pub async fn list_entries(
    state: &AppState,
    actor: &AuthUser,
    branch_id: &str,
) -> Result<Vec<EntryView>, AppError> {
    ensure_can_view(actor, branch_id)?;
    let entries = state.calendar.list_by_branch(branch_id).await?;
    Ok(entries.into_iter().map(EntryView::from).collect())
}

/// Approved entries, legacy rows included.
pub async fn approved_entries(
    state: &AppState,
    actor: &AuthUser,
    branch_id: &str,
) -> Result<Vec<CalendarEntry>, AppError> {
    ensure_can_view(actor, branch_id)?;
    let mut entries: Vec<CalendarEntry> = state
        .calendar
        .list_by_branch(branch_id)
        .await?
        .into_iter()
        .filter(|e| e.status == EntryStatus::Approved)
        .collect();
    entries.sort_by_key(|e| e.date);
    Ok(entries)
}

pub async fn upcoming_entries(
    state: &AppState,
    actor: &AuthUser,
    branch_id: &str,
    today: NaiveDate,
) -> Result<Vec<CalendarEntry>, AppError> {
    let mut entries = approved_entries(state, actor, branch_id).await?;
    entries.retain(|e| e.date >= today);
    Ok(entries)
}

pub async fn create_entry(
    state: &AppState,
    actor: &AuthUser,
    branch_id: &str,
    draft: EntryDraft,
) -> Result<CalendarEntry, AppError> {
    actor.require_branch_manager(branch_id)?;
    draft.validate()?;

    let entry = CalendarEntry::from_draft(branch_id, draft, &actor.actor(), None, Utc::now());
    state.calendar.insert(&entry).await?;

    tracing::info!(entry_id = %entry.id, branch_id, date = %entry.date, "Calendar entry submitted");
    record(state, actor, CALENDAR_REQUESTED, &entry).await;

    Ok(entry)
}

pub async fn update_entry(
    state: &AppState,
    actor: &AuthUser,
    branch_id: &str,
    entry_id: &str,
    draft: EntryDraft,
) -> Result<CalendarEntry, AppError> {
    actor.require_branch_manager(branch_id)?;
    draft.validate()?;

    let existing = state
        .calendar
        .get(entry_id)
        .await?
        .filter(|e| e.branch_id == branch_id)
        .ok_or_else(|| AppError::NotFound("Calendar entry not found".into()))?;

    let entry =
        CalendarEntry::from_draft(branch_id, draft, &actor.actor(), Some(&existing), Utc::now());
    // Deleted since the read: never resurrect it.
    if !state.calendar.update(&entry).await? {
        return Err(AppError::NotFound("Calendar entry not found".into()));
    }

    record(state, actor, CALENDAR_UPDATED, &entry).await;

    Ok(entry)
}

pub async fn delete_entry(
    state: &AppState,
    actor: &AuthUser,
    branch_id: &str,
    entry_id: &str,
) -> Result<(), AppError> {
    actor.require_branch_manager(branch_id)?;

    let existing = state
        .calendar
        .get(entry_id)
        .await?
        .filter(|e| e.branch_id == branch_id)
        .ok_or_else(|| AppError::NotFound("Calendar entry not found".into()))?;

    if !state.calendar.delete(branch_id, entry_id).await? {
        return Err(AppError::NotFound("Calendar entry not found".into()));
    }

    record(state, actor, CALENDAR_DELETED, &existing).await;
    Ok(())
}

async fn record(state: &AppState, actor: &AuthUser, action: &str, entry: &CalendarEntry) {
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
                "entry_type": entry.entry_type,
                "status": entry.status,
            }),
        })
        .await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::calendar_entry::{Actor, ReviewStamp};
    use crate::model::role::Role;
    use crate::state::testing::Fixture;
    use crate::store::CalendarStore;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn manager(branch: &str) -> AuthUser {
        AuthUser {
            id: "manager-1".into(),
            name: "Liza".into(),
            role: Role::BranchManager,
            branch_id: Some(branch.to_string()),
        }
    }

    fn draft(day: NaiveDate, title: &str) -> EntryDraft {
        EntryDraft {
            date: day,
            title: title.to_string(),
            description: String::new(),
            entry_type: EntryType::Holiday,
            all_day: true,
            special_hours: None,
        }
    }

    #[actix_web::test]
    async fn new_entry_enters_pending_feed() {
        let fx = Fixture::new();
        let mut feed = fx.state.calendar.subscribe_pending();
        assert!(feed.next().await.unwrap().is_empty());

        let entry = create_entry(&fx.state, &manager("branch-1"), "branch-1", draft(date(2025, 12, 24), "Christmas Eve"))
            .await
            .unwrap();
        assert_eq!(entry.status, EntryStatus::Pending);

        let pending = feed.next().await.unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].id, entry.id);
        assert_eq!(fx.activity.actions(), vec![CALENDAR_REQUESTED.to_string()]);
    }

    #[actix_web::test]
    async fn other_branch_is_forbidden() {
        let fx = Fixture::new();
        let err = create_entry(&fx.state, &manager("branch-2"), "branch-1", draft(date(2025, 12, 24), "x"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }

    #[actix_web::test]
    async fn invalid_draft_is_rejected() {
        let fx = Fixture::new();
        let err = create_entry(&fx.state, &manager("branch-1"), "branch-1", draft(date(2025, 12, 24), " "))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[actix_web::test]
    async fn editing_approved_entry_keeps_it_approved() {
        let fx = Fixture::new();
        let bm = manager("branch-1");
        let entry = create_entry(&fx.state, &bm, "branch-1", draft(date(2025, 12, 24), "Christmas Eve"))
            .await
            .unwrap();
        let reviewer = Actor {
            id: "opmanager-1".into(),
            name: "Ops".into(),
        };
        fx.calendar
            .review(&entry.id, &ReviewStamp::approve(&reviewer, Utc::now()))
            .await
            .unwrap();

        let edited = update_entry(&fx.state, &bm, "branch-1", &entry.id, draft(date(2025, 12, 24), "Christmas Eve (half day)"))
            .await
            .unwrap();
        assert_eq!(edited.status, EntryStatus::Approved);

        let approved = approved_entries(&fx.state, &bm, "branch-1").await.unwrap();
        assert_eq!(approved.len(), 1);
        assert_eq!(approved[0].title, "Christmas Eve (half day)");
    }

    #[actix_web::test]
    async fn legacy_entry_counts_as_approved_and_upcoming() {
        let fx = Fixture::new();
        let bm = manager("branch-1");
        let mut legacy = CalendarEntry::from_draft(
            "branch-1",
            draft(date(2025, 12, 25), "Christmas Day"),
            &bm.actor(),
            None,
            Utc::now(),
        );
        legacy.status = EntryStatus::from_stored(None).unwrap();
        fx.calendar.seed(legacy);

        let upcoming = upcoming_entries(&fx.state, &bm, "branch-1", date(2025, 12, 1)).await.unwrap();
        assert_eq!(upcoming.len(), 1);
        assert!(upcoming_entries(&fx.state, &bm, "branch-1", date(2026, 1, 1)).await.unwrap().is_empty());
    }

    #[actix_web::test]
    async fn edit_racing_a_delete_does_not_resurrect() {
        let fx = Fixture::new();
        let bm = manager("branch-1");
        let entry = create_entry(&fx.state, &bm, "branch-1", draft(date(2025, 12, 24), "Christmas Eve"))
            .await
            .unwrap();

        fx.calendar.delete_after_next_read();
        let err = update_entry(&fx.state, &bm, "branch-1", &entry.id, draft(date(2025, 12, 24), "Edited"))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::NotFound(_)));
        assert!(fx.calendar.get(&entry.id).await.unwrap().is_none());
        assert_eq!(fx.activity.actions(), vec![CALENDAR_REQUESTED.to_string()]);
    }

    #[actix_web::test]
    async fn delete_removes_entry_at_any_status() {
        let fx = Fixture::new();
        let bm = manager("branch-1");
        let entry = create_entry(&fx.state, &bm, "branch-1", draft(date(2025, 12, 24), "Christmas Eve"))
            .await
            .unwrap();

        delete_entry(&fx.state, &bm, "branch-1", &entry.id).await.unwrap();
        assert!(list_entries(&fx.state, &bm, "branch-1").await.unwrap().is_empty());
        assert!(matches!(
            delete_entry(&fx.state, &bm, "branch-1", &entry.id).await.unwrap_err(),
            AppError::NotFound(_)
        ));
    }

    #[test]
    fn lists_entry_types_with_labels() {
        let labels: Vec<&str> = entry_types().iter().map(|t| t.label).collect();
        assert_eq!(labels, vec!["Holiday", "Temporary Closure", "Special Hours"]);
    }
}
