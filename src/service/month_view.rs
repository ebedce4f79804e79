use std::collections::HashMap;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::auth::auth::AuthUser;
use crate::error::AppError;
use crate::model::calendar_entry::EntryStatus;
use crate::model::holiday::PublicHoliday;
use crate::model::leave_request::LeaveStatus;
use crate::service::branch_calendar::ensure_can_view;
use crate::service::day_grid::{DayOverlay, MergedDay, merge_days, month_grid, years_to_load};
use crate::state::AppState;

#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct MonthQuery {
    #[schema(example = 2025)]
    pub year: i32,
    #[schema(example = 12)]
    pub month: u32,
    /// Omit to show every branch (operational roles only)
    #[schema(example = "branch-makati")]
    pub branch_id: Option<String>,
    /// ISO country code for public holidays
    #[schema(example = "PH")]
    pub country: Option<String>,
    /// Also show entries still waiting for approval
    #[serde(default)]
    pub include_pending: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MonthView {
    pub year: i32,
    pub month: u32,
    #[schema(nullable = true)]
    pub branch_id: Option<String>,
    pub country: String,
    pub days: Vec<MergedDay>,
    /// Public holidays falling inside the displayed month
    pub holidays: Vec<PublicHoliday>,
    /// Years whose public holidays could not be loaded. Days in them may be
    /// holidays; the lookup is worth retrying.
    pub holidays_unavailable: Vec<i32>,
}

fn resolve_branch(actor: &AuthUser, requested: Option<&str>) -> Result<Option<String>, AppError> {
    match requested {
        Some(branch_id) => {
            ensure_can_view(actor, branch_id)?;
            Ok(Some(branch_id.to_string()))
        }
        None if actor.role.has_operational_authority() => Ok(None),
        None => actor
            .branch_id
            .clone()
            .map(Some)
            .ok_or_else(|| AppError::Validation("branch_id is required".into())),
    }
}

/// Approved leave of the branch drawn as spans across the grid.
async fn leave_overlays(
    state: &AppState,
    branch_id: &str,
    from: NaiveDate,
    to: NaiveDate,
) -> Result<Vec<DayOverlay>, AppError> {
    let leaves = state.leaves.list_by_branch(branch_id).await?;
    let names: HashMap<String, String> = state
        .staff
        .list_by_branch(branch_id)
        .await?
        .into_iter()
        .map(|s| (s.id, s.display_name))
        .collect();

    let mut overlays: Vec<DayOverlay> = leaves
        .into_iter()
        .filter(|l| l.status == LeaveStatus::Approved && l.start_date <= to && from <= l.end_date)
        .map(|l| {
            let name = names.get(&l.employee_id).map_or(l.employee_id.as_str(), String::as_str);
            DayOverlay {
                label: format!("{name} ({})", l.leave_type.as_str()),
                employee_id: Some(l.employee_id.clone()),
                start: l.start_date,
                end: l.end_date,
            }
        })
        .collect();
    overlays.sort_by(|a, b| a.start.cmp(&b.start).then_with(|| a.label.cmp(&b.label)));
    Ok(overlays)
}

pub async fn month_view(
    state: &AppState,
    actor: &AuthUser,
    query: &MonthQuery,
    today: NaiveDate,
) -> Result<MonthView, AppError> {
    let branch_id = resolve_branch(actor, query.branch_id.as_deref())?;
    let country = query
        .country
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .unwrap_or(&state.default_country)
        .to_uppercase();

    let cells = month_grid(query.year, query.month, today)?;
    let (Some(first), Some(last)) = (cells.first(), cells.last()) else {
        return Err(AppError::Validation("empty month grid".into()));
    };
    let (from, to) = (first.date, last.date);

    let years = years_to_load(query.year, query.month, &cells);
    let lookup = state.holidays.holiday_map(&years, &country).await;
    let holidays = lookup.by_date;

    let entries: Vec<_> = state
        .calendar
        .list_between(branch_id.as_deref(), from, to)
        .await?
        .into_iter()
        .filter(|e| match e.status {
            EntryStatus::Approved => true,
            EntryStatus::Pending => query.include_pending,
            EntryStatus::Rejected => false,
        })
        .collect();

    let overlays = match branch_id.as_deref() {
        Some(branch_id) => leave_overlays(state, branch_id, from, to).await?,
        None => Vec::new(),
    };

    let mut month_holidays: Vec<PublicHoliday> = holidays
        .values()
        .filter(|h| h.date.year() == query.year && h.date.month() == query.month)
        .cloned()
        .collect();
    month_holidays.sort_by_key(|h| h.date);

    Ok(MonthView {
        year: query.year,
        month: query.month,
        branch_id,
        country,
        days: merge_days(&cells, &entries, &holidays, &overlays),
        holidays: month_holidays,
        holidays_unavailable: lookup.unavailable_years,
    })
}
