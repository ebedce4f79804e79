//! Six-week month grid and the per-day merge of entries, holidays and overlays.

use std::collections::{BTreeSet, HashMap};

use chrono::{Datelike, Duration, NaiveDate};
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

use crate::model::calendar_entry::CalendarEntry;
use crate::model::holiday::PublicHoliday;

pub const GRID_CELLS: usize = 42;
/// Items listed per cell before the rest are summarised as `overflow`.
pub const DAY_ENTRY_DISPLAY_LIMIT: usize = 3;
/// Years the calendar can display.
pub const YEAR_RANGE: std::ops::RangeInclusive<i32> = 1..=9999;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GridError {
    #[error("invalid month {year}-{month}")]
    InvalidMonth { year: i32, month: u32 },
    #[error("year {0} is outside 1..=9999")]
    YearOutOfRange(i32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayCell {
    pub date: NaiveDate,
    pub in_month: bool,
    pub is_today: bool,
}

/// 42 consecutive days starting at the Sunday on or before the 1st.
pub fn month_grid(year: i32, month: u32, today: NaiveDate) -> Result<Vec<DayCell>, GridError> {
    if !YEAR_RANGE.contains(&year) {
        return Err(GridError::YearOutOfRange(year));
    }
    let first = NaiveDate::from_ymd_opt(year, month, 1).ok_or(GridError::InvalidMonth { year, month })?;
    let lead = first.weekday().num_days_from_sunday() as i64;
    let start = first
        .checked_sub_signed(Duration::days(lead))
        .ok_or(GridError::YearOutOfRange(year))?;

    Ok(start
        .iter_days()
        .take(GRID_CELLS)
        .map(|date| DayCell {
            date,
            in_month: date.month() == month && date.year() == year,
            is_today: date == today,
        })
        .collect())
}

/// Holiday years the grid needs. December also pulls in the following year.
pub fn years_to_load(year: i32, month: u32, cells: &[DayCell]) -> Vec<i32> {
    let mut years: BTreeSet<i32> = cells.iter().map(|c| c.date.year()).collect();
    years.insert(year);
    if month == 12 {
        years.insert(year + 1);
    }
    years.into_iter().collect()
}

/// A span drawn across the grid, such as approved leave or stylist lending.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct DayOverlay {
    #[schema(example = "Ana Reyes (vacation)")]
    pub label: String,
    #[schema(nullable = true)]
    pub employee_id: Option<String>,
    #[schema(format = "date", value_type = String)]
    pub start: NaiveDate,
    #[schema(format = "date", value_type = String)]
    pub end: NaiveDate,
}

impl DayOverlay {
    fn covers(&self, day: NaiveDate) -> bool {
        self.start <= day && day <= self.end
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MergedDay {
    #[schema(example = "2025-12-25", format = "date", value_type = String)]
    pub date: NaiveDate,
    pub in_month: bool,
    pub is_today: bool,
    pub entries: Vec<CalendarEntry>,
    #[schema(nullable = true)]
    pub holiday: Option<PublicHoliday>,
    pub overlays: Vec<DayOverlay>,
    /// Items beyond the display limit. Everything is still listed above.
    pub overflow: usize,
}

pub fn merge_days(
    cells: &[DayCell],
    entries: &[CalendarEntry],
    holidays: &HashMap<NaiveDate, PublicHoliday>,
    overlays: &[DayOverlay],
) -> Vec<MergedDay> {
    let mut by_day: HashMap<NaiveDate, Vec<CalendarEntry>> = HashMap::new();
    for entry in entries {
        by_day.entry(entry.date).or_default().push(entry.clone());
    }

    cells
        .iter()
        .map(|cell| {
            let entries = by_day.remove(&cell.date).unwrap_or_default();
            let holiday = holidays.get(&cell.date).cloned();
            let overlays: Vec<DayOverlay> =
                overlays.iter().filter(|o| o.covers(cell.date)).cloned().collect();

            let shown = entries.len() + usize::from(holiday.is_some()) + overlays.len();
            MergedDay {
                date: cell.date,
                in_month: cell.in_month,
                is_today: cell.is_today,
                entries,
                holiday,
                overlays,
                overflow: shown.saturating_sub(DAY_ENTRY_DISPLAY_LIMIT),
            }
        })
        .collect()
}
