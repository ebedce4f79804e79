use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;
use uuid::Uuid;

pub const NO_REASON_GIVEN: &str = "no reason given";

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum EntryType {
    Holiday,
    Closure,
    SpecialHours,
}

impl EntryType {
    pub const ALL: [EntryType; 3] = [EntryType::Holiday, EntryType::Closure, EntryType::SpecialHours];

    pub fn as_str(&self) -> &'static str {
        match self {
            EntryType::Holiday => "holiday",
            EntryType::Closure => "closure",
            EntryType::SpecialHours => "special_hours",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "holiday" => Some(EntryType::Holiday),
            "closure" => Some(EntryType::Closure),
            "special_hours" => Some(EntryType::SpecialHours),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            EntryType::Holiday => "Holiday",
            EntryType::Closure => "Temporary Closure",
            EntryType::SpecialHours => "Special Hours",
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum EntryStatus {
    Pending,
    Approved,
    Rejected,
}

impl EntryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryStatus::Pending => "pending",
            EntryStatus::Approved => "approved",
            EntryStatus::Rejected => "rejected",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(EntryStatus::Pending),
            "approved" => Some(EntryStatus::Approved),
            "rejected" => Some(EntryStatus::Rejected),
            _ => None,
        }
    }

    /// Rows written before approvals existed carry no status and count as approved.
    pub fn from_stored(value: Option<&str>) -> Option<Self> {
        match value {
            None => Some(EntryStatus::Approved),
            Some(s) => Self::parse(s),
        }
    }
}

impl fmt::Display for EntryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct SpecialHours {
    #[schema(example = "10:00:00", value_type = String)]
    pub open: NaiveTime,
    #[schema(example = "15:00:00", value_type = String)]
    pub close: NaiveTime,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CalendarEntry {
    pub id: String,
    #[schema(example = "branch-makati")]
    pub branch_id: String,
    #[schema(example = "2025-12-25", format = "date", value_type = String)]
    pub date: NaiveDate,
    #[schema(example = "Christmas Day")]
    pub title: String,
    pub description: String,
    pub entry_type: EntryType,
    pub all_day: bool,
    #[schema(nullable = true)]
    pub special_hours: Option<SpecialHours>,
    pub status: EntryStatus,
    #[schema(nullable = true)]
    pub requested_by: Option<String>,
    #[schema(nullable = true)]
    pub requested_by_name: Option<String>,
    #[schema(nullable = true)]
    pub reviewed_by: Option<String>,
    #[schema(nullable = true)]
    pub reviewed_by_name: Option<String>,
    pub reviewed_at: Option<DateTime<Utc>>,
    #[schema(nullable = true)]
    pub rejection_reason: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Branch-manager input for creating or editing an entry.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct EntryDraft {
    #[schema(example = "2025-12-24", format = "date", value_type = String)]
    pub date: NaiveDate,
    #[schema(example = "Christmas Eve")]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_entry_type")]
    pub entry_type: EntryType,
    #[serde(default = "default_all_day")]
    pub all_day: bool,
    #[serde(default)]
    pub special_hours: Option<SpecialHours>,
}

fn default_entry_type() -> EntryType {
    EntryType::Holiday
}

fn default_all_day() -> bool {
    true
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CalendarValidationError {
    #[error("title is required")]
    MissingTitle,
    #[error("special hours entries that are not all-day need opening and closing times")]
    MissingSpecialHours,
    #[error("special hours must open before they close")]
    InvertedHours,
}

impl EntryDraft {
    pub fn validate(&self) -> Result<(), CalendarValidationError> {
        if self.title.trim().is_empty() {
            return Err(CalendarValidationError::MissingTitle);
        }
        if self.entry_type == EntryType::SpecialHours && !self.all_day {
            let hours = self
                .special_hours
                .ok_or(CalendarValidationError::MissingSpecialHours)?;
            if hours.open >= hours.close {
                return Err(CalendarValidationError::InvertedHours);
            }
        }
        Ok(())
    }

    fn effective_special_hours(&self) -> Option<SpecialHours> {
        if self.entry_type == EntryType::SpecialHours && !self.all_day {
            self.special_hours
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub id: String,
    pub name: String,
}

/// Outcome of an operational-manager review, written only if the entry is still pending.
#[derive(Debug, Clone, PartialEq)]
pub struct ReviewStamp {
    pub status: EntryStatus,
    pub reviewer_id: String,
    pub reviewer_name: String,
    pub at: DateTime<Utc>,
    pub rejection_reason: Option<String>,
}

impl ReviewStamp {
    pub fn approve(reviewer: &Actor, at: DateTime<Utc>) -> Self {
        Self {
            status: EntryStatus::Approved,
            reviewer_id: reviewer.id.clone(),
            reviewer_name: reviewer.name.clone(),
            at,
            rejection_reason: None,
        }
    }

    pub fn reject(reviewer: &Actor, reason: String, at: DateTime<Utc>) -> Self {
        Self {
            status: EntryStatus::Rejected,
            reviewer_id: reviewer.id.clone(),
            reviewer_name: reviewer.name.clone(),
            at,
            rejection_reason: Some(reason),
        }
    }
}

impl CalendarEntry {
    /// New entries start pending; edits keep whatever status the stored entry has.
    pub fn from_draft(
        branch_id: &str,
        draft: EntryDraft,
        actor: &Actor,
        existing: Option<&CalendarEntry>,
        now: DateTime<Utc>,
    ) -> Self {
        let special_hours = draft.effective_special_hours();
        match existing {
            Some(prev) => Self {
                id: prev.id.clone(),
                branch_id: branch_id.to_string(),
                date: draft.date,
                title: draft.title,
                description: draft.description,
                entry_type: draft.entry_type,
                all_day: draft.all_day,
                special_hours,
                status: prev.status,
                requested_by: prev.requested_by.clone().or_else(|| Some(actor.id.clone())),
                requested_by_name: prev
                    .requested_by_name
                    .clone()
                    .or_else(|| Some(actor.name.clone())),
                reviewed_by: prev.reviewed_by.clone(),
                reviewed_by_name: prev.reviewed_by_name.clone(),
                reviewed_at: prev.reviewed_at,
                rejection_reason: prev.rejection_reason.clone(),
                created_at: prev.created_at,
                updated_at: Some(now),
            },
            None => Self {
                id: Uuid::new_v4().to_string(),
                branch_id: branch_id.to_string(),
                date: draft.date,
                title: draft.title,
                description: draft.description,
                entry_type: draft.entry_type,
                all_day: draft.all_day,
                special_hours,
                status: EntryStatus::Pending,
                requested_by: Some(actor.id.clone()),
                requested_by_name: Some(actor.name.clone()),
                reviewed_by: None,
                reviewed_by_name: None,
                reviewed_at: None,
                rejection_reason: None,
                created_at: Some(now),
                updated_at: Some(now),
            },
        }
    }

    pub fn apply_review(&mut self, stamp: &ReviewStamp) {
        self.status = stamp.status;
        self.reviewed_by = Some(stamp.reviewer_id.clone());
        self.reviewed_by_name = Some(stamp.reviewer_name.clone());
        self.reviewed_at = Some(stamp.at);
        self.rejection_reason = stamp.rejection_reason.clone();
    }

    /// Text shown to the submitter of a rejected entry.
    pub fn rejection_reason_display(&self) -> Option<&str> {
        if self.status != EntryStatus::Rejected {
            return None;
        }
        match self.rejection_reason.as_deref() {
            Some(reason) if !reason.trim().is_empty() => Some(reason),
            _ => Some(NO_REASON_GIVEN),
        }
    }
}
