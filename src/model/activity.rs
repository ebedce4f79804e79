use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

pub const LEAVE_REQUESTED: &str = "leave_requested";
pub const LEAVE_APPROVED: &str = "leave_approved";
pub const LEAVE_REJECTED: &str = "leave_rejected";
pub const LEAVE_CANCELLED: &str = "leave_cancelled";
pub const CALENDAR_REQUESTED: &str = "branch_calendar_requested";
pub const CALENDAR_UPDATED: &str = "branch_calendar_updated";
pub const CALENDAR_DELETED: &str = "branch_calendar_deleted";
pub const CALENDAR_APPROVED: &str = "calendar_entry_approved";
pub const CALENDAR_REJECTED: &str = "calendar_entry_rejected";

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ActivityRecord {
    pub id: String,
    #[schema(example = "calendar_entry_approved")]
    pub action: String,
    #[schema(example = "opmanager-1")]
    pub performed_by: String,
    #[schema(nullable = true)]
    pub branch_id: Option<String>,
    #[schema(nullable = true)]
    pub target_id: Option<String>,
    #[schema(value_type = Object)]
    pub details: Value,
    pub recorded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default)]
pub struct ActivityFilter {
    pub performed_by: Option<String>,
    pub action: Option<String>,
    pub branch_id: Option<String>,
    pub limit: u32,
}
