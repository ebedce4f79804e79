use std::cmp::Ordering;
use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::auth::auth::AuthUser;
use crate::error::AppError;
use crate::model::leave_request::{LeaveRequest, LeaveStatus, LeaveType};
use crate::model::role::Role;
use crate::state::AppState;

pub const DEFAULT_PER_PAGE: u64 = 10;
pub const MAX_PER_PAGE: u64 = 100;

#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct LeaveQuery {
    /// Defaults to the caller's branch
    #[schema(example = "branch-makati")]
    pub branch_id: Option<String>,
    /// pending, approved, rejected, cancelled, rejected_cancelled or all
    #[schema(example = "pending")]
    pub status: Option<String>,
    #[schema(example = "vacation")]
    pub leave_type: Option<String>,
    #[schema(example = "stylist-7")]
    pub employee_id: Option<String>,
    /// Case-insensitive match on the employee's name
    #[schema(example = "ana")]
    pub search: Option<String>,
    /// requested_at, start_date, end_date, status, leave_type or employee_name
    #[schema(example = "requested_at")]
    pub sort_by: Option<String>,
    /// asc or desc
    #[schema(example = "desc")]
    pub order: Option<String>,
    #[schema(example = 1)]
    /// Pagination page number (start with 1)
    pub page: Option<u64>,
    #[schema(example = 10)]
    /// Pagination per page number
    pub per_page: Option<u64>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LeaveListItem {
    #[serde(flatten)]
    pub leave: LeaveRequest,
    #[schema(example = "Ana Reyes")]
    pub employee_name: String,
}

#[derive(Debug, Default, Serialize, ToSchema)]
pub struct LeaveSummary {
    pub pending: usize,
    pub approved: usize,
    pub rejected: usize,
    pub cancelled: usize,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LeavePage {
    pub data: Vec<LeaveListItem>,
    #[schema(example = 1)]
    pub page: u64,
    #[schema(example = 10)]
    pub per_page: u64,
    #[schema(example = 1)]
    pub total: usize,
    /// Status counts over every matching request, not just this page.
    pub summary: LeaveSummary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StatusFilter {
    Only(LeaveStatus),
    RejectedOrCancelled,
}

impl StatusFilter {
    fn parse(value: &str) -> Result<Option<Self>, AppError> {
        match value {
            "all" | "" => Ok(None),
            "rejected_cancelled" => Ok(Some(StatusFilter::RejectedOrCancelled)),
            other => LeaveStatus::parse(other)
                .map(|s| Some(StatusFilter::Only(s)))
                .ok_or_else(|| AppError::Validation(format!("Invalid status filter {other}"))),
        }
    }

    fn matches(&self, status: LeaveStatus) -> bool {
        match self {
            StatusFilter::Only(s) => *s == status,
            StatusFilter::RejectedOrCancelled => {
                matches!(status, LeaveStatus::Rejected | LeaveStatus::Cancelled)
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SortKey {
    RequestedAt,
    StartDate,
    EndDate,
    Status,
    LeaveType,
    EmployeeName,
}

impl SortKey {
    fn parse(value: &str) -> Result<Self, AppError> {
        match value {
            "requested_at" => Ok(SortKey::RequestedAt),
            "start_date" => Ok(SortKey::StartDate),
            "end_date" => Ok(SortKey::EndDate),
            "status" => Ok(SortKey::Status),
            "leave_type" => Ok(SortKey::LeaveType),
            "employee_name" => Ok(SortKey::EmployeeName),
            other => Err(AppError::Validation(format!("Cannot sort by {other}"))),
        }
    }

    fn compare(&self, a: &LeaveListItem, b: &LeaveListItem) -> Ordering {
        match self {
            SortKey::RequestedAt => a.leave.requested_at.cmp(&b.leave.requested_at),
            SortKey::StartDate => a.leave.start_date.cmp(&b.leave.start_date),
            SortKey::EndDate => a.leave.end_date.cmp(&b.leave.end_date),
            SortKey::Status => a.leave.status.as_str().cmp(b.leave.status.as_str()),
            SortKey::LeaveType => a.leave.leave_type.as_str().cmp(b.leave.leave_type.as_str()),
            SortKey::EmployeeName => a
                .employee_name
                .to_lowercase()
                .cmp(&b.employee_name.to_lowercase()),
        }
    }
}

struct Criteria {
    status: Option<StatusFilter>,
    leave_type: Option<LeaveType>,
    employee_id: Option<String>,
    search: Option<String>,
    sort: SortKey,
    descending: bool,
    page: u64,
    per_page: u64,
}

impl Criteria {
    fn from_query(query: &LeaveQuery) -> Result<Self, AppError> {
        let status = match query.status.as_deref() {
            Some(s) => StatusFilter::parse(s)?,
            None => None,
        };
        let leave_type = match query.leave_type.as_deref() {
            None | Some("all") => None,
            Some(t) => Some(
                LeaveType::parse(t)
                    .ok_or_else(|| AppError::Validation(format!("Invalid leave type {t}")))?,
            ),
        };
        let sort = match query.sort_by.as_deref() {
            Some(s) => SortKey::parse(s)?,
            None => SortKey::RequestedAt,
        };
        let descending = match query.order.as_deref() {
            None | Some("desc") => true,
            Some("asc") => false,
            Some(other) => return Err(AppError::Validation(format!("Invalid order {other}"))),
        };

        Ok(Self {
            status,
            leave_type,
            employee_id: query.employee_id.clone().filter(|e| e != "all"),
            search: query
                .search
                .as_deref()
                .map(|s| s.trim().to_lowercase())
                .filter(|s| !s.is_empty()),
            sort,
            descending,
            page: query.page.unwrap_or(1).max(1),
            per_page: query.per_page.unwrap_or(DEFAULT_PER_PAGE).clamp(1, MAX_PER_PAGE),
        })
    }

    fn keeps(&self, item: &LeaveListItem) -> bool {
        self.status.is_none_or(|f| f.matches(item.leave.status))
            && self.leave_type.is_none_or(|t| t == item.leave.leave_type)
            && self
                .employee_id
                .as_ref()
                .is_none_or(|e| *e == item.leave.employee_id)
            && self
                .search
                .as_ref()
                .is_none_or(|s| item.employee_name.to_lowercase().contains(s.as_str()))
    }
}

fn paginate(
    leaves: Vec<LeaveRequest>,
    names: &HashMap<String, String>,
    criteria: &Criteria,
) -> LeavePage {
    let mut items: Vec<LeaveListItem> = leaves
        .into_iter()
        .map(|leave| LeaveListItem {
            employee_name: names
                .get(&leave.employee_id)
                .cloned()
                .unwrap_or_else(|| leave.employee_id.clone()),
            leave,
        })
        .filter(|item| criteria.keeps(item))
        .collect();

    items.sort_by(|a, b| {
        let ord = criteria.sort.compare(a, b).then_with(|| a.leave.id.cmp(&b.leave.id));
        if criteria.descending { ord.reverse() } else { ord }
    });

    let mut summary = LeaveSummary::default();
    for item in &items {
        match item.leave.status {
            LeaveStatus::Pending => summary.pending += 1,
            LeaveStatus::Approved => summary.approved += 1,
            LeaveStatus::Rejected => summary.rejected += 1,
            LeaveStatus::Cancelled => summary.cancelled += 1,
        }
    }

    let total = items.len();
    let offset = criteria.page.saturating_sub(1).saturating_mul(criteria.per_page);
    let data = items
        .into_iter()
        .skip(usize::try_from(offset).unwrap_or(usize::MAX))
        .take(usize::try_from(criteria.per_page).unwrap_or(usize::MAX))
        .collect();

    LeavePage {
        data,
        page: criteria.page,
        per_page: criteria.per_page,
        total,
        summary,
    }
}

/// Branch managers see the requests they can act on plus their own.
/// Other manager-level requests belong to operations.
fn visible_to(actor: &AuthUser, leave: &LeaveRequest) -> bool {
    actor.role != Role::BranchManager
        || !leave.requires_operational_approval
        || leave.employee_id == actor.id
}

pub async fn list_branch_leaves(
    state: &AppState,
    actor: &AuthUser,
    query: &LeaveQuery,
) -> Result<LeavePage, AppError> {
    let branch_id = query
        .branch_id
        .clone()
        .or_else(|| actor.branch_id.clone())
        .ok_or_else(|| AppError::Validation("branch_id is required".into()))?;
    actor.require_branch_manager(&branch_id)?;

    let criteria = Criteria::from_query(query)?;

    let mut leaves = state.leaves.list_by_branch(&branch_id).await?;
    leaves.retain(|l| visible_to(actor, l));
    let names: HashMap<String, String> = state
        .staff
        .list_by_branch(&branch_id)
        .await?
        .into_iter()
        .map(|s| (s.id, s.display_name))
        .collect();

    Ok(paginate(leaves, &names, &criteria))
}
