use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::model::role::Role;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum LeaveType {
    Vacation,
    Sick,
    Personal,
    Emergency,
    Other,
}

impl LeaveType {
    pub fn as_str(&self) -> &'static str {
        match self {
            LeaveType::Vacation => "vacation",
            LeaveType::Sick => "sick",
            LeaveType::Personal => "personal",
            LeaveType::Emergency => "emergency",
            LeaveType::Other => "other",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "vacation" => Some(LeaveType::Vacation),
            "sick" => Some(LeaveType::Sick),
            "personal" => Some(LeaveType::Personal),
            "emergency" => Some(LeaveType::Emergency),
            "other" => Some(LeaveType::Other),
            _ => None,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum LeaveStatus {
    Pending,
    Approved,
    Rejected,
    Cancelled,
}

impl LeaveStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LeaveStatus::Pending => "pending",
            LeaveStatus::Approved => "approved",
            LeaveStatus::Rejected => "rejected",
            LeaveStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(LeaveStatus::Pending),
            "approved" => Some(LeaveStatus::Approved),
            "rejected" => Some(LeaveStatus::Rejected),
            "cancelled" => Some(LeaveStatus::Cancelled),
            _ => None,
        }
    }
}

impl fmt::Display for LeaveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LeaveRequest {
    #[schema(example = "5f0c6c2e-8a51-4c1b-9d43-2f7e0b1a9e11")]
    pub id: String,
    #[schema(example = "stylist-7")]
    pub employee_id: String,
    #[schema(example = "branch-makati")]
    pub branch_id: String,
    #[schema(example = "2025-06-09", format = "date", value_type = String)]
    pub start_date: NaiveDate,
    #[schema(example = "2025-06-12", format = "date", value_type = String)]
    pub end_date: NaiveDate,
    pub leave_type: LeaveType,
    pub status: LeaveStatus,
    /// Snapshot of the employee's role at filing time; never recomputed.
    pub requires_operational_approval: bool,
    #[schema(nullable = true)]
    pub reason: Option<String>,
    #[schema(nullable = true)]
    pub rejection_reason: Option<String>,
    /// Who filed the request: the employee, or a manager on their behalf.
    pub submitted_by: String,
    #[schema(value_type = String, format = "date-time")]
    pub requested_at: DateTime<Utc>,
    #[schema(nullable = true)]
    pub reviewed_by: Option<String>,
    pub reviewed_at: Option<DateTime<Utc>>,
    #[schema(nullable = true)]
    pub cancelled_by: Option<String>,
    pub cancelled_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub struct NewLeave {
    pub employee_id: String,
    pub branch_id: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub leave_type: LeaveType,
    pub reason: Option<String>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LeaveValidationError {
    #[error("employee_id is required")]
    MissingEmployee,
    #[error("start_date cannot be after end_date")]
    InvertedRange,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransitionError {
    #[error("leave request is already {0}")]
    NotPending(LeaveStatus),
    #[error("employees cannot review their own leave request")]
    SelfReview,
    #[error("only the employee or the original submitter can cancel this request")]
    NotRequester,
}

#[derive(Debug, Clone)]
pub enum ReviewDecision {
    Approve,
    Reject { reason: String },
}

/// A validated status change, ready to be written conditionally on `pending`.
#[derive(Debug, Clone, PartialEq)]
pub struct LeaveTransition {
    pub to: LeaveStatus,
    pub actor_id: String,
    pub at: DateTime<Utc>,
    pub rejection_reason: Option<String>,
}

impl LeaveRequest {
    pub fn file(
        new: NewLeave,
        employee_role: Role,
        submitted_by: &str,
        now: DateTime<Utc>,
    ) -> Result<Self, LeaveValidationError> {
        if new.employee_id.trim().is_empty() {
            return Err(LeaveValidationError::MissingEmployee);
        }
        if new.end_date < new.start_date {
            return Err(LeaveValidationError::InvertedRange);
        }

        Ok(Self {
            id: Uuid::new_v4().to_string(),
            employee_id: new.employee_id,
            branch_id: new.branch_id,
            start_date: new.start_date,
            end_date: new.end_date,
            leave_type: new.leave_type,
            status: LeaveStatus::Pending,
            requires_operational_approval: employee_role.is_manager_level(),
            reason: new.reason.filter(|r| !r.trim().is_empty()),
            rejection_reason: None,
            submitted_by: submitted_by.to_string(),
            requested_at: now,
            reviewed_by: None,
            reviewed_at: None,
            cancelled_by: None,
            cancelled_at: None,
        })
    }

    pub fn review(
        &self,
        reviewer_id: &str,
        decision: ReviewDecision,
        now: DateTime<Utc>,
    ) -> Result<LeaveTransition, TransitionError> {
        self.ensure_pending()?;
        if reviewer_id == self.employee_id {
            return Err(TransitionError::SelfReview);
        }

        let (to, rejection_reason) = match decision {
            ReviewDecision::Approve => (LeaveStatus::Approved, None),
            ReviewDecision::Reject { reason } => (LeaveStatus::Rejected, Some(reason)),
        };

        Ok(LeaveTransition {
            to,
            actor_id: reviewer_id.to_string(),
            at: now,
            rejection_reason,
        })
    }

    pub fn cancel(&self, actor_id: &str, now: DateTime<Utc>) -> Result<LeaveTransition, TransitionError> {
        self.ensure_pending()?;
        if actor_id != self.employee_id && actor_id != self.submitted_by {
            return Err(TransitionError::NotRequester);
        }

        Ok(LeaveTransition {
            to: LeaveStatus::Cancelled,
            actor_id: actor_id.to_string(),
            at: now,
            rejection_reason: None,
        })
    }

    pub fn apply(&mut self, transition: &LeaveTransition) {
        self.status = transition.to;
        match transition.to {
            LeaveStatus::Cancelled => {
                self.cancelled_by = Some(transition.actor_id.clone());
                self.cancelled_at = Some(transition.at);
            }
            _ => {
                self.reviewed_by = Some(transition.actor_id.clone());
                self.reviewed_at = Some(transition.at);
                self.rejection_reason = transition.rejection_reason.clone();
            }
        }
    }

    /// Whether the request spans `day`.
    pub fn covers(&self, day: NaiveDate) -> bool {
        self.start_date <= day && day <= self.end_date
    }

    fn ensure_pending(&self) -> Result<(), TransitionError> {
        if self.status == LeaveStatus::Pending {
            Ok(())
        } else {
            Err(TransitionError::NotPending(self.status))
        }
    }
}
