use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use serde_json::json;
use utoipa::ToSchema;

use crate::auth::auth::AuthUser;
use crate::error::AppError;
use crate::model::activity::{LEAVE_APPROVED, LEAVE_CANCELLED, LEAVE_REJECTED, LEAVE_REQUESTED};
use crate::model::leave_request::{LeaveRequest, LeaveStatus, LeaveType, NewLeave, ReviewDecision};
use crate::service::activity_log::Activity;
use crate::service::conflicts::{ConflictError, ConflictPreview, find_conflicts};
use crate::state::AppState;

/// Appointment times quoted back when filing is refused.
pub const CONFLICT_SAMPLE_LIMIT: usize = 3;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateLeave {
    /// Defaults to the caller.
    #[schema(example = "stylist-7", nullable = true)]
    #[serde(default)]
    pub employee_id: Option<String>,
    #[schema(example = "2025-06-09", format = "date", value_type = String)]
    pub start_date: NaiveDate,
    #[schema(example = "2025-06-12", format = "date", value_type = String)]
    pub end_date: NaiveDate,
    pub leave_type: LeaveType,
    #[schema(example = "Family trip", nullable = true)]
    #[serde(default)]
    pub reason: Option<String>,
}

pub(crate) fn conflict_error(e: ConflictError) -> AppError {
    match e {
        ConflictError::MissingEmployee => AppError::Validation(e.to_string()),
        ConflictError::LookupFailed(_) => AppError::LookupFailed(
            "Could not check appointments for this staff. Please try again.".into(),
        ),
    }
}

/// Inline preview shown while a leave form is being filled in.
pub async fn preview_conflicts(
    state: &AppState,
    actor: &AuthUser,
    employee_id: &str,
    start_date: NaiveDate,
    end_date: NaiveDate,
) -> Result<ConflictPreview, AppError> {
    if end_date < start_date {
        return Err(AppError::Validation("start_date cannot be after end_date".into()));
    }
    if actor.id != employee_id {
        let employee = state
            .staff
            .get(employee_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Employee not found".into()))?;
        if !actor.manages_branch(&employee.branch_id) {
            return Err(AppError::Forbidden("You cannot view this employee's schedule".into()));
        }
    }

    let conflicts = find_conflicts(state.appointments.as_ref(), employee_id, start_date, end_date)
        .await
        .map_err(conflict_error)?;
    Ok(ConflictPreview::from_conflicts(conflicts))
}

pub async fn file_leave(
    state: &AppState,
    actor: &AuthUser,
    req: CreateLeave,
) -> Result<LeaveRequest, AppError> {
    let employee_id = req
        .employee_id
        .filter(|id| !id.trim().is_empty())
        .unwrap_or_else(|| actor.id.clone());

    if req.end_date < req.start_date {
        return Err(AppError::Validation("start_date cannot be after end_date".into()));
    }

    let employee = state
        .staff
        .get(&employee_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Employee not found".into()))?;

    if actor.id != employee.id && !actor.manages_branch(&employee.branch_id) {
        return Err(AppError::Forbidden("You cannot file leave for this employee".into()));
    }

    let conflicts = find_conflicts(
        state.appointments.as_ref(),
        &employee.id,
        req.start_date,
        req.end_date,
    )
    .await
    .map_err(conflict_error)?;

    if !conflicts.is_empty() {
        let samples: Vec<String> = conflicts
            .iter()
            .take(CONFLICT_SAMPLE_LIMIT)
            .map(|a| a.appointment_date.format("%Y-%m-%d %H:%M").to_string())
            .collect();
        return Err(AppError::Conflict {
            message: format!(
                "{} active appointment(s) fall inside this leave",
                conflicts.len()
            ),
            details: Some(json!({ "total": conflicts.len(), "samples": samples })),
        });
    }

    let leave = LeaveRequest::file(
        NewLeave {
            employee_id: employee.id.clone(),
            branch_id: employee.branch_id.clone(),
            start_date: req.start_date,
            end_date: req.end_date,
            leave_type: req.leave_type,
            reason: req.reason,
        },
        employee.role,
        &actor.id,
        Utc::now(),
    )?;

    state.leaves.create(&leave).await?;

    tracing::info!(
        leave_id = %leave.id,
        employee_id = %leave.employee_id,
        requires_operational_approval = leave.requires_operational_approval,
        "Leave request filed"
    );

    state
        .activity
        .record(Activity {
            action: LEAVE_REQUESTED,
            performed_by: &actor.id,
            branch_id: Some(&leave.branch_id),
            target_id: Some(&leave.id),
            details: json!({
                "employee_id": leave.employee_id,
                "start_date": leave.start_date,
                "end_date": leave.end_date,
                "leave_type": leave.leave_type,
                "requires_operational_approval": leave.requires_operational_approval,
            }),
        })
        .await;

    Ok(leave)
}

async fn load(state: &AppState, leave_id: &str) -> Result<LeaveRequest, AppError> {
    state
        .leaves
        .get(leave_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Leave request not found".into()))
}

fn ensure_can_review(actor: &AuthUser, leave: &LeaveRequest) -> Result<(), AppError> {
    if leave.requires_operational_approval {
        if !actor.role.has_operational_authority() {
            return Err(AppError::Forbidden(
                "Manager leave needs operational manager approval".into(),
            ));
        }
    } else if !actor.manages_branch(&leave.branch_id) {
        return Err(AppError::Forbidden(
            "Only the branch manager can review this request".into(),
        ));
    }
    Ok(())
}

pub async fn review_leave(
    state: &AppState,
    actor: &AuthUser,
    leave_id: &str,
    decision: ReviewDecision,
) -> Result<LeaveRequest, AppError> {
    let mut leave = load(state, leave_id).await?;
    ensure_can_review(actor, &leave)?;

    let transition = leave.review(&actor.id, decision, Utc::now())?;
    if !state.leaves.transition(&leave.id, &transition).await? {
        return Err(AppError::conflict("Leave request was already reviewed"));
    }
    leave.apply(&transition);

    let action = match leave.status {
        LeaveStatus::Approved => LEAVE_APPROVED,
        _ => LEAVE_REJECTED,
    };
    tracing::info!(leave_id = %leave.id, reviewer = %actor.id, status = %leave.status, "Leave reviewed");

    state
        .activity
        .record(Activity {
            action,
            performed_by: &actor.id,
            branch_id: Some(&leave.branch_id),
            target_id: Some(&leave.id),
            details: json!({
                "employee_id": leave.employee_id,
                "rejection_reason": leave.rejection_reason,
            }),
        })
        .await;

    Ok(leave)
}

pub async fn cancel_leave(
    state: &AppState,
    actor: &AuthUser,
    leave_id: &str,
) -> Result<LeaveRequest, AppError> {
    let mut leave = load(state, leave_id).await?;

    let transition = leave.cancel(&actor.id, Utc::now())?;
    if !state.leaves.transition(&leave.id, &transition).await? {
        return Err(AppError::conflict("Leave request is no longer pending"));
    }
    leave.apply(&transition);

    state
        .activity
        .record(Activity {
            action: LEAVE_CANCELLED,
            performed_by: &actor.id,
            branch_id: Some(&leave.branch_id),
            target_id: Some(&leave.id),
            details: json!({ "employee_id": leave.employee_id }),
        })
        .await;

    Ok(leave)
}

pub async fn get_leave(
    state: &AppState,
    actor: &AuthUser,
    leave_id: &str,
) -> Result<LeaveRequest, AppError> {
    let leave = load(state, leave_id).await?;
    let involved = actor.id == leave.employee_id || actor.id == leave.submitted_by;
    if !involved && !actor.manages_branch(&leave.branch_id) {
        return Err(AppError::Forbidden("You cannot view this leave request".into()));
    }
    Ok(leave)
}

pub async fn my_leaves(state: &AppState, actor: &AuthUser) -> Result<Vec<LeaveRequest>, AppError> {
    let mut leaves = state.leaves.list_by_employee(&actor.id).await?;
    leaves.sort_by(|a, b| b.requested_at.cmp(&a.requested_at));
    Ok(leaves)
}
