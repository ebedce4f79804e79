use chrono::NaiveDate;
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

use crate::model::appointment::Appointment;
use crate::store::{AppointmentStore, StoreError};

/// How many conflicts the inline preview lists.
pub const CONFLICT_PREVIEW_LIMIT: usize = 10;

#[derive(Debug, Error)]
pub enum ConflictError {
    #[error("employee_id is required")]
    MissingEmployee,
    #[error("could not check appointments for this employee")]
    LookupFailed(#[source] StoreError),
}

/// Active appointments on any day from `start` through `end`, earliest first.
/// Matching is by calendar date, so the whole of the last day counts.
/// An inverted range matches nothing.
pub fn active_conflicts(
    appointments: Vec<Appointment>,
    start: NaiveDate,
    end: NaiveDate,
) -> Vec<Appointment> {
    let mut found: Vec<Appointment> = appointments
        .into_iter()
        .filter(|a| a.status.is_active())
        .filter(|a| (start..=end).contains(&a.appointment_date.date()))
        .collect();
    found.sort_by(|a, b| a.appointment_date.cmp(&b.appointment_date).then_with(|| a.id.cmp(&b.id)));
    found
}

pub async fn find_conflicts(
    store: &dyn AppointmentStore,
    employee_id: &str,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Vec<Appointment>, ConflictError> {
    if employee_id.trim().is_empty() {
        return Err(ConflictError::MissingEmployee);
    }
    if end < start {
        return Ok(Vec::new());
    }

    let appointments = store.list_by_employee(employee_id).await.map_err(|e| {
        tracing::warn!(error = %e, employee_id, "Appointment lookup failed");
        ConflictError::LookupFailed(e)
    })?;

    Ok(active_conflicts(appointments, start, end))
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ConflictPreview {
    /// Every active conflict, not just the listed ones.
    #[schema(example = 1)]
    pub total: usize,
    pub truncated: bool,
    pub conflicts: Vec<Appointment>,
}

impl ConflictPreview {
    pub fn from_conflicts(mut all: Vec<Appointment>) -> Self {
        let total = all.len();
        all.truncate(CONFLICT_PREVIEW_LIMIT);
        Self {
            total,
            truncated: total > CONFLICT_PREVIEW_LIMIT,
            conflicts: all,
        }
    }
}
