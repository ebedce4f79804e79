pub mod activity;
pub mod appointments;
pub mod calendar;
pub mod leaves;
pub mod pending_feed;
pub mod staff;

#[cfg(test)]
pub mod memory;

use thiserror::Error;

pub use activity::{ActivityStore, MySqlActivityStore};
pub use appointments::{AppointmentStore, MySqlAppointmentStore};
pub use calendar::{CalendarStore, MySqlCalendarStore, ReviewOutcome};
pub use leaves::{LeaveStore, MySqlLeaveStore};
pub use pending_feed::{PendingFeed, PendingSubscription};
pub use staff::{BranchDirectory, MySqlDirectory, StaffDirectory};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("stored record {id} is invalid: {reason}")]
    Corrupt { id: String, reason: String },
}

impl StoreError {
    pub(crate) fn corrupt(id: &str, reason: impl Into<String>) -> Self {
        StoreError::Corrupt {
            id: id.to_string(),
            reason: reason.into(),
        }
    }
}
