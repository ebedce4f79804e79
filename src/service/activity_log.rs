use std::sync::Arc;

use chrono::Utc;
use serde_json::Value;
use uuid::Uuid;

use crate::model::activity::{ActivityFilter, ActivityRecord};
use crate::store::{ActivityStore, StoreError};

pub const DEFAULT_ACTIVITY_LIMIT: u32 = 100;
pub const MAX_ACTIVITY_LIMIT: u32 = 500;

/// Best-effort audit trail. Recording never fails the caller.
#[derive(Clone)]
pub struct ActivityLog {
    store: Arc<dyn ActivityStore>,
}

pub struct Activity<'a> {
    pub action: &'a str,
    pub performed_by: &'a str,
    pub branch_id: Option<&'a str>,
    pub target_id: Option<&'a str>,
    pub details: Value,
}

impl ActivityLog {
    pub fn new(store: Arc<dyn ActivityStore>) -> Self {
        Self { store }
    }

    pub async fn record(&self, activity: Activity<'_>) {
        let record = ActivityRecord {
            id: Uuid::new_v4().to_string(),
            action: activity.action.to_string(),
            performed_by: activity.performed_by.to_string(),
            branch_id: activity.branch_id.map(str::to_string),
            target_id: activity.target_id.map(str::to_string),
            details: activity.details,
            recorded_at: Utc::now(),
        };

        if let Err(e) = self.store.insert(&record).await {
            tracing::warn!(
                error = %e,
                action = %record.action,
                performed_by = %record.performed_by,
                "Failed to record activity"
            );
        }
    }

    pub async fn list(&self, mut filter: ActivityFilter) -> Result<Vec<ActivityRecord>, StoreError> {
        filter.limit = match filter.limit {
            0 => DEFAULT_ACTIVITY_LIMIT,
            n => n.min(MAX_ACTIVITY_LIMIT),
        };
        self.store.list(&filter).await
    }
}
