use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::MySqlPool;

use crate::model::leave_request::{LeaveRequest, LeaveStatus, LeaveTransition, LeaveType};
use crate::store::StoreError;

#[async_trait]
pub trait LeaveStore: Send + Sync {
    async fn create(&self, leave: &LeaveRequest) -> Result<(), StoreError>;
    async fn get(&self, id: &str) -> Result<Option<LeaveRequest>, StoreError>;
    /// Applies the transition only while the request is still pending.
    /// Returns `false` when another writer got there first.
    async fn transition(&self, id: &str, transition: &LeaveTransition) -> Result<bool, StoreError>;
    async fn list_by_branch(&self, branch_id: &str) -> Result<Vec<LeaveRequest>, StoreError>;
    async fn list_by_employee(&self, employee_id: &str) -> Result<Vec<LeaveRequest>, StoreError>;
}

pub struct MySqlLeaveStore {
    pool: MySqlPool,
}

impl MySqlLeaveStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

const LEAVE_COLUMNS: &str = r#"
    id, employee_id, branch_id, start_date, end_date, leave_type, status,
    requires_operational_approval, reason, rejection_reason, submitted_by,
    requested_at, reviewed_by, reviewed_at, cancelled_by, cancelled_at
"#;

#[derive(sqlx::FromRow)]
struct LeaveRow {
    id: String,
    employee_id: String,
    branch_id: String,
    start_date: NaiveDate,
    end_date: NaiveDate,
    leave_type: String,
    status: String,
    requires_operational_approval: bool,
    reason: Option<String>,
    rejection_reason: Option<String>,
    submitted_by: String,
    requested_at: DateTime<Utc>,
    reviewed_by: Option<String>,
    reviewed_at: Option<DateTime<Utc>>,
    cancelled_by: Option<String>,
    cancelled_at: Option<DateTime<Utc>>,
}

impl TryFrom<LeaveRow> for LeaveRequest {
    type Error = StoreError;

    fn try_from(row: LeaveRow) -> Result<Self, Self::Error> {
        let leave_type = LeaveType::parse(&row.leave_type)
            .ok_or_else(|| StoreError::corrupt(&row.id, format!("unknown leave type {}", row.leave_type)))?;
        let status = LeaveStatus::parse(&row.status)
            .ok_or_else(|| StoreError::corrupt(&row.id, format!("unknown status {}", row.status)))?;

        Ok(LeaveRequest {
            id: row.id,
            employee_id: row.employee_id,
            branch_id: row.branch_id,
            start_date: row.start_date,
            end_date: row.end_date,
            leave_type,
            status,
            requires_operational_approval: row.requires_operational_approval,
            reason: row.reason,
            rejection_reason: row.rejection_reason,
            submitted_by: row.submitted_by,
            requested_at: row.requested_at,
            reviewed_by: row.reviewed_by,
            reviewed_at: row.reviewed_at,
            cancelled_by: row.cancelled_by,
            cancelled_at: row.cancelled_at,
        })
    }
}

impl MySqlLeaveStore {
    async fn fetch_where(&self, clause: &str, value: &str) -> Result<Vec<LeaveRequest>, StoreError> {
        let sql = format!(
            "SELECT {LEAVE_COLUMNS} FROM leave_requests WHERE {clause} ORDER BY requested_at DESC"
        );
        let rows = sqlx::query_as::<_, LeaveRow>(&sql)
            .bind(value)
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(LeaveRequest::try_from).collect()
    }
}

#[async_trait]
impl LeaveStore for MySqlLeaveStore {
    async fn create(&self, leave: &LeaveRequest) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO leave_requests
                (id, employee_id, branch_id, start_date, end_date, leave_type, status,
                 requires_operational_approval, reason, submitted_by, requested_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&leave.id)
        .bind(&leave.employee_id)
        .bind(&leave.branch_id)
        .bind(leave.start_date)
        .bind(leave.end_date)
        .bind(leave.leave_type.as_str())
        .bind(leave.status.as_str())
        .bind(leave.requires_operational_approval)
        .bind(&leave.reason)
        .bind(&leave.submitted_by)
        .bind(leave.requested_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get(&self, id: &str) -> Result<Option<LeaveRequest>, StoreError> {
        let mut found = self.fetch_where("id = ?", id).await?;
        Ok(found.pop())
    }

    async fn transition(&self, id: &str, transition: &LeaveTransition) -> Result<bool, StoreError> {
        let result = match transition.to {
            LeaveStatus::Cancelled => {
                sqlx::query(
                    r#"
                    UPDATE leave_requests
                    SET status = 'cancelled', cancelled_by = ?, cancelled_at = ?
                    WHERE id = ?
                    AND status = 'pending'
                    "#,
                )
                .bind(&transition.actor_id)
                .bind(transition.at)
                .bind(id)
                .execute(&self.pool)
                .await?
            }
            to => {
                sqlx::query(
                    r#"
                    UPDATE leave_requests
                    SET status = ?, reviewed_by = ?, reviewed_at = ?, rejection_reason = ?
                    WHERE id = ?
                    AND status = 'pending'
                    "#,
                )
                .bind(to.as_str())
                .bind(&transition.actor_id)
                .bind(transition.at)
                .bind(&transition.rejection_reason)
                .bind(id)
                .execute(&self.pool)
                .await?
            }
        };

        Ok(result.rows_affected() == 1)
    }

    async fn list_by_branch(&self, branch_id: &str) -> Result<Vec<LeaveRequest>, StoreError> {
        self.fetch_where("branch_id = ?", branch_id).await
    }

    async fn list_by_employee(&self, employee_id: &str) -> Result<Vec<LeaveRequest>, StoreError> {
        self.fetch_where("employee_id = ?", employee_id).await
    }
}
