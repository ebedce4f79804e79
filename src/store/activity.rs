use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::MySqlPool;

use crate::model::activity::{ActivityFilter, ActivityRecord};
use crate::store::StoreError;

#[async_trait]
pub trait ActivityStore: Send + Sync {
    async fn insert(&self, record: &ActivityRecord) -> Result<(), StoreError>;
    /// Newest first.
    async fn list(&self, filter: &ActivityFilter) -> Result<Vec<ActivityRecord>, StoreError>;
}

pub struct MySqlActivityStore {
    pool: MySqlPool,
}

impl MySqlActivityStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct ActivityRow {
    id: String,
    action: String,
    performed_by: String,
    branch_id: Option<String>,
    target_id: Option<String>,
    details: String,
    recorded_at: DateTime<Utc>,
}

impl TryFrom<ActivityRow> for ActivityRecord {
    type Error = StoreError;

    fn try_from(row: ActivityRow) -> Result<Self, Self::Error> {
        let details = serde_json::from_str(&row.details)
            .map_err(|e| StoreError::corrupt(&row.id, format!("details are not JSON: {e}")))?;
        Ok(ActivityRecord {
            id: row.id,
            action: row.action,
            performed_by: row.performed_by,
            branch_id: row.branch_id,
            target_id: row.target_id,
            details,
            recorded_at: row.recorded_at,
        })
    }
}

#[async_trait]
impl ActivityStore for MySqlActivityStore {
    async fn insert(&self, record: &ActivityRecord) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO activity_logs
                (id, action, performed_by, branch_id, target_id, details, recorded_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&record.id)
        .bind(&record.action)
        .bind(&record.performed_by)
        .bind(&record.branch_id)
        .bind(&record.target_id)
        .bind(record.details.to_string())
        .bind(record.recorded_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn list(&self, filter: &ActivityFilter) -> Result<Vec<ActivityRecord>, StoreError> {
        let mut where_sql = String::from(" WHERE 1=1");
        let mut args: Vec<&str> = Vec::new();

        if let Some(performed_by) = filter.performed_by.as_deref() {
            where_sql.push_str(" AND performed_by = ?");
            args.push(performed_by);
        }
        if let Some(action) = filter.action.as_deref() {
            where_sql.push_str(" AND action = ?");
            args.push(action);
        }
        if let Some(branch_id) = filter.branch_id.as_deref() {
            where_sql.push_str(" AND branch_id = ?");
            args.push(branch_id);
        }

        let sql = format!(
            r#"
            SELECT id, action, performed_by, branch_id, target_id, details, recorded_at
            FROM activity_logs
            {}
            ORDER BY recorded_at DESC
            LIMIT ?
            "#,
            where_sql
        );

        let mut query = sqlx::query_as::<_, ActivityRow>(&sql);
        for arg in args {
            query = query.bind(arg);
        }
        let rows = query.bind(filter.limit).fetch_all(&self.pool).await?;

        rows.into_iter().map(ActivityRecord::try_from).collect()
    }
}
