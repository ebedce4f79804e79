use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use sqlx::MySqlPool;

use crate::model::calendar_entry::{CalendarEntry, EntryStatus, EntryType, ReviewStamp, SpecialHours};
use crate::store::{PendingFeed, PendingSubscription, StoreError};

#[derive(Debug, Clone, PartialEq)]
pub enum ReviewOutcome {
    /// The entry as committed, review stamp included.
    Applied(CalendarEntry),
    AlreadyReviewed(EntryStatus),
    NotFound,
}

#[async_trait]
pub trait CalendarStore: Send + Sync {
    async fn insert(&self, entry: &CalendarEntry) -> Result<(), StoreError>;
    /// Rewrites the editable fields; status and review columns are left alone.
    /// Returns `false` when the entry no longer exists for the branch.
    async fn update(&self, entry: &CalendarEntry) -> Result<bool, StoreError>;
    async fn get(&self, entry_id: &str) -> Result<Option<CalendarEntry>, StoreError>;
    /// Returns `false` when no entry with that id exists for the branch.
    async fn delete(&self, branch_id: &str, entry_id: &str) -> Result<bool, StoreError>;
    /// Single conditional write: only a pending entry can be reviewed.
    async fn review(&self, entry_id: &str, stamp: &ReviewStamp) -> Result<ReviewOutcome, StoreError>;
    async fn list_by_branch(&self, branch_id: &str) -> Result<Vec<CalendarEntry>, StoreError>;
    /// Entries dated within `[from, to]`, for one branch or all of them.
    async fn list_between(
        &self,
        branch_id: Option<&str>,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<CalendarEntry>, StoreError>;
    async fn list_pending(&self) -> Result<Vec<CalendarEntry>, StoreError>;
    fn subscribe_pending(&self) -> PendingSubscription;
    /// Reloads the pending snapshot, picking up writes made elsewhere.
    async fn refresh_pending(&self) -> Result<(), StoreError>;
}

pub struct MySqlCalendarStore {
    pool: MySqlPool,
    feed: PendingFeed,
}

impl MySqlCalendarStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self {
            pool,
            feed: PendingFeed::new(),
        }
    }

    async fn fetch(&self, clause: &str, binds: &[&str]) -> Result<Vec<CalendarEntry>, StoreError> {
        let sql = format!("SELECT {ENTRY_COLUMNS} FROM calendar_entries WHERE {clause} ORDER BY entry_date, id");
        let mut query = sqlx::query_as::<_, EntryRow>(&sql);
        for value in binds {
            query = query.bind(*value);
        }
        let rows = query.fetch_all(&self.pool).await?;
        rows.into_iter().map(CalendarEntry::try_from).collect()
    }

    /// Write paths republish after committing; a failed reload only delays the feed.
    async fn publish_after_write(&self) {
        if let Err(e) = self.refresh_pending().await {
            tracing::warn!(error = %e, "Failed to refresh pending calendar feed");
        }
    }
}

const ENTRY_COLUMNS: &str = r#"
    id, branch_id, entry_date, title, description, entry_type, all_day,
    special_open, special_close, status, requested_by, requested_by_name,
    reviewed_by, reviewed_by_name, reviewed_at, rejection_reason, created_at, updated_at
"#;

#[derive(sqlx::FromRow)]
struct EntryRow {
    id: String,
    branch_id: String,
    entry_date: NaiveDate,
    title: String,
    description: Option<String>,
    entry_type: Option<String>,
    all_day: Option<bool>,
    special_open: Option<NaiveTime>,
    special_close: Option<NaiveTime>,
    status: Option<String>,
    requested_by: Option<String>,
    requested_by_name: Option<String>,
    reviewed_by: Option<String>,
    reviewed_by_name: Option<String>,
    reviewed_at: Option<DateTime<Utc>>,
    rejection_reason: Option<String>,
    created_at: Option<DateTime<Utc>>,
    updated_at: Option<DateTime<Utc>>,
}

impl TryFrom<EntryRow> for CalendarEntry {
    type Error = StoreError;

    fn try_from(row: EntryRow) -> Result<Self, Self::Error> {
        let status = EntryStatus::from_stored(row.status.as_deref())
            .ok_or_else(|| StoreError::corrupt(&row.id, format!("unknown status {:?}", row.status)))?;
        let entry_type = match row.entry_type.as_deref() {
            None => EntryType::Holiday,
            Some(t) => EntryType::parse(t)
                .ok_or_else(|| StoreError::corrupt(&row.id, format!("unknown entry type {t}")))?,
        };
        let special_hours = match (row.special_open, row.special_close) {
            (Some(open), Some(close)) => Some(SpecialHours { open, close }),
            _ => None,
        };

        Ok(CalendarEntry {
            id: row.id,
            branch_id: row.branch_id,
            date: row.entry_date,
            title: row.title,
            description: row.description.unwrap_or_default(),
            entry_type,
            all_day: row.all_day.unwrap_or(true),
            special_hours,
            status,
            requested_by: row.requested_by,
            requested_by_name: row.requested_by_name,
            reviewed_by: row.reviewed_by,
            reviewed_by_name: row.reviewed_by_name,
            reviewed_at: row.reviewed_at,
            rejection_reason: row.rejection_reason,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[async_trait]
impl CalendarStore for MySqlCalendarStore {
    async fn insert(&self, entry: &CalendarEntry) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO calendar_entries
                (id, branch_id, entry_date, title, description, entry_type, all_day,
                 special_open, special_close, status, requested_by, requested_by_name,
                 created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&entry.id)
        .bind(&entry.branch_id)
        .bind(entry.date)
        .bind(&entry.title)
        .bind(&entry.description)
        .bind(entry.entry_type.as_str())
        .bind(entry.all_day)
        .bind(entry.special_hours.map(|h| h.open))
        .bind(entry.special_hours.map(|h| h.close))
        .bind(entry.status.as_str())
        .bind(&entry.requested_by)
        .bind(&entry.requested_by_name)
        .bind(entry.created_at)
        .bind(entry.updated_at)
        .execute(&self.pool)
        .await?;

        self.publish_after_write().await;
        Ok(())
    }

    async fn update(&self, entry: &CalendarEntry) -> Result<bool, StoreError> {
        // The connection reports matched rows, so an unchanged edit still counts.
        let result = sqlx::query(
            r#"
            UPDATE calendar_entries
            SET entry_date = ?, title = ?, description = ?, entry_type = ?, all_day = ?,
                special_open = ?, special_close = ?, updated_at = ?
            WHERE id = ?
            AND branch_id = ?
            "#,
        )
        .bind(entry.date)
        .bind(&entry.title)
        .bind(&entry.description)
        .bind(entry.entry_type.as_str())
        .bind(entry.all_day)
        .bind(entry.special_hours.map(|h| h.open))
        .bind(entry.special_hours.map(|h| h.close))
        .bind(entry.updated_at)
        .bind(&entry.id)
        .bind(&entry.branch_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(false);
        }
        self.publish_after_write().await;
        Ok(true)
    }

    async fn get(&self, entry_id: &str) -> Result<Option<CalendarEntry>, StoreError> {
        let mut found = self.fetch("id = ?", &[entry_id]).await?;
        Ok(found.pop())
    }

    async fn delete(&self, branch_id: &str, entry_id: &str) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM calendar_entries WHERE id = ? AND branch_id = ?")
            .bind(entry_id)
            .bind(branch_id)
            .execute(&self.pool)
            .await?;

        self.publish_after_write().await;
        Ok(result.rows_affected() == 1)
    }

    async fn review(&self, entry_id: &str, stamp: &ReviewStamp) -> Result<ReviewOutcome, StoreError> {
        let mut tx = self.pool.begin().await?;

        // Lock the row so the returned entry is exactly what was reviewed.
        let sql = format!("SELECT {ENTRY_COLUMNS} FROM calendar_entries WHERE id = ? FOR UPDATE");
        let row = sqlx::query_as::<_, EntryRow>(&sql)
            .bind(entry_id)
            .fetch_optional(&mut *tx)
            .await?;
        let Some(row) = row else {
            return Ok(ReviewOutcome::NotFound);
        };
        let mut entry = CalendarEntry::try_from(row)?;
        if entry.status != EntryStatus::Pending {
            return Ok(ReviewOutcome::AlreadyReviewed(entry.status));
        }

        sqlx::query(
            r#"
            UPDATE calendar_entries
            SET status = ?, reviewed_by = ?, reviewed_by_name = ?, reviewed_at = ?, rejection_reason = ?
            WHERE id = ?
            AND status = 'pending'
            "#,
        )
        .bind(stamp.status.as_str())
        .bind(&stamp.reviewer_id)
        .bind(&stamp.reviewer_name)
        .bind(stamp.at)
        .bind(&stamp.rejection_reason)
        .bind(entry_id)
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;

        entry.apply_review(stamp);
        self.publish_after_write().await;
        Ok(ReviewOutcome::Applied(entry))
    }

    async fn list_by_branch(&self, branch_id: &str) -> Result<Vec<CalendarEntry>, StoreError> {
        self.fetch("branch_id = ?", &[branch_id]).await
    }

    async fn list_between(
        &self,
        branch_id: Option<&str>,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<CalendarEntry>, StoreError> {
        let from = from.to_string();
        let to = to.to_string();
        match branch_id {
            Some(branch) => {
                self.fetch("branch_id = ? AND entry_date BETWEEN ? AND ?", &[branch, &from, &to])
                    .await
            }
            None => self.fetch("entry_date BETWEEN ? AND ?", &[&from, &to]).await,
        }
    }

    async fn list_pending(&self) -> Result<Vec<CalendarEntry>, StoreError> {
        self.fetch("status = ?", &[EntryStatus::Pending.as_str()]).await
    }

    fn subscribe_pending(&self) -> PendingSubscription {
        self.feed.subscribe()
    }

    async fn refresh_pending(&self) -> Result<(), StoreError> {
        let pending = self.list_pending().await?;
        self.feed.publish(pending);
        Ok(())
    }
}
