use async_trait::async_trait;
use chrono::NaiveDateTime;
use sqlx::MySqlPool;

use crate::model::appointment::{Appointment, AppointmentStatus};
use crate::store::StoreError;

#[async_trait]
pub trait AppointmentStore: Send + Sync {
    /// Every appointment the employee works on. Unknown employees yield an empty list.
    async fn list_by_employee(&self, employee_id: &str) -> Result<Vec<Appointment>, StoreError>;
}

pub struct MySqlAppointmentStore {
    pool: MySqlPool,
}

impl MySqlAppointmentStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct AppointmentRow {
    id: String,
    stylist_id: String,
    branch_id: String,
    client_name: Option<String>,
    appointment_date: NaiveDateTime,
    status: String,
}

impl From<AppointmentRow> for Appointment {
    fn from(row: AppointmentRow) -> Self {
        Appointment {
            id: row.id,
            stylist_id: row.stylist_id,
            branch_id: row.branch_id,
            client_name: row.client_name,
            appointment_date: row.appointment_date,
            status: AppointmentStatus::parse(&row.status),
        }
    }
}

#[async_trait]
impl AppointmentStore for MySqlAppointmentStore {
    async fn list_by_employee(&self, employee_id: &str) -> Result<Vec<Appointment>, StoreError> {
        // multi-service bookings list each stylist in appointment_services
        let rows = sqlx::query_as::<_, AppointmentRow>(
            r#"
            SELECT a.id, a.stylist_id, a.branch_id, a.client_name, a.appointment_date, a.status
            FROM appointments a
            WHERE a.stylist_id = ?
               OR EXISTS (
                    SELECT 1 FROM appointment_services s
                    WHERE s.appointment_id = a.id AND s.stylist_id = ?
               )
            ORDER BY a.appointment_date DESC
            "#,
        )
        .bind(employee_id)
        .bind(employee_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Appointment::from).collect())
    }
}
