use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AppointmentStatus {
    Pending,
    Confirmed,
    InService,
    Completed,
    Cancelled,
    NoShow,
    /// Statuses written by other tools that this service does not know about.
    Other(String),
}

impl AppointmentStatus {
    pub fn parse(value: &str) -> Self {
        match value {
            "pending" => AppointmentStatus::Pending,
            "confirmed" => AppointmentStatus::Confirmed,
            "in_service" => AppointmentStatus::InService,
            "completed" => AppointmentStatus::Completed,
            "cancelled" => AppointmentStatus::Cancelled,
            "no_show" => AppointmentStatus::NoShow,
            other => AppointmentStatus::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            AppointmentStatus::Pending => "pending",
            AppointmentStatus::Confirmed => "confirmed",
            AppointmentStatus::InService => "in_service",
            AppointmentStatus::Completed => "completed",
            AppointmentStatus::Cancelled => "cancelled",
            AppointmentStatus::NoShow => "no_show",
            AppointmentStatus::Other(s) => s,
        }
    }

    pub fn is_active(&self) -> bool {
        !matches!(
            self,
            AppointmentStatus::Cancelled | AppointmentStatus::Completed | AppointmentStatus::NoShow
        )
    }
}

impl From<String> for AppointmentStatus {
    fn from(value: String) -> Self {
        AppointmentStatus::parse(&value)
    }
}

impl From<AppointmentStatus> for String {
    fn from(value: AppointmentStatus) -> Self {
        value.as_str().to_string()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Appointment {
    #[schema(example = "apt-1001")]
    pub id: String,
    #[schema(example = "stylist-7")]
    pub stylist_id: String,
    #[schema(example = "branch-makati")]
    pub branch_id: String,
    #[schema(example = "Maria Santos", nullable = true)]
    pub client_name: Option<String>,
    #[schema(example = "2025-06-10T14:30:00", value_type = String, format = "date-time")]
    pub appointment_date: NaiveDateTime,
    #[schema(example = "confirmed", value_type = String)]
    pub status: AppointmentStatus,
}
