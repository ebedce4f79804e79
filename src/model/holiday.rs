use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A public holiday as returned by the holiday API. Advisory only, never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PublicHoliday {
    #[schema(example = "2025-12-25", format = "date", value_type = String)]
    pub date: NaiveDate,
    #[schema(example = "Christmas Day")]
    pub name: String,
    #[schema(example = "Araw ng Pasko")]
    pub local_name: String,
}
