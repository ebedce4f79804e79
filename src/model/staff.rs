use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::model::role::Role;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StaffMember {
    #[schema(example = "stylist-7")]
    pub id: String,
    #[schema(example = "branch-makati")]
    pub branch_id: String,
    #[schema(example = "Ana Reyes")]
    pub display_name: String,
    pub role: Role,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, sqlx::FromRow)]
pub struct Branch {
    #[schema(example = "branch-makati")]
    pub id: String,
    #[schema(example = "Makati Branch")]
    pub name: String,
}
