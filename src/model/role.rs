use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    SystemAdmin,
    OperationalManager,
    BranchManager,
    Receptionist,
    Stylist,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::SystemAdmin => "system_admin",
            Role::OperationalManager => "operational_manager",
            Role::BranchManager => "branch_manager",
            Role::Receptionist => "receptionist",
            Role::Stylist => "stylist",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "system_admin" => Some(Role::SystemAdmin),
            "operational_manager" => Some(Role::OperationalManager),
            "branch_manager" => Some(Role::BranchManager),
            "receptionist" => Some(Role::Receptionist),
            "stylist" => Some(Role::Stylist),
            _ => None,
        }
    }

    /// Leave filed for a manager-level employee needs operational approval.
    pub fn is_manager_level(&self) -> bool {
        matches!(self, Role::BranchManager | Role::OperationalManager)
    }

    pub fn has_operational_authority(&self) -> bool {
        matches!(self, Role::OperationalManager | Role::SystemAdmin)
    }
}
