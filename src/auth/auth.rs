use crate::error::AppError;
use crate::model::calendar_entry::Actor;
use crate::model::role::Role;
use actix_web::{FromRequest, HttpMessage, HttpRequest, dev::Payload};
use futures::future::{Ready, ready};
use serde::Serialize;
use utoipa::ToSchema;

/// Identity placed in request extensions by `auth_middleware`.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AuthUser {
    #[schema(example = "manager-1")]
    pub id: String,
    #[schema(example = "Liza Cruz")]
    pub name: String,
    pub role: Role,
    #[schema(nullable = true)]
    pub branch_id: Option<String>,
}

impl FromRequest for AuthUser {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(
            req.extensions()
                .get::<AuthUser>()
                .cloned()
                .ok_or_else(|| AppError::Unauthorized("Missing token".into())),
        )
    }
}

impl AuthUser {
    pub fn actor(&self) -> Actor {
        Actor {
            id: self.id.clone(),
            name: self.name.clone(),
        }
    }

    pub fn require_operational(&self) -> Result<(), AppError> {
        if self.role.has_operational_authority() {
            Ok(())
        } else {
            Err(AppError::Forbidden("Operational manager only".into()))
        }
    }

    /// Branch managers act on their own branch; operational roles on any.
    pub fn manages_branch(&self, branch_id: &str) -> bool {
        match self.role {
            Role::OperationalManager | Role::SystemAdmin => true,
            Role::BranchManager => self.branch_id.as_deref() == Some(branch_id),
            Role::Receptionist | Role::Stylist => false,
        }
    }

    pub fn require_branch_manager(&self, branch_id: &str) -> Result<(), AppError> {
        if self.manages_branch(branch_id) {
            Ok(())
        } else {
            Err(AppError::Forbidden("Branch manager of this branch only".into()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(role: Role, branch: Option<&str>) -> AuthUser {
        AuthUser {
            id: "u1".into(),
            name: "User".into(),
            role,
            branch_id: branch.map(str::to_string),
        }
    }

    #[test]
    fn branch_managers_only_manage_their_branch() {
        let bm = user(Role::BranchManager, Some("b1"));
        assert!(bm.manages_branch("b1"));
        assert!(!bm.manages_branch("b2"));
        assert!(user(Role::OperationalManager, None).manages_branch("b2"));
        assert!(!user(Role::Stylist, Some("b1")).manages_branch("b1"));
    }

    #[test]
    fn operational_authority() {
        assert!(user(Role::SystemAdmin, None).require_operational().is_ok());
        assert!(user(Role::BranchManager, Some("b1")).require_operational().is_err());
    }
}
