use actix_web::{HttpResponse, Responder, web};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

use crate::auth::auth::AuthUser;
use crate::error::AppError;
use crate::model::activity::{ActivityFilter, ActivityRecord};
use crate::state::AppState;

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct ActivityQuery {
    #[schema(example = "opmanager-1")]
    pub performed_by: Option<String>,
    #[schema(example = "calendar_entry_approved")]
    pub action: Option<String>,
    #[schema(example = "branch-makati")]
    pub branch_id: Option<String>,
    /// Defaults to 100, at most 500
    #[schema(example = 100)]
    pub limit: Option<u32>,
}

/// Audit trail, newest first
#[utoipa::path(
    get,
    path = "/api/activity",
    params(ActivityQuery),
    responses(
        (status = 200, description = "Recorded activity", body = [ActivityRecord]),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Activity"
)]
pub async fn list_activity(
    auth: AuthUser,
    state: web::Data<AppState>,
    query: web::Query<ActivityQuery>,
) -> Result<impl Responder, AppError> {
    auth.require_operational()?;

    let query = query.into_inner();
    let records = state
        .activity
        .list(ActivityFilter {
            performed_by: query.performed_by,
            action: query.action,
            branch_id: query.branch_id,
            limit: query.limit.unwrap_or(0),
        })
        .await?;

    Ok(HttpResponse::Ok().json(records))
}
