use actix_web::{HttpResponse, Responder, web};
use chrono::NaiveDate;
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

use crate::auth::auth::AuthUser;
use crate::error::AppError;
use crate::model::leave_request::{LeaveRequest, ReviewDecision};
use crate::service::conflicts::ConflictPreview;
use crate::service::leave_listing::{LeavePage, LeaveQuery, list_branch_leaves};
use crate::service::leave_workflow::{self, CreateLeave};
use crate::state::AppState;

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct ConflictQuery {
    /// Defaults to the caller
    #[schema(example = "stylist-7")]
    pub employee_id: Option<String>,
    #[schema(example = "2025-06-09", format = "date", value_type = String)]
    pub start_date: NaiveDate,
    #[schema(example = "2025-06-12", format = "date", value_type = String)]
    pub end_date: NaiveDate,
}

#[derive(Deserialize, ToSchema)]
pub struct RejectLeave {
    /// Stored exactly as given
    #[schema(example = "Peak season")]
    #[serde(default)]
    pub reason: String,
}

/* =========================
File a leave request
========================= */
#[utoipa::path(
    post,
    path = "/api/leave",
    request_body(
        content = CreateLeave,
        description = "Leave request payload",
        content_type = "application/json"
    ),
    responses(
        (status = 201, description = "Leave request submitted", body = Object, example = json!({
            "message": "Leave request submitted",
            "status": "pending"
        })),
        (status = 400, description = "Bad request"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 409, description = "Active appointments fall inside the leave", body = Object, example = json!({
            "message": "1 active appointment(s) fall inside this leave",
            "details": { "total": 1, "samples": ["2025-06-10 14:30"] }
        })),
        (status = 503, description = "Appointments could not be checked")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn create_leave(
    auth: AuthUser,
    state: web::Data<AppState>,
    payload: web::Json<CreateLeave>,
) -> Result<impl Responder, AppError> {
    let leave = leave_workflow::file_leave(&state, &auth, payload.into_inner()).await?;

    Ok(HttpResponse::Created().json(serde_json::json!({
        "message": "Leave request submitted",
        "status": leave.status,
        "leave": leave,
    })))
}

/// Appointments that would clash with a leave, for the inline preview
#[utoipa::path(
    get,
    path = "/api/leave/conflicts",
    params(ConflictQuery),
    responses(
        (status = 200, description = "Up to 10 conflicts and the full count", body = ConflictPreview),
        (status = 400, description = "Bad request"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 503, description = "Appointments could not be checked")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn leave_conflicts(
    auth: AuthUser,
    state: web::Data<AppState>,
    query: web::Query<ConflictQuery>,
) -> Result<impl Responder, AppError> {
    let employee_id = query
        .employee_id
        .as_deref()
        .filter(|id| !id.trim().is_empty())
        .unwrap_or(&auth.id);

    let preview = leave_workflow::preview_conflicts(
        &state,
        &auth,
        employee_id,
        query.start_date,
        query.end_date,
    )
    .await?;

    Ok(HttpResponse::Ok().json(preview))
}

/* =========================
Approve leave
========================= */
#[utoipa::path(
    put,
    path = "/api/leave/{leave_id}/approve",
    params(
        ("leave_id" = String, Path, description = "ID of the leave request to approve")
    ),
    responses(
        (status = 200, description = "Leave approved", body = Object, example = json!({
            "message": "Leave approved"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Leave request not found"),
        (status = 409, description = "Leave request already processed", body = Object, example = json!({
            "message": "Leave request was already reviewed"
        }))
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn approve_leave(
    auth: AuthUser,
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<impl Responder, AppError> {
    let leave_id = path.into_inner();
    let leave =
        leave_workflow::review_leave(&state, &auth, &leave_id, ReviewDecision::Approve).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Leave approved",
        "leave": leave,
    })))
}

/* =========================
Reject leave
========================= */
#[utoipa::path(
    put,
    path = "/api/leave/{leave_id}/reject",
    params(
        ("leave_id" = String, Path, description = "ID of the leave request to reject")
    ),
    request_body(content = RejectLeave, content_type = "application/json"),
    responses(
        (status = 200, description = "Leave rejected", body = Object, example = json!({
            "message": "Leave rejected"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Leave request not found"),
        (status = 409, description = "Leave request already processed")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn reject_leave(
    auth: AuthUser,
    state: web::Data<AppState>,
    path: web::Path<String>,
    payload: web::Json<RejectLeave>,
) -> Result<impl Responder, AppError> {
    let leave_id = path.into_inner();
    let decision = ReviewDecision::Reject {
        reason: payload.into_inner().reason,
    };
    let leave = leave_workflow::review_leave(&state, &auth, &leave_id, decision).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Leave rejected",
        "leave": leave,
    })))
}

#[utoipa::path(
    put,
    path = "/api/leave/{leave_id}/cancel",
    params(
        ("leave_id" = String, Path, description = "ID of the leave request to cancel")
    ),
    responses(
        (status = 200, description = "Leave cancelled", body = Object, example = json!({
            "message": "Leave cancelled"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Only the employee or the submitter can cancel"),
        (status = 404, description = "Leave request not found"),
        (status = 409, description = "Leave request is no longer pending")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn cancel_leave(
    auth: AuthUser,
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<impl Responder, AppError> {
    let leave_id = path.into_inner();
    let leave = leave_workflow::cancel_leave(&state, &auth, &leave_id).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Leave cancelled",
        "leave": leave,
    })))
}

/// for getting a leave application details endpoint
#[utoipa::path(
    get,
    path = "/api/leave/{leave_id}",
    params(
        ("leave_id" = String, Path, description = "ID of the leave request to fetch")
    ),
    responses(
        (status = 200, description = "Leave request found", body = LeaveRequest),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Leave request not found", body = Object, example = json!({
            "message": "Leave request not found"
        }))
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn get_leave(
    auth: AuthUser,
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<impl Responder, AppError> {
    let leave = leave_workflow::get_leave(&state, &auth, &path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(leave))
}

/// The caller's own leave history, newest first
#[utoipa::path(
    get,
    path = "/api/leave/mine",
    responses(
        (status = 200, description = "Leave requests of the caller", body = [LeaveRequest]),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn my_leaves(
    auth: AuthUser,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    let leaves = leave_workflow::my_leaves(&state, &auth).await?;
    Ok(HttpResponse::Ok().json(leaves))
}

/// for getting a branch's leave applications endpoint
#[utoipa::path(
    get,
    path = "/api/leave",
    params(LeaveQuery),
    responses(
        (status = 200, description = "Paginated leave list", body = LeavePage),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn leave_list(
    auth: AuthUser,
    state: web::Data<AppState>,
    query: web::Query<LeaveQuery>,
) -> Result<impl Responder, AppError> {
    let page = list_branch_leaves(&state, &auth, &query).await?;
    Ok(HttpResponse::Ok().json(page))
}

#[cfg(test)]
mod tests {
    use actix_web::http::StatusCode;
    use actix_web::test::{self, TestRequest};
    use chrono::Utc;
    use serde_json::{Value, json};

    use crate::api::testing::{bearer, call};
    use crate::model::appointment::{Appointment, AppointmentStatus};
    use crate::model::leave_request::{LeaveRequest, LeaveStatus, LeaveType, NewLeave};
    use crate::model::role::Role;
    use crate::state::testing::Fixture;

    fn june_leave_body() -> Value {
        json!({
            "start_date": "2025-06-09",
            "end_date": "2025-06-12",
            "leave_type": "vacation"
        })
    }

    fn pending_leave(employee: &str, role: Role) -> LeaveRequest {
        LeaveRequest::file(
            NewLeave {
                employee_id: employee.into(),
                branch_id: "branch-1".into(),
                start_date: chrono::NaiveDate::from_ymd_opt(2025, 7, 1).unwrap(),
                end_date: chrono::NaiveDate::from_ymd_opt(2025, 7, 2).unwrap(),
                leave_type: LeaveType::Sick,
                reason: None,
            },
            role,
            employee,
            Utc::now(),
        )
        .unwrap()
    }

    #[actix_web::test]
    async fn missing_token_is_unauthorized() {
        let fx = Fixture::new();
        let resp = call(&fx.state, TestRequest::get().uri("/api/leave/mine")).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn filing_returns_created() {
        let fx = Fixture::new();
        let req = TestRequest::post()
            .uri("/api/leave")
            .insert_header(bearer("stylist-1", Role::Stylist, Some("branch-1")))
            .set_json(june_leave_body());

        let resp = call(&fx.state, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["status"], "pending");
        assert_eq!(fx.leaves.all().len(), 1);
    }

    #[actix_web::test]
    async fn conflicting_appointment_returns_409_with_samples() {
        let fx = Fixture::new();
        fx.appointments.add(Appointment {
            id: "apt-1".into(),
            stylist_id: "stylist-1".into(),
            branch_id: "branch-1".into(),
            client_name: None,
            appointment_date: chrono::NaiveDate::from_ymd_opt(2025, 6, 10)
                .unwrap()
                .and_hms_opt(9, 0, 0)
                .unwrap(),
            status: AppointmentStatus::parse("confirmed"),
        });

        let req = TestRequest::post()
            .uri("/api/leave")
            .insert_header(bearer("stylist-1", Role::Stylist, Some("branch-1")))
            .set_json(june_leave_body());
        let resp = call(&fx.state, req).await;
        assert_eq!(resp.status(), StatusCode::CONFLICT);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["details"]["samples"][0], "2025-06-10 09:00");
    }

    #[actix_web::test]
    async fn appointment_outage_is_503() {
        let fx = Fixture::new();
        fx.appointments.fail(true);

        let req = TestRequest::get()
            .uri("/api/leave/conflicts?start_date=2025-06-09&end_date=2025-06-12")
            .insert_header(bearer("stylist-1", Role::Stylist, Some("branch-1")));
        let resp = call(&fx.state, req).await;
        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["retryable"], true);
    }

    #[actix_web::test]
    async fn inverted_range_is_400() {
        let fx = Fixture::new();
        let req = TestRequest::post()
            .uri("/api/leave")
            .insert_header(bearer("stylist-1", Role::Stylist, Some("branch-1")))
            .set_json(json!({
                "start_date": "2025-06-12",
                "end_date": "2025-06-09",
                "leave_type": "vacation"
            }));
        let resp = call(&fx.state, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn manager_leave_needs_operations() {
        let fx = Fixture::new();
        let leave = pending_leave("manager-1", Role::BranchManager);
        fx.leaves.insert(leave.clone());

        let uri = format!("/api/leave/{}/approve", leave.id);
        let req = TestRequest::put()
            .uri(&uri)
            .insert_header(bearer("manager-2", Role::BranchManager, Some("branch-1")));
        assert_eq!(call(&fx.state, req).await.status(), StatusCode::FORBIDDEN);

        let req = TestRequest::put()
            .uri(&uri)
            .insert_header(bearer("opmanager-1", Role::OperationalManager, None));
        assert_eq!(call(&fx.state, req).await.status(), StatusCode::OK);

        let req = TestRequest::put()
            .uri(&uri)
            .insert_header(bearer("opmanager-2", Role::OperationalManager, None));
        assert_eq!(call(&fx.state, req).await.status(), StatusCode::CONFLICT);
    }

    #[actix_web::test]
    async fn reject_then_list_by_status() {
        let fx = Fixture::new();
        let leave = pending_leave("stylist-1", Role::Stylist);
        fx.leaves.insert(leave.clone());
        fx.leaves.insert(pending_leave("stylist-1", Role::Stylist));

        let req = TestRequest::put()
            .uri(&format!("/api/leave/{}/reject", leave.id))
            .insert_header(bearer("manager-1", Role::BranchManager, Some("branch-1")))
            .set_json(json!({ "reason": "" }));
        let resp = call(&fx.state, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["leave"]["status"], "rejected");
        assert_eq!(body["leave"]["rejection_reason"], "");

        let req = TestRequest::get()
            .uri("/api/leave?status=rejected_cancelled")
            .insert_header(bearer("manager-1", Role::BranchManager, Some("branch-1")));
        let resp = call(&fx.state, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["total"], 1);
        assert_eq!(body["data"][0]["employee_name"], "stylist-1 name");
        assert_eq!(body["summary"]["rejected"], 1);
        assert_eq!(body["summary"]["pending"], 0);
    }

    #[actix_web::test]
    async fn employee_cancels_own_leave() {
        let fx = Fixture::new();
        let leave = pending_leave("stylist-1", Role::Stylist);
        fx.leaves.insert(leave.clone());

        let req = TestRequest::put()
            .uri(&format!("/api/leave/{}/cancel", leave.id))
            .insert_header(bearer("stylist-1", Role::Stylist, Some("branch-1")));
        assert_eq!(call(&fx.state, req).await.status(), StatusCode::OK);

        let req = TestRequest::get()
            .uri("/api/leave/mine")
            .insert_header(bearer("stylist-1", Role::Stylist, Some("branch-1")));
        let mine: Vec<LeaveRequest> = test::read_body_json(call(&fx.state, req).await).await;
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].status, LeaveStatus::Cancelled);
    }
}
