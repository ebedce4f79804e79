use actix_web::{HttpResponse, Responder, web};
use chrono::Local;

use crate::auth::auth::AuthUser;
use crate::error::AppError;
use crate::model::calendar_entry::{CalendarEntry, EntryDraft};
use crate::service::branch_calendar::{self, EntryTypeInfo, EntryView};
use crate::service::month_view::{MonthQuery, MonthView, month_view};
use crate::state::AppState;

/// Entry types a branch manager can choose from
#[utoipa::path(
    get,
    path = "/api/calendar/entry-types",
    responses(
        (status = 200, description = "Entry types with display labels", body = [EntryTypeInfo]),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Calendar"
)]
pub async fn entry_types(_auth: AuthUser) -> impl Responder {
    HttpResponse::Ok().json(branch_calendar::entry_types())
}

/// Six-week month grid with entries, public holidays and approved leave merged per day
#[utoipa::path(
    get,
    path = "/api/calendar/month",
    params(MonthQuery),
    responses(
        (status = 200, description = "Merged month grid", body = MonthView),
        (status = 400, description = "Invalid month, or year outside 1..=9999"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Calendar"
)]
pub async fn month(
    auth: AuthUser,
    state: web::Data<AppState>,
    query: web::Query<MonthQuery>,
) -> Result<impl Responder, AppError> {
    let view = month_view(&state, &auth, &query, Local::now().date_naive()).await?;
    Ok(HttpResponse::Ok().json(view))
}

#[utoipa::path(
    get,
    path = "/api/calendar/branches/{branch_id}/entries",
    params(
        ("branch_id" = String, Path, description = "Branch whose calendar to list")
    ),
    responses(
        (status = 200, description = "Every entry of the branch, any status", body = [EntryView]),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Calendar"
)]
pub async fn list_entries(
    auth: AuthUser,
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<impl Responder, AppError> {
    let entries = branch_calendar::list_entries(&state, &auth, &path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(entries))
}

#[utoipa::path(
    get,
    path = "/api/calendar/branches/{branch_id}/approved",
    params(
        ("branch_id" = String, Path, description = "Branch whose calendar to list")
    ),
    responses(
        (status = 200, description = "Approved entries by date", body = [CalendarEntry]),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Calendar"
)]
pub async fn approved_entries(
    auth: AuthUser,
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<impl Responder, AppError> {
    let entries = branch_calendar::approved_entries(&state, &auth, &path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(entries))
}

#[utoipa::path(
    get,
    path = "/api/calendar/branches/{branch_id}/upcoming",
    params(
        ("branch_id" = String, Path, description = "Branch whose calendar to list")
    ),
    responses(
        (status = 200, description = "Approved entries from today on", body = [CalendarEntry]),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Calendar"
)]
pub async fn upcoming_entries(
    auth: AuthUser,
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<impl Responder, AppError> {
    let entries = branch_calendar::upcoming_entries(
        &state,
        &auth,
        &path.into_inner(),
        Local::now().date_naive(),
    )
    .await?;
    Ok(HttpResponse::Ok().json(entries))
}

/* =========================
Submit a calendar entry for approval
========================= */
#[utoipa::path(
    post,
    path = "/api/calendar/branches/{branch_id}/entries",
    params(
        ("branch_id" = String, Path, description = "Branch the entry belongs to")
    ),
    request_body(
        content = EntryDraft,
        description = "Calendar entry payload",
        content_type = "application/json"
    ),
    responses(
        (status = 201, description = "Entry submitted and waiting for approval", body = CalendarEntry),
        (status = 400, description = "Bad request"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Calendar"
)]
pub async fn create_entry(
    auth: AuthUser,
    state: web::Data<AppState>,
    path: web::Path<String>,
    payload: web::Json<EntryDraft>,
) -> Result<impl Responder, AppError> {
    let entry =
        branch_calendar::create_entry(&state, &auth, &path.into_inner(), payload.into_inner())
            .await?;
    Ok(HttpResponse::Created().json(entry))
}

#[utoipa::path(
    put,
    path = "/api/calendar/branches/{branch_id}/entries/{entry_id}",
    params(
        ("branch_id" = String, Path, description = "Branch the entry belongs to"),
        ("entry_id" = String, Path, description = "Entry to edit")
    ),
    request_body(content = EntryDraft, content_type = "application/json"),
    responses(
        (status = 200, description = "Entry updated, status unchanged", body = CalendarEntry),
        (status = 400, description = "Bad request"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Calendar entry not found")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Calendar"
)]
pub async fn update_entry(
    auth: AuthUser,
    state: web::Data<AppState>,
    path: web::Path<(String, String)>,
    payload: web::Json<EntryDraft>,
) -> Result<impl Responder, AppError> {
    let (branch_id, entry_id) = path.into_inner();
    let entry =
        branch_calendar::update_entry(&state, &auth, &branch_id, &entry_id, payload.into_inner())
            .await?;
    Ok(HttpResponse::Ok().json(entry))
}

#[utoipa::path(
    delete,
    path = "/api/calendar/branches/{branch_id}/entries/{entry_id}",
    params(
        ("branch_id" = String, Path, description = "Branch the entry belongs to"),
        ("entry_id" = String, Path, description = "Entry to delete")
    ),
    responses(
        (status = 200, description = "Entry deleted", body = Object, example = json!({
            "message": "Calendar entry deleted"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Calendar entry not found")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Calendar"
)]
pub async fn delete_entry(
    auth: AuthUser,
    state: web::Data<AppState>,
    path: web::Path<(String, String)>,
) -> Result<impl Responder, AppError> {
    let (branch_id, entry_id) = path.into_inner();
    branch_calendar::delete_entry(&state, &auth, &branch_id, &entry_id).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Calendar entry deleted"
    })))
}

#[cfg(test)]
mod tests {
    use actix_web::http::StatusCode;
    use actix_web::test::{self, TestRequest};
    use serde_json::{Value, json};

    use crate::api::testing::{bearer, call};
    use crate::model::role::Role;
    use crate::state::testing::Fixture;

    fn christmas_eve() -> Value {
        json!({
            "date": "2025-12-24",
            "title": "Christmas Eve",
            "entry_type": "special_hours",
            "all_day": false,
            "special_hours": { "open": "10:00:00", "close": "15:00:00" }
        })
    }

    #[actix_web::test]
    async fn manager_submits_and_edits_entry() {
        let fx = Fixture::new();
        let req = TestRequest::post()
            .uri("/api/calendar/branches/branch-1/entries")
            .insert_header(bearer("manager-1", Role::BranchManager, Some("branch-1")))
            .set_json(christmas_eve());
        let resp = call(&fx.state, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let created: Value = test::read_body_json(resp).await;
        assert_eq!(created["status"], "pending");
        assert_eq!(created["requested_by"], "manager-1");

        let mut edit = christmas_eve();
        edit["title"] = json!("Christmas Eve (early close)");
        let req = TestRequest::put()
            .uri(&format!(
                "/api/calendar/branches/branch-1/entries/{}",
                created["id"].as_str().unwrap()
            ))
            .insert_header(bearer("manager-1", Role::BranchManager, Some("branch-1")))
            .set_json(edit);
        let updated: Value = test::read_body_json(call(&fx.state, req).await).await;
        assert_eq!(updated["title"], "Christmas Eve (early close)");
        assert_eq!(updated["status"], "pending");
    }

    #[actix_web::test]
    async fn stylist_cannot_submit() {
        let fx = Fixture::new();
        let req = TestRequest::post()
            .uri("/api/calendar/branches/branch-1/entries")
            .insert_header(bearer("stylist-1", Role::Stylist, Some("branch-1")))
            .set_json(christmas_eve());
        assert_eq!(call(&fx.state, req).await.status(), StatusCode::FORBIDDEN);
    }

    #[actix_web::test]
    async fn special_hours_without_times_is_400() {
        let fx = Fixture::new();
        let req = TestRequest::post()
            .uri("/api/calendar/branches/branch-1/entries")
            .insert_header(bearer("manager-1", Role::BranchManager, Some("branch-1")))
            .set_json(json!({
                "date": "2025-12-24",
                "title": "Short day",
                "entry_type": "special_hours",
                "all_day": false
            }));
        assert_eq!(call(&fx.state, req).await.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn month_grid_has_42_days() {
        let fx = Fixture::new();
        let req = TestRequest::get()
            .uri("/api/calendar/month?year=2025&month=12&branch_id=branch-1")
            .insert_header(bearer("stylist-1", Role::Stylist, Some("branch-1")));
        let resp = call(&fx.state, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["days"].as_array().unwrap().len(), 42);
        assert_eq!(body["days"][0]["date"], "2025-11-30");
        assert_eq!(body["country"], "PH");
    }

    #[actix_web::test]
    async fn entry_types_are_listed() {
        let fx = Fixture::new();
        let req = TestRequest::get()
            .uri("/api/calendar/entry-types")
            .insert_header(bearer("stylist-1", Role::Stylist, Some("branch-1")));
        let body: Value = test::read_body_json(call(&fx.state, req).await).await;
        assert_eq!(body[1]["value"], "closure");
        assert_eq!(body[1]["label"], "Temporary Closure");
    }
}
