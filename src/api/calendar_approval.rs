use std::convert::Infallible;

use actix_web::http::header;
use actix_web::web::Bytes;
use actix_web::{HttpResponse, Responder, web};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

use crate::auth::auth::AuthUser;
use crate::error::AppError;
use crate::service::branch_calendar::EntryView;
use crate::service::calendar_approval::{self, PendingEntry, VerificationReport, annotate};
use crate::state::AppState;
use crate::store::PendingSubscription;

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct VerifyQuery {
    /// ISO country code, defaults to the configured country
    #[schema(example = "PH")]
    pub country: Option<String>,
    /// Drop cached holiday years before checking
    #[serde(default)]
    pub refresh: bool,
}

#[derive(Deserialize, ToSchema)]
pub struct RejectEntry {
    /// Stored exactly as given; an empty reason is shown as "no reason given"
    #[schema(example = "Branch must stay open for the mall sale")]
    #[serde(default)]
    pub reason: String,
}

/// Calendar entries waiting for review, by date
#[utoipa::path(
    get,
    path = "/api/calendar/approvals",
    responses(
        (status = 200, description = "Pending entries with branch names", body = [PendingEntry]),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Calendar Approval"
)]
pub async fn pending_entries(
    auth: AuthUser,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    let entries = calendar_approval::pending_entries(&state, &auth).await?;
    Ok(HttpResponse::Ok().json(entries))
}

fn sse_frame(entries: &[PendingEntry]) -> Bytes {
    match serde_json::to_string(entries) {
        Ok(json) => Bytes::from(format!("event: pending\ndata: {json}\n\n")),
        Err(e) => {
            tracing::error!(error = %e, "Failed to encode pending snapshot");
            Bytes::from_static(b": snapshot skipped\n\n")
        }
    }
}

/// Live pending queue as Server-Sent Events. Every event carries the full snapshot.
#[utoipa::path(
    get,
    path = "/api/calendar/approvals/stream",
    responses(
        (status = 200, description = "text/event-stream of `pending` events, current snapshot first", content_type = "text/event-stream"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Calendar Approval"
)]
pub async fn pending_stream(
    auth: AuthUser,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    auth.require_operational()?;

    let state = state.get_ref().clone();
    let subscription = state.calendar.subscribe_pending();

    let events = futures::stream::unfold(
        (state, subscription),
        |(state, mut subscription): (AppState, PendingSubscription)| async move {
            let snapshot = subscription.next().await?;
            let frame = sse_frame(&annotate(&state, snapshot).await);
            Some((Ok::<_, Infallible>(frame), (state, subscription)))
        },
    );

    Ok(HttpResponse::Ok()
        .insert_header((header::CONTENT_TYPE, "text/event-stream"))
        .insert_header((header::CACHE_CONTROL, "no-cache"))
        .streaming(events))
}

/// Advisory check of every pending entry against public holidays
#[utoipa::path(
    get,
    path = "/api/calendar/approvals/verify",
    params(VerifyQuery),
    responses(
        (status = 200, description = "holiday, not_holiday or unavailable per entry", body = VerificationReport),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Calendar Approval"
)]
pub async fn verify_pending(
    auth: AuthUser,
    state: web::Data<AppState>,
    query: web::Query<VerifyQuery>,
) -> Result<impl Responder, AppError> {
    let report =
        calendar_approval::verify_pending(&state, &auth, query.country.as_deref(), query.refresh)
            .await?;
    Ok(HttpResponse::Ok().json(report))
}

/* =========================
Approve calendar entry (operations)
========================= */
#[utoipa::path(
    put,
    path = "/api/calendar/approvals/{entry_id}/approve",
    params(
        ("entry_id" = String, Path, description = "Calendar entry to approve")
    ),
    responses(
        (status = 200, description = "Entry approved", body = EntryView),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Calendar entry not found"),
        (status = 409, description = "Entry was already reviewed", body = Object, example = json!({
            "message": "Calendar entry was already reviewed (approved)"
        }))
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Calendar Approval"
)]
pub async fn approve_entry(
    auth: AuthUser,
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<impl Responder, AppError> {
    let entry = calendar_approval::approve_entry(&state, &auth, &path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(entry))
}

/* =========================
Reject calendar entry (operations)
========================= */
#[utoipa::path(
    put,
    path = "/api/calendar/approvals/{entry_id}/reject",
    params(
        ("entry_id" = String, Path, description = "Calendar entry to reject")
    ),
    request_body(content = RejectEntry, content_type = "application/json"),
    responses(
        (status = 200, description = "Entry rejected", body = EntryView),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Calendar entry not found"),
        (status = 409, description = "Entry was already reviewed")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Calendar Approval"
)]
pub async fn reject_entry(
    auth: AuthUser,
    state: web::Data<AppState>,
    path: web::Path<String>,
    payload: web::Json<RejectEntry>,
) -> Result<impl Responder, AppError> {
    let entry = calendar_approval::reject_entry(
        &state,
        &auth,
        &path.into_inner(),
        payload.into_inner().reason,
    )
    .await?;
    Ok(HttpResponse::Ok().json(entry))
}

#[cfg(test)]
mod tests {
    use std::pin::Pin;

    use actix_web::body::MessageBody;
    use actix_web::http::StatusCode;
    use actix_web::test::{self, TestRequest};
    use chrono::{NaiveDate, Utc};
    use serde_json::{Value, json};

    use crate::api::testing::{bearer, call};
    use crate::model::calendar_entry::{Actor, CalendarEntry, EntryDraft, EntryType};
    use crate::model::role::Role;
    use crate::state::testing::Fixture;

    fn seed(fx: &Fixture) -> CalendarEntry {
        let draft = EntryDraft {
            date: NaiveDate::from_ymd_opt(2025, 12, 24).unwrap(),
            title: "Christmas Eve".into(),
            description: String::new(),
            entry_type: EntryType::Closure,
            all_day: true,
            special_hours: None,
        };
        let bm = Actor {
            id: "manager-1".into(),
            name: "manager-1 name".into(),
        };
        let entry = CalendarEntry::from_draft("branch-1", draft, &bm, None, Utc::now());
        fx.calendar.seed(entry.clone());
        entry
    }

    fn ops() -> (&'static str, String) {
        bearer("opmanager-1", Role::OperationalManager, None)
    }

    #[actix_web::test]
    async fn lists_pending_with_branch_name() {
        let fx = Fixture::new();
        seed(&fx);
        let req = TestRequest::get().uri("/api/calendar/approvals").insert_header(ops());
        let body: Value = test::read_body_json(call(&fx.state, req).await).await;
        assert_eq!(body[0]["branch_name"], "Makati Branch");
        assert_eq!(body[0]["title"], "Christmas Eve");
    }

    #[actix_web::test]
    async fn branch_manager_cannot_list_queue() {
        let fx = Fixture::new();
        let req = TestRequest::get()
            .uri("/api/calendar/approvals")
            .insert_header(bearer("manager-1", Role::BranchManager, Some("branch-1")));
        assert_eq!(call(&fx.state, req).await.status(), StatusCode::FORBIDDEN);
    }

    #[actix_web::test]
    async fn second_approval_is_409() {
        let fx = Fixture::new();
        let entry = seed(&fx);
        let uri = format!("/api/calendar/approvals/{}/approve", entry.id);

        let resp = call(&fx.state, TestRequest::put().uri(&uri).insert_header(ops())).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["status"], "approved");
        assert_eq!(body["reviewed_by_name"], "opmanager-1 name");

        let resp = call(&fx.state, TestRequest::put().uri(&uri).insert_header(ops())).await;
        assert_eq!(resp.status(), StatusCode::CONFLICT);
        assert_eq!(fx.activity.actions().len(), 1);
    }

    #[actix_web::test]
    async fn reject_with_empty_reason() {
        let fx = Fixture::new();
        let entry = seed(&fx);
        let req = TestRequest::put()
            .uri(&format!("/api/calendar/approvals/{}/reject", entry.id))
            .insert_header(ops())
            .set_json(json!({ "reason": "" }));
        let body: Value = test::read_body_json(call(&fx.state, req).await).await;
        assert_eq!(body["status"], "rejected");
        assert_eq!(body["rejection_reason"], "");
        assert_eq!(body["rejection_reason_display"], "no reason given");
    }

    #[actix_web::test]
    async fn verify_reports_unavailable_on_provider_failure() {
        let fx = Fixture::new();
        seed(&fx);
        fx.holidays.failing.store(true, std::sync::atomic::Ordering::SeqCst);

        let req = TestRequest::get()
            .uri("/api/calendar/approvals/verify?country=PH")
            .insert_header(ops());
        let body: Value = test::read_body_json(call(&fx.state, req).await).await;
        assert_eq!(body["entries"][0]["result"], "unavailable");
    }

    #[actix_web::test]
    async fn stream_starts_with_current_snapshot() {
        let fx = Fixture::new();
        seed(&fx);
        let req = TestRequest::get()
            .uri("/api/calendar/approvals/stream")
            .insert_header(ops());
        let resp = call(&fx.state, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            resp.headers().get("content-type").unwrap(),
            "text/event-stream"
        );

        let mut body = resp.into_body();
        let first = std::future::poll_fn(|cx| Pin::new(&mut body).poll_next(cx))
            .await
            .unwrap()
            .unwrap();
        let text = String::from_utf8(first.to_vec()).unwrap();
        assert!(text.starts_with("event: pending\ndata: "));
        assert!(text.contains("Makati Branch"));
    }
}
