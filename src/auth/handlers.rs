use crate::auth::auth::AuthUser;
use actix_web::{HttpResponse, Responder, get};

/// Identity resolved from the bearer token
#[utoipa::path(
    get,
    path = "/api/me",
    responses(
        (status = 200, description = "Current user", body = AuthUser),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Auth"
)]
#[get("/me")]
pub async fn me(auth: AuthUser) -> impl Responder {
    HttpResponse::Ok().json(auth)
}
