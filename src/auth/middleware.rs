use crate::auth::auth::AuthUser;
use crate::auth::jwt::verify_token;
use crate::config::Config;
use crate::model::role::Role;
use actix_web::middleware::Next;
use actix_web::{
    Error, HttpMessage, HttpResponse,
    body::BoxBody,
    dev::{ServiceRequest, ServiceResponse},
    web::Data,
};
use serde_json::json;

pub async fn auth_middleware(
    req: ServiceRequest,
    next: Next<BoxBody>,
) -> Result<ServiceResponse<BoxBody>, Error> {
    let config = req
        .app_data::<Data<Config>>()
        .ok_or_else(|| actix_web::error::ErrorInternalServerError("App config missing"))?;

    let header_value = match req.headers().get("Authorization").map(|h| h.to_str()) {
        Some(Ok(h)) => h,
        Some(Err(_)) => {
            return Ok(unauthorized(req, "Invalid Authorization header encoding"));
        }
        None => return Ok(unauthorized(req, "Missing Authorization header")),
    };

    let token = match header_value.strip_prefix("Bearer ") {
        Some(t) => t,
        None => return Ok(unauthorized(req, "Authorization header must start with Bearer")),
    };

    let claims = match verify_token(token, &config.jwt_secret) {
        Ok(c) => c,
        Err(e) => {
            tracing::debug!(error = %e, "Rejected bearer token");
            return Ok(unauthorized(req, "Invalid or expired token"));
        }
    };

    let role = match Role::parse(&claims.role) {
        Some(role) => role,
        None => return Ok(unauthorized(req, "Invalid role")),
    };

    let auth_user = AuthUser {
        id: claims.sub,
        name: claims.name,
        role,
        branch_id: claims.branch_id,
    };

    req.extensions_mut().insert(auth_user);

    next.call(req).await
}

fn unauthorized(req: ServiceRequest, message: &str) -> ServiceResponse<BoxBody> {
    let resp = HttpResponse::Unauthorized().json(json!({ "message": message }));
    req.into_response(resp.map_into_boxed_body())
}
