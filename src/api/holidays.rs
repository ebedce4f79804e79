use actix_web::{HttpResponse, Responder, web};
use chrono::NaiveDate;
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

use crate::auth::auth::AuthUser;
use crate::error::AppError;
use crate::model::holiday::PublicHoliday;
use crate::state::AppState;

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct CountryQuery {
    /// ISO country code, defaults to the configured country
    #[schema(example = "PH")]
    pub country: Option<String>,
}

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct RangeQuery {
    #[schema(example = "2025-12-01", format = "date", value_type = String)]
    pub start_date: NaiveDate,
    #[schema(example = "2026-01-31", format = "date", value_type = String)]
    pub end_date: NaiveDate,
    #[schema(example = "PH")]
    pub country: Option<String>,
}

fn country_or_default<'a>(state: &'a AppState, country: Option<&'a str>) -> &'a str {
    country
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .unwrap_or(&state.default_country)
}

/// Public holidays of one year
#[utoipa::path(
    get,
    path = "/api/holidays/{year}",
    params(
        ("year" = i32, Path, description = "Calendar year"),
        CountryQuery
    ),
    responses(
        (status = 200, description = "Public holidays by date", body = [PublicHoliday]),
        (status = 401, description = "Unauthorized"),
        (status = 503, description = "Holiday service unavailable", body = Object, example = json!({
            "message": "Public holidays are unavailable right now",
            "retryable": true
        }))
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Holidays"
)]
pub async fn year_holidays(
    _auth: AuthUser,
    state: web::Data<AppState>,
    path: web::Path<i32>,
    query: web::Query<CountryQuery>,
) -> Result<impl Responder, AppError> {
    let year = path.into_inner();
    let country = country_or_default(&state, query.country.as_deref());

    let holidays = state.holidays.try_holidays(year, country).await.map_err(|e| {
        tracing::warn!(error = %e, year, country, "Public holiday lookup failed");
        AppError::LookupFailed("Public holidays are unavailable right now".into())
    })?;

    Ok(HttpResponse::Ok().json(holidays.as_ref()))
}

/// Public holidays between two dates, at most two years apart
#[utoipa::path(
    get,
    path = "/api/holidays/range",
    params(RangeQuery),
    responses(
        (status = 200, description = "Public holidays by date", body = [PublicHoliday]),
        (status = 400, description = "start_date after end_date, or range wider than two years"),
        (status = 401, description = "Unauthorized"),
        (status = 503, description = "Holiday service unavailable for a year in the range", body = Object, example = json!({
            "message": "Public holidays for 2025 are unavailable right now",
            "retryable": true
        }))
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Holidays"
)]
pub async fn range_holidays(
    _auth: AuthUser,
    state: web::Data<AppState>,
    query: web::Query<RangeQuery>,
) -> Result<impl Responder, AppError> {
    let country = country_or_default(&state, query.country.as_deref());
    let holidays = state
        .holidays
        .in_range(query.start_date, query.end_date, country)
        .await?;
    Ok(HttpResponse::Ok().json(holidays))
}
