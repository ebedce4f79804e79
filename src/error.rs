use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde_json::{Value, json};
use thiserror::Error;

use crate::model::calendar_entry::CalendarValidationError;
use crate::model::leave_request::{LeaveValidationError, TransitionError};
use crate::service::day_grid::GridError;
use crate::store::StoreError;
use crate::utils::holiday_cache::RangeError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{message}")]
    Conflict {
        message: String,
        details: Option<Value>,
    },
    /// A collaborator could not be reached. Never reported as an empty result.
    #[error("{0}")]
    LookupFailed(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl AppError {
    pub fn conflict(message: impl Into<String>) -> Self {
        AppError::Conflict {
            message: message.into(),
            details: None,
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict { .. } => StatusCode::CONFLICT,
            AppError::LookupFailed(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let body = match self {
            AppError::Store(e) => {
                tracing::error!(error = %e, "Store operation failed");
                json!({ "message": "Internal Server Error" })
            }
            AppError::Conflict {
                message,
                details: Some(details),
            } => json!({ "message": message, "details": details }),
            AppError::LookupFailed(message) => json!({ "message": message, "retryable": true }),
            other => json!({ "message": other.to_string() }),
        };

        HttpResponse::build(self.status_code()).json(body)
    }
}

impl From<LeaveValidationError> for AppError {
    fn from(e: LeaveValidationError) -> Self {
        AppError::Validation(e.to_string())
    }
}

impl From<CalendarValidationError> for AppError {
    fn from(e: CalendarValidationError) -> Self {
        AppError::Validation(e.to_string())
    }
}

impl From<GridError> for AppError {
    fn from(e: GridError) -> Self {
        AppError::Validation(e.to_string())
    }
}

impl From<RangeError> for AppError {
    fn from(e: RangeError) -> Self {
        match e {
            RangeError::Unavailable { years } => {
                let years: Vec<String> = years.iter().map(i32::to_string).collect();
                AppError::LookupFailed(format!(
                    "Public holidays for {} are unavailable right now",
                    years.join(", ")
                ))
            }
            other => AppError::Validation(other.to_string()),
        }
    }
}

impl From<TransitionError> for AppError {
    fn from(e: TransitionError) -> Self {
        match e {
            TransitionError::NotPending(_) => AppError::conflict(e.to_string()),
            TransitionError::SelfReview | TransitionError::NotRequester => {
                AppError::Forbidden(e.to_string())
            }
        }
    }
}
