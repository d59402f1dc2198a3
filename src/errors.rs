use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::services::booking::BookingError;
use crate::services::draft::DraftError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("unauthorized")]
    Unauthorized,

    #[error("invalid transition")]
    InvalidTransition,

    #[error("this job was already accepted by another provider")]
    StaleSnapshot(String),

    #[error("missing fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),

    #[error("no draft in progress")]
    DraftNotStarted,

    #[error("{0}")]
    Validation(String),

    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<BookingError> for AppError {
    fn from(err: BookingError) -> Self {
        match err {
            BookingError::Unauthorized => AppError::Unauthorized,
            BookingError::InvalidTransition => AppError::InvalidTransition,
            BookingError::StaleSnapshot(detail) => AppError::StaleSnapshot(detail),
            BookingError::NotFound(id) => AppError::NotFound(id),
            BookingError::Storage(err) => AppError::Internal(err),
        }
    }
}

impl From<DraftError> for AppError {
    fn from(err: DraftError) -> Self {
        match err {
            DraftError::NotStarted => AppError::DraftNotStarted,
            DraftError::MissingFields(fields) => AppError::MissingFields(fields),
            DraftError::Storage(err) => AppError::Internal(err),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Unauthorized => StatusCode::FORBIDDEN,
            AppError::InvalidTransition => StatusCode::CONFLICT,
            AppError::StaleSnapshot(_) => StatusCode::CONFLICT,
            AppError::MissingFields(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::DraftNotStarted => StatusCode::NOT_FOUND,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = match &self {
            AppError::MissingFields(fields) => serde_json::json!({
                "error": self.to_string(),
                "missing": fields,
            }),
            _ => serde_json::json!({ "error": self.to_string() }),
        };
        (status, axum::Json(body)).into_response()
    }
}
