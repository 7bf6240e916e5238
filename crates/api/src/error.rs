use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use linguaflow_services::assessment::AssessmentError;
use linguaflow_services::proficiency::ProficiencyError;
use serde::Serialize;

#[derive(Debug)]
pub enum ApiError {
    NotFound(String),
    BadRequest(String),
    Unauthorized(String),
    Forbidden(String),
    Conflict(String),
    Internal(String),
    Validation(String),
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiError::NotFound(msg) => write!(f, "Not found: {msg}"),
            ApiError::BadRequest(msg) => write!(f, "Bad request: {msg}"),
            ApiError::Unauthorized(msg) => write!(f, "Unauthorized: {msg}"),
            ApiError::Forbidden(msg) => write!(f, "Forbidden: {msg}"),
            ApiError::Conflict(msg) => write!(f, "Conflict: {msg}"),
            ApiError::Internal(msg) => write!(f, "Internal error: {msg}"),
            ApiError::Validation(msg) => write!(f, "Validation: {msg}"),
        }
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "unauthorized", msg),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, "forbidden", msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, "conflict", msg),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, "internal", msg),
            ApiError::Validation(msg) => (StatusCode::UNPROCESSABLE_ENTITY, "validation", msg),
        };

        let body = ErrorResponse {
            error: error_type.to_string(),
            message,
        };

        (status, Json(body)).into_response()
    }
}

impl From<AssessmentError> for ApiError {
    fn from(err: AssessmentError) -> Self {
        match err {
            AssessmentError::NotFound => {
                ApiError::NotFound("Assessment not found or expired".to_string())
            }
            AssessmentError::Forbidden => {
                ApiError::Forbidden("Assessment belongs to another user".to_string())
            }
            e @ AssessmentError::OutOfSequence { .. } => ApiError::Conflict(e.to_string()),
            AssessmentError::AlreadyCompleted => {
                ApiError::Conflict("Assessment already completed".to_string())
            }
            AssessmentError::NotCompleted => {
                ApiError::Conflict("Assessment still in progress".to_string())
            }
            AssessmentError::InvalidProgram(msg) => ApiError::Validation(msg),
            AssessmentError::InsufficientEvidence => ApiError::Validation(
                "Assessment produced no usable level; retake it and answer at least one question"
                    .to_string(),
            ),
            AssessmentError::QuestionSource(e) => ApiError::Internal(e.to_string()),
            AssessmentError::Store(e) => ApiError::Internal(e.to_string()),
            AssessmentError::Catalog(e) => ApiError::Internal(e.to_string()),
            AssessmentError::Proficiency(e) => ApiError::Internal(e.to_string()),
            AssessmentError::Codec(e) => ApiError::Internal(e.to_string()),
        }
    }
}

impl From<ProficiencyError> for ApiError {
    fn from(err: ProficiencyError) -> Self {
        ApiError::Internal(err.to_string())
    }
}
