use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use ambumed_infra::UpdateError;

pub fn update_error_to_response(err: UpdateError) -> axum::response::Response {
    match err {
        UpdateError::NotFound(msg) => json_error(StatusCode::NOT_FOUND, "not_found", msg),
        UpdateError::Conflict(msg) => json_error(StatusCode::CONFLICT, "conflict", msg),
        UpdateError::Validation(msg) => {
            json_error(StatusCode::BAD_REQUEST, "validation_error", msg)
        }
        UpdateError::Connectivity(msg) => {
            json_error(StatusCode::BAD_GATEWAY, "backend_unreachable", msg)
        }
        UpdateError::Backend(msg) => json_error(StatusCode::BAD_GATEWAY, "backend_error", msg),
        UpdateError::Internal(msg) => {
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "internal_error", msg)
        }
    }
}

/// Malformed or mistyped request bodies are reported as 400 with the usual shape.
pub fn json_rejection_to_response(rejection: JsonRejection) -> axum::response::Response {
    json_error(StatusCode::BAD_REQUEST, "invalid_body", rejection.body_text())
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
