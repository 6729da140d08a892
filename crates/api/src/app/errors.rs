use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use larder_ai::AiError;
use larder_core::DomainError;
use larder_infra::{ReconcileError, StoreError};

pub fn domain_error_to_response(err: DomainError) -> axum::response::Response {
    let message = err.to_string();
    match err {
        DomainError::Validation(_) => json_error(StatusCode::BAD_REQUEST, "validation_error", message),
        DomainError::NotFound { .. } => json_error(StatusCode::NOT_FOUND, "not_found", message),
        DomainError::InsufficientStock { .. } => json_error(StatusCode::CONFLICT, "insufficient_stock", message),
        DomainError::Conflict(_) => json_error(StatusCode::CONFLICT, "conflict", message),
    }
}

pub fn store_error_to_response(err: StoreError) -> axum::response::Response {
    match err {
        StoreError::Domain(e) => domain_error_to_response(e),
        StoreError::Database(msg) => json_error(StatusCode::INTERNAL_SERVER_ERROR, "store_error", msg),
        StoreError::Decode(msg) => json_error(StatusCode::INTERNAL_SERVER_ERROR, "decode_error", msg),
    }
}

pub fn reconcile_error_to_response(err: ReconcileError) -> axum::response::Response {
    match err {
        ReconcileError::Store(e) => store_error_to_response(e),
        ReconcileError::Ai(e) => {
            let message = e.to_string();
            match e {
                AiError::InvalidInput(_) => {
                    json_error(StatusCode::UNPROCESSABLE_ENTITY, "model_input_rejected", message)
                }
                AiError::InferenceFailed(_) => json_error(StatusCode::BAD_GATEWAY, "inference_error", message),
                AiError::Internal(_) => json_error(StatusCode::INTERNAL_SERVER_ERROR, "internal_error", message),
            }
        }
        ReconcileError::Io(e) => json_error(StatusCode::INTERNAL_SERVER_ERROR, "io_error", e.to_string()),
        ReconcileError::DetectorUnavailable => json_error(
            StatusCode::SERVICE_UNAVAILABLE,
            "detector_unavailable",
            "ingredient detection is not configured",
        ),
    }
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
