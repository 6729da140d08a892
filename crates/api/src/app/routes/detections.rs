use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Extension, Multipart},
    http::{StatusCode, header},
    response::IntoResponse,
    routing::{get, post},
};
use chrono::Utc;

use crate::app::errors;
use crate::app::services::AppServices;

const MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

pub fn router() -> Router {
    Router::new()
        .route("/", post(upload))
        .route("/annotated", get(annotated))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
}

/// Multipart upload with a `file` field; detected ingredients go into inventory.
pub async fn upload(
    Extension(services): Extension<Arc<AppServices>>,
    mut multipart: Multipart,
) -> axum::response::Response {
    if !services.reconciler.has_detector() {
        return errors::reconcile_error_to_response(larder_infra::ReconcileError::DetectorUnavailable);
    }

    let mut file = None;
    loop {
        match multipart.next_field().await {
            Ok(Some(field)) => {
                if field.name() != Some("file") {
                    continue;
                }
                let filename = field.file_name().unwrap_or("upload").to_string();
                match field.bytes().await {
                    Ok(bytes) => file = Some((filename, bytes.to_vec())),
                    Err(e) => return errors::json_error(StatusCode::BAD_REQUEST, "validation_error", e.to_string()),
                }
            }
            Ok(None) => break,
            Err(e) => return errors::json_error(StatusCode::BAD_REQUEST, "validation_error", e.to_string()),
        }
    }

    let Some((filename, image)) = file else {
        return errors::json_error(
            StatusCode::BAD_REQUEST,
            "validation_error",
            "multipart field 'file' is required",
        );
    };

    match services
        .reconciler
        .detect_and_replenish(&filename, image, Utc::now())
        .await
    {
        Ok(report) => Json(report).into_response(),
        Err(e) => errors::reconcile_error_to_response(e),
    }
}

/// The last annotated detection image.
pub async fn annotated(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    match services.reconciler.annotated_image().await {
        Ok(Some(bytes)) => ([(header::CONTENT_TYPE, "image/jpeg")], bytes).into_response(),
        Ok(None) => errors::json_error(StatusCode::NOT_FOUND, "not_found", "no annotated image yet"),
        Err(e) => errors::reconcile_error_to_response(e),
    }
}
