use std::sync::Arc;

use axum::{
    Json, Router,
    extract::Extension,
    response::IntoResponse,
    routing::{get, post},
};

use crate::app::errors;
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_predictions))
        .route("/refresh", post(refresh))
}

pub async fn list_predictions(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    match services.store().predictions().await {
        Ok(predictions) => Json(predictions).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

/// Run the forecast now instead of waiting for the daily run.
pub async fn refresh(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    match services.reconciler.refresh_forecasts(services.today()).await {
        Ok(run) => Json(run).into_response(),
        Err(e) => errors::reconcile_error_to_response(e),
    }
}
