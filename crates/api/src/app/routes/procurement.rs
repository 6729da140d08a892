use std::sync::Arc;

use axum::{Json, Router, extract::Extension, response::IntoResponse, routing::get};

use crate::app::errors;
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new().route("/", get(tomorrow))
}

/// Ingredients to buy for tomorrow's predicted sales.
pub async fn tomorrow(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    match services.reconciler.procurement(services.today()).await {
        Ok(plan) => Json(plan).into_response(),
        Err(e) => errors::reconcile_error_to_response(e),
    }
}
