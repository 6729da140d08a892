use std::sync::Arc;

use axum::{Json, Router, extract::Extension, response::IntoResponse, routing::get};
use chrono::Utc;

use larder_inventory::InventoryView;

use crate::app::errors;
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new().route("/", get(list_inventory))
}

pub async fn list_inventory(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    let now = Utc::now();
    match services.store().list_inventory().await {
        Ok(items) => Json(items.iter().map(|i| i.view(now)).collect::<Vec<InventoryView>>()).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}
