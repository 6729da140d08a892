use std::sync::Arc;

use axum::{Json, Router, extract::Extension, response::IntoResponse, routing::get};

use larder_menu::MenuListing;

use crate::app::errors;
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new().route("/", get(list_menu))
}

/// Menu with ingredient names only.
pub async fn list_menu(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    match services.store().list_menu().await {
        Ok(items) => Json(items.iter().map(|m| m.listing()).collect::<Vec<MenuListing>>()).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}
