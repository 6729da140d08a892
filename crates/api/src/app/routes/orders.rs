use std::sync::Arc;

use axum::{Json, Router, extract::Extension, response::IntoResponse, routing::post};

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new().route("/", post(place_order))
}

/// Take the dish's ingredients out of inventory and record the sale.
pub async fn place_order(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::OrderRequest>,
) -> axum::response::Response {
    let servings = match dto::non_negative_u32(body.quantity, "quantity") {
        Ok(s) => s,
        Err(resp) => return resp,
    };

    match services
        .reconciler
        .fulfill_order(&body.dish_name, servings, services.today())
        .await
    {
        Ok(receipt) => Json(receipt).into_response(),
        Err(e) => errors::reconcile_error_to_response(e),
    }
}
