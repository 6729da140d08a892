use std::sync::Arc;

use axum::{
    Json, Router,
    extract::Extension,
    response::IntoResponse,
    routing::{get, post},
};

use larder_sales::SalesWindow;

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/weekly", get(weekly))
        .route("/monthly", get(monthly))
        .route("/history", post(history))
}

pub async fn weekly(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    sales_in_window(&services, SalesWindow::LastDays(7)).await
}

pub async fn monthly(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    sales_in_window(&services, SalesWindow::CurrentMonth).await
}

pub async fn history(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::SalesHistoryRequest>,
) -> axum::response::Response {
    let months = match dto::non_negative_u32(body.month, "month") {
        Ok(m) => m,
        Err(resp) => return resp,
    };
    sales_in_window(&services, SalesWindow::LastMonths(months)).await
}

async fn sales_in_window(services: &AppServices, window: SalesWindow) -> axum::response::Response {
    let range = match window.range(services.today()) {
        Ok(r) => r,
        Err(e) => return errors::domain_error_to_response(e),
    };
    match services.store().sales_in(range).await {
        Ok(records) => Json(records).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}
