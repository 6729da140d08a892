use axum::Router;

pub mod detections;
pub mod inventory;
pub mod menu;
pub mod orders;
pub mod predictions;
pub mod procurement;
pub mod sales;
pub mod system;

/// Router for every endpoint except `/health`.
pub fn router() -> Router {
    Router::new()
        .nest("/menu", menu::router())
        .nest("/sales", sales::router())
        .nest("/orders", orders::router())
        .nest("/inventory", inventory::router())
        .nest("/predictions", predictions::router())
        .nest("/procurement", procurement::router())
        .nest("/detections", detections::router())
}
