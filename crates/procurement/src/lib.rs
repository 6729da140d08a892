//! Procurement projection.
//!
//! Turns tomorrow's forecast into ingredient needs and sorts every needed
//! ingredient into exactly one of three buckets (to buy, insufficient,
//! sufficient). Pure domain logic (no IO, no HTTP, no storage).

pub mod projection;

pub use projection::{DishForecast, ProcurementPlan, Shortfall, StockStatus, classify, project_procurement};
