//! `larder-ai`
//!
//! **Responsibility:** ML subsystem boundary.
//!
//! This crate is intentionally **not** part of the domain model:
//! - It must not depend on domain crates (menu/inventory/sales).
//! - It must not mutate state; callers persist what it returns.
//! - Inputs are plain snapshots provided by infra.

pub mod detection;
pub mod forecast;
pub mod job;
pub mod result;
pub mod scheduler;

pub use detection::{
    DEFAULT_MIN_CONFIDENCE, DetectedObject, Detection, DetectionJob, DetectionSummary, IngredientDetector, count_labels,
};
pub use forecast::{
    DEFAULT_HORIZON_DAYS, ForecastJob, ForecastPoint, SalesForecaster, SalesPoint, SeasonalTrendForecaster,
    partition_by_dish,
};
pub use job::AiJob;
pub use result::AiError;
pub use scheduler::{AiScheduler, LocalAiScheduler};
