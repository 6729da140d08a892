//! Background AI runners.
//!
//! Runners own their thread and log failures; nothing they do propagates into
//! request handling.

pub mod forecast_runner;

pub use forecast_runner::{ForecastRunner, ForecastRunnerHandle, next_run_after};
