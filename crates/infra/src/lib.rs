//! Infrastructure layer: storage, configuration, external services and the
//! background jobs that tie the domain crates together.

pub mod ai;
pub mod config;
pub mod db;
pub mod external;
pub mod reconciliation;
pub mod store;

pub use config::{Config, ConfigError};
pub use reconciliation::{DetectionReport, ForecastRun, ReconcileError, Reconciler};
pub use store::{InMemoryStore, PostgresStore, RestaurantStore, StoreError};
