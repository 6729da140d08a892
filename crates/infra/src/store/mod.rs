//! Storage for menu, inventory, sales and predictions.
//!
//! `InMemoryStore` backs tests and database-less runs; `PostgresStore` is the
//! production implementation.

pub mod in_memory;
pub mod postgres;
pub mod r#trait;

pub use in_memory::InMemoryStore;
pub use postgres::PostgresStore;
pub(crate) use postgres::map_sqlx_error;
pub use r#trait::{RestaurantStore, StoreError};
