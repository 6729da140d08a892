use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use thiserror::Error;

use larder_core::DomainError;
use larder_inventory::{InventoryItem, RestockOutcome};
use larder_menu::MenuItem;
use larder_sales::{DateRange, FulfillmentReceipt, HolidayCalendar, Prediction, SalesRecord};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("database error: {0}")]
    Database(String),

    /// A stored row could not be turned back into a domain value.
    #[error("decode error: {0}")]
    Decode(String),
}

/// Persistence for menu, inventory, sales ledger and predictions.
///
/// Multi-step operations (`fulfill_order`, `replenish`, `upsert_predictions`)
/// are atomic: either every write lands or none does.
#[async_trait::async_trait]
pub trait RestaurantStore: Send + Sync + 'static {
    async fn list_menu(&self) -> Result<Vec<MenuItem>, StoreError>;

    async fn list_inventory(&self) -> Result<Vec<InventoryItem>, StoreError>;

    /// Take `servings` of `dish_name` out of inventory and record the sale on `today`.
    ///
    /// Nothing is written when the dish is unknown or any ingredient is short.
    async fn fulfill_order(
        &self,
        dish_name: &str,
        servings: u32,
        today: NaiveDate,
        holidays: &HolidayCalendar,
    ) -> Result<FulfillmentReceipt, StoreError>;

    /// Add detected `label -> count` pairs to inventory.
    async fn replenish(
        &self,
        counts: &BTreeMap<String, u32>,
        now: DateTime<Utc>,
    ) -> Result<Vec<RestockOutcome>, StoreError>;

    /// Sales records within `range`, ordered by date then dish.
    async fn sales_in(&self, range: DateRange) -> Result<Vec<SalesRecord>, StoreError>;

    /// Every stored prediction, ordered by date then dish.
    async fn predictions(&self) -> Result<Vec<Prediction>, StoreError>;

    async fn predictions_for(&self, date: NaiveDate) -> Result<Vec<Prediction>, StoreError>;

    /// Insert or overwrite predictions keyed by `(date, dish_name)`.
    async fn upsert_predictions(&self, predictions: &[Prediction]) -> Result<(), StoreError>;
}
