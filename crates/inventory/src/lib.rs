//! Inventory domain module.
//!
//! This crate contains business rules for kitchen stock, implemented purely as
//! deterministic domain logic (no IO, no HTTP, no storage).

pub mod item;
pub mod replenish;

pub use item::{InventoryItem, InventoryView, humanize_elapsed};
pub use replenish::{
    DEFAULT_CATEGORY, DEFAULT_PRICE, DEFAULT_QUALITY, DEFAULT_REMAINING_LIFE, Restock, RestockAction,
    RestockOutcome, plan_replenishment,
};
