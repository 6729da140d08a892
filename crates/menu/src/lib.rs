//! Menu domain module.
//!
//! Dishes and their per-serving ingredient requirements, implemented purely as
//! deterministic domain logic (no IO, no HTTP, no storage).

pub mod item;
pub mod recipe;

pub use item::{MenuItem, MenuListing};
pub use recipe::Recipe;
