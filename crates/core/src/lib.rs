//! `larder-core`: shared domain building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns):
//! the error model, ingredient name normalization and quantity validation.

pub mod error;
pub mod name;
pub mod quantity;

pub use error::{DomainError, DomainResult};
pub use name::IngredientKey;
pub use quantity::{QUANTITY_EPSILON, Quantity, covers, ensure_quantity, settle};
