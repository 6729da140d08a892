use serde::Deserialize;

use crate::app::errors;

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct OrderRequest {
    pub dish_name: String,
    /// Servings; must be at least 1.
    pub quantity: i64,
}

#[derive(Debug, Deserialize)]
pub struct SalesHistoryRequest {
    /// How many months back to include.
    pub month: i64,
}

// -------------------------
// Mapping helpers
// -------------------------

/// Narrow a client-supplied count to `u32`, rejecting negatives.
pub fn non_negative_u32(value: i64, field: &str) -> Result<u32, axum::response::Response> {
    u32::try_from(value).map_err(|_| {
        errors::json_error(
            axum::http::StatusCode::BAD_REQUEST,
            "validation_error",
            format!("{field} must be a non-negative integer"),
        )
    })
}
