//! Order fulfillment: what an order takes out of the kitchen.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use larder_core::{DomainError, DomainResult, Quantity, covers, settle};
use larder_menu::MenuItem;

/// Stock changes needed to serve an order, computed before anything is written.
#[derive(Debug, Clone, PartialEq)]
pub struct FulfillmentPlan {
    pub dish_name: String,
    pub servings: u32,
    /// Ingredient → amount taken out.
    pub consumed: BTreeMap<String, Quantity>,
    /// Ingredient → amount left afterwards (required ingredients only).
    pub remaining: BTreeMap<String, Quantity>,
}

/// Result of a fulfilled order as reported to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FulfillmentReceipt {
    pub dish_name: String,
    pub servings: u32,
    pub consumed: BTreeMap<String, Quantity>,
    /// Servings of this dish recorded for the day, including this order.
    pub sales_today: i64,
    pub message: String,
}

impl FulfillmentPlan {
    pub fn receipt(self, sales_today: i64) -> FulfillmentReceipt {
        let message = format!(
            "Inventory updated and sales data recorded for {} servings of '{}'.",
            self.servings, self.dish_name
        );
        FulfillmentReceipt {
            dish_name: self.dish_name,
            servings: self.servings,
            consumed: self.consumed,
            sales_today,
            message,
        }
    }
}

/// Check `stock` (ingredient → on-hand amount) against `servings` of `dish`.
///
/// Requirements are checked in ingredient-name order and the first problem is
/// returned: an ingredient missing from inventory, or one with less on hand
/// than required.
pub fn plan_fulfillment(
    dish: &MenuItem,
    servings: u32,
    stock: &BTreeMap<String, Quantity>,
) -> DomainResult<FulfillmentPlan> {
    if servings == 0 {
        return Err(DomainError::validation("servings must be at least 1"));
    }

    let required = dish.ingredients.scaled(f64::from(servings));
    let mut remaining = BTreeMap::new();

    for (ingredient, need) in &required {
        let available = *stock
            .get(ingredient)
            .ok_or_else(|| DomainError::ingredient_not_found(ingredient.clone()))?;
        if !covers(available, *need) {
            return Err(DomainError::insufficient_stock(ingredient.clone(), *need, available));
        }
        remaining.insert(ingredient.clone(), settle(available - need).max(0.0));
    }

    Ok(FulfillmentPlan {
        dish_name: dish.dish_name.clone(),
        servings,
        consumed: required,
        remaining,
    })
}
