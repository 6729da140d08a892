use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use larder_core::{QUANTITY_EPSILON, Quantity, covers};
use larder_menu::Recipe;
use larder_sales::Prediction;

/// Availability of one needed ingredient.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum StockStatus {
    /// Nothing on hand; buy the full requirement.
    ToBuy { required: Quantity },
    /// Some on hand, less than required.
    Insufficient { available: Quantity, required: Quantity },
    /// Enough on hand.
    Sufficient { available: Quantity },
}

/// Bucket an ingredient by comparing what is required with what is on hand.
pub fn classify(required: Quantity, available: Quantity) -> StockStatus {
    if available < QUANTITY_EPSILON {
        StockStatus::ToBuy { required }
    } else if !covers(available, required) {
        StockStatus::Insufficient { available, required }
    } else {
        StockStatus::Sufficient { available }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DishForecast {
    pub dish: String,
    pub predicted_sales: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Shortfall {
    pub available: Quantity,
    pub required: Quantity,
}

/// Projected ingredient needs for one day.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProcurementPlan {
    pub date: Option<NaiveDate>,
    pub predicted_sales: Vec<DishForecast>,
    pub total_ingredients_needed: BTreeMap<String, Quantity>,
    pub ingredients_to_buy: BTreeMap<String, Quantity>,
    pub insufficient_ingredients: BTreeMap<String, Shortfall>,
    pub sufficient_ingredients: BTreeMap<String, Quantity>,
    /// Forecast dishes with no menu entry; they contribute no requirements.
    pub skipped_dishes: Vec<String>,
}

impl ProcurementPlan {
    fn place(&mut self, ingredient: String, status: StockStatus) {
        match status {
            StockStatus::ToBuy { required } => {
                self.ingredients_to_buy.insert(ingredient, required);
            }
            StockStatus::Insufficient { available, required } => {
                self.insufficient_ingredients
                    .insert(ingredient, Shortfall { available, required });
            }
            StockStatus::Sufficient { available } => {
                self.sufficient_ingredients.insert(ingredient, available);
            }
        }
    }
}

/// Project needs for `date` from its predictions.
///
/// `recipes` maps dish name to per-serving requirements; `stock` maps
/// ingredient to on-hand amount (absent means zero). Predictions for other
/// dates are ignored.
pub fn project_procurement(
    date: NaiveDate,
    predictions: &[Prediction],
    recipes: &BTreeMap<String, Recipe>,
    stock: &BTreeMap<String, Quantity>,
) -> ProcurementPlan {
    let mut plan = ProcurementPlan {
        date: Some(date),
        ..Default::default()
    };

    for prediction in predictions.iter().filter(|p| p.date == date) {
        let sales = prediction.rounded_sales();
        plan.predicted_sales.push(DishForecast {
            dish: prediction.dish_name.clone(),
            predicted_sales: sales,
        });

        let Some(recipe) = recipes.get(&prediction.dish_name) else {
            plan.skipped_dishes.push(prediction.dish_name.clone());
            continue;
        };
        for (ingredient, per_serving) in recipe.iter() {
            *plan
                .total_ingredients_needed
                .entry(ingredient.to_string())
                .or_insert(0.0) += per_serving * sales as f64;
        }
    }

    let needed: Vec<(String, Quantity)> = plan
        .total_ingredients_needed
        .iter()
        .map(|(k, v)| (k.clone(), *v))
        .collect();
    for (ingredient, required) in needed {
        let available = stock.get(&ingredient).copied().unwrap_or(0.0);
        plan.place(ingredient, classify(required, available));
    }

    plan
}
