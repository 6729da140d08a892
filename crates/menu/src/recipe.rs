//! Per-serving ingredient requirements of a dish.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use larder_core::{DomainError, DomainResult, Quantity, ensure_quantity};

/// Ingredient → quantity needed for one serving.
///
/// Stored as JSON object text (`{"tomato": 2, "cheese": 0.5}`) and decoded
/// through serde, never evaluated. Iteration order is ingredient-name order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Recipe(BTreeMap<String, Quantity>);

impl Recipe {
    pub fn new(requirements: BTreeMap<String, Quantity>) -> DomainResult<Self> {
        for (ingredient, qty) in &requirements {
            if ingredient.trim().is_empty() {
                return Err(DomainError::validation("ingredient name cannot be empty"));
            }
            ensure_quantity(*qty, &format!("quantity of '{ingredient}'"))?;
        }
        Ok(Self(requirements))
    }

    /// Decode the stored ingredient text of `dish`.
    pub fn parse(dish: &str, raw: &str) -> DomainResult<Self> {
        let map: BTreeMap<String, Quantity> = serde_json::from_str(raw).map_err(|e| {
            DomainError::validation(format!("ingredients of '{dish}' are not a JSON object of quantities: {e}"))
        })?;
        Self::new(map)
    }

    pub fn get(&self, ingredient: &str) -> Option<Quantity> {
        self.0.get(ingredient).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Quantity)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn ingredient_names(&self) -> Vec<String> {
        self.0.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Requirements for `servings` servings.
    pub fn scaled(&self, servings: f64) -> BTreeMap<String, Quantity> {
        self.0
            .iter()
            .map(|(k, v)| (k.clone(), v * servings))
            .collect()
    }
}

impl FromIterator<(String, Quantity)> for Recipe {
    /// Unvalidated construction, for literals in tests and seed data.
    fn from_iter<T: IntoIterator<Item = (String, Quantity)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}
