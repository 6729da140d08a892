//! Detection-driven restocking.
//!
//! Detected labels are matched case-insensitively against stocked ingredients.
//! A match adds the detected count to that row; an unseen label becomes a new
//! row with default attributes.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use larder_core::{DomainError, DomainResult, IngredientKey, Quantity};

use crate::item::InventoryItem;

pub const DEFAULT_REMAINING_LIFE: i32 = 7;
pub const DEFAULT_QUALITY: &str = "Fresh";
pub const DEFAULT_CATEGORY: &str = "Unknown";
pub const DEFAULT_PRICE: f64 = 10.0;

/// A single write produced by [`plan_replenishment`], applied in order.
#[derive(Debug, Clone, PartialEq)]
pub enum Restock {
    /// Add `by` to the existing row named `ingredient`.
    Increment {
        label: String,
        ingredient: String,
        by: Quantity,
        resulting: Quantity,
    },
    /// Insert a new row.
    Insert { label: String, item: InventoryItem },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RestockAction {
    Updated,
    Inserted,
}

/// What happened to one detected label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RestockOutcome {
    pub label: String,
    pub ingredient: String,
    pub action: RestockAction,
    pub quantity: Quantity,
}

impl Restock {
    pub fn outcome(&self) -> RestockOutcome {
        match self {
            Restock::Increment {
                label,
                ingredient,
                resulting,
                ..
            } => RestockOutcome {
                label: label.clone(),
                ingredient: ingredient.clone(),
                action: RestockAction::Updated,
                quantity: *resulting,
            },
            Restock::Insert { label, item } => RestockOutcome {
                label: label.clone(),
                ingredient: item.ingredient.clone(),
                action: RestockAction::Inserted,
                quantity: item.quantity,
            },
        }
    }
}

/// Plan the writes for a batch of detected `label -> count` pairs.
///
/// `stock` is the current inventory as `(ingredient, quantity)` pairs. Labels
/// are processed in label order; two labels normalizing to the same key end up
/// in one row.
pub fn plan_replenishment<'a>(
    counts: &BTreeMap<String, u32>,
    stock: impl IntoIterator<Item = (&'a str, Quantity)>,
    now: DateTime<Utc>,
) -> DomainResult<Vec<Restock>> {
    let mut known: HashMap<IngredientKey, (String, Quantity)> = HashMap::new();
    for (ingredient, qty) in stock {
        // First row wins when the table already holds case-variant duplicates.
        known
            .entry(IngredientKey::from_label(ingredient))
            .or_insert_with(|| (ingredient.to_string(), qty));
    }

    let mut writes = Vec::with_capacity(counts.len());
    for (label, &count) in counts {
        let key = IngredientKey::from_label(label);
        if key.is_empty() {
            return Err(DomainError::validation("detected label cannot be empty"));
        }
        let count = Quantity::from(count);

        match known.get_mut(&key) {
            Some((ingredient, qty)) => {
                *qty += count;
                writes.push(Restock::Increment {
                    label: label.clone(),
                    ingredient: ingredient.clone(),
                    by: count,
                    resulting: *qty,
                });
            }
            None => {
                let ingredient = label.trim().to_string();
                known.insert(key, (ingredient.clone(), count));
                writes.push(Restock::Insert {
                    label: label.clone(),
                    item: InventoryItem {
                        ingredient,
                        quantity: count,
                        remaining_life: DEFAULT_REMAINING_LIFE,
                        quality: DEFAULT_QUALITY.to_string(),
                        category: DEFAULT_CATEGORY.to_string(),
                        price: DEFAULT_PRICE,
                        last_updated: now,
                    },
                });
            }
        }
    }

    Ok(writes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const NO_STOCK: [(&str, Quantity); 0] = [];

    fn counts(pairs: &[(&str, u32)]) -> BTreeMap<String, u32> {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn unseen_label_inserts_defaults() {
        let now = Utc::now();
        let writes = plan_replenishment(&counts(&[("corn", 3)]), [("tomato", 5.0)], now).unwrap();
        assert_eq!(writes.len(), 1);
        match &writes[0] {
            Restock::Insert { item, .. } => {
                assert_eq!(item.ingredient, "corn");
                assert_eq!(item.quantity, 3.0);
                assert_eq!(item.remaining_life, DEFAULT_REMAINING_LIFE);
                assert_eq!(item.quality, "Fresh");
                assert_eq!(item.category, "Unknown");
                assert_eq!(item.price, DEFAULT_PRICE);
                assert_eq!(item.last_updated, now);
            }
            other => panic!("expected insert, got {other:?}"),
        }
    }

    #[test]
    fn known_label_matches_case_insensitively() {
        let writes = plan_replenishment(&counts(&[("TOMATO", 2)]), [("Tomato", 5.0)], Utc::now()).unwrap();
        assert_eq!(
            writes,
            vec![Restock::Increment {
                label: "TOMATO".to_string(),
                ingredient: "Tomato".to_string(),
                by: 2.0,
                resulting: 7.0,
            }]
        );
        assert_eq!(writes[0].outcome().action, RestockAction::Updated);
    }

    #[test]
    fn spellings_of_one_ingredient_share_a_row() {
        let writes = plan_replenishment(&counts(&[("Onion", 1), ("onion", 2)]), NO_STOCK, Utc::now()).unwrap();
        assert_eq!(writes.len(), 2);
        assert!(matches!(&writes[0], Restock::Insert { item, .. } if item.ingredient == "Onion"));
        assert_eq!(writes[1].outcome().ingredient, "Onion");
        assert_eq!(writes[1].outcome().quantity, 3.0);
    }

    #[test]
    fn blank_label_is_rejected() {
        assert!(plan_replenishment(&counts(&[("  ", 1)]), NO_STOCK, Utc::now()).is_err());
    }

    proptest! {
        #[test]
        fn every_detected_unit_lands_in_inventory(
            labels in proptest::collection::btree_map("[a-cA-C]{1,3}", 1u32..20, 0..8),
            on_hand in 0.0f64..100.0,
        ) {
            let writes = plan_replenishment(&labels, [("abc", on_hand)], Utc::now()).unwrap();
            prop_assert_eq!(writes.len(), labels.len());

            let added: f64 = writes
                .iter()
                .map(|w| match w {
                    Restock::Increment { by, .. } => *by,
                    Restock::Insert { item, .. } => item.quantity,
                })
                .sum();
            let expected: f64 = labels.values().map(|c| f64::from(*c)).sum();
            prop_assert!((added - expected).abs() < 1e-9);
        }
    }
}
