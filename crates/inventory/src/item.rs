use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use larder_core::{DomainResult, IngredientKey, Quantity, ensure_quantity};

/// One stocked ingredient.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryItem {
    pub ingredient: String,
    pub quantity: Quantity,
    /// Days of shelf life left.
    pub remaining_life: i32,
    pub quality: String,
    pub category: String,
    pub price: f64,
    pub last_updated: DateTime<Utc>,
}

impl InventoryItem {
    pub fn key(&self) -> IngredientKey {
        IngredientKey::from_label(&self.ingredient)
    }

    /// Add `delta` (may be negative) keeping the quantity valid.
    pub fn adjust(&mut self, delta: Quantity, at: DateTime<Utc>) -> DomainResult<()> {
        self.quantity = ensure_quantity(self.quantity + delta, &format!("stock of '{}'", self.ingredient))?;
        self.last_updated = at;
        Ok(())
    }

    pub fn view(&self, now: DateTime<Utc>) -> InventoryView {
        InventoryView {
            item: self.clone(),
            time_since_last_update: humanize_elapsed((now - self.last_updated).num_seconds()),
        }
    }
}

/// Inventory row as listed to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryView {
    #[serde(flatten)]
    pub item: InventoryItem,
    pub time_since_last_update: String,
}

/// "N seconds/minutes/hours/days ago", truncating to the largest whole unit.
pub fn humanize_elapsed(seconds: i64) -> String {
    let seconds = seconds.max(0);
    if seconds < 60 {
        format!("{seconds} seconds ago")
    } else if seconds < 3_600 {
        format!("{} minutes ago", seconds / 60)
    } else if seconds < 86_400 {
        format!("{} hours ago", seconds / 3_600)
    } else {
        format!("{} days ago", seconds / 86_400)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn tomato(qty: Quantity) -> InventoryItem {
        InventoryItem {
            ingredient: "Tomato".to_string(),
            quantity: qty,
            remaining_life: 5,
            quality: "Fresh".to_string(),
            category: "Vegetable".to_string(),
            price: 2.0,
            last_updated: Utc::now(),
        }
    }

    #[test]
    fn humanize_boundaries() {
        assert_eq!(humanize_elapsed(0), "0 seconds ago");
        assert_eq!(humanize_elapsed(59), "59 seconds ago");
        assert_eq!(humanize_elapsed(60), "1 minutes ago");
        assert_eq!(humanize_elapsed(3_599), "59 minutes ago");
        assert_eq!(humanize_elapsed(3_600), "1 hours ago");
        assert_eq!(humanize_elapsed(86_399), "23 hours ago");
        assert_eq!(humanize_elapsed(86_400), "1 days ago");
        assert_eq!(humanize_elapsed(-5), "0 seconds ago");
    }

    #[test]
    fn adjust_cannot_go_negative() {
        let mut item = tomato(3.0);
        let before = item.last_updated;
        assert!(item.adjust(-4.0, before + Duration::seconds(1)).is_err());
        assert_eq!(item.quantity, 3.0);
        assert_eq!(item.last_updated, before);

        item.adjust(-3.0, before + Duration::seconds(1)).unwrap();
        assert_eq!(item.quantity, 0.0);
        assert!(item.last_updated > before);
    }

    #[test]
    fn view_reports_age() {
        let item = tomato(1.0);
        let view = item.view(item.last_updated + Duration::hours(5));
        assert_eq!(view.time_since_last_update, "5 hours ago");
        assert_eq!(view.item.key().as_str(), "tomato");
    }
}
