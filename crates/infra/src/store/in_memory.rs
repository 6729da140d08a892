use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, NaiveDate, Utc};
use tracing::instrument;

use larder_core::{DomainError, Quantity};
use larder_inventory::{InventoryItem, Restock, RestockOutcome, plan_replenishment};
use larder_menu::MenuItem;
use larder_sales::{DateRange, FulfillmentReceipt, HolidayCalendar, Prediction, SalesRecord, plan_fulfillment};

use super::r#trait::{RestaurantStore, StoreError};

#[derive(Debug, Default)]
struct Tables {
    menu: BTreeMap<String, MenuItem>,
    inventory: BTreeMap<String, InventoryItem>,
    sales: BTreeMap<(NaiveDate, String), SalesRecord>,
    predictions: BTreeMap<(NaiveDate, String), Prediction>,
}

/// In-memory store for tests and local runs without a database.
///
/// Every operation takes one lock over all tables.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_menu(self, items: impl IntoIterator<Item = MenuItem>) -> Self {
        if let Ok(mut t) = self.tables.write() {
            t.menu.extend(items.into_iter().map(|m| (m.dish_name.clone(), m)));
        }
        self
    }

    pub fn with_inventory(self, items: impl IntoIterator<Item = InventoryItem>) -> Self {
        if let Ok(mut t) = self.tables.write() {
            t.inventory.extend(items.into_iter().map(|i| (i.ingredient.clone(), i)));
        }
        self
    }

    pub fn with_sales(self, records: impl IntoIterator<Item = SalesRecord>) -> Self {
        if let Ok(mut t) = self.tables.write() {
            t.sales
                .extend(records.into_iter().map(|r| ((r.date, r.dish_name.clone()), r)));
        }
        self
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Tables>, StoreError> {
        self.tables
            .read()
            .map_err(|_| StoreError::Database("lock poisoned".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Tables>, StoreError> {
        self.tables
            .write()
            .map_err(|_| StoreError::Database("lock poisoned".to_string()))
    }
}

#[async_trait::async_trait]
impl RestaurantStore for InMemoryStore {
    async fn list_menu(&self) -> Result<Vec<MenuItem>, StoreError> {
        Ok(self.read()?.menu.values().cloned().collect())
    }

    async fn list_inventory(&self) -> Result<Vec<InventoryItem>, StoreError> {
        Ok(self.read()?.inventory.values().cloned().collect())
    }

    #[instrument(skip(self, holidays), err)]
    async fn fulfill_order(
        &self,
        dish_name: &str,
        servings: u32,
        today: NaiveDate,
        holidays: &HolidayCalendar,
    ) -> Result<FulfillmentReceipt, StoreError> {
        let mut t = self.write()?;

        let dish = t
            .menu
            .get(dish_name)
            .ok_or_else(|| DomainError::dish_not_found(dish_name))?;
        let stock: BTreeMap<String, Quantity> = t
            .inventory
            .iter()
            .map(|(name, item)| (name.clone(), item.quantity))
            .collect();
        let plan = plan_fulfillment(dish, servings, &stock)?;

        let now = Utc::now();
        for (ingredient, left) in &plan.remaining {
            if let Some(item) = t.inventory.get_mut(ingredient) {
                item.quantity = *left;
                item.last_updated = now;
            }
        }

        let servings = i64::from(servings);
        let record = t
            .sales
            .entry((today, plan.dish_name.clone()))
            .and_modify(|r| r.absorb(servings))
            .or_insert_with(|| SalesRecord::first_sale(today, plan.dish_name.clone(), servings, holidays));
        let sales_today = record.sales;

        Ok(plan.receipt(sales_today))
    }

    #[instrument(skip(self, counts), fields(labels = counts.len()), err)]
    async fn replenish(
        &self,
        counts: &BTreeMap<String, u32>,
        now: DateTime<Utc>,
    ) -> Result<Vec<RestockOutcome>, StoreError> {
        let mut t = self.write()?;

        let writes = plan_replenishment(
            counts,
            t.inventory.values().map(|i| (i.ingredient.as_str(), i.quantity)),
            now,
        )?;

        let mut outcomes = Vec::with_capacity(writes.len());
        for write in writes {
            outcomes.push(write.outcome());
            match write {
                Restock::Increment { ingredient, by, .. } => {
                    if let Some(item) = t.inventory.get_mut(&ingredient) {
                        item.adjust(by, now)?;
                    }
                }
                Restock::Insert { item, .. } => {
                    t.inventory.insert(item.ingredient.clone(), item);
                }
            }
        }
        Ok(outcomes)
    }

    async fn sales_in(&self, range: DateRange) -> Result<Vec<SalesRecord>, StoreError> {
        Ok(self
            .read()?
            .sales
            .values()
            .filter(|r| range.contains(r.date))
            .cloned()
            .collect())
    }

    async fn predictions(&self) -> Result<Vec<Prediction>, StoreError> {
        Ok(self.read()?.predictions.values().cloned().collect())
    }

    async fn predictions_for(&self, date: NaiveDate) -> Result<Vec<Prediction>, StoreError> {
        Ok(self
            .read()?
            .predictions
            .values()
            .filter(|p| p.date == date)
            .cloned()
            .collect())
    }

    #[instrument(skip(self, predictions), fields(count = predictions.len()), err)]
    async fn upsert_predictions(&self, predictions: &[Prediction]) -> Result<(), StoreError> {
        let mut t = self.write()?;
        for p in predictions {
            t.predictions.insert((p.date, p.dish_name.clone()), p.clone());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use larder_inventory::RestockAction;
    use larder_menu::Recipe;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, d).unwrap()
    }

    fn dish(name: &str, recipe: &str) -> MenuItem {
        MenuItem {
            dish_name: name.to_string(),
            price: 12.0,
            ingredients: Recipe::parse(name, recipe).unwrap(),
            category: "Main".to_string(),
            vegetarian: false,
            img_link: None,
        }
    }

    fn stock(name: &str, quantity: f64) -> InventoryItem {
        InventoryItem {
            ingredient: name.to_string(),
            quantity,
            remaining_life: 5,
            quality: "Good".to_string(),
            category: "Vegetable".to_string(),
            price: 2.0,
            last_updated: DateTime::<Utc>::UNIX_EPOCH,
        }
    }

    fn kitchen() -> InMemoryStore {
        InMemoryStore::new()
            .with_menu([dish("Bruschetta", r#"{"tomato": 2, "bread": 1}"#)])
            .with_inventory([stock("tomato", 10.0), stock("bread", 4.0), stock("basil", 3.0)])
    }

    async fn quantities(store: &InMemoryStore) -> BTreeMap<String, f64> {
        store
            .list_inventory()
            .await
            .unwrap()
            .into_iter()
            .map(|i| (i.ingredient, i.quantity))
            .collect()
    }

    #[tokio::test]
    async fn fulfillment_decrements_exactly_and_records_sale() {
        let store = kitchen();
        let receipt = store
            .fulfill_order("Bruschetta", 3, day(16), &HolidayCalendar::default())
            .await
            .unwrap();
        assert_eq!(receipt.sales_today, 3);
        assert_eq!(receipt.consumed["tomato"], 6.0);

        let q = quantities(&store).await;
        assert_eq!(q["tomato"], 4.0);
        assert_eq!(q["bread"], 1.0);
        assert_eq!(q["basil"], 3.0);
    }

    #[tokio::test]
    async fn same_day_sales_collapse_into_one_row() {
        let store = kitchen();
        let holidays = HolidayCalendar::new([day(16)]);
        store.fulfill_order("Bruschetta", 1, day(16), &holidays).await.unwrap();
        let second = store.fulfill_order("Bruschetta", 2, day(16), &holidays).await.unwrap();
        assert_eq!(second.sales_today, 3);

        let rows = store.sales_in(DateRange { from: None, until: None }).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].sales, 3);
        assert!(rows[0].is_holiday);
        assert_eq!(rows[0].day, 5);
    }

    #[tokio::test]
    async fn shortfall_leaves_everything_untouched() {
        let store = kitchen();
        let err = store
            .fulfill_order("Bruschetta", 5, day(16), &HolidayCalendar::default())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            StoreError::Domain(DomainError::InsufficientStock { ref ingredient, .. }) if ingredient == "bread"
        ));

        let q = quantities(&store).await;
        assert_eq!(q["tomato"], 10.0);
        assert_eq!(q["bread"], 4.0);
        assert!(store.sales_in(DateRange { from: None, until: None }).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn unknown_dish_is_not_found() {
        let err = kitchen()
            .fulfill_order("Pizza", 1, day(16), &HolidayCalendar::default())
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Domain(DomainError::NotFound { kind: "dish", .. })));
    }

    #[tokio::test]
    async fn replenish_updates_matched_row_and_inserts_unseen_label() {
        let store = kitchen();
        let now = Utc::now();
        let counts = BTreeMap::from([("Tomato".to_string(), 2), ("corn".to_string(), 3)]);
        let outcomes = store.replenish(&counts, now).await.unwrap();

        assert_eq!(outcomes[0].ingredient, "tomato");
        assert_eq!(outcomes[0].action, RestockAction::Updated);
        assert_eq!(outcomes[1].action, RestockAction::Inserted);

        let inventory = store.list_inventory().await.unwrap();
        assert_eq!(inventory.len(), 4);
        let corn = inventory.iter().find(|i| i.ingredient == "corn").unwrap();
        assert_eq!(corn.quantity, 3.0);
        assert_eq!(corn.remaining_life, 7);
        assert_eq!(corn.quality, "Fresh");
        assert_eq!(corn.category, "Unknown");
        assert_eq!(corn.price, 10.0);
        let tomato = inventory.iter().find(|i| i.ingredient == "tomato").unwrap();
        assert_eq!(tomato.quantity, 12.0);
        assert_eq!(tomato.last_updated, now);
    }

    #[tokio::test]
    async fn prediction_upsert_overwrites() {
        let store = InMemoryStore::new();
        store
            .upsert_predictions(&[Prediction::new(day(17), "Bruschetta", 4.0)])
            .await
            .unwrap();
        store
            .upsert_predictions(&[
                Prediction::new(day(17), "Bruschetta", 6.5),
                Prediction::new(day(18), "Bruschetta", 2.0),
            ])
            .await
            .unwrap();

        let all = store.predictions().await.unwrap();
        assert_eq!(all.len(), 2);
        let tomorrow = store.predictions_for(day(17)).await.unwrap();
        assert_eq!(tomorrow, vec![Prediction::new(day(17), "Bruschetta", 6.5)]);
    }

    #[tokio::test]
    async fn sales_range_filters_by_date() {
        let store = kitchen();
        let none = HolidayCalendar::default();
        store.fulfill_order("Bruschetta", 1, day(1), &none).await.unwrap();
        store.fulfill_order("Bruschetta", 1, day(10), &none).await.unwrap();

        let recent = store
            .sales_in(DateRange { from: Some(day(9)), until: None })
            .await
            .unwrap();
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].date, day(10));
    }
}
