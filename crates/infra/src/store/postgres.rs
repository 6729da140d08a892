//! Postgres-backed restaurant store.
//!
//! ## Error mapping
//!
//! | SQLx error | Postgres code | `StoreError` |
//! |------------|---------------|--------------|
//! | Database (unique violation) | `23505` | `Domain(Conflict)` |
//! | Database (check violation) | `23514` | `Domain(Validation)` |
//! | Database (other) | any | `Database` |
//! | PoolClosed / other | n/a | `Database` |
//!
//! Multi-statement operations run in one transaction. Fulfillment and
//! replenishment lock the inventory rows they read (`FOR UPDATE`) so two
//! concurrent orders cannot both pass the stock check.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use tracing::instrument;

use larder_core::{DomainError, Quantity};
use larder_inventory::{InventoryItem, Restock, RestockOutcome, plan_replenishment};
use larder_menu::{MenuItem, Recipe};
use larder_sales::{DateRange, FulfillmentReceipt, HolidayCalendar, Prediction, SalesRecord, plan_fulfillment};

use super::r#trait::{RestaurantStore, StoreError};

#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: Arc<PgPool>,
}

impl PostgresStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool: Arc::new(pool) }
    }
}

#[async_trait::async_trait]
impl RestaurantStore for PostgresStore {
    #[instrument(skip(self), err)]
    async fn list_menu(&self) -> Result<Vec<MenuItem>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT dish_name, price, ingredients, category, vegetarian, img_link
            FROM menu
            ORDER BY dish_name
            "#,
        )
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_menu", e))?;

        rows.iter().map(menu_from_row).collect()
    }

    #[instrument(skip(self), err)]
    async fn list_inventory(&self) -> Result<Vec<InventoryItem>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT ingredient, quantity, remaining_life, quality, category, price, last_updated
            FROM inventory
            ORDER BY ingredient
            "#,
        )
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_inventory", e))?;

        rows.iter().map(inventory_from_row).collect()
    }

    #[instrument(skip(self, holidays), err)]
    async fn fulfill_order(
        &self,
        dish_name: &str,
        servings: u32,
        today: NaiveDate,
        holidays: &HolidayCalendar,
    ) -> Result<FulfillmentReceipt, StoreError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("fulfill_order.begin", e))?;

        let row = sqlx::query(
            r#"
            SELECT dish_name, price, ingredients, category, vegetarian, img_link
            FROM menu
            WHERE dish_name = $1
            "#,
        )
        .bind(dish_name)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("fulfill_order.menu", e))?;
        let dish = match row {
            Some(row) => menu_from_row(&row)?,
            None => return Err(DomainError::dish_not_found(dish_name).into()),
        };

        let names = dish.ingredients.ingredient_names();
        let rows = sqlx::query(
            r#"
            SELECT ingredient, quantity
            FROM inventory
            WHERE ingredient = ANY($1)
            ORDER BY ingredient
            FOR UPDATE
            "#,
        )
        .bind(&names)
        .fetch_all(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("fulfill_order.lock_inventory", e))?;

        let mut stock = BTreeMap::new();
        for row in &rows {
            let ingredient: String = get(row, "ingredient")?;
            let quantity: f64 = get(row, "quantity")?;
            stock.insert(ingredient, quantity);
        }

        // Returning here drops `tx`, which rolls back.
        let plan = plan_fulfillment(&dish, servings, &stock)?;

        for (ingredient, left) in &plan.remaining {
            sqlx::query(
                r#"
                UPDATE inventory
                SET quantity = $1, last_updated = NOW()
                WHERE ingredient = $2
                "#,
            )
            .bind(left)
            .bind(ingredient)
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("fulfill_order.decrement", e))?;
        }

        let record = SalesRecord::first_sale(today, plan.dish_name.clone(), i64::from(servings), holidays);
        let sales_today: i64 = sqlx::query(
            r#"
            INSERT INTO sales_data (date, dish_name, sales, day, month, is_weekend, is_holiday)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (date, dish_name)
            DO UPDATE SET sales = sales_data.sales + EXCLUDED.sales
            RETURNING sales
            "#,
        )
        .bind(record.date)
        .bind(&record.dish_name)
        .bind(record.sales)
        .bind(record.day as i32)
        .bind(record.month as i32)
        .bind(record.is_weekend)
        .bind(record.is_holiday)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("fulfill_order.record_sale", e))
        .and_then(|row| get(&row, "sales"))?;

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("fulfill_order.commit", e))?;

        Ok(plan.receipt(sales_today))
    }

    #[instrument(skip(self, counts), fields(labels = counts.len()), err)]
    async fn replenish(
        &self,
        counts: &BTreeMap<String, u32>,
        now: DateTime<Utc>,
    ) -> Result<Vec<RestockOutcome>, StoreError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("replenish.begin", e))?;

        let rows = sqlx::query(
            r#"
            SELECT ingredient, quantity
            FROM inventory
            ORDER BY ingredient
            FOR UPDATE
            "#,
        )
        .fetch_all(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("replenish.lock_inventory", e))?;

        let mut stock: Vec<(String, Quantity)> = Vec::with_capacity(rows.len());
        for row in &rows {
            stock.push((get(row, "ingredient")?, get(row, "quantity")?));
        }

        let writes = plan_replenishment(counts, stock.iter().map(|(n, q)| (n.as_str(), *q)), now)?;

        let mut outcomes = Vec::with_capacity(writes.len());
        for write in &writes {
            match write {
                Restock::Increment { ingredient, by, .. } => {
                    sqlx::query(
                        r#"
                        UPDATE inventory
                        SET quantity = quantity + $1, last_updated = $2
                        WHERE ingredient = $3
                        "#,
                    )
                    .bind(by)
                    .bind(now)
                    .bind(ingredient)
                    .execute(&mut *tx)
                    .await
                    .map_err(|e| map_sqlx_error("replenish.increment", e))?;
                }
                Restock::Insert { item, .. } => {
                    sqlx::query(
                        r#"
                        INSERT INTO inventory
                            (ingredient, quantity, remaining_life, quality, category, price, last_updated)
                        VALUES ($1, $2, $3, $4, $5, $6, $7)
                        "#,
                    )
                    .bind(&item.ingredient)
                    .bind(item.quantity)
                    .bind(item.remaining_life)
                    .bind(&item.quality)
                    .bind(&item.category)
                    .bind(item.price)
                    .bind(item.last_updated)
                    .execute(&mut *tx)
                    .await
                    .map_err(|e| map_sqlx_error("replenish.insert", e))?;
                }
            }
            outcomes.push(write.outcome());
        }

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("replenish.commit", e))?;

        Ok(outcomes)
    }

    #[instrument(skip(self), err)]
    async fn sales_in(&self, range: DateRange) -> Result<Vec<SalesRecord>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT date, dish_name, sales, day, month, is_weekend, is_holiday
            FROM sales_data
            WHERE ($1::date IS NULL OR date >= $1)
                AND ($2::date IS NULL OR date < $2)
            ORDER BY date, dish_name
            "#,
        )
        .bind(range.from)
        .bind(range.until)
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("sales_in", e))?;

        rows.iter().map(sales_from_row).collect()
    }

    #[instrument(skip(self), err)]
    async fn predictions(&self) -> Result<Vec<Prediction>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT date, dish_name, predicted_sales
            FROM sales_predictions
            ORDER BY date, dish_name
            "#,
        )
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("predictions", e))?;

        rows.iter().map(prediction_from_row).collect()
    }

    #[instrument(skip(self), err)]
    async fn predictions_for(&self, date: NaiveDate) -> Result<Vec<Prediction>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT date, dish_name, predicted_sales
            FROM sales_predictions
            WHERE date = $1
            ORDER BY dish_name
            "#,
        )
        .bind(date)
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("predictions_for", e))?;

        rows.iter().map(prediction_from_row).collect()
    }

    #[instrument(skip(self, predictions), fields(count = predictions.len()), err)]
    async fn upsert_predictions(&self, predictions: &[Prediction]) -> Result<(), StoreError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("upsert_predictions.begin", e))?;

        for p in predictions {
            sqlx::query(
                r#"
                INSERT INTO sales_predictions (date, dish_name, predicted_sales)
                VALUES ($1, $2, $3)
                ON CONFLICT (date, dish_name)
                DO UPDATE SET predicted_sales = EXCLUDED.predicted_sales
                "#,
            )
            .bind(p.date)
            .bind(&p.dish_name)
            .bind(p.predicted_sales)
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("upsert_predictions", e))?;
        }

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("upsert_predictions.commit", e))
    }
}

fn get<'r, T>(row: &'r PgRow, column: &str) -> Result<T, StoreError>
where
    T: sqlx::Decode<'r, sqlx::Postgres> + sqlx::Type<sqlx::Postgres>,
{
    row.try_get(column)
        .map_err(|e| StoreError::Decode(format!("column {column}: {e}")))
}

fn menu_from_row(row: &PgRow) -> Result<MenuItem, StoreError> {
    let dish_name: String = get(row, "dish_name")?;
    let raw: String = get(row, "ingredients")?;
    let ingredients = Recipe::parse(&dish_name, &raw).map_err(|e| StoreError::Decode(e.to_string()))?;
    Ok(MenuItem {
        price: get(row, "price")?,
        category: get(row, "category")?,
        vegetarian: get(row, "vegetarian")?,
        img_link: get(row, "img_link")?,
        ingredients,
        dish_name,
    })
}

fn inventory_from_row(row: &PgRow) -> Result<InventoryItem, StoreError> {
    Ok(InventoryItem {
        ingredient: get(row, "ingredient")?,
        quantity: get(row, "quantity")?,
        remaining_life: get(row, "remaining_life")?,
        quality: get(row, "quality")?,
        category: get(row, "category")?,
        price: get(row, "price")?,
        last_updated: get(row, "last_updated")?,
    })
}

fn sales_from_row(row: &PgRow) -> Result<SalesRecord, StoreError> {
    let day: i32 = get(row, "day")?;
    let month: i32 = get(row, "month")?;
    Ok(SalesRecord {
        date: get(row, "date")?,
        dish_name: get(row, "dish_name")?,
        sales: get(row, "sales")?,
        day: u32::try_from(day).map_err(|e| StoreError::Decode(format!("column day: {e}")))?,
        month: u32::try_from(month).map_err(|e| StoreError::Decode(format!("column month: {e}")))?,
        is_weekend: get(row, "is_weekend")?,
        is_holiday: get(row, "is_holiday")?,
    })
}

fn prediction_from_row(row: &PgRow) -> Result<Prediction, StoreError> {
    Ok(Prediction {
        date: get(row, "date")?,
        dish_name: get(row, "dish_name")?,
        predicted_sales: get(row, "predicted_sales")?,
    })
}

/// Map a sqlx error to `StoreError`, tagging it with the failing operation.
pub(crate) fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            let msg = format!("database error in {}: {}", operation, db_err.message());
            match db_err.code().as_deref() {
                Some("23505") => StoreError::Domain(DomainError::conflict(msg)),
                Some("23514") => StoreError::Domain(DomainError::validation(msg)),
                _ => StoreError::Database(msg),
            }
        }
        sqlx::Error::PoolClosed => StoreError::Database(format!("connection pool closed in {}", operation)),
        _ => StoreError::Database(format!("sqlx error in {}: {}", operation, err)),
    }
}
