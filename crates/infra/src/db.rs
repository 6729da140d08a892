//! Postgres connection pool and schema bootstrap.

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tracing::info;

use crate::store::{StoreError, map_sqlx_error};

/// Tables used by [`crate::store::PostgresStore`].
///
/// The unique constraints back the insert-or-increment of daily sales and
/// the overwrite of predictions.
pub const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS menu (
    dish_name   TEXT PRIMARY KEY,
    price       DOUBLE PRECISION NOT NULL,
    ingredients TEXT NOT NULL,
    category    TEXT NOT NULL DEFAULT '',
    vegetarian  BOOLEAN NOT NULL DEFAULT FALSE,
    img_link    TEXT
);

CREATE TABLE IF NOT EXISTS inventory (
    ingredient     TEXT PRIMARY KEY,
    quantity       DOUBLE PRECISION NOT NULL CHECK (quantity >= 0),
    remaining_life INTEGER NOT NULL,
    quality        TEXT NOT NULL,
    category       TEXT NOT NULL,
    price          DOUBLE PRECISION NOT NULL,
    last_updated   TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE TABLE IF NOT EXISTS sales_data (
    id         BIGSERIAL PRIMARY KEY,
    date       DATE NOT NULL,
    dish_name  TEXT NOT NULL,
    sales      BIGINT NOT NULL,
    day        INTEGER NOT NULL,
    month      INTEGER NOT NULL,
    is_weekend BOOLEAN NOT NULL,
    is_holiday BOOLEAN NOT NULL,
    UNIQUE (date, dish_name)
);

CREATE TABLE IF NOT EXISTS sales_predictions (
    date            DATE NOT NULL,
    dish_name       TEXT NOT NULL,
    predicted_sales DOUBLE PRECISION NOT NULL,
    PRIMARY KEY (date, dish_name)
);
"#;

/// Open a pool against `url`.
pub async fn connect(url: &str, max_connections: u32) -> Result<PgPool, StoreError> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(url)
        .await
        .map_err(|e| map_sqlx_error("connect", e))?;
    info!(max_connections, "connected to postgres");
    Ok(pool)
}

/// Create missing tables. Idempotent.
pub async fn ensure_schema(pool: &PgPool) -> Result<(), StoreError> {
    sqlx::raw_sql(SCHEMA)
        .execute(pool)
        .await
        .map_err(|e| map_sqlx_error("ensure_schema", e))?;
    Ok(())
}
