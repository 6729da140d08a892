use std::sync::Arc;

use anyhow::Context;
use chrono::{Local, NaiveDate};
use tracing::info;

use larder_infra::external::HttpDetector;
use larder_infra::{Config, InMemoryStore, PostgresStore, Reconciler, RestaurantStore, db};

/// Everything handlers need, shared behind an `Arc`.
pub struct AppServices {
    pub reconciler: Arc<Reconciler>,
}

impl AppServices {
    pub fn new(reconciler: Reconciler) -> Self {
        Self {
            reconciler: Arc::new(reconciler),
        }
    }

    pub fn store(&self) -> &Arc<dyn RestaurantStore> {
        self.reconciler.store()
    }

    /// Server-local calendar date.
    pub fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// Wire the store, detector and reconciler described by `config`.
pub async fn build_services(config: &Config) -> anyhow::Result<AppServices> {
    let store: Arc<dyn RestaurantStore> = match &config.database_url {
        Some(url) => {
            let pool = db::connect(url, config.database_max_connections)
                .await
                .context("failed to connect to postgres")?;
            db::ensure_schema(&pool).await.context("failed to create schema")?;
            Arc::new(PostgresStore::new(pool))
        }
        None => Arc::new(InMemoryStore::new()),
    };

    let mut reconciler = Reconciler::new(store)
        .with_holidays(config.holidays.clone())
        .with_horizon_days(config.forecast_horizon_days)
        .with_min_confidence(config.detector_min_confidence)
        .with_upload_dir(&config.upload_dir)
        .with_annotated_image_path(&config.annotated_image_path);

    if let Some(url) = &config.detector_url {
        let detector = HttpDetector::new(url.clone(), config.detector_timeout)?;
        info!(url = %detector.url(), "ingredient detector configured");
        reconciler = reconciler.with_detector(Arc::new(detector));
    }

    Ok(AppServices::new(reconciler))
}
