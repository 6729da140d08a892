//! Keeps inventory, the sales ledger and predictions consistent with what
//! happens in the kitchen: fulfilled orders, detected deliveries and the
//! demand forecast.

use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::Serialize;
use thiserror::Error;
use tracing::{info, instrument, warn};

use larder_ai::{
    AiError, AiJob, AiScheduler, DEFAULT_HORIZON_DAYS, DEFAULT_MIN_CONFIDENCE, DetectionJob, ForecastJob,
    IngredientDetector, LocalAiScheduler, SalesForecaster, SalesPoint, SeasonalTrendForecaster, partition_by_dish,
};
use larder_core::{DomainError, Quantity};
use larder_inventory::RestockOutcome;
use larder_menu::Recipe;
use larder_procurement::{ProcurementPlan, project_procurement};
use larder_sales::{FulfillmentReceipt, HolidayCalendar, Prediction, SalesWindow};

use crate::store::{RestaurantStore, StoreError};

#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Ai(#[from] AiError),

    #[error("io error: {0}")]
    Io(#[from] io::Error),

    #[error("ingredient detection is not configured")]
    DetectorUnavailable,
}

impl From<DomainError> for ReconcileError {
    fn from(e: DomainError) -> Self {
        Self::Store(StoreError::Domain(e))
    }
}

impl ReconcileError {
    /// The domain rule that rejected the request, if any.
    pub fn domain(&self) -> Option<&DomainError> {
        match self {
            Self::Store(StoreError::Domain(e)) => Some(e),
            _ => None,
        }
    }
}

/// Result of one detection upload.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetectionReport {
    pub filename: String,
    pub detected: BTreeMap<String, u32>,
    pub replenished: Vec<RestockOutcome>,
}

/// Result of one forecast refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ForecastRun {
    pub dishes: usize,
    pub points: usize,
}

pub struct Reconciler {
    store: Arc<dyn RestaurantStore>,
    scheduler: LocalAiScheduler,
    forecaster: Arc<dyn SalesForecaster>,
    detector: Option<Arc<dyn IngredientDetector>>,
    holidays: HolidayCalendar,
    horizon_days: u32,
    min_confidence: f32,
    upload_dir: PathBuf,
    annotated_image_path: PathBuf,
}

impl Reconciler {
    pub fn new(store: Arc<dyn RestaurantStore>) -> Self {
        Self {
            store,
            scheduler: LocalAiScheduler::new("reconciler"),
            forecaster: Arc::new(SeasonalTrendForecaster::new()),
            detector: None,
            holidays: HolidayCalendar::default(),
            horizon_days: DEFAULT_HORIZON_DAYS,
            min_confidence: DEFAULT_MIN_CONFIDENCE,
            upload_dir: PathBuf::from("uploads"),
            annotated_image_path: PathBuf::from("output.jpg"),
        }
    }

    pub fn with_forecaster(mut self, forecaster: Arc<dyn SalesForecaster>) -> Self {
        self.forecaster = forecaster;
        self
    }

    pub fn with_detector(mut self, detector: Arc<dyn IngredientDetector>) -> Self {
        self.detector = Some(detector);
        self
    }

    pub fn with_holidays(mut self, holidays: HolidayCalendar) -> Self {
        self.holidays = holidays;
        self
    }

    pub fn with_horizon_days(mut self, days: u32) -> Self {
        self.horizon_days = days;
        self
    }

    pub fn with_min_confidence(mut self, min_confidence: f32) -> Self {
        self.min_confidence = min_confidence;
        self
    }

    pub fn with_upload_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.upload_dir = dir.into();
        self
    }

    pub fn with_annotated_image_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.annotated_image_path = path.into();
        self
    }

    pub fn store(&self) -> &Arc<dyn RestaurantStore> {
        &self.store
    }

    pub fn has_detector(&self) -> bool {
        self.detector.is_some()
    }

    /// Serve `servings` of `dish_name` on `today`.
    #[instrument(skip(self), err)]
    pub async fn fulfill_order(
        &self,
        dish_name: &str,
        servings: u32,
        today: NaiveDate,
    ) -> Result<FulfillmentReceipt, ReconcileError> {
        let receipt = self
            .store
            .fulfill_order(dish_name, servings, today, &self.holidays)
            .await?;
        info!(
            dish = %receipt.dish_name,
            servings = receipt.servings,
            sales_today = receipt.sales_today,
            "order fulfilled"
        );
        Ok(receipt)
    }

    /// What to buy for the day after `today`, given its predictions.
    #[instrument(skip(self), err)]
    pub async fn procurement(&self, today: NaiveDate) -> Result<ProcurementPlan, ReconcileError> {
        let tomorrow = today
            .checked_add_signed(Duration::days(1))
            .ok_or_else(|| DomainError::validation("date out of range"))?;

        let predictions = self.store.predictions_for(tomorrow).await?;
        let recipes: BTreeMap<String, Recipe> = self
            .store
            .list_menu()
            .await?
            .into_iter()
            .map(|m| (m.dish_name, m.ingredients))
            .collect();
        let stock: BTreeMap<String, Quantity> = self
            .store
            .list_inventory()
            .await?
            .into_iter()
            .map(|i| (i.ingredient, i.quantity))
            .collect();

        let plan = project_procurement(tomorrow, &predictions, &recipes, &stock);
        for dish in &plan.skipped_dishes {
            warn!(dish = %dish, date = %tomorrow, "forecast dish has no menu entry, skipped");
        }
        info!(
            date = %tomorrow,
            to_buy = plan.ingredients_to_buy.len(),
            insufficient = plan.insufficient_ingredients.len(),
            sufficient = plan.sufficient_ingredients.len(),
            "procurement projected"
        );
        Ok(plan)
    }

    /// Fit every dish's history before `today` and store its projection.
    ///
    /// Dishes run in name order. The first failure aborts the run; dishes
    /// already stored stay stored.
    #[instrument(skip(self), err)]
    pub async fn refresh_forecasts(&self, today: NaiveDate) -> Result<ForecastRun, ReconcileError> {
        let range = SalesWindow::Before(today).range(today)?;
        let history: Vec<SalesPoint> = self
            .store
            .sales_in(range)
            .await?
            .into_iter()
            .map(|r| SalesPoint {
                date: r.date,
                dish: r.dish_name,
                sales: r.sales as f64,
            })
            .collect();

        let mut run = ForecastRun { dishes: 0, points: 0 };
        for (dish, series) in partition_by_dish(&history) {
            let job = ForecastJob::new(self.forecaster.clone(), dish, series).with_horizon(self.horizon_days);
            let points = self.run_blocking(job).await?;
            let predictions: Vec<Prediction> = points
                .into_iter()
                .map(|p| Prediction::new(p.date, p.dish, p.value))
                .collect();
            self.store.upsert_predictions(&predictions).await?;
            run.dishes += 1;
            run.points += predictions.len();
        }

        info!(
            forecaster = self.forecaster.name(),
            dishes = run.dishes,
            points = run.points,
            "forecasts refreshed"
        );
        Ok(run)
    }

    /// Save an uploaded photo, detect ingredients on it and add them to inventory.
    ///
    /// The annotated image (or the upload itself when the detector renders none)
    /// overwrites the file at the annotated image path; concurrent uploads
    /// race on it and the last writer wins.
    #[instrument(skip(self, image), fields(bytes = image.len()), err)]
    pub async fn detect_and_replenish(
        &self,
        filename: &str,
        image: Vec<u8>,
        now: DateTime<Utc>,
    ) -> Result<DetectionReport, ReconcileError> {
        let detector = self.detector.clone().ok_or(ReconcileError::DetectorUnavailable)?;
        if image.is_empty() {
            return Err(DomainError::validation("uploaded file is empty").into());
        }

        let filename = sanitize_filename(filename);
        tokio::fs::create_dir_all(&self.upload_dir).await?;
        tokio::fs::write(self.upload_dir.join(&filename), &image).await?;

        let job = DetectionJob::new(detector, image.clone()).with_min_confidence(self.min_confidence);
        let summary = self.run_blocking(job).await?;

        let annotated = summary.annotated_image.unwrap_or(image);
        write_replacing(&self.annotated_image_path, &annotated).await?;

        let replenished = self.store.replenish(&summary.counts, now).await?;
        info!(
            filename = %filename,
            labels = summary.counts.len(),
            rows = replenished.len(),
            "detected ingredients added to inventory"
        );

        Ok(DetectionReport {
            filename,
            detected: summary.counts,
            replenished,
        })
    }

    /// Run a model job on the blocking pool.
    async fn run_blocking<J: AiJob>(&self, job: J) -> Result<J::Output, AiError> {
        let scheduler = self.scheduler.clone();
        let kind = job.kind();
        tokio::task::spawn_blocking(move || scheduler.run(job))
            .await
            .map_err(|e| AiError::Internal(format!("{kind} task failed: {e}")))?
    }

    /// Bytes of the last annotated image, if one was written.
    pub async fn annotated_image(&self) -> Result<Option<Vec<u8>>, ReconcileError> {
        match tokio::fs::read(&self.annotated_image_path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

/// Keep only the last path component of a client-supplied file name.
pub fn sanitize_filename(raw: &str) -> String {
    let name = raw.rsplit(['/', '\\']).next().unwrap_or("").trim();
    if name.is_empty() || name == "." || name == ".." {
        "upload".to_string()
    } else {
        name.to_string()
    }
}

async fn write_replacing(path: &Path, bytes: &[u8]) -> io::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(path, bytes).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use larder_ai::{DetectedObject, Detection};
    use larder_inventory::{InventoryItem, RestockAction};
    use larder_menu::MenuItem;
    use larder_sales::SalesRecord;

    use crate::store::InMemoryStore;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, d).unwrap()
    }

    fn dish(name: &str, recipe: &str) -> MenuItem {
        MenuItem {
            dish_name: name.to_string(),
            price: 8.0,
            ingredients: Recipe::parse(name, recipe).unwrap(),
            category: "Main".to_string(),
            vegetarian: true,
            img_link: None,
        }
    }

    fn stock(name: &str, quantity: f64) -> InventoryItem {
        InventoryItem {
            ingredient: name.to_string(),
            quantity,
            remaining_life: 3,
            quality: "Good".to_string(),
            category: "Vegetable".to_string(),
            price: 1.5,
            last_updated: Utc::now(),
        }
    }

    fn sale(d: NaiveDate, dish: &str, sales: i64) -> SalesRecord {
        SalesRecord::first_sale(d, dish, sales, &HolidayCalendar::default())
    }

    fn scratch_dir(test: &str) -> PathBuf {
        std::env::temp_dir().join(format!("larder-{}-{test}", std::process::id()))
    }

    struct Fixed;

    impl IngredientDetector for Fixed {
        fn detect(&self, _image: &[u8]) -> Result<Detection, AiError> {
            Ok(Detection {
                objects: vec![
                    DetectedObject { label: "Tomato".into(), confidence: 0.9 },
                    DetectedObject { label: "corn".into(), confidence: 0.8 },
                    DetectedObject { label: "corn".into(), confidence: 0.1 },
                ],
                annotated_image: None,
            })
        }
    }

    #[tokio::test]
    async fn procurement_uses_tomorrows_predictions() {
        let store = Arc::new(
            InMemoryStore::new()
                .with_menu([dish("Salad", r#"{"tomato": 2, "lettuce": 1}"#)])
                .with_inventory([stock("tomato", 4.0), stock("lettuce", 9.0)]),
        );
        store
            .upsert_predictions(&[
                Prediction::new(day(17), "Salad", 4.6),
                Prediction::new(day(17), "Soup", 3.0),
                Prediction::new(day(18), "Salad", 100.0),
            ])
            .await
            .unwrap();

        let plan = Reconciler::new(store).procurement(day(16)).await.unwrap();
        assert_eq!(plan.date, Some(day(17)));
        assert_eq!(plan.total_ingredients_needed["tomato"], 10.0);
        assert_eq!(plan.insufficient_ingredients["tomato"].available, 4.0);
        assert_eq!(plan.sufficient_ingredients["lettuce"], 9.0);
        assert_eq!(plan.skipped_dishes, vec!["Soup".to_string()]);
    }

    #[tokio::test]
    async fn forecast_refresh_stores_one_horizon_per_dish() {
        let history: Vec<SalesRecord> = (1..=14)
            .flat_map(|d| [sale(day(d), "Salad", 10 + i64::from(d)), sale(day(d), "Soup", 5)])
            .chain([sale(day(16), "Salad", 999)])
            .collect();
        let store = Arc::new(InMemoryStore::new().with_sales(history));

        let run = Reconciler::new(store.clone()).refresh_forecasts(day(16)).await.unwrap();
        assert_eq!(run, ForecastRun { dishes: 2, points: 20 });

        let salad = store.predictions_for(day(15)).await.unwrap();
        let first = salad.iter().find(|p| p.dish_name == "Salad").unwrap();
        assert!((first.predicted_sales - 25.0).abs() < 1e-6);
    }

    struct ThreadSpy {
        caller: std::thread::ThreadId,
        ran_elsewhere: std::sync::Mutex<Vec<bool>>,
    }

    impl SalesForecaster for ThreadSpy {
        fn name(&self) -> &'static str {
            "thread-spy"
        }

        fn forecast(&self, history: &[(NaiveDate, f64)], horizon: u32) -> Result<Vec<(NaiveDate, f64)>, AiError> {
            self.ran_elsewhere
                .lock()
                .unwrap()
                .push(std::thread::current().id() != self.caller);
            let (last, value) = history[history.len() - 1];
            Ok((1..=i64::from(horizon)).map(|d| (last + Duration::days(d), value)).collect())
        }
    }

    #[tokio::test]
    async fn forecast_fits_run_off_the_runtime_thread() {
        let history = vec![sale(day(1), "Salad", 3), sale(day(2), "Soup", 4)];
        let store = Arc::new(InMemoryStore::new().with_sales(history));
        let spy = Arc::new(ThreadSpy {
            caller: std::thread::current().id(),
            ran_elsewhere: std::sync::Mutex::new(Vec::new()),
        });

        let run = Reconciler::new(store)
            .with_forecaster(spy.clone())
            .with_horizon_days(2)
            .refresh_forecasts(day(16))
            .await
            .unwrap();

        assert_eq!(run, ForecastRun { dishes: 2, points: 4 });
        assert_eq!(*spy.ran_elsewhere.lock().unwrap(), vec![true, true]);
    }

    #[tokio::test]
    async fn forecast_failure_keeps_earlier_dishes() {
        let history = vec![
            sale(day(1), "Apple pie", 3),
            sale(day(2), "Apple pie", 4),
            sale(day(3), "Zucchini", 2),
        ];
        let store = Arc::new(InMemoryStore::new().with_sales(history));

        let err = Reconciler::new(store.clone()).refresh_forecasts(day(16)).await.unwrap_err();
        assert!(matches!(err, ReconcileError::Ai(AiError::InvalidInput(_))));

        let stored = store.predictions().await.unwrap();
        assert_eq!(stored.len(), 10);
        assert!(stored.iter().all(|p| p.dish_name == "Apple pie"));
    }

    #[tokio::test]
    async fn detection_replenishes_and_writes_images() {
        let dir = scratch_dir("detect");
        let store = Arc::new(InMemoryStore::new().with_inventory([stock("tomato", 1.0)]));
        let reconciler = Reconciler::new(store.clone())
            .with_detector(Arc::new(Fixed))
            .with_upload_dir(dir.join("uploads"))
            .with_annotated_image_path(dir.join("annotated.jpg"));

        let report = reconciler
            .detect_and_replenish("../../etc/fridge.jpg", vec![1, 2, 3], Utc::now())
            .await
            .unwrap();

        assert_eq!(report.filename, "fridge.jpg");
        assert_eq!(report.detected, BTreeMap::from([("Tomato".to_string(), 1), ("corn".to_string(), 1)]));
        assert_eq!(report.replenished[0].action, RestockAction::Updated);
        assert_eq!(report.replenished[0].ingredient, "tomato");
        assert_eq!(report.replenished[1].action, RestockAction::Inserted);

        assert!(dir.join("uploads").join("fridge.jpg").exists());
        assert_eq!(reconciler.annotated_image().await.unwrap(), Some(vec![1, 2, 3]));
        assert_eq!(store.list_inventory().await.unwrap().len(), 2);

        let _ = std::fs::remove_dir_all(dir);
    }

    #[tokio::test]
    async fn detection_without_detector_is_unavailable() {
        let reconciler = Reconciler::new(Arc::new(InMemoryStore::new()));
        let err = reconciler
            .detect_and_replenish("a.jpg", vec![1], Utc::now())
            .await
            .unwrap_err();
        assert!(matches!(err, ReconcileError::DetectorUnavailable));
    }

    #[tokio::test]
    async fn missing_annotated_image_is_none() {
        let reconciler = Reconciler::new(Arc::new(InMemoryStore::new()))
            .with_annotated_image_path(scratch_dir("none").join("missing.jpg"));
        assert_eq!(reconciler.annotated_image().await.unwrap(), None);
    }

    #[test]
    fn sanitize_keeps_last_component() {
        assert_eq!(sanitize_filename("photo.jpg"), "photo.jpg");
        assert_eq!(sanitize_filename("a/b/c.png"), "c.png");
        assert_eq!(sanitize_filename("C:\\tmp\\x.jpg"), "x.jpg");
        assert_eq!(sanitize_filename("dir/"), "upload");
        assert_eq!(sanitize_filename(".."), "upload");
    }
}
