use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Forecast sales of one dish on one day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub date: NaiveDate,
    pub dish_name: String,
    pub predicted_sales: f64,
}

impl Prediction {
    pub fn new(date: NaiveDate, dish_name: impl Into<String>, predicted_sales: f64) -> Self {
        Self {
            date,
            dish_name: dish_name.into(),
            predicted_sales,
        }
    }

    /// Whole servings: rounded half away from zero, never negative.
    pub fn rounded_sales(&self) -> i64 {
        if !self.predicted_sales.is_finite() {
            return 0;
        }
        (self.predicted_sales.round() as i64).max(0)
    }
}
