//! Per-dish sales forecasting.
//!
//! Model (`SeasonalTrendForecaster`):
//! - Fit `sales = a + b·t + s[weekday]` by ordinary least squares, where `t` is
//!   the day offset from the first observation.
//! - The weekday term is only used once the history spans two weeks and has
//!   enough observations for the extra coefficients.
//! - Project the fitted line (plus weekday effect) over the days following the
//!   last observation.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::job::AiJob;
use crate::result::AiError;

pub const DEFAULT_HORIZON_DAYS: u32 = 10;

/// Observed sales of one dish on one day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesPoint {
    pub date: NaiveDate,
    pub dish: String,
    pub sales: f64,
}

/// Forecast value of one dish on one future day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    pub date: NaiveDate,
    pub dish: String,
    pub value: f64,
}

/// A time-series model fitted independently per dish.
pub trait SalesForecaster: Send + Sync + 'static {
    fn name(&self) -> &'static str;

    /// `history` is sorted by date with one value per date. Returns `horizon`
    /// points for the days right after the last observation.
    fn forecast(&self, history: &[(NaiveDate, f64)], horizon: u32) -> Result<Vec<(NaiveDate, f64)>, AiError>;
}

/// Group points by dish, summing duplicate dates. Dishes and dates come out sorted.
pub fn partition_by_dish(points: &[SalesPoint]) -> BTreeMap<String, Vec<(NaiveDate, f64)>> {
    let mut grouped: BTreeMap<String, BTreeMap<NaiveDate, f64>> = BTreeMap::new();
    for p in points {
        *grouped
            .entry(p.dish.clone())
            .or_default()
            .entry(p.date)
            .or_insert(0.0) += p.sales;
    }
    grouped
        .into_iter()
        .map(|(dish, series)| (dish, series.into_iter().collect()))
        .collect()
}

#[derive(Debug, Clone)]
pub struct SeasonalTrendForecaster {
    /// Minimum history span (days) before the weekday term is fitted.
    weekly_min_span_days: i64,
}

impl Default for SeasonalTrendForecaster {
    fn default() -> Self {
        Self {
            weekly_min_span_days: 14,
        }
    }
}

impl SeasonalTrendForecaster {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SalesForecaster for SeasonalTrendForecaster {
    fn name(&self) -> &'static str {
        "seasonal-trend"
    }

    fn forecast(&self, history: &[(NaiveDate, f64)], horizon: u32) -> Result<Vec<(NaiveDate, f64)>, AiError> {
        if history.len() < 2 {
            return Err(AiError::InvalidInput(format!(
                "need at least 2 observations, got {}",
                history.len()
            )));
        }
        if history.windows(2).any(|w| w[0].0 >= w[1].0) {
            return Err(AiError::InvalidInput(
                "history must be sorted with one value per date".to_string(),
            ));
        }
        if history.iter().any(|(_, y)| !y.is_finite()) {
            return Err(AiError::InvalidInput("history contains non-finite sales".to_string()));
        }

        let first = history[0].0;
        let last = history[history.len() - 1].0;
        let span = (last - first).num_days();
        let scale = span as f64;

        let mut weekdays: Vec<u32> = history.iter().map(|(d, _)| d.weekday().num_days_from_monday()).collect();
        weekdays.sort_unstable();
        weekdays.dedup();

        // First present weekday is the baseline; the rest get a dummy column.
        let weekly = span >= self.weekly_min_span_days && history.len() > 2 + weekdays.len();
        let dummies: Vec<u32> = if weekly { weekdays[1..].to_vec() } else { Vec::new() };

        let row = |date: NaiveDate| -> Vec<f64> {
            let t = (date - first).num_days() as f64 / scale;
            let wd = date.weekday().num_days_from_monday();
            let mut r = Vec::with_capacity(2 + dummies.len());
            r.push(1.0);
            r.push(t);
            r.extend(dummies.iter().map(|d| if *d == wd { 1.0 } else { 0.0 }));
            r
        };

        let xs: Vec<Vec<f64>> = history.iter().map(|(d, _)| row(*d)).collect();
        let ys: Vec<f64> = history.iter().map(|(_, y)| *y).collect();
        let coef = least_squares(&xs, &ys)?;

        // Weekdays never observed get the average effect of the observed ones.
        let mean_effect = if weekly {
            coef[2..].iter().sum::<f64>() / weekdays.len() as f64
        } else {
            0.0
        };

        let mut out = Vec::with_capacity(horizon as usize);
        for k in 1..=i64::from(horizon) {
            let date = last + Duration::days(k);
            let t = (date - first).num_days() as f64 / scale;
            let wd = date.weekday().num_days_from_monday();
            let effect = if !weekly || wd == weekdays[0] {
                0.0
            } else {
                match dummies.iter().position(|d| *d == wd) {
                    Some(i) => coef[2 + i],
                    None => mean_effect,
                }
            };
            out.push((date, coef[0] + coef[1] * t + effect));
        }
        Ok(out)
    }
}

/// Solve the normal equations `XᵀX β = Xᵀy` with partial pivoting.
fn least_squares(xs: &[Vec<f64>], ys: &[f64]) -> Result<Vec<f64>, AiError> {
    let p = xs.first().map(Vec::len).unwrap_or(0);
    let mut a = vec![vec![0.0; p + 1]; p];
    for (row, y) in xs.iter().zip(ys) {
        for i in 0..p {
            for j in 0..p {
                a[i][j] += row[i] * row[j];
            }
            a[i][p] += row[i] * y;
        }
    }

    for col in 0..p {
        let pivot = (col..p)
            .max_by(|&r1, &r2| a[r1][col].abs().total_cmp(&a[r2][col].abs()))
            .unwrap_or(col);
        if a[pivot][col].abs() < 1e-12 {
            return Err(AiError::InferenceFailed("singular design matrix".to_string()));
        }
        a.swap(col, pivot);
        for r in 0..p {
            if r == col {
                continue;
            }
            let factor = a[r][col] / a[col][col];
            if factor == 0.0 {
                continue;
            }
            for c in col..=p {
                a[r][c] -= factor * a[col][c];
            }
        }
    }

    Ok((0..p).map(|i| a[i][p] / a[i][i]).collect())
}

/// Forecast job for a single dish.
pub struct ForecastJob {
    forecaster: Arc<dyn SalesForecaster>,
    dish: String,
    history: Vec<(NaiveDate, f64)>,
    horizon: u32,
}

impl ForecastJob {
    pub fn new(forecaster: Arc<dyn SalesForecaster>, dish: impl Into<String>, history: Vec<(NaiveDate, f64)>) -> Self {
        Self {
            forecaster,
            dish: dish.into(),
            history,
            horizon: DEFAULT_HORIZON_DAYS,
        }
    }

    pub fn with_horizon(mut self, horizon: u32) -> Self {
        self.horizon = horizon;
        self
    }
}

impl AiJob for ForecastJob {
    type Input = Vec<(NaiveDate, f64)>;
    type Output = Vec<ForecastPoint>;

    fn kind(&self) -> &'static str {
        "sales.forecast"
    }

    fn input(&self) -> &Self::Input {
        &self.history
    }

    fn run(&self) -> Result<Self::Output, AiError> {
        let projected = self
            .forecaster
            .forecast(&self.history, self.horizon)
            .map_err(|e| match e {
                AiError::InvalidInput(m) => AiError::InvalidInput(format!("dish '{}': {m}", self.dish)),
                AiError::InferenceFailed(m) => AiError::InferenceFailed(format!("dish '{}': {m}", self.dish)),
                AiError::Internal(m) => AiError::Internal(format!("dish '{}': {m}", self.dish)),
            })?;

        Ok(projected
            .into_iter()
            .map(|(date, value)| ForecastPoint {
                date,
                dish: self.dish.clone(),
                value,
            })
            .collect())
    }
}
