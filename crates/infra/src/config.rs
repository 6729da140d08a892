//! Process configuration read from environment variables.

use std::env;
use std::fmt::Display;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use chrono::NaiveTime;
use thiserror::Error;
use tracing::{info, warn};

use larder_sales::HolidayCalendar;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("invalid {key} value '{value}': {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: SocketAddr,
    /// `None` runs against the in-memory store.
    pub database_url: Option<String>,
    pub database_max_connections: u32,
    /// `None` disables the detection endpoint.
    pub detector_url: Option<String>,
    pub detector_min_confidence: f32,
    pub detector_timeout: Duration,
    pub upload_dir: PathBuf,
    pub annotated_image_path: PathBuf,
    pub forecast_horizon_days: u32,
    /// Local time of day the forecast runner fires.
    pub forecast_daily_at: NaiveTime,
    pub holidays: HolidayCalendar,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary key lookup; unset keys take their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let detector_timeout_secs: u64 = parse_or(&lookup, "DETECTOR_TIMEOUT_SECS", "30")?;
        let forecast_daily_at = {
            let raw = value_or(&lookup, "FORECAST_DAILY_AT", "06:00");
            NaiveTime::parse_from_str(raw.trim(), "%H:%M").map_err(|e| invalid("FORECAST_DAILY_AT", &raw, e))?
        };
        let holidays = {
            let raw = lookup("HOLIDAYS").unwrap_or_default();
            HolidayCalendar::parse_list(&raw).map_err(|e| invalid("HOLIDAYS", &raw, e))?
        };
        let detector_min_confidence: f32 = parse_or(&lookup, "DETECTOR_MIN_CONFIDENCE", "0.25")?;
        if !(0.0..=1.0).contains(&detector_min_confidence) {
            return Err(invalid(
                "DETECTOR_MIN_CONFIDENCE",
                &detector_min_confidence.to_string(),
                "must be within [0, 1]",
            ));
        }

        let database_url = optional(&lookup, "DATABASE_URL");
        if database_url.is_none() {
            warn!("DATABASE_URL not set, using the in-memory store");
        }
        let detector_url = optional(&lookup, "DETECTOR_URL");
        if detector_url.is_none() {
            warn!("DETECTOR_URL not set, detection is disabled");
        }

        Ok(Self {
            bind_addr: parse_or(&lookup, "BIND_ADDR", "0.0.0.0:8080")?,
            database_url,
            database_max_connections: parse_or(&lookup, "DATABASE_MAX_CONNECTIONS", "5")?,
            detector_url,
            detector_min_confidence,
            detector_timeout: Duration::from_secs(detector_timeout_secs),
            upload_dir: PathBuf::from(value_or(&lookup, "UPLOAD_DIR", "uploads")),
            annotated_image_path: PathBuf::from(value_or(&lookup, "ANNOTATED_IMAGE_PATH", "output.jpg")),
            forecast_horizon_days: parse_or(&lookup, "FORECAST_HORIZON_DAYS", "10")?,
            forecast_daily_at,
            holidays,
        })
    }
}

fn optional(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<String> {
    lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn value_or(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: &str) -> String {
    optional(lookup, key).unwrap_or_else(|| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    })
}

fn parse_or<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &'static str, default: &str) -> Result<T, ConfigError>
where
    T::Err: Display,
{
    let raw = value_or(lookup, key, default);
    raw.parse().map_err(|e| invalid(key, &raw, e))
}

fn invalid(key: &'static str, value: &str, reason: impl Display) -> ConfigError {
    ConfigError::Invalid {
        key,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}
