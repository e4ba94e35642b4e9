//! Configuration management and validation.
//!
//! Holds the export location and the user-chosen statistics parameters,
//! with defaults matching the dashboard's initial slider positions.

use crate::constants::{
    DEFAULT_EXPORT_PATH, DEFAULT_LOWER_BOUND, DEFAULT_UPPER_BOUND, RESERVOIR_DAYS, WINDOW_DAYS,
};
use crate::error::{DiaDashError, Result};
use crate::stats::{StatsParams, StintPolicy};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::debug;

/// Global configuration for one dashboard run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashConfig {
    /// Export file, or a directory holding exports
    pub data_path: PathBuf,

    /// Lower glucose bound in mg/dL (inclusive)
    pub lower_bound: f32,

    /// Upper glucose bound in mg/dL (inclusive)
    pub upper_bound: f32,

    /// Basal insulin per day in units
    pub basal_rate_per_day: f32,

    /// Days covered by the export
    pub window_days: u32,

    /// Infusion-site change cadence in days
    pub reservoir_days: u32,

    pub stint_policy: StintPolicy,
}

impl Default for DashConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from(DEFAULT_EXPORT_PATH),
            lower_bound: DEFAULT_LOWER_BOUND,
            upper_bound: DEFAULT_UPPER_BOUND,
            basal_rate_per_day: 0.0,
            window_days: WINDOW_DAYS,
            reservoir_days: RESERVOIR_DAYS,
            stint_policy: StintPolicy::default(),
        }
    }
}

impl DashConfig {
    /// Read exports from a different file or directory
    pub fn with_data_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.data_path = path.into();
        self
    }

    /// Set the glucose range used for time-in-range and stints
    pub fn with_bounds(mut self, lower: f32, upper: f32) -> Self {
        self.lower_bound = lower;
        self.upper_bound = upper;
        self
    }

    pub fn with_basal_rate(mut self, units_per_day: f32) -> Self {
        self.basal_rate_per_day = units_per_day;
        self
    }

    pub fn with_window_days(mut self, days: u32) -> Self {
        self.window_days = days;
        self
    }

    pub fn with_reservoir_days(mut self, days: u32) -> Self {
        self.reservoir_days = days;
        self
    }

    pub fn with_stint_policy(mut self, policy: StintPolicy) -> Self {
        self.stint_policy = policy;
        self
    }

    /// Check bounds and dosing inputs before any statistics are computed
    pub fn validate(&self) -> Result<()> {
        if !self.lower_bound.is_finite() || !self.upper_bound.is_finite() {
            return Err(DiaDashError::configuration("Glucose bounds must be finite"));
        }
        if self.lower_bound <= 0.0 || self.upper_bound <= 0.0 {
            return Err(DiaDashError::configuration(format!(
                "Glucose bounds must be positive, got {}..{}",
                self.lower_bound, self.upper_bound
            )));
        }
        if self.lower_bound > self.upper_bound {
            return Err(DiaDashError::configuration(format!(
                "Lower bound {} exceeds upper bound {}",
                self.lower_bound, self.upper_bound
            )));
        }
        if !self.basal_rate_per_day.is_finite() || self.basal_rate_per_day < 0.0 {
            return Err(DiaDashError::configuration(format!(
                "Basal rate must be a non-negative number of units, got {}",
                self.basal_rate_per_day
            )));
        }
        if self.window_days == 0 || self.reservoir_days == 0 {
            return Err(DiaDashError::configuration(
                "Window and reservoir periods must be at least one day",
            ));
        }

        debug!(
            "Configuration valid: bounds {}..{}, basal {}U/day",
            self.lower_bound, self.upper_bound, self.basal_rate_per_day
        );
        Ok(())
    }

    /// Statistics inputs derived from this configuration
    pub fn stats_params(&self) -> StatsParams {
        StatsParams {
            lower_bound: self.lower_bound,
            upper_bound: self.upper_bound,
            basal_rate_per_day: self.basal_rate_per_day,
            window_days: self.window_days,
            reservoir_days: self.reservoir_days,
            stint_policy: self.stint_policy,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_dashboard() {
        let config = DashConfig::default();
        assert_eq!(config.data_path, PathBuf::from("data/raw/raw_data.csv"));
        assert_eq!((config.lower_bound, config.upper_bound), (80.0, 150.0));
        assert_eq!(config.basal_rate_per_day, 0.0);
        assert_eq!(config.stint_policy, StintPolicy::Longest);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_flows_into_params() {
        let params = DashConfig::default()
            .with_bounds(70.0, 180.0)
            .with_basal_rate(20.0)
            .with_stint_policy(StintPolicy::LastInterval)
            .stats_params();

        assert_eq!(params.lower_bound, 70.0);
        assert_eq!(params.upper_bound, 180.0);
        assert_eq!(params.basal_rate_per_day, 20.0);
        assert_eq!(params.window_days, 7);
        assert_eq!(params.reservoir_days, 3);
        assert_eq!(params.stint_policy, StintPolicy::LastInterval);
    }

    #[test]
    fn test_validation_rejects_bad_inputs() {
        let inverted = DashConfig::default().with_bounds(200.0, 100.0);
        assert!(matches!(
            inverted.validate(),
            Err(DiaDashError::Configuration { .. })
        ));

        assert!(DashConfig::default().with_bounds(0.0, 100.0).validate().is_err());
        assert!(DashConfig::default().with_basal_rate(-1.0).validate().is_err());
        assert!(DashConfig::default().with_basal_rate(f32::NAN).validate().is_err());
        assert!(DashConfig::default().with_reservoir_days(0).validate().is_err());
    }

    #[test]
    fn test_equal_bounds_are_allowed() {
        assert!(DashConfig::default().with_bounds(120.0, 120.0).validate().is_ok());
    }

    #[test]
    fn test_config_deserializes_from_json() {
        let config: DashConfig = serde_json::from_str(
            r#"{
                "data_path": "exports",
                "lower_bound": 70.0,
                "upper_bound": 180.0,
                "basal_rate_per_day": 18.5,
                "window_days": 7,
                "reservoir_days": 3,
                "stint_policy": "last_interval"
            }"#,
        )
        .unwrap();

        assert_eq!(config.data_path, PathBuf::from("exports"));
        assert_eq!(config.stint_policy, StintPolicy::LastInterval);
    }
}
