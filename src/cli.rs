//! Command-line interface components.

use crate::config::DashConfig;
use crate::constants::DEFAULT_EXPORT_PATH;
use crate::stats::StintPolicy;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "diadash")]
#[command(about = "Weekly glucose and insulin summary from a CareLink CSV export")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Args {
    /// Export file, or a directory whose newest CSV is used
    #[arg(value_name = "PATH", default_value = DEFAULT_EXPORT_PATH)]
    pub path: PathBuf,

    /// Lower glucose bound in mg/dL
    #[arg(long, value_name = "MG_DL")]
    pub low: Option<f32>,

    /// Upper glucose bound in mg/dL
    #[arg(long, value_name = "MG_DL")]
    pub high: Option<f32>,

    /// Basal insulin per day in units
    #[arg(long, value_name = "UNITS")]
    pub basal: Option<f32>,

    /// How the in-range stint is measured
    #[arg(long, value_enum)]
    pub stint: Option<StintPolicy>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Also print per-day glucose distribution and bolus totals
    #[arg(long)]
    pub daily: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

impl Args {
    /// Merge command-line overrides onto the default configuration
    pub fn to_config(&self) -> DashConfig {
        let defaults = DashConfig::default();
        let lower = self.low.unwrap_or(defaults.lower_bound);
        let upper = self.high.unwrap_or(defaults.upper_bound);
        let basal = self.basal.unwrap_or(defaults.basal_rate_per_day);
        let stint = self.stint.unwrap_or(defaults.stint_policy);

        defaults
            .with_data_path(&self.path)
            .with_bounds(lower, upper)
            .with_basal_rate(basal)
            .with_stint_policy(stint)
    }

    pub fn log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "warn" }
    }
}

/// Set up structured logging on stderr. `RUST_LOG` overrides the level.
pub fn setup_logging(args: &Args) {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let log_level = args.log_level();
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("diadash={}", log_level)));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_level(true)
                .with_writer(std::io::stderr)
                .compact(),
        )
        .init();

    tracing::debug!("Logging initialized at level: {}", log_level);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = Args::parse_from(["diadash"]);
        let config = args.to_config();

        assert_eq!(config, DashConfig::default());
        assert_eq!(args.format, OutputFormat::Text);
        assert_eq!(args.log_level(), "warn");
    }

    #[test]
    fn test_overrides() {
        let args = Args::parse_from([
            "diadash",
            "exports/",
            "--low",
            "70",
            "--high",
            "180",
            "--basal",
            "20",
            "--stint",
            "last",
            "--format",
            "json",
            "--daily",
            "-v",
        ]);
        let config = args.to_config();

        assert_eq!(config.data_path, PathBuf::from("exports/"));
        assert_eq!((config.lower_bound, config.upper_bound), (70.0, 180.0));
        assert_eq!(config.basal_rate_per_day, 20.0);
        assert_eq!(config.stint_policy, StintPolicy::LastInterval);
        assert_eq!(args.format, OutputFormat::Json);
        assert!(args.daily);
        assert_eq!(args.log_level(), "debug");
    }

    #[test]
    fn test_unknown_stint_policy_rejected() {
        assert!(Args::try_parse_from(["diadash", "--stint", "median"]).is_err());
    }
}
