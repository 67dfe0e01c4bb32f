use clap::Parser;

use crate::error::{Result, TrendError};

pub const DEFAULT_REGION: &str = "SA";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackerConfig {
    region: String,
}

impl TrackerConfig {
    pub fn new(region: impl Into<String>) -> Result<Self> {
        let region = region.into();
        if region.trim().is_empty() {
            return Err(TrendError::Config("region code must not be empty".into()));
        }
        Ok(Self { region })
    }

    pub fn region(&self) -> &str {
        &self.region
    }
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            region: DEFAULT_REGION.to_string(),
        }
    }
}

/// Track trending hashtags for a single region.
#[derive(Parser, Debug, Clone)]
#[command(version)]
pub struct Args {
    /// Only posts from this location code are counted.
    #[arg(long, default_value = DEFAULT_REGION)]
    pub region: String,

    /// Number of trends to print.
    #[arg(long, default_value_t = 5)]
    pub limit: usize,

    /// Also print the trends of the trailing window of this many hours.
    #[arg(long, allow_negative_numbers = true)]
    pub window_hours: Option<i64>,

    /// Also print the hour-over-hour growth rates.
    #[arg(long)]
    pub growth: bool,

    /// Read `<LOCATION> <content>` lines from stdin instead of the sample posts.
    #[arg(long)]
    pub stdin: bool,

    /// Ingest workers used with --stdin.
    #[arg(long, default_value_t = 4)]
    pub workers: usize,
}

impl Args {
    pub fn tracker_config(&self) -> Result<TrackerConfig> {
        TrackerConfig::new(self.region.clone())
    }

    pub fn validate(&self) -> Result<()> {
        if self.workers == 0 {
            return Err(TrendError::Config("workers must be greater than zero".into()));
        }
        Ok(())
    }
}
