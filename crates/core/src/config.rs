use chrono::NaiveDate;
use serde::Deserialize;
use std::collections::BTreeMap;

use crate::error::{InsightsError, InsightsResult};
use crate::types::Channel;

/// Root application configuration. Loaded from environment variables
/// with the prefix `CAMPAIGN_INSIGHTS__`.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub generator: GeneratorConfig,
    #[serde(default)]
    pub reporting: ReportingConfig,
    #[serde(default)]
    pub simulator: SimulatorConfig,
}

/// Where the SQLite store and the CSV snapshot live, relative to the
/// working directory unless absolute.
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    #[serde(default = "default_store_path")]
    pub path: String,
    #[serde(default = "default_export_path")]
    pub export_path: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeneratorConfig {
    #[serde(default = "default_start_date")]
    pub start_date: NaiveDate,
    /// Exclusive.
    #[serde(default = "default_end_date")]
    pub end_date: NaiveDate,
    /// Fixed seed for reproducible runs; entropy when absent.
    #[serde(default)]
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReportingConfig {
    #[serde(default = "default_roas_target")]
    pub roas_target: f64,
    #[serde(default = "default_cpa_target")]
    pub cpa_target: f64,
    #[serde(default = "default_top_n")]
    pub top_n: usize,
}

/// Budget slider settings. The simulator baseline is fixed and does not
/// follow these defaults.
#[derive(Debug, Clone, Deserialize)]
pub struct SimulatorConfig {
    #[serde(default = "default_google_search_budget")]
    pub google_search_budget: f64,
    #[serde(default = "default_facebook_ads_budget")]
    pub facebook_ads_budget: f64,
    #[serde(default = "default_tiktok_ads_budget")]
    pub tiktok_ads_budget: f64,
    #[serde(default = "default_max_budget")]
    pub max_budget: f64,
    #[serde(default = "default_budget_step")]
    pub step: f64,
    #[serde(default = "default_revenue_goal")]
    pub revenue_goal: f64,
}

// Default functions
fn default_store_path() -> String {
    "marketing.db".to_string()
}
fn default_export_path() -> String {
    "marketing_data_raw.csv".to_string()
}
fn default_start_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 1, 1).unwrap_or(NaiveDate::MIN)
}
fn default_end_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 4, 1).unwrap_or(NaiveDate::MIN)
}
fn default_roas_target() -> f64 {
    2.5
}
fn default_cpa_target() -> f64 {
    45.0
}
fn default_top_n() -> usize {
    5
}
fn default_google_search_budget() -> f64 {
    15_000.0
}
fn default_facebook_ads_budget() -> f64 {
    10_000.0
}
fn default_tiktok_ads_budget() -> f64 {
    5_000.0
}
fn default_max_budget() -> f64 {
    50_000.0
}
fn default_budget_step() -> f64 {
    1_000.0
}
fn default_revenue_goal() -> f64 {
    200_000.0
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: default_store_path(),
            export_path: default_export_path(),
        }
    }
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            start_date: default_start_date(),
            end_date: default_end_date(),
            seed: None,
        }
    }
}

impl GeneratorConfig {
    /// Number of days in the `[start_date, end_date)` window.
    pub fn days(&self) -> i64 {
        (self.end_date - self.start_date).num_days()
    }

    pub fn validate(&self) -> InsightsResult<()> {
        if self.end_date <= self.start_date {
            return Err(InsightsError::Config(format!(
                "generator window is empty: {} .. {}",
                self.start_date, self.end_date
            )));
        }
        Ok(())
    }
}

impl Default for ReportingConfig {
    fn default() -> Self {
        Self {
            roas_target: default_roas_target(),
            cpa_target: default_cpa_target(),
            top_n: default_top_n(),
        }
    }
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            google_search_budget: default_google_search_budget(),
            facebook_ads_budget: default_facebook_ads_budget(),
            tiktok_ads_budget: default_tiktok_ads_budget(),
            max_budget: default_max_budget(),
            step: default_budget_step(),
            revenue_goal: default_revenue_goal(),
        }
    }
}

impl SimulatorConfig {
    /// Slider starting positions keyed by channel.
    pub fn default_allocations(&self) -> BTreeMap<Channel, f64> {
        BTreeMap::from([
            (Channel::GoogleSearch, self.google_search_budget),
            (Channel::FacebookAds, self.facebook_ads_budget),
            (Channel::TikTokAds, self.tiktok_ads_budget),
        ])
    }
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, config::ConfigError> {
        let builder = config::Config::builder().add_source(
            config::Environment::with_prefix("CAMPAIGN_INSIGHTS")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        config.try_deserialize()
    }
}
