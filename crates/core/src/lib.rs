pub mod config;
pub mod error;
pub mod metrics;
pub mod types;

pub use config::AppConfig;
pub use error::{InsightsError, InsightsResult};
pub use types::{CampaignSpec, Channel, PerformanceRecord};
