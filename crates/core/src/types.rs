use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::error::InsightsError;

/// Marketing acquisition channel. Stored and displayed by its label.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Channel {
    #[serde(rename = "Google Search")]
    GoogleSearch,
    #[serde(rename = "Facebook Ads")]
    FacebookAds,
    #[serde(rename = "TikTok Ads")]
    TikTokAds,
    #[serde(rename = "Email")]
    Email,
}

impl Channel {
    pub const ALL: [Channel; 4] = [
        Channel::GoogleSearch,
        Channel::FacebookAds,
        Channel::TikTokAds,
        Channel::Email,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Channel::GoogleSearch => "Google Search",
            Channel::FacebookAds => "Facebook Ads",
            Channel::TikTokAds => "TikTok Ads",
            Channel::Email => "Email",
        }
    }

    /// Paid channels buy clicks; Email is sent at a flat cost.
    pub fn is_paid(&self) -> bool {
        !matches!(self, Channel::Email)
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Channel {
    type Err = InsightsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Channel::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| InsightsError::Decode(format!("unknown channel '{s}'")))
    }
}

// Groups sort by label, the same order the dashboard tables use.
impl Ord for Channel {
    fn cmp(&self, other: &Self) -> Ordering {
        self.as_str().cmp(other.as_str())
    }
}

impl PartialOrd for Channel {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// A campaign definition. A campaign runs on exactly one channel for its
/// whole lifetime.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CampaignSpec {
    pub campaign_id: String,
    pub channel: Channel,
    pub campaign_name: String,
}

impl CampaignSpec {
    pub fn new(campaign_id: &str, channel: Channel, campaign_name: &str) -> Self {
        Self {
            campaign_id: campaign_id.to_string(),
            channel,
            campaign_name: campaign_name.to_string(),
        }
    }
}

/// One campaign's performance on one day.
///
/// Field order matches the `marketing_performance` table and the CSV
/// snapshot header.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PerformanceRecord {
    pub date: NaiveDate,
    pub campaign_id: String,
    pub campaign_name: String,
    pub channel: Channel,
    pub impressions: u64,
    pub clicks: u64,
    pub spend: f64,
    pub conversions: u64,
    pub revenue: f64,
}

impl PerformanceRecord {
    /// `(date, campaign_id)` uniquely identifies a record.
    pub fn key(&self) -> (NaiveDate, &str) {
        (self.date, self.campaign_id.as_str())
    }
}
