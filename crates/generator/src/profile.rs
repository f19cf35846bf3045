//! Per-channel sampling parameters and the fixed campaign catalog.

use campaign_core::types::{CampaignSpec, Channel};
use serde::{Deserialize, Serialize};

/// Closed interval sampled uniformly.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UniformRange {
    pub low: f64,
    pub high: f64,
}

impl UniformRange {
    pub const fn new(low: f64, high: f64) -> Self {
        Self { low, high }
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.low && value <= self.high
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelProfile {
    pub channel: Channel,
    /// Daily impressions before variation and seasonality.
    pub base_impressions: u64,
    pub cost_per_click: UniformRange,
    pub conversion_rate: UniformRange,
    pub order_value: UniformRange,
}

// ─── Delivery constants ─────────────────────────────────────────────────────

/// Multiplier on paid volume for Saturday and Sunday.
pub const WEEKEND_SEASONALITY: f64 = 1.2;
/// Day-to-day swing applied to volume.
pub const VOLUME_VARIATION: UniformRange = UniformRange::new(0.8, 1.2);
/// Click-through rate for paid channels.
pub const PAID_CTR: UniformRange = UniformRange::new(0.01, 0.03);
/// Email: every send reaches the whole list.
pub const EMAIL_SEND_VOLUME: u64 = 20_000;
pub const EMAIL_CTR: f64 = 0.20;
/// Email costs the same per day regardless of clicks.
pub const EMAIL_FLAT_COST: f64 = 50.0;

/// The channel table used by the generator binary.
pub fn default_profiles() -> Vec<ChannelProfile> {
    vec![
        ChannelProfile {
            channel: Channel::GoogleSearch,
            base_impressions: 10_000,
            cost_per_click: UniformRange::new(1.5, 4.0),
            conversion_rate: UniformRange::new(0.05, 0.12),
            order_value: UniformRange::new(80.0, 150.0),
        },
        ChannelProfile {
            channel: Channel::FacebookAds,
            base_impressions: 10_000,
            cost_per_click: UniformRange::new(0.5, 1.5),
            conversion_rate: UniformRange::new(0.02, 0.05),
            order_value: UniformRange::new(40.0, 90.0),
        },
        ChannelProfile {
            channel: Channel::TikTokAds,
            base_impressions: 50_000,
            cost_per_click: UniformRange::new(0.1, 0.4),
            conversion_rate: UniformRange::new(0.005, 0.02),
            order_value: UniformRange::new(20.0, 50.0),
        },
        ChannelProfile {
            channel: Channel::Email,
            base_impressions: EMAIL_SEND_VOLUME,
            cost_per_click: UniformRange::new(0.0, 0.0),
            conversion_rate: UniformRange::new(0.08, 0.15),
            order_value: UniformRange::new(50.0, 100.0),
        },
    ]
}

pub fn default_campaigns() -> Vec<CampaignSpec> {
    vec![
        CampaignSpec::new("CMP-001", Channel::GoogleSearch, "Credit Cards Generic"),
        CampaignSpec::new("CMP-002", Channel::GoogleSearch, "Travel Rewards"),
        CampaignSpec::new("CMP-003", Channel::FacebookAds, "Retargeting - Site Visitors"),
        CampaignSpec::new("CMP-004", Channel::FacebookAds, "Lookalike - Top Spenders"),
        CampaignSpec::new("CMP-005", Channel::TikTokAds, "Viral Creative V1"),
        CampaignSpec::new("CMP-006", Channel::TikTokAds, "Influencer Collab"),
        CampaignSpec::new("CMP-007", Channel::Email, "Weekly Newsletter"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_every_channel_has_a_profile() {
        let profiles = default_profiles();
        for channel in Channel::ALL {
            assert_eq!(
                profiles.iter().filter(|p| p.channel == channel).count(),
                1,
                "{channel} should have exactly one profile"
            );
        }
    }

    #[test]
    fn test_catalog_ids_are_unique() {
        let campaigns = default_campaigns();
        let ids: HashSet<_> = campaigns.iter().map(|c| c.campaign_id.as_str()).collect();
        assert_eq!(ids.len(), campaigns.len());
    }

    #[test]
    fn test_ranges_are_ordered() {
        for p in default_profiles() {
            assert!(p.cost_per_click.low <= p.cost_per_click.high);
            assert!(p.conversion_rate.low <= p.conversion_rate.high);
            assert!(p.order_value.low <= p.order_value.high);
        }
    }
}
