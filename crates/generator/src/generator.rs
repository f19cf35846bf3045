//! Daily per-campaign record synthesis.

use campaign_core::config::GeneratorConfig;
use campaign_core::metrics::round_money;
use campaign_core::types::{CampaignSpec, Channel, PerformanceRecord};
use campaign_core::{InsightsError, InsightsResult};
use chrono::{Datelike, Days, NaiveDate, Weekday};
use tracing::{debug, info};

use crate::profile::{
    default_campaigns, default_profiles, ChannelProfile, EMAIL_CTR, EMAIL_FLAT_COST,
    PAID_CTR, VOLUME_VARIATION, WEEKEND_SEASONALITY,
};
use crate::sampler::{RandomSampler, Sampler};

/// Produces one [`PerformanceRecord`] per campaign per day over
/// `[start_date, end_date)`.
#[derive(Debug, Clone)]
pub struct DataGenerator {
    start_date: NaiveDate,
    end_date: NaiveDate,
    profiles: Vec<ChannelProfile>,
    campaigns: Vec<CampaignSpec>,
}

impl DataGenerator {
    /// Generator over the configured window with the built-in channel table
    /// and campaign catalog.
    pub fn new(config: &GeneratorConfig) -> InsightsResult<Self> {
        Self::with_catalog(config, default_profiles(), default_campaigns())
    }

    pub fn with_catalog(
        config: &GeneratorConfig,
        profiles: Vec<ChannelProfile>,
        campaigns: Vec<CampaignSpec>,
    ) -> InsightsResult<Self> {
        config.validate()?;

        for campaign in &campaigns {
            if !profiles.iter().any(|p| p.channel == campaign.channel) {
                return Err(InsightsError::Config(format!(
                    "campaign {} runs on {} which has no channel profile",
                    campaign.campaign_id, campaign.channel
                )));
            }
        }
        for (i, campaign) in campaigns.iter().enumerate() {
            if campaigns[..i]
                .iter()
                .any(|c| c.campaign_id == campaign.campaign_id)
            {
                return Err(InsightsError::Config(format!(
                    "duplicate campaign id {}",
                    campaign.campaign_id
                )));
            }
        }

        Ok(Self {
            start_date: config.start_date,
            end_date: config.end_date,
            profiles,
            campaigns,
        })
    }

    pub fn campaigns(&self) -> &[CampaignSpec] {
        &self.campaigns
    }

    /// Every date in the window, in order.
    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.start_date
            .iter_days()
            .take_while(move |d| *d < self.end_date)
    }

    /// `campaigns × days`.
    pub fn expected_rows(&self) -> usize {
        self.campaigns.len() * self.dates().count()
    }

    /// Generate from a fixed seed, or from entropy when `seed` is `None`.
    pub fn generate_seeded(&self, seed: Option<u64>) -> Vec<PerformanceRecord> {
        match seed {
            Some(seed) => {
                debug!(seed, "Generating with fixed seed");
                self.generate(&mut RandomSampler::seeded(seed))
            }
            None => self.generate(&mut RandomSampler::from_entropy()),
        }
    }

    /// Build the full dataset, day-major then catalog order.
    pub fn generate<S: Sampler>(&self, sampler: &mut S) -> Vec<PerformanceRecord> {
        let mut records = Vec::with_capacity(self.expected_rows());

        for date in self.dates() {
            let seasonality = seasonality(date);
            for campaign in &self.campaigns {
                let Some(profile) = self.profile(campaign.channel) else {
                    continue;
                };
                records.push(sample_record(date, campaign, profile, seasonality, sampler));
            }
        }

        info!(
            rows = records.len(),
            start = %self.start_date,
            end = %self.end_date,
            campaigns = self.campaigns.len(),
            "Generated marketing performance data"
        );
        records
    }

    fn profile(&self, channel: Channel) -> Option<&ChannelProfile> {
        self.profiles.iter().find(|p| p.channel == channel)
    }
}

/// Weekend volume lift.
pub fn seasonality(date: NaiveDate) -> f64 {
    match date.weekday() {
        Weekday::Sat | Weekday::Sun => WEEKEND_SEASONALITY,
        _ => 1.0,
    }
}

fn sample_record<S: Sampler>(
    date: NaiveDate,
    campaign: &CampaignSpec,
    profile: &ChannelProfile,
    seasonality: f64,
    sampler: &mut S,
) -> PerformanceRecord {
    let (impressions, clicks, spend) = if campaign.channel.is_paid() {
        let variation = sampler.volume_variation(VOLUME_VARIATION);
        let impressions = (profile.base_impressions as f64 * variation * seasonality) as u64;
        let ctr = sampler.click_through_rate(PAID_CTR);
        let clicks = ((impressions as f64 * ctr) as u64).min(impressions);
        let cpc = sampler.cost_per_click(profile.cost_per_click);
        (impressions, clicks, clicks as f64 * cpc)
    } else {
        // Sends go to the full list; no seasonality.
        let impressions = profile.base_impressions;
        let variation = sampler.volume_variation(VOLUME_VARIATION);
        let clicks = ((impressions as f64 * EMAIL_CTR * variation) as u64).min(impressions);
        (impressions, clicks, EMAIL_FLAT_COST)
    };

    let rate = sampler.conversion_rate(profile.conversion_rate);
    let conversions = ((clicks as f64 * rate) as u64).min(clicks);
    let order_value = sampler.order_value(profile.order_value);
    let revenue = conversions as f64 * order_value;

    PerformanceRecord {
        date,
        campaign_id: campaign.campaign_id.clone(),
        campaign_name: campaign.campaign_name.clone(),
        channel: campaign.channel,
        impressions,
        clicks,
        spend: round_money(spend.max(0.0)),
        conversions,
        revenue: round_money(revenue.max(0.0)),
    }
}

/// Window of `days` days starting at `start`.
pub fn window(start: NaiveDate, days: u64, seed: Option<u64>) -> GeneratorConfig {
    GeneratorConfig {
        start_date: start,
        end_date: start.checked_add_days(Days::new(days)).unwrap_or(start),
        seed,
    }
}
