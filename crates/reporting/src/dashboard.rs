//! Dashboard views: executive KPIs, revenue trend, channel and campaign
//! tables, and the budget simulator, assembled from one dataset.

use campaign_core::config::AppConfig;
use campaign_core::metrics::{cpa, roas};
use campaign_core::types::{Channel, PerformanceRecord};
use campaign_core::InsightsResult;
use serde::Serialize;
use std::borrow::Borrow;
use std::collections::BTreeMap;
use tracing::debug;

use crate::aggregate::{aggregate, rank, roas_by_channel, AggregateRow, Dimension, RankMetric};
use crate::budget::{recommend_shift, BudgetShift, BudgetSimulator, SimulationOutcome};
use crate::filter::{filter_by_channels, ChannelSelection};

/// Headline KPIs with deltas against the configured targets.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExecutiveSummary {
    pub total_spend: f64,
    pub total_revenue: f64,
    pub total_conversions: u64,
    pub roas: f64,
    pub cpa: f64,
    pub roas_vs_target: f64,
    pub cpa_vs_target: f64,
}

impl ExecutiveSummary {
    pub fn from_records<I>(records: I, roas_target: f64, cpa_target: f64) -> Self
    where
        I: IntoIterator,
        I::Item: Borrow<PerformanceRecord>,
    {
        let mut total_spend = 0.0;
        let mut total_revenue = 0.0;
        let mut total_conversions = 0;
        for record in records {
            let record = record.borrow();
            total_spend += record.spend;
            total_revenue += record.revenue;
            total_conversions += record.conversions;
        }

        let roas = roas(total_revenue, total_spend);
        let cpa = cpa(total_spend, total_conversions);
        Self {
            total_spend,
            total_revenue,
            total_conversions,
            roas,
            cpa,
            roas_vs_target: roas - roas_target,
            cpa_vs_target: cpa - cpa_target,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardView {
    pub summary: ExecutiveSummary,
    /// Spend and revenue per day.
    pub daily_trend: Vec<AggregateRow>,
    pub channel_performance: Vec<AggregateRow>,
    /// All campaigns, unfiltered.
    pub campaign_efficiency: Vec<AggregateRow>,
    pub top_roas_campaigns: Vec<AggregateRow>,
    pub highest_cpa_campaigns: Vec<AggregateRow>,
    pub simulation: SimulationOutcome,
    pub recommendation: Option<BudgetShift>,
}

impl DashboardView {
    /// Build every view. The summary, trend, channel table and the ROAS
    /// feeding the simulator honour `selection`; the campaign deep dive
    /// always covers the full dataset.
    pub fn build(
        records: &[PerformanceRecord],
        selection: &ChannelSelection,
        allocations: &BTreeMap<Channel, f64>,
        config: &AppConfig,
    ) -> InsightsResult<Self> {
        let filtered = filter_by_channels(records, selection);
        let reporting = &config.reporting;

        let summary = ExecutiveSummary::from_records(
            filtered.iter().copied(),
            reporting.roas_target,
            reporting.cpa_target,
        );
        let daily_trend = aggregate(filtered.iter().copied(), &[Dimension::Date]);
        let channel_performance = aggregate(filtered.iter().copied(), &[Dimension::Channel]);

        let campaign_efficiency = aggregate(records, &[Dimension::Campaign]);
        let top_roas_campaigns = rank(&campaign_efficiency, RankMetric::Roas, reporting.top_n);
        let highest_cpa_campaigns = rank(&campaign_efficiency, RankMetric::Cpa, reporting.top_n);

        let roas_lookup = roas_by_channel(&channel_performance);
        let simulation =
            BudgetSimulator::from_config(&config.simulator).simulate(allocations, &roas_lookup)?;
        let recommendation = recommend_shift(&roas_lookup, allocations.keys().copied());

        debug!(
            rows = filtered.len(),
            days = daily_trend.len(),
            channels = channel_performance.len(),
            campaigns = campaign_efficiency.len(),
            "Dashboard built"
        );

        Ok(Self {
            summary,
            daily_trend,
            channel_performance,
            campaign_efficiency,
            top_roas_campaigns,
            highest_cpa_campaigns,
            simulation,
            recommendation,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn record(
        day: u32,
        campaign: &str,
        channel: Channel,
        spend: f64,
        revenue: f64,
        conversions: u64,
    ) -> PerformanceRecord {
        PerformanceRecord {
            date: NaiveDate::from_ymd_opt(2025, 2, day).unwrap(),
            campaign_id: campaign.to_string(),
            campaign_name: campaign.to_string(),
            channel,
            impressions: 10_000,
            clicks: 200,
            spend,
            conversions,
            revenue,
        }
    }

    fn records() -> Vec<PerformanceRecord> {
        vec![
            record(1, "Credit Cards Generic", Channel::GoogleSearch, 600.0, 2_400.0, 12),
            record(1, "Lookalike - Top Spenders", Channel::FacebookAds, 300.0, 450.0, 6),
            record(1, "Influencer Collab", Channel::TikTokAds, 100.0, 200.0, 4),
            record(1, "Weekly Newsletter", Channel::Email, 50.0, 600.0, 10),
            record(2, "Credit Cards Generic", Channel::GoogleSearch, 400.0, 1_600.0, 8),
            record(2, "Lookalike - Top Spenders", Channel::FacebookAds, 300.0, 450.0, 4),
            record(2, "Influencer Collab", Channel::TikTokAds, 100.0, 200.0, 2),
            record(2, "Weekly Newsletter", Channel::Email, 50.0, 600.0, 10),
        ]
    }

    #[test]
    fn test_summary_against_targets() {
        let summary = ExecutiveSummary::from_records(&records(), 2.5, 45.0);
        assert_eq!(summary.total_spend, 1_900.0);
        assert_eq!(summary.total_revenue, 6_500.0);
        assert_eq!(summary.total_conversions, 56);
        assert!((summary.roas - 6_500.0 / 1_900.0).abs() < 1e-9);
        assert!((summary.roas_vs_target - (summary.roas - 2.5)).abs() < 1e-9);
        assert!((summary.cpa - 1_900.0 / 56.0).abs() < 1e-9);
    }

    #[test]
    fn test_summary_of_nothing_is_zero() {
        let summary = ExecutiveSummary::from_records(Vec::<PerformanceRecord>::new(), 2.5, 45.0);
        assert_eq!(summary.roas, 0.0);
        assert_eq!(summary.cpa, 0.0);
        assert_eq!(summary.roas_vs_target, -2.5);
    }

    #[test]
    fn test_full_view() {
        let config = AppConfig::default();
        let allocations = config.simulator.default_allocations();
        let view =
            DashboardView::build(&records(), &ChannelSelection::All, &allocations, &config)
                .unwrap();

        assert_eq!(view.daily_trend.len(), 2);
        assert_eq!(view.channel_performance.len(), 4);
        assert_eq!(view.campaign_efficiency.len(), 4);
        assert_eq!(
            view.top_roas_campaigns[0].key.campaign_name(),
            Some("Weekly Newsletter")
        );
        assert_eq!(
            view.highest_cpa_campaigns[0].key.campaign_name(),
            Some("Lookalike - Top Spenders")
        );

        // Google 4.0, Facebook 1.5, TikTok 2.0 at the slider defaults,
        // which equal the baseline.
        assert_eq!(view.simulation.projection.total_revenue, 85_000.0);
        assert_eq!(view.simulation.delta_vs_baseline, 0.0);

        let shift = view.recommendation.unwrap();
        assert_eq!(shift.from, Channel::FacebookAds);
        assert_eq!(shift.to, Channel::GoogleSearch);
    }

    #[test]
    fn test_selection_narrows_summary_but_not_deep_dive() {
        let config = AppConfig::default();
        let allocations = config.simulator.default_allocations();
        let selection = ChannelSelection::from_selected([Channel::Email]);
        let view = DashboardView::build(&records(), &selection, &allocations, &config).unwrap();

        assert_eq!(view.summary.total_spend, 100.0);
        assert_eq!(view.channel_performance.len(), 1);
        assert_eq!(view.campaign_efficiency.len(), 4);
        // No paid channel history in the selection, so nothing projects.
        assert_eq!(view.simulation.projection.total_revenue, 0.0);
        assert!(view.recommendation.is_none());
    }

    #[test]
    fn test_view_serializes() {
        let config = AppConfig::default();
        let view = DashboardView::build(
            &records(),
            &ChannelSelection::All,
            &config.simulator.default_allocations(),
            &config,
        )
        .unwrap();
        let json = serde_json::to_value(&view).unwrap();
        assert!(json["summary"]["roas"].is_number());
        assert_eq!(json["channel_performance"].as_array().unwrap().len(), 4);
    }
}
