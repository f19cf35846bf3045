//! Grouped sums over performance records with derived ROAS/CPA.
//!
//! Ratios are always taken over the summed numerator and denominator of a
//! group, never averaged across rows.

use campaign_core::metrics::{cpa, roas};
use campaign_core::types::{Channel, PerformanceRecord};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::collections::BTreeMap;

/// Grouping dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    Date,
    Channel,
    /// Campaign name together with its channel.
    Campaign,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyPart {
    Date(NaiveDate),
    CampaignName(String),
    Channel(Channel),
}

/// Group identity, one part per requested dimension in request order.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct GroupKey(pub Vec<KeyPart>);

impl GroupKey {
    fn of(record: &PerformanceRecord, dims: &[Dimension]) -> Self {
        let mut parts = Vec::with_capacity(dims.len() + 1);
        for dim in dims {
            match dim {
                Dimension::Date => parts.push(KeyPart::Date(record.date)),
                Dimension::Channel => parts.push(KeyPart::Channel(record.channel)),
                Dimension::Campaign => {
                    parts.push(KeyPart::CampaignName(record.campaign_name.clone()));
                    parts.push(KeyPart::Channel(record.channel));
                }
            }
        }
        GroupKey(parts)
    }

    pub fn date(&self) -> Option<NaiveDate> {
        self.0.iter().find_map(|p| match p {
            KeyPart::Date(d) => Some(*d),
            _ => None,
        })
    }

    pub fn channel(&self) -> Option<Channel> {
        self.0.iter().find_map(|p| match p {
            KeyPart::Channel(c) => Some(*c),
            _ => None,
        })
    }

    pub fn campaign_name(&self) -> Option<&str> {
        self.0.iter().find_map(|p| match p {
            KeyPart::CampaignName(n) => Some(n.as_str()),
            _ => None,
        })
    }

    /// Human-readable label, parts joined with " / ".
    pub fn label(&self) -> String {
        if self.0.is_empty() {
            return "Total".to_string();
        }
        self.0
            .iter()
            .map(|p| match p {
                KeyPart::Date(d) => d.to_string(),
                KeyPart::CampaignName(n) => n.clone(),
                KeyPart::Channel(c) => c.to_string(),
            })
            .collect::<Vec<_>>()
            .join(" / ")
    }
}

/// Summed metrics of one group.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateRow {
    pub key: GroupKey,
    pub spend: f64,
    pub revenue: f64,
    pub conversions: u64,
    pub impressions: u64,
    pub clicks: u64,
    pub roas: f64,
    pub cpa: f64,
}

#[derive(Debug, Clone, Copy, Default)]
struct Totals {
    spend: f64,
    revenue: f64,
    conversions: u64,
    impressions: u64,
    clicks: u64,
}

impl Totals {
    fn add(&mut self, record: &PerformanceRecord) {
        self.spend += record.spend;
        self.revenue += record.revenue;
        self.conversions += record.conversions;
        self.impressions += record.impressions;
        self.clicks += record.clicks;
    }

    fn into_row(self, key: GroupKey) -> AggregateRow {
        AggregateRow {
            key,
            spend: self.spend,
            revenue: self.revenue,
            conversions: self.conversions,
            impressions: self.impressions,
            clicks: self.clicks,
            roas: roas(self.revenue, self.spend),
            cpa: cpa(self.spend, self.conversions),
        }
    }
}

/// Group `records` by `dims` and sum each group. Groups come back in
/// ascending key order. With no dimensions the result is a single
/// grand-total row, even for an empty input.
pub fn aggregate<I>(records: I, dims: &[Dimension]) -> Vec<AggregateRow>
where
    I: IntoIterator,
    I::Item: Borrow<PerformanceRecord>,
{
    let mut dims_seen: Vec<Dimension> = Vec::with_capacity(dims.len());
    for dim in dims {
        if !dims_seen.contains(dim) {
            dims_seen.push(*dim);
        }
    }

    let mut groups: BTreeMap<GroupKey, Totals> = BTreeMap::new();
    if dims_seen.is_empty() {
        groups.insert(GroupKey::default(), Totals::default());
    }
    for record in records {
        let record = record.borrow();
        groups
            .entry(GroupKey::of(record, &dims_seen))
            .or_default()
            .add(record);
    }

    groups
        .into_iter()
        .map(|(key, totals)| totals.into_row(key))
        .collect()
}

/// Metric used to order aggregated rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RankMetric {
    Roas,
    Cpa,
}

impl RankMetric {
    pub fn value(&self, row: &AggregateRow) -> f64 {
        match self {
            RankMetric::Roas => row.roas,
            RankMetric::Cpa => row.cpa,
        }
    }
}

/// Top `n` rows by `metric`, highest first. Equal values keep their group
/// order.
pub fn rank(rows: &[AggregateRow], metric: RankMetric, n: usize) -> Vec<AggregateRow> {
    let mut ranked = rows.to_vec();
    ranked.sort_by(|a, b| metric.value(b).total_cmp(&metric.value(a)));
    ranked.truncate(n);
    ranked
}

/// Historical ROAS per channel from rows that carry a channel key.
pub fn roas_by_channel(rows: &[AggregateRow]) -> BTreeMap<Channel, f64> {
    rows.iter()
        .filter_map(|row| row.key.channel().map(|c| (c, row.roas)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(
        day: u32,
        campaign: &str,
        channel: Channel,
        spend: f64,
        revenue: f64,
        conversions: u64,
    ) -> PerformanceRecord {
        PerformanceRecord {
            date: NaiveDate::from_ymd_opt(2025, 1, day).unwrap(),
            campaign_id: campaign.to_string(),
            campaign_name: campaign.to_string(),
            channel,
            impressions: 1_000,
            clicks: 50,
            spend,
            conversions,
            revenue,
        }
    }

    fn records() -> Vec<PerformanceRecord> {
        vec![
            record(1, "Travel Rewards", Channel::GoogleSearch, 300.0, 900.0, 6),
            record(1, "Viral Creative V1", Channel::TikTokAds, 100.0, 150.0, 2),
            record(1, "Weekly Newsletter", Channel::Email, 50.0, 600.0, 10),
            record(2, "Travel Rewards", Channel::GoogleSearch, 200.0, 100.0, 0),
            record(2, "Viral Creative V1", Channel::TikTokAds, 0.0, 0.0, 0),
            record(2, "Weekly Newsletter", Channel::Email, 50.0, 600.0, 10),
        ]
    }

    // 1. Grouping -----------------------------------------------------------

    #[test]
    fn test_group_by_channel_sorted_by_label() {
        let rows = aggregate(&records(), &[Dimension::Channel]);
        let channels: Vec<_> = rows.iter().filter_map(|r| r.key.channel()).collect();
        assert_eq!(
            channels,
            vec![Channel::Email, Channel::GoogleSearch, Channel::TikTokAds]
        );

        let google = &rows[1];
        assert_eq!(google.spend, 500.0);
        assert_eq!(google.revenue, 1_000.0);
        assert_eq!(google.conversions, 6);
        assert_eq!(google.impressions, 2_000);
        assert!((google.roas - 2.0).abs() < 1e-9);
        assert!((google.cpa - 500.0 / 6.0).abs() < 1e-9);
    }

    #[test]
    fn test_ratios_use_summed_totals() {
        // Per-row ROAS would average 3.0 and 0.5; pooled ROAS is 2.0.
        let rows = aggregate(&records(), &[Dimension::Channel]);
        let google = rows
            .iter()
            .find(|r| r.key.channel() == Some(Channel::GoogleSearch))
            .unwrap();
        assert!((google.roas - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_group_by_date() {
        let rows = aggregate(&records(), &[Dimension::Date]);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].key.date(), NaiveDate::from_ymd_opt(2025, 1, 1));
        assert_eq!(rows[0].spend, 450.0);
        assert_eq!(rows[1].revenue, 700.0);
    }

    #[test]
    fn test_group_by_campaign_carries_channel() {
        let rows = aggregate(&records(), &[Dimension::Campaign]);
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].key.campaign_name(), Some("Travel Rewards"));
        assert_eq!(rows[0].key.channel(), Some(Channel::GoogleSearch));
        assert_eq!(rows[0].key.label(), "Travel Rewards / Google Search");
    }

    #[test]
    fn test_multiple_dimensions_and_duplicates() {
        let rows = aggregate(
            &records(),
            &[Dimension::Channel, Dimension::Date, Dimension::Channel],
        );
        assert_eq!(rows.len(), 6);
        assert_eq!(rows[0].key.channel(), Some(Channel::Email));
        assert_eq!(rows[0].key.0.len(), 2);
    }

    #[test]
    fn test_no_dimensions_is_grand_total() {
        let rows = aggregate(&records(), &[]);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].key.label(), "Total");
        assert_eq!(rows[0].spend, 700.0);

        let empty = aggregate(Vec::<PerformanceRecord>::new(), &[]);
        assert_eq!(empty.len(), 1);
        assert_eq!(empty[0].roas, 0.0);
        assert_eq!(empty[0].cpa, 0.0);
    }

    #[test]
    fn test_channel_sums_decompose_total() {
        let rows = aggregate(&records(), &[Dimension::Channel]);
        let by_channel: f64 = rows.iter().map(|r| r.spend).sum();
        let total: f64 = records().iter().map(|r| r.spend).sum();
        assert!((by_channel - total).abs() < 1e-9);
    }

    // 2. Zero guards --------------------------------------------------------

    #[test]
    fn test_zero_spend_group_has_zero_roas() {
        let only_zero = vec![record(2, "Viral Creative V1", Channel::TikTokAds, 0.0, 0.0, 0)];
        let rows = aggregate(&only_zero, &[Dimension::Channel]);
        assert_eq!(rows[0].roas, 0.0);
        assert_eq!(rows[0].cpa, 0.0);
        assert!(rows[0].roas.is_finite());
    }

    // 3. Ranking ------------------------------------------------------------

    #[test]
    fn test_rank_by_roas_descending() {
        let rows = aggregate(&records(), &[Dimension::Campaign]);
        let top = rank(&rows, RankMetric::Roas, 2);
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].key.campaign_name(), Some("Weekly Newsletter"));
        assert_eq!(top[1].key.campaign_name(), Some("Travel Rewards"));
    }

    #[test]
    fn test_rank_by_cpa_descending() {
        let rows = aggregate(&records(), &[Dimension::Campaign]);
        let top = rank(&rows, RankMetric::Cpa, 10);
        assert_eq!(top.len(), 3);
        assert_eq!(top[0].key.campaign_name(), Some("Travel Rewards"));
    }

    #[test]
    fn test_rank_ties_keep_group_order() {
        let tied = vec![
            record(1, "B", Channel::Email, 10.0, 20.0, 1),
            record(1, "A", Channel::Email, 10.0, 20.0, 1),
            record(1, "C", Channel::Email, 10.0, 20.0, 1),
        ];
        let rows = aggregate(&tied, &[Dimension::Campaign]);
        let names: Vec<_> = rank(&rows, RankMetric::Roas, 3)
            .iter()
            .map(|r| r.key.campaign_name().unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["A", "B", "C"]);
    }

    #[test]
    fn test_roas_lookup_by_channel() {
        let rows = aggregate(&records(), &[Dimension::Channel]);
        let lookup = roas_by_channel(&rows);
        assert_eq!(lookup.len(), 3);
        assert!((lookup[&Channel::Email] - 12.0).abs() < 1e-9);
        assert!((lookup[&Channel::TikTokAds] - 1.5).abs() < 1e-9);
    }
}
