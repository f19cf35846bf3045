//! What-if budget simulator: linear revenue projection from historical
//! channel ROAS, compared against a fixed reference allocation.

use campaign_core::config::SimulatorConfig;
use campaign_core::metrics::guarded_ratio;
use campaign_core::types::Channel;
use campaign_core::{InsightsError, InsightsResult};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Reference monthly allocation the projection is compared against. Fixed;
/// it does not follow the slider defaults.
pub const BASELINE_ALLOCATION: [(Channel, f64); 3] = [
    (Channel::GoogleSearch, 15_000.0),
    (Channel::FacebookAds, 10_000.0),
    (Channel::TikTokAds, 5_000.0),
];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BudgetProjection {
    pub per_channel_revenue: BTreeMap<Channel, f64>,
    pub total_revenue: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationOutcome {
    pub projection: BudgetProjection,
    pub total_budget: f64,
    pub baseline_revenue: f64,
    /// `projection.total_revenue - baseline_revenue`.
    pub delta_vs_baseline: f64,
    pub revenue_goal: f64,
    /// Share of the revenue goal reached, clamped to `[0, 1]`.
    pub goal_progress: f64,
}

/// Suggested reallocation from the weakest to the strongest channel.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BudgetShift {
    pub from: Channel,
    pub from_roas: f64,
    pub to: Channel,
    pub to_roas: f64,
}

// ---------------------------------------------------------------------------
// Projection
// ---------------------------------------------------------------------------

/// `budget × historical ROAS` per channel. Channels missing from the lookup
/// project zero revenue.
pub fn project_budget(
    allocations: &BTreeMap<Channel, f64>,
    roas_lookup: &BTreeMap<Channel, f64>,
) -> BudgetProjection {
    let per_channel_revenue: BTreeMap<Channel, f64> = allocations
        .iter()
        .map(|(channel, budget)| {
            let roas = roas_lookup.get(channel).copied().unwrap_or(0.0);
            (*channel, budget * roas)
        })
        .collect();
    let total_revenue: f64 = per_channel_revenue.values().sum();

    BudgetProjection {
        per_channel_revenue,
        total_revenue,
    }
}

pub fn baseline_allocation() -> BTreeMap<Channel, f64> {
    BASELINE_ALLOCATION.into_iter().collect()
}

/// Highest- and lowest-ROAS channels among `channels`; `None` when there is
/// nothing to move.
pub fn recommend_shift(
    roas_lookup: &BTreeMap<Channel, f64>,
    channels: impl IntoIterator<Item = Channel>,
) -> Option<BudgetShift> {
    let mut best: Option<(Channel, f64)> = None;
    let mut worst: Option<(Channel, f64)> = None;

    for channel in channels {
        let roas = roas_lookup.get(&channel).copied().unwrap_or(0.0);
        if best.map_or(true, |(_, r)| roas > r) {
            best = Some((channel, roas));
        }
        if worst.map_or(true, |(_, r)| roas < r) {
            worst = Some((channel, roas));
        }
    }

    let ((to, to_roas), (from, from_roas)) = (best?, worst?);
    if to == from || to_roas <= from_roas {
        return None;
    }
    Some(BudgetShift {
        from,
        from_roas,
        to,
        to_roas,
    })
}

// ---------------------------------------------------------------------------
// BudgetSimulator
// ---------------------------------------------------------------------------

/// Slider-bounded simulator.
#[derive(Debug, Clone)]
pub struct BudgetSimulator {
    max_budget: f64,
    step: f64,
    revenue_goal: f64,
}

impl BudgetSimulator {
    pub fn new(max_budget: f64, step: f64, revenue_goal: f64) -> Self {
        Self {
            max_budget,
            step,
            revenue_goal,
        }
    }

    pub fn from_config(config: &SimulatorConfig) -> Self {
        Self::new(config.max_budget, config.step, config.revenue_goal)
    }

    /// Every allocation must sit on a slider notch in `0..=max_budget`.
    pub fn validate(&self, allocations: &BTreeMap<Channel, f64>) -> InsightsResult<()> {
        for (channel, budget) in allocations {
            if !budget.is_finite() || *budget < 0.0 || *budget > self.max_budget {
                return Err(InsightsError::Config(format!(
                    "{channel} budget {budget} outside 0..={}",
                    self.max_budget
                )));
            }
            if self.step > 0.0 && (budget / self.step).fract() != 0.0 {
                return Err(InsightsError::Config(format!(
                    "{channel} budget {budget} is not a multiple of {}",
                    self.step
                )));
            }
        }
        Ok(())
    }

    pub fn simulate(
        &self,
        allocations: &BTreeMap<Channel, f64>,
        roas_lookup: &BTreeMap<Channel, f64>,
    ) -> InsightsResult<SimulationOutcome> {
        self.validate(allocations)?;

        let projection = project_budget(allocations, roas_lookup);
        let baseline_revenue = project_budget(&baseline_allocation(), roas_lookup).total_revenue;
        let total_budget: f64 = allocations.values().sum();
        let goal_progress =
            guarded_ratio(projection.total_revenue, self.revenue_goal).clamp(0.0, 1.0);

        debug!(
            total_budget,
            projected = projection.total_revenue,
            baseline = baseline_revenue,
            "Budget simulation"
        );

        Ok(SimulationOutcome {
            delta_vs_baseline: projection.total_revenue - baseline_revenue,
            projection,
            total_budget,
            baseline_revenue,
            revenue_goal: self.revenue_goal,
            goal_progress,
        })
    }
}

impl Default for BudgetSimulator {
    fn default() -> Self {
        Self::from_config(&SimulatorConfig::default())
    }
}
