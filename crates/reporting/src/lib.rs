//! Campaign analytics over the stored performance records: filters,
//! grouped aggregation with ROAS/CPA, ranking, the budget simulator, and
//! the dashboard views built from them.

pub mod aggregate;
pub mod budget;
pub mod dashboard;
pub mod filter;

pub use aggregate::{
    aggregate, rank, roas_by_channel, AggregateRow, Dimension, GroupKey, KeyPart, RankMetric,
};
pub use budget::{
    baseline_allocation, project_budget, recommend_shift, BudgetProjection, BudgetShift,
    BudgetSimulator, SimulationOutcome, BASELINE_ALLOCATION,
};
pub use dashboard::{DashboardView, ExecutiveSummary};
pub use filter::{filter_by_channels, ChannelSelection, RecordFilter, Selection};
