//! Multiselect-style record filters. An empty selection means "no filter",
//! not "nothing selected".

use campaign_core::types::{Channel, PerformanceRecord};
use campaign_core::InsightsResult;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Selection<T: Ord> {
    All,
    Only(BTreeSet<T>),
}

impl<T: Ord> Default for Selection<T> {
    fn default() -> Self {
        Selection::All
    }
}

impl<T: Ord> Selection<T> {
    /// Selection from a multiselect widget: picking nothing applies no filter.
    pub fn from_selected(items: impl IntoIterator<Item = T>) -> Self {
        let set: BTreeSet<T> = items.into_iter().collect();
        if set.is_empty() {
            Selection::All
        } else {
            Selection::Only(set)
        }
    }

    /// Exact selection. An empty set matches nothing.
    pub fn only(items: impl IntoIterator<Item = T>) -> Self {
        Selection::Only(items.into_iter().collect())
    }

    pub fn allows(&self, value: &T) -> bool {
        match self {
            Selection::All => true,
            Selection::Only(set) => set.contains(value),
        }
    }
}

pub type ChannelSelection = Selection<Channel>;

impl Selection<Channel> {
    /// Parse channel labels such as `"Google Search"`.
    pub fn from_labels<S: AsRef<str>>(labels: &[S]) -> InsightsResult<Self> {
        let channels = labels
            .iter()
            .map(|l| l.as_ref().parse::<Channel>())
            .collect::<InsightsResult<Vec<_>>>()?;
        Ok(Self::from_selected(channels))
    }
}

/// Records whose channel is allowed by `selection`, in input order.
pub fn filter_by_channels<'a>(
    records: &'a [PerformanceRecord],
    selection: &ChannelSelection,
) -> Vec<&'a PerformanceRecord> {
    records
        .iter()
        .filter(|r| selection.allows(&r.channel))
        .collect()
}

/// Channel and campaign-name filters combined, as in the raw data browser.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecordFilter {
    pub channels: Selection<Channel>,
    pub campaigns: Selection<String>,
}

impl RecordFilter {
    pub fn matches(&self, record: &PerformanceRecord) -> bool {
        self.channels.allows(&record.channel) && self.campaigns.allows(&record.campaign_name)
    }

    pub fn apply<'a>(&self, records: &'a [PerformanceRecord]) -> Vec<&'a PerformanceRecord> {
        records.iter().filter(|r| self.matches(r)).collect()
    }
}
