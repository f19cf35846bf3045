//! Line-oriented SQL console. Each line is one query or a `:` command;
//! rejected queries and bad command arguments are reported and the session
//! carries on.

use campaign_core::config::AppConfig;
use campaign_core::types::{Channel, PerformanceRecord};
use campaign_core::{InsightsError, InsightsResult};
use campaign_reporting::{
    BudgetSimulator, ChannelSelection, DashboardView, RecordFilter, Selection,
};
use campaign_store::DatasetCache;
use std::collections::BTreeMap;
use std::io::{BufRead, Write};
use tracing::info;

use crate::render;

const PROMPT: &str = "sql> ";

const HELP: &str = "\
Query marketing_performance (one statement per line)
  :channels [label,...]                  filter the dashboard by channel (empty = all)
  :budget <channel>=<amount>[,...]       move budget sliders (empty = defaults)
  :browse [channels=..] [campaigns=..]   list raw rows
  :reload  :quit";

/// Dashboard controls that persist across console commands.
#[derive(Debug, Clone)]
pub struct Session {
    pub selection: ChannelSelection,
    pub allocations: BTreeMap<Channel, f64>,
}

impl Session {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            selection: ChannelSelection::All,
            allocations: config.simulator.default_allocations(),
        }
    }

    pub fn view(
        &self,
        records: &[PerformanceRecord],
        config: &AppConfig,
    ) -> InsightsResult<DashboardView> {
        DashboardView::build(records, &self.selection, &self.allocations, config)
    }
}

pub fn run<R: BufRead, W: Write>(
    cache: &mut DatasetCache,
    session: &mut Session,
    config: &AppConfig,
    input: R,
    out: &mut W,
) -> anyhow::Result<()> {
    writeln!(out, "\n{HELP}")?;
    write!(out, "{PROMPT}")?;
    out.flush()?;

    for line in input.lines() {
        let line = line?;
        let command = line.trim();
        let (name, args) = command
            .split_once(char::is_whitespace)
            .map_or((command, ""), |(name, args)| (name, args.trim()));

        match name {
            "" => {}
            ":quit" | ":q" => break,
            ":reload" => {
                let dataset = cache.reload()?;
                let view = session.view(&dataset, config)?;
                write!(out, "{}", render::dashboard(&view, config)?)?;
            }
            ":channels" => match ChannelSelection::from_labels(&split_list(args)) {
                Ok(selection) => {
                    info!(selection = ?selection, "Channel filter changed");
                    session.selection = selection;
                    let dataset = cache.dataset()?;
                    let view = session.view(&dataset, config)?;
                    write!(out, "{}", render::dashboard(&view, config)?)?;
                }
                Err(e) => writeln!(out, "{e}")?,
            },
            ":budget" => match budget_update(&session.allocations, args, config) {
                Ok(allocations) => {
                    info!(allocations = ?allocations, "Budget sliders moved");
                    session.allocations = allocations;
                    let dataset = cache.dataset()?;
                    let view = session.view(&dataset, config)?;
                    write!(out, "{}", render::simulator(&view)?)?;
                }
                Err(e) => writeln!(out, "{e}")?,
            },
            ":browse" => match browse_filter(args) {
                Ok(filter) => {
                    let dataset = cache.dataset()?;
                    let rows = filter.apply(&dataset);
                    writeln!(out, "Showing {} rows", rows.len())?;
                    write!(out, "{}", render::query_table(&render::records_table(rows))?)?;
                }
                Err(e) => writeln!(out, "{e}")?,
            },
            _ => match cache.store().run_query(command) {
                Ok(table) => {
                    info!(rows = table.row_count(), "Query executed");
                    writeln!(out, "Returned {} rows", table.row_count())?;
                    write!(out, "{}", render::query_table(&table)?)?;
                }
                Err(e @ InsightsError::MalformedQuery(_)) => {
                    writeln!(out, "{e}")?;
                }
                Err(e) => return Err(e.into()),
            },
        }

        write!(out, "{PROMPT}")?;
        out.flush()?;
    }

    writeln!(out)?;
    Ok(())
}

/// Comma-separated values with blanks dropped.
fn split_list(args: &str) -> Vec<&str> {
    args.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .collect()
}

/// Apply `channel=amount` pairs to `current`. Only channels that have a
/// slider can be moved, and the result must pass slider validation. No
/// pairs restores the configured defaults.
fn budget_update(
    current: &BTreeMap<Channel, f64>,
    args: &str,
    config: &AppConfig,
) -> InsightsResult<BTreeMap<Channel, f64>> {
    let pairs = split_list(args);
    if pairs.is_empty() {
        return Ok(config.simulator.default_allocations());
    }

    let mut allocations = current.clone();
    for pair in pairs {
        let (label, amount) = pair.split_once('=').ok_or_else(|| {
            InsightsError::Config(format!("expected <channel>=<amount>, got '{pair}'"))
        })?;
        let channel: Channel = label.trim().parse()?;
        let amount = amount.trim();
        let amount: f64 = amount.parse().map_err(|_| {
            InsightsError::Config(format!("{channel} budget '{amount}' is not a number"))
        })?;
        let slot = allocations
            .get_mut(&channel)
            .ok_or_else(|| InsightsError::Config(format!("{channel} has no budget slider")))?;
        *slot = amount;
    }

    BudgetSimulator::from_config(&config.simulator).validate(&allocations)?;
    Ok(allocations)
}

/// `channels=a,b campaigns=x,y`, either part optional. Labels may contain
/// spaces, so each value list runs up to the next key.
fn browse_filter(args: &str) -> InsightsResult<RecordFilter> {
    const KEYS: [&str; 2] = ["channels=", "campaigns="];

    let mut found: Vec<(usize, &str)> = KEYS
        .into_iter()
        .filter_map(|key| args.find(key).map(|at| (at, key)))
        .collect();
    found.sort_unstable();

    let leading = found.first().map_or(args, |&(at, _)| &args[..at]);
    if !leading.trim().is_empty() {
        return Err(InsightsError::Config(format!(
            "unexpected browse argument '{}'",
            leading.trim()
        )));
    }

    let mut filter = RecordFilter::default();
    for (i, &(at, key)) in found.iter().enumerate() {
        let end = found.get(i + 1).map_or(args.len(), |&(next, _)| next);
        let values = split_list(&args[at + key.len()..end]);
        if key == "channels=" {
            filter.channels = ChannelSelection::from_labels(&values)?;
        } else {
            filter.campaigns = Selection::from_selected(values.into_iter().map(String::from));
        }
    }
    Ok(filter)
}

#[cfg(test)]
mod tests {
    use super::*;
    use campaign_core::types::{Channel, PerformanceRecord};
    use campaign_store::MarketingStore;
    use chrono::NaiveDate;

    fn record(
        campaign_id: &str,
        campaign_name: &str,
        channel: Channel,
        spend: f64,
        revenue: f64,
    ) -> PerformanceRecord {
        PerformanceRecord {
            date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            campaign_id: campaign_id.to_string(),
            campaign_name: campaign_name.to_string(),
            channel,
            impressions: 20_000,
            clicks: 400,
            spend,
            conversions: 10,
            revenue,
        }
    }

    fn seeded_cache(dir: &tempfile::TempDir) -> DatasetCache {
        let store = MarketingStore::new(dir.path().join("marketing.db"));
        let records = [
            record("CMP-001", "Brand Search", Channel::GoogleSearch, 1_000.0, 3_000.0),
            record("CMP-003", "Retargeting - Site Visitors", Channel::FacebookAds, 1_000.0, 1_500.0),
            record("CMP-005", "Viral Challenge", Channel::TikTokAds, 1_000.0, 2_000.0),
            record("CMP-007", "Weekly Newsletter", Channel::Email, 50.0, 30_750.0),
        ];
        store.replace_all(&records).unwrap();
        DatasetCache::new(store)
    }

    fn run_script(cache: &mut DatasetCache, state: &mut Session, script: &str) -> String {
        let mut out = Vec::new();
        run(cache, state, &AppConfig::default(), script.as_bytes(), &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    fn session(cache: &mut DatasetCache, script: &str) -> String {
        let mut state = Session::new(&AppConfig::default());
        run_script(cache, &mut state, script)
    }

    #[test]
    fn test_query_prints_rows() {
        let dir = tempfile::tempdir().unwrap();
        let mut cache = seeded_cache(&dir);
        let output = session(
            &mut cache,
            "SELECT channel, SUM(spend) AS total_spend FROM marketing_performance GROUP BY channel\n",
        );
        assert!(output.contains("Returned 4 rows"), "{output}");
        assert!(output.contains("total_spend"));
        assert!(output.contains("Email"));
    }

    #[test]
    fn test_bad_query_does_not_end_session() {
        let dir = tempfile::tempdir().unwrap();
        let mut cache = seeded_cache(&dir);
        let output = session(
            &mut cache,
            "SELECT nope FROM marketing_performance\nSELECT COUNT(*) FROM marketing_performance\n",
        );
        assert!(output.contains("SQL error"), "{output}");
        assert!(output.contains("no such column"));
        assert!(output.contains("Returned 1 rows"));
    }

    #[test]
    fn test_quit_stops_reading() {
        let dir = tempfile::tempdir().unwrap();
        let mut cache = seeded_cache(&dir);
        let output = session(&mut cache, ":quit\nSELECT 1\n");
        assert!(!output.contains("Returned"));
    }

    #[test]
    fn test_reload_rerenders_dashboard() {
        let dir = tempfile::tempdir().unwrap();
        let mut cache = seeded_cache(&dir);
        let output = session(&mut cache, ":reload\n");
        assert!(cache.is_loaded());
        assert!(output.contains("Executive Summary"), "{output}");
    }

    #[test]
    fn test_multiple_statements_are_reported() {
        let dir = tempfile::tempdir().unwrap();
        let mut cache = seeded_cache(&dir);
        let output = session(
            &mut cache,
            "SELECT 1; DROP TABLE marketing_performance\n;\nSELECT COUNT(*) FROM marketing_performance\n",
        );
        assert!(output.contains("one statement at a time"), "{output}");
        assert!(output.contains("SQL error: empty query"));
        assert!(output.contains("Returned 1 rows"));
        assert_eq!(cache.store().row_count().unwrap(), 4);
    }

    #[test]
    fn test_channels_command_filters_dashboard() {
        let dir = tempfile::tempdir().unwrap();
        let mut cache = seeded_cache(&dir);
        let mut state = Session::new(&AppConfig::default());

        let output = run_script(&mut cache, &mut state, ":channels Google Search, TikTok Ads\n");

        assert_eq!(
            state.selection,
            ChannelSelection::from_selected([Channel::GoogleSearch, Channel::TikTokAds])
        );
        assert!(output.contains("Executive Summary"), "{output}");
        assert!(output.contains("Total Spend              $2,000"), "{output}");

        let output = run_script(&mut cache, &mut state, ":channels\n");
        assert_eq!(state.selection, ChannelSelection::All);
        assert!(output.contains("Total Spend              $3,050"), "{output}");
    }

    #[test]
    fn test_channels_command_rejects_unknown_label() {
        let dir = tempfile::tempdir().unwrap();
        let mut cache = seeded_cache(&dir);
        let mut state = Session::new(&AppConfig::default());

        let output = run_script(&mut cache, &mut state, ":channels Myspace\n");

        assert!(output.contains("unknown channel 'Myspace'"), "{output}");
        assert_eq!(state.selection, ChannelSelection::All);
        assert!(!output.contains("Executive Summary"));
    }

    #[test]
    fn test_budget_command_moves_slider() {
        let dir = tempfile::tempdir().unwrap();
        let mut cache = seeded_cache(&dir);
        let mut state = Session::new(&AppConfig::default());

        let output = run_script(&mut cache, &mut state, ":budget Google Search=20000\n");

        assert_eq!(state.allocations[&Channel::GoogleSearch], 20_000.0);
        assert_eq!(state.allocations[&Channel::FacebookAds], 10_000.0);
        assert!(output.contains("Budget Allocator (Simulator)"), "{output}");
        assert!(!output.contains("Executive Summary"));
        // Google ROAS 3.0: 5,000 more budget is 15,000 more revenue.
        assert!(output.contains("($15,000 vs Baseline)"), "{output}");

        run_script(&mut cache, &mut state, ":budget\n");
        assert_eq!(state.allocations, AppConfig::default().simulator.default_allocations());
    }

    #[test]
    fn test_budget_command_rejects_invalid_allocation() {
        let dir = tempfile::tempdir().unwrap();
        let mut cache = seeded_cache(&dir);
        let mut state = Session::new(&AppConfig::default());
        let defaults = state.allocations.clone();

        let output = run_script(
            &mut cache,
            &mut state,
            ":budget TikTok Ads=1500\n:budget Facebook Ads=60000\n:budget Email=1000\n:budget Google Search\n",
        );

        assert!(output.contains("not a multiple of 1000"), "{output}");
        assert!(output.contains("outside 0..=50000"), "{output}");
        assert!(output.contains("Email has no budget slider"), "{output}");
        assert!(output.contains("expected <channel>=<amount>"), "{output}");
        assert!(!output.contains("Budget Allocator"));
        assert_eq!(state.allocations, defaults);
    }

    #[test]
    fn test_browse_command_filters_rows() {
        let dir = tempfile::tempdir().unwrap();
        let mut cache = seeded_cache(&dir);

        let output = session(&mut cache, ":browse\n");
        assert!(output.contains("Showing 4 rows"), "{output}");

        let output = session(
            &mut cache,
            ":browse channels=Google Search, Facebook Ads campaigns=Retargeting - Site Visitors\n",
        );
        assert!(output.contains("Showing 1 rows"), "{output}");
        assert!(output.contains("CMP-003"));
        assert!(!output.contains("CMP-001"));

        let output = session(&mut cache, ":browse campaigns=Weekly Newsletter\n");
        assert!(output.contains("Showing 1 rows"), "{output}");
        assert!(output.contains("CMP-007"));
    }

    #[test]
    fn test_browse_command_rejects_bad_arguments() {
        let dir = tempfile::tempdir().unwrap();
        let mut cache = seeded_cache(&dir);
        let output = session(&mut cache, ":browse everything\n:browse channels=Fax\n");
        assert!(output.contains("unexpected browse argument 'everything'"), "{output}");
        assert!(output.contains("unknown channel 'Fax'"), "{output}");
        assert!(!output.contains("Showing"));
    }
}
