//! Campaign Insights: marketing analytics dashboard over the local
//! performance store, rendered as text, followed by an interactive console
//! for ad-hoc SQL, channel filters, budget sliders and the raw data browser.

mod console;
mod render;

use campaign_core::config::AppConfig;
use campaign_store::{DatasetCache, MarketingStore};
use clap::Parser;
use console::Session;
use std::io::{self, Write};
use tracing::{error, info, warn};

#[derive(Parser, Debug)]
#[command(name = "campaign-insights")]
#[command(about = "Marketing performance dashboard and SQL console")]
#[command(version)]
struct Cli {
    /// SQLite store path (overrides config)
    #[arg(long, env = "CAMPAIGN_INSIGHTS__STORE__PATH")]
    store_path: Option<String>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "campaign_insights=info,campaign_store=warn".into()),
        )
        .with_writer(io::stderr)
        .json()
        .init();

    let cli = Cli::parse();

    let mut config = AppConfig::load().unwrap_or_else(|e| {
        warn!(error = %e, "Failed to load config, using defaults");
        AppConfig::default()
    });
    if let Some(path) = cli.store_path {
        config.store.path = path;
    }

    let mut cache = DatasetCache::new(MarketingStore::new(&config.store.path));
    let dataset = match cache.dataset() {
        Ok(dataset) => dataset,
        Err(e) => {
            error!(error = %e, path = %config.store.path, "Error loading database");
            return Err(e.into());
        }
    };
    info!(rows = dataset.len(), "Dashboard data loaded");

    let mut session = Session::new(&config);
    let view = session.view(&dataset, &config)?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    write!(out, "{}", render::dashboard(&view, &config)?)?;

    let schema = cache.store().table_schema()?;
    write!(out, "{}", render::section("Schema"))?;
    write!(out, "{}", render::query_table(&schema)?)?;
    out.flush()?;

    let stdin = io::stdin();
    console::run(&mut cache, &mut session, &config, stdin.lock(), &mut out)?;

    Ok(())
}
