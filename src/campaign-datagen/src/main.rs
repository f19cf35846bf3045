//! Campaign Insights data generator. Synthesizes the marketing performance
//! history, writes the CSV snapshot, and replaces the SQLite store.

use campaign_core::config::AppConfig;
use campaign_generator::{stage_csv, DataGenerator};
use campaign_store::MarketingStore;
use clap::Parser;
use tracing::{error, info, warn};

#[derive(Parser, Debug)]
#[command(name = "campaign-datagen")]
#[command(about = "Generate synthetic marketing performance data")]
#[command(version)]
struct Cli {
    /// SQLite store path (overrides config)
    #[arg(long, env = "CAMPAIGN_INSIGHTS__STORE__PATH")]
    store_path: Option<String>,

    /// CSV snapshot path (overrides config)
    #[arg(long, env = "CAMPAIGN_INSIGHTS__STORE__EXPORT_PATH")]
    export_path: Option<String>,

    /// Random seed for a reproducible dataset (overrides config)
    #[arg(long, env = "CAMPAIGN_INSIGHTS__GENERATOR__SEED")]
    seed: Option<u64>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "campaign_datagen=info,campaign_generator=info,campaign_store=info".into()
            }),
        )
        .with_writer(std::io::stderr)
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
    if let Some(path) = cli.export_path {
        config.store.export_path = path;
    }
    if let Some(seed) = cli.seed {
        config.generator.seed = Some(seed);
    }

    info!(
        start = %config.generator.start_date,
        end = %config.generator.end_date,
        seed = ?config.generator.seed,
        store = %config.store.path,
        "Generating marketing data"
    );

    regenerate(&config)?;
    Ok(())
}

/// Generate, stage the CSV snapshot, replace the store, then publish the
/// snapshot. A failed store replace leaves both the old store and the old
/// snapshot in place.
fn regenerate(config: &AppConfig) -> anyhow::Result<u64> {
    let generator = DataGenerator::new(&config.generator)?;
    let records = generator.generate_seeded(config.generator.seed);
    info!(rows = records.len(), "Generated records");

    let staged = stage_csv(&records, &config.store.export_path)?;

    let store = MarketingStore::new(&config.store.path);
    if let Err(e) = store.replace_all(&records) {
        error!(error = %e, "Failed to load store, previous contents kept");
        return Err(e.into());
    }
    staged.commit()?;

    let count = store.row_count()?;
    info!(rows = count, path = %config.store.path, "Loaded rows into marketing_performance");

    Ok(count)
}
