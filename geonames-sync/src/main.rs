use std::sync::Arc;

use anyhow::Error;
use clap::{Parser, Subcommand};
use envconfig::Envconfig;
use geonames_sync::{
    config::Config,
    context::AppContext,
    reconcile::run_daily_cycle,
    seed::SeedPipeline,
    source::file::AlternateNameSource,
    staging::{http::GeonamesDownloads, DownloadService},
    store::TranslationStore,
};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

#[derive(Parser)]
#[command(name = "geonames-sync")]
#[command(about = "Sync GeoNames place-name translations into Postgres")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Clone, Copy)]
enum Command {
    /// Bulk-seed the translation tables from the full alternate names export
    Seed,
    /// Apply the daily modification and deletion feeds
    Update,
    /// Empty the translation tables ahead of a re-seed
    Truncate,
}

fn setup_tracing() {
    let log_layer: tracing_subscriber::filter::Filtered<
        tracing_subscriber::fmt::Layer<tracing_subscriber::Registry>,
        EnvFilter,
        tracing_subscriber::Registry,
    > = tracing_subscriber::fmt::layer().with_filter(EnvFilter::from_default_env());
    tracing_subscriber::registry().with(log_layer).init();
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    setup_tracing();
    let cli = Cli::parse();

    let config = Config::init_from_env().expect("invalid configuration");
    let context = Arc::new(AppContext::new(&config).await?);
    context.clone().spawn_shutdown_listener();

    let scope = config.locale_scope();
    let downloads = GeonamesDownloads::new(&config.geonames_base_url, &config.staging_dir)?;

    for target in config.translation_targets() {
        if !target.enabled {
            info!(table = %target.translation_table, "target disabled, skipping");
            continue;
        }
        let store = TranslationStore::new(context.pool().clone(), target);

        match cli.command {
            Command::Seed => {
                let path = downloads.download_alternate_names().await?;
                let mut source = AlternateNameSource::open(&path).await?;
                let report = SeedPipeline::new(&context, &store, &scope)
                    .seed(&mut source)
                    .await?;
                println!("{}", serde_json::to_string_pretty(&report)?);
            }
            Command::Update => {
                let report = run_daily_cycle(&context, &store, &scope, &downloads).await?;
                println!("{}", serde_json::to_string_pretty(&report)?);
            }
            Command::Truncate => {
                store.truncate().await?;
                info!(table = %store.target().translation_table, "truncated");
            }
        }

        if !context.is_running() {
            break;
        }
    }

    Ok(())
}
