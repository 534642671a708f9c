mod display;
mod input;
mod run;

use clap::{Parser, Subcommand};
use sitedist_geo::CacheStore;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "sitedist")]
#[command(about = "Rank site addresses by driving distance from a reference address")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Geocode the sites and rank them nearest first
    Rank(run::RankArgs),
    /// Show the coordinate cache location and size
    Cache,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = sitedist_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Rank(args) => run::rank(&config, args).await,
        Commands::Cache => {
            let store = CacheStore::load(&config.cache_path);
            println!("{}: {} cached address(es)", store.path().display(), store.len());
            Ok(())
        }
    }
}
