mod cli;
mod config;
mod glossary;
mod prompt;
mod storage;
mod utils;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use cli::{Cli, Commands};
use config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // A broken config file must not block `config` subcommands that repair it.
    let cfg = match cli.command {
        Commands::Config(_) => Config::default(),
        _ => Config::load()?,
    };

    let default_level = if cfg.general.verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .init();

    match cli.command {
        Commands::Glossary(args) => glossary::commands::run(args, &cfg, cli.store).await?,
        Commands::Prompt(args) => prompt::commands::run(args, &cfg, cli.store).await?,
        Commands::Config(args) => config::commands::run(args, cli.store)?,
    }

    Ok(())
}
