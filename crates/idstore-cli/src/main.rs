mod cli;
mod commands;
mod config;
mod observability;
mod output;

use anyhow::{Context, Result};
use clap::Parser;

use cli::{Cli, Commands};
use config::loader::load_config;
use output::print_error;

#[tokio::main]
async fn main() {
    if let Err(e) = dotenvy::dotenv() {
        // A missing .env file is fine
        if !matches!(e, dotenvy::Error::Io(ref io_err) if io_err.kind() == std::io::ErrorKind::NotFound) {
            eprintln!("Warning: Failed to load .env file: {e}");
        }
    }

    if let Err(e) = run().await {
        print_error(&format!("{e:#}"));
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    let mut cfg = load_config(&cli.config)
        .map_err(anyhow::Error::msg)
        .with_context(|| format!("loading {}", cli.config.display()))?;

    let level = cli.log_level.as_deref().unwrap_or(&cfg.logging.level);
    observability::init_tracing_with_level(level);
    tracing::debug!(path = %cli.config.display(), "Configuration loaded");

    match &cli.command {
        Commands::Provision(args) => {
            commands::provision::provision(&cfg.cosmos, args.dry_run).await?;
        }
        Commands::Migrate(args) => {
            let source_url = args
                .source_url
                .as_deref()
                .or(cfg.migration.source_url.as_deref())
                .context("no source database; pass --source-url or set migration.source_url")?;
            commands::migrate::migrate(&cfg.cosmos, source_url).await?;
        }
        Commands::Seed(args) => {
            commands::seed::seed(&cfg.cosmos, &args.file).await?;
        }
        Commands::Sweep => {
            commands::grants::sweep(&cfg.cosmos).await?;
        }
        Commands::Cleanup(args) => {
            if let Some(interval_secs) = args.interval_secs {
                cfg.cleanup.interval_secs = interval_secs;
                cfg.cleanup.validate().map_err(anyhow::Error::msg)?;
            }
            commands::grants::cleanup(&cfg.cosmos, cfg.cleanup.clone()).await?;
        }
        Commands::Config => {
            print!("{}", toml::to_string_pretty(&cfg.redacted())?);
        }
    }

    Ok(())
}
