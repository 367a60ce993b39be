use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "idstore")]
#[command(about = "Provision and maintain authorization server document storage")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file (overrides IDSTORE_CONFIG)
    #[arg(short, long, global = true, env = "IDSTORE_CONFIG", default_value = "idstore.toml")]
    pub config: PathBuf,

    /// Log level (overrides logging.level)
    #[arg(short, long, global = true)]
    pub log_level: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create the database and the four containers if they are missing
    Provision(ProvisionArgs),
    /// Copy clients and resources from a relational database
    Migrate(MigrateArgs),
    /// Add configuration records from a JSON file when not yet present
    Seed(SeedArgs),
    /// Delete expired grants once
    Sweep,
    /// Delete expired grants periodically until interrupted
    Cleanup(CleanupArgs),
    /// Print the effective configuration
    Config,
}

#[derive(clap::Args)]
pub struct ProvisionArgs {
    /// Only list the containers that would be provisioned
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(clap::Args)]
pub struct MigrateArgs {
    /// Source database URL (overrides migration.source_url)
    #[arg(long, env = "IDSTORE_MIGRATION_SOURCE_URL")]
    pub source_url: Option<String>,
}

#[derive(clap::Args)]
pub struct SeedArgs {
    /// JSON file with `clients`, `identityResources` and `apiResources`
    #[arg(short, long)]
    pub file: PathBuf,
}

#[derive(clap::Args)]
pub struct CleanupArgs {
    /// Seconds between sweeps (overrides cleanup.interval_secs)
    #[arg(long)]
    pub interval_secs: Option<u64>,
}
