use std::sync::Arc;

use anyhow::{Context, Result, bail};
use idstore_cosmos::{CosmosDbConfig, CosmosStorage};
use idstore_migrate::{Migrator, PostgresSource};

use crate::output::print_success;

pub async fn migrate(config: &CosmosDbConfig, source_url: &str) -> Result<()> {
    let source = PostgresSource::connect(source_url)
        .await
        .context("connecting to source database")?;
    let storage = CosmosStorage::connect(config).await?;

    let migrator = Migrator::new(Arc::new(source), storage.configuration());
    if !migrator.migrate().await {
        bail!("Migration failed, see log for the cause");
    }
    print_success("Migration completed");
    Ok(())
}
