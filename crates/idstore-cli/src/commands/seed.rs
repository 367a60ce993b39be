use std::path::Path;

use anyhow::{Context, Result};
use idstore_cosmos::{CosmosDbConfig, CosmosStorage, SeedData, ensure_seed_data};

use crate::output::print_success;

pub async fn seed(config: &CosmosDbConfig, file: &Path) -> Result<()> {
    let bytes = std::fs::read(file).with_context(|| format!("reading {}", file.display()))?;
    let data = SeedData::from_json(&bytes).with_context(|| format!("parsing {}", file.display()))?;

    let storage = CosmosStorage::connect(config).await?;
    let report = ensure_seed_data(&storage.configuration(), &data).await?;
    print_success(&format!(
        "Seeded {} clients, {} identity resources, {} API resources",
        report.clients, report.identity_resources, report.api_resources
    ));
    Ok(())
}
