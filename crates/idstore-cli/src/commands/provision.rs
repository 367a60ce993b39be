use anyhow::Result;
use idstore_cosmos::{CollectionName, CosmosDbConfig, CosmosStorage};

use crate::output::{print_field, print_success};

pub async fn provision(config: &CosmosDbConfig, dry_run: bool) -> Result<()> {
    print_field("Database", config.database_name());
    for collection in CollectionName::ALL {
        print_field(
            collection.container_id(),
            format!(
                "partition {} / {} RU/s",
                collection.partition_key_path(),
                config.reserve_units_for(collection)
            ),
        );
    }
    if dry_run {
        return Ok(());
    }

    let storage = CosmosStorage::connect(config).await?;
    print_success(&format!("Storage ready in database {}", storage.database()));
    Ok(())
}
