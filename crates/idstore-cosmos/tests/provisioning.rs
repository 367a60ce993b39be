use std::sync::Arc;

use idstore_cosmos::backend::ContainerLink;
use idstore_cosmos::{CollectionName, CosmosDbConfig, CosmosStorage, InMemoryBackend};

#[tokio::test]
async fn provisions_all_containers_once() {
    let backend = Arc::new(InMemoryBackend::new());
    let config = CosmosDbConfig::memory()
        .with_database_name("auth")
        .with_reserve_units(CollectionName::PersistedGrants, 2500);

    let first = CosmosStorage::with_backend(backend.clone(), &config)
        .await
        .unwrap();
    let second = CosmosStorage::with_backend(backend.clone(), &config)
        .await
        .unwrap();
    assert_eq!(first.database(), "auth");
    assert_eq!(second.database(), "auth");

    for collection in CollectionName::ALL {
        let link = ContainerLink::new("auth", collection.container_id());
        let expected = if collection == CollectionName::PersistedGrants {
            2500
        } else {
            1000
        };
        assert_eq!(backend.container_throughput(&link), Some(expected), "{collection}");
        assert_eq!(
            backend.container_properties(&link),
            Some(collection.container_properties())
        );
    }
}

#[tokio::test]
async fn stores_from_separate_handles_share_data() {
    let backend = Arc::new(InMemoryBackend::new());
    let config = CosmosDbConfig::memory();

    let writer = CosmosStorage::with_backend(backend.clone(), &config)
        .await
        .unwrap();
    let reader = CosmosStorage::with_backend(backend, &config).await.unwrap();

    let seed = idstore_cosmos::SeedData {
        clients: vec![idstore_core::Client::new("web")],
        ..Default::default()
    };
    idstore_cosmos::ensure_seed_data(&writer.configuration(), &seed)
        .await
        .unwrap();

    let clients = reader
        .configuration()
        .query_clients(None)
        .fetch_all()
        .await
        .unwrap();
    assert_eq!(clients.len(), 1);
}
