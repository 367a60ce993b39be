//! Authorization server store traits over the document stores.

use idstore_core::{
    ApiResource, Client, ClientStore, IdentityResource, PersistedGrant, PersistedGrantStore,
    ResourceStore, Scope,
};
use idstore_cosmos::entities::{ApiResourceEntity, ClientEntity, IdentityResourceEntity};
use idstore_cosmos::{CosmosDbConfig, CosmosStorage};
use time::{Duration, OffsetDateTime};

async fn storage() -> CosmosStorage {
    CosmosStorage::connect(&CosmosDbConfig::memory())
        .await
        .unwrap()
}

fn persisted(key: &str, client: &str, subject: &str, kind: &str, data: &str) -> PersistedGrant {
    PersistedGrant {
        key: key.into(),
        grant_type: kind.into(),
        subject_id: subject.into(),
        client_id: client.into(),
        creation_time: OffsetDateTime::now_utc(),
        expiration: Some(OffsetDateTime::now_utc() + Duration::days(1)),
        data: data.into(),
    }
}

// ---- Clients ----

#[tokio::test]
async fn add_client_twice_yields_two_documents() {
    let storage = storage().await;
    let config = storage.configuration();

    let first = config
        .add_client(ClientEntity::from(&Client::new("web")))
        .await
        .unwrap();
    let mut other = Client::new("web");
    other.description = Some("duplicate".into());
    let second = config.add_client(ClientEntity::from(&other)).await.unwrap();

    assert_ne!(first.id, second.id);
    let all = config.query_clients(Some("web")).fetch_all().await.unwrap();
    assert_eq!(all.len(), 2);
}

#[tokio::test]
async fn find_client_by_id() {
    let storage = storage().await;
    let mut client = Client::new("web");
    client.allowed_scopes = vec!["openid".into()];
    storage
        .configuration()
        .add_client(ClientEntity::from(&client))
        .await
        .unwrap();

    let store = storage.client_store();
    assert_eq!(store.find_client_by_id("web").await.unwrap(), Some(client));
    assert_eq!(store.find_client_by_id("missing").await.unwrap(), None);
}

// ---- Resources ----

async fn seeded_resources() -> CosmosStorage {
    let storage = storage().await;
    let config = storage.configuration();

    for resource in [
        IdentityResource::new("openid", ["sub"]),
        IdentityResource::new("profile", ["name"]),
        IdentityResource::new("email", ["email"]),
    ] {
        config
            .add_identity_resource(IdentityResourceEntity::from(&resource))
            .await
            .unwrap();
    }

    let mut orders = ApiResource::new("orders");
    orders.scopes.push(Scope::new("orders.read"));
    for resource in [orders, ApiResource::new("billing")] {
        config
            .add_api_resource(ApiResourceEntity::from(&resource))
            .await
            .unwrap();
    }
    storage
}

#[tokio::test]
async fn identity_resources_by_scope() {
    let store = seeded_resources().await.resource_store();

    let mut names: Vec<String> = store
        .find_identity_resources_by_scope(&["openid".into(), "email".into(), "api".into()])
        .await
        .unwrap()
        .into_iter()
        .map(|r| r.name)
        .collect();
    names.sort();
    assert_eq!(names, vec!["email", "openid"]);

    assert!(
        store
            .find_identity_resources_by_scope(&[])
            .await
            .unwrap()
            .is_empty()
    );
}

#[tokio::test]
async fn api_resources_by_nested_scope() {
    let store = seeded_resources().await.resource_store();

    let found = store
        .find_api_resources_by_scope(&["orders.read".into()])
        .await
        .unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].name, "orders");

    let found = store
        .find_api_resources_by_scope(&["billing".into(), "orders".into()])
        .await
        .unwrap();
    assert_eq!(found.len(), 2);
}

#[tokio::test]
async fn api_resource_by_name_and_all_resources() {
    let store = seeded_resources().await.resource_store();

    let billing = store.find_api_resource("billing").await.unwrap().unwrap();
    assert_eq!(billing.scopes[0].name, "billing");
    assert!(store.find_api_resource("nope").await.unwrap().is_none());

    let all = store.get_all_resources().await.unwrap();
    assert_eq!(all.identity_resources.len(), 3);
    assert_eq!(all.api_resources.len(), 2);
    assert!(all.scope_names().contains("orders.read"));
}

// ---- Persisted grants ----

#[tokio::test]
async fn store_inserts_then_updates_by_key() {
    let storage = storage().await;
    let store = storage.persisted_grant_store();

    store
        .store(&persisted("k1", "web", "alice", "refresh_token", "v1"))
        .await
        .unwrap();
    store
        .store(&persisted("k1", "web", "alice", "refresh_token", "v2"))
        .await
        .unwrap();

    let all = store.get_all("alice").await.unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].data, "v2");
}

#[tokio::test]
async fn store_conflict_becomes_update() {
    let storage = storage().await;
    let store = storage.persisted_grant_store();

    store
        .store(&persisted("old", "web", "alice", "user_consent", "v1"))
        .await
        .unwrap();
    // New key, same (client, subject, type) slot.
    store
        .store(&persisted("new", "web", "alice", "user_consent", "v2"))
        .await
        .unwrap();

    assert!(store.get("old").await.unwrap().is_none());
    let current = store.get("new").await.unwrap().unwrap();
    assert_eq!(current.data, "v2");
    assert_eq!(store.get_all("alice").await.unwrap().len(), 1);
}

#[tokio::test]
async fn store_moves_grant_to_another_client() {
    let storage = storage().await;
    let store = storage.persisted_grant_store();

    store
        .store(&persisted("k1", "web", "alice", "refresh_token", "v1"))
        .await
        .unwrap();
    store
        .store(&persisted("k1", "spa", "alice", "refresh_token", "v2"))
        .await
        .unwrap();

    let moved = store.get("k1").await.unwrap().unwrap();
    assert_eq!((moved.client_id.as_str(), moved.data.as_str()), ("spa", "v2"));
    assert_eq!(store.get_all("alice").await.unwrap().len(), 1);
}

#[tokio::test]
async fn store_moving_into_occupied_slot_updates_holder() {
    let storage = storage().await;
    let store = storage.persisted_grant_store();

    store
        .store(&persisted("k1", "web", "alice", "refresh_token", "v1"))
        .await
        .unwrap();
    store
        .store(&persisted("k2", "spa", "alice", "refresh_token", "v2"))
        .await
        .unwrap();
    // k1 moves to spa, whose (spa, alice, refresh_token) slot k2 holds.
    store
        .store(&persisted("k1", "spa", "alice", "refresh_token", "v3"))
        .await
        .unwrap();

    let current = store.get("k1").await.unwrap().unwrap();
    assert_eq!((current.client_id.as_str(), current.data.as_str()), ("spa", "v3"));
    assert!(store.get("k2").await.unwrap().is_none());

    let all = store.get_all("alice").await.unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].key, "k1");
}

#[tokio::test]
async fn concurrent_stores_keep_one_document() {
    let storage = storage().await;

    let tasks: Vec<_> = (0..8)
        .map(|i| {
            let store = storage.persisted_grant_store();
            tokio::spawn(async move {
                store
                    .store(&persisted("k", "web", "alice", "refresh_token", &format!("v{i}")))
                    .await
            })
        })
        .collect();
    for task in tasks {
        task.await.unwrap().unwrap();
    }

    let store = storage.persisted_grant_store();
    assert_eq!(store.get_all("alice").await.unwrap().len(), 1);
    assert!(store.get("k").await.unwrap().is_some());
}

#[tokio::test]
async fn remove_all_of_type_through_trait() {
    let storage = storage().await;
    let store = storage.persisted_grant_store();

    store.store(&persisted("1", "web", "alice", "refresh_token", "")).await.unwrap();
    store.store(&persisted("2", "web", "alice", "user_consent", "")).await.unwrap();

    store
        .remove_all_of_type("alice", "web", "refresh_token")
        .await
        .unwrap();
    assert!(store.get("1").await.unwrap().is_none());
    assert!(store.get("2").await.unwrap().is_some());

    store.remove_all("alice", "web").await.unwrap();
    assert!(store.get_all("alice").await.unwrap().is_empty());
}
