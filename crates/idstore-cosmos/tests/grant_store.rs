//! Grant store contract, exercised on the in-memory backend.

use idstore_cosmos::entities::PersistedGrantEntity;
use idstore_cosmos::{CosmosDbConfig, CosmosStorage, GrantStore};
use time::{Duration, OffsetDateTime};

async fn grants() -> GrantStore {
    CosmosStorage::connect(&CosmosDbConfig::memory())
        .await
        .unwrap()
        .grants()
}

fn grant(
    key: &str,
    client: &str,
    subject: &str,
    kind: &str,
    expiration: Option<OffsetDateTime>,
) -> PersistedGrantEntity {
    PersistedGrantEntity {
        id: String::new(),
        key: key.into(),
        grant_type: kind.into(),
        subject_id: subject.into(),
        client_id: client.into(),
        creation_time: OffsetDateTime::now_utc(),
        expiration,
        data: format!("{{\"key\":\"{key}\"}}"),
    }
}

#[tokio::test]
async fn add_then_get_returns_same_grant() {
    let store = grants().await;
    let expiration = Some(OffsetDateTime::now_utc() + Duration::hours(1));
    let input = grant("abc", "web", "alice", "refresh_token", expiration);

    let stored = store.add(input.clone()).await.unwrap();
    assert!(!stored.id.is_empty());

    let found = store.get("abc").await.unwrap().expect("grant present");
    assert_eq!(found.key, input.key);
    assert_eq!(found.client_id, input.client_id);
    assert_eq!(found.subject_id, input.subject_id);
    assert_eq!(found.grant_type, input.grant_type);
    assert_eq!(found.data, input.data);
    // Stored with 100ns precision.
    let delta = found.expiration.unwrap() - input.expiration.unwrap();
    assert!(delta.abs() < Duration::microseconds(1));
}

#[tokio::test]
async fn same_client_subject_type_conflicts() {
    let store = grants().await;
    store
        .add(grant("a", "web", "alice", "refresh_token", None))
        .await
        .unwrap();

    let err = store
        .add(grant("b", "web", "alice", "refresh_token", None))
        .await
        .unwrap_err();
    assert!(err.is_conflict());

    store
        .add(grant("c", "web", "bob", "refresh_token", None))
        .await
        .unwrap();
}

#[tokio::test]
async fn remove_then_get_is_none() {
    let store = grants().await;
    store
        .add(grant("a", "web", "alice", "refresh_token", None))
        .await
        .unwrap();

    store.remove("a").await.unwrap();
    assert!(store.get("a").await.unwrap().is_none());

    store.remove("never-existed").await.unwrap();
    assert!(store.get("never-existed").await.unwrap().is_none());
}

#[tokio::test]
async fn remove_all_touches_only_matching_pair() {
    let store = grants().await;
    store.add(grant("1", "web", "alice", "refresh_token", None)).await.unwrap();
    store.add(grant("2", "web", "alice", "user_consent", None)).await.unwrap();
    store.add(grant("3", "web", "bob", "refresh_token", None)).await.unwrap();
    store.add(grant("4", "spa", "alice", "refresh_token", None)).await.unwrap();

    assert_eq!(store.remove_all("alice", "web").await.unwrap(), 2);

    assert!(store.get("1").await.unwrap().is_none());
    assert!(store.get("2").await.unwrap().is_none());
    assert!(store.get("3").await.unwrap().is_some());
    assert!(store.get("4").await.unwrap().is_some());

    assert_eq!(store.remove_all("alice", "web").await.unwrap(), 0);
}

#[tokio::test]
async fn get_all_spans_clients() {
    let store = grants().await;
    store.add(grant("1", "web", "alice", "refresh_token", None)).await.unwrap();
    store.add(grant("2", "spa", "alice", "refresh_token", None)).await.unwrap();
    store.add(grant("3", "spa", "bob", "refresh_token", None)).await.unwrap();

    let mut keys: Vec<String> = store
        .get_all("alice")
        .await
        .unwrap()
        .into_iter()
        .map(|g| g.key)
        .collect();
    keys.sort();
    assert_eq!(keys, vec!["1", "2"]);
    assert!(store.get_all("carol").await.unwrap().is_empty());
}

#[tokio::test]
async fn sweep_removes_exactly_expired_grants() {
    let store = grants().await;
    let now = OffsetDateTime::now_utc();

    store
        .add(grant("a", "c1", "s1", "refresh_token", Some(now - Duration::hours(1))))
        .await
        .unwrap();
    store
        .add(grant("b", "c1", "s2", "refresh_token", Some(now + Duration::hours(1))))
        .await
        .unwrap();
    store
        .add(grant("c", "c2", "s1", "authorization_code", Some(now - Duration::seconds(30))))
        .await
        .unwrap();

    assert_eq!(store.remove_expired().await.unwrap(), 2);
    assert!(store.get("a").await.unwrap().is_none());
    assert!(store.get("b").await.unwrap().is_some());
    assert!(store.get("c").await.unwrap().is_none());

    assert_eq!(store.remove_expired().await.unwrap(), 0);
    assert!(store.get("b").await.unwrap().is_some());
}
