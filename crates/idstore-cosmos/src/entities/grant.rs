use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use super::{Document, timestamp};

/// Stored grant document (container `persistedGrants`, partition `/clientId`).
///
/// `(clientId, subjectId, type)` is unique within the container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedGrantEntity {
    #[serde(default)]
    pub id: String,
    pub key: String,
    #[serde(rename = "type")]
    pub grant_type: String,
    pub subject_id: String,
    pub client_id: String,
    #[serde(with = "timestamp")]
    pub creation_time: OffsetDateTime,
    /// Absent for grants that never expire.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "timestamp::option"
    )]
    pub expiration: Option<OffsetDateTime>,
    pub data: String,
}

impl PersistedGrantEntity {
    /// Returns `true` if the grant expired strictly before `now`.
    pub fn is_expired_at(&self, now: OffsetDateTime) -> bool {
        self.expiration.is_some_and(|exp| exp < now)
    }
}

impl Document for PersistedGrantEntity {
    fn id(&self) -> &str {
        &self.id
    }
    fn set_id(&mut self, id: String) {
        self.id = id;
    }
    fn partition_key(&self) -> &str {
        &self.client_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use time::macros::datetime;

    #[test]
    fn test_document_shape() {
        let entity = PersistedGrantEntity {
            id: "0b6c".into(),
            key: "abc".into(),
            grant_type: "refresh_token".into(),
            subject_id: "alice".into(),
            client_id: "web".into(),
            creation_time: datetime!(2024-01-01 00:00 UTC),
            expiration: None,
            data: "{}".into(),
        };
        let value = serde_json::to_value(&entity).unwrap();
        assert_eq!(value["type"], "refresh_token");
        assert_eq!(value["creationTime"], "2024-01-01T00:00:00.0000000Z");
        assert!(value.get("expiration").is_none());
    }

    #[test]
    fn test_backend_metadata_ignored() {
        let entity: PersistedGrantEntity = serde_json::from_value(json!({
            "id": "1",
            "key": "abc",
            "type": "user_consent",
            "subjectId": "alice",
            "clientId": "web",
            "creationTime": "2024-01-01T00:00:00.0000000Z",
            "expiration": "2024-01-02T00:00:00.0000000Z",
            "data": "{}",
            "_rid": "x", "_self": "y", "_etag": "\"z\"", "_ts": 1704067200
        }))
        .unwrap();
        assert_eq!(entity.expiration, Some(datetime!(2024-01-02 00:00 UTC)));
        assert!(entity.is_expired_at(datetime!(2024-01-03 00:00 UTC)));
        assert!(!entity.is_expired_at(datetime!(2024-01-02 00:00 UTC)));
    }
}
