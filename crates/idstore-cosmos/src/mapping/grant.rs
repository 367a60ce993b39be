use idstore_core::PersistedGrant;

use crate::entities::PersistedGrantEntity;

impl From<&PersistedGrant> for PersistedGrantEntity {
    fn from(grant: &PersistedGrant) -> Self {
        Self {
            id: String::new(),
            key: grant.key.clone(),
            grant_type: grant.grant_type.clone(),
            subject_id: grant.subject_id.clone(),
            client_id: grant.client_id.clone(),
            creation_time: grant.creation_time,
            expiration: grant.expiration,
            data: grant.data.clone(),
        }
    }
}

impl From<PersistedGrantEntity> for PersistedGrant {
    fn from(entity: PersistedGrantEntity) -> Self {
        Self {
            key: entity.key,
            grant_type: entity.grant_type,
            subject_id: entity.subject_id,
            client_id: entity.client_id,
            creation_time: entity.creation_time,
            expiration: entity.expiration,
            data: entity.data,
        }
    }
}

impl PersistedGrantEntity {
    /// Copies every grant field onto this entity, keeping its id.
    pub fn apply(&mut self, grant: &PersistedGrant) {
        let id = std::mem::take(&mut self.id);
        *self = Self::from(grant);
        self.id = id;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::OffsetDateTime;

    #[test]
    fn test_apply_keeps_id() {
        let grant = PersistedGrant {
            key: "k".into(),
            grant_type: "refresh_token".into(),
            subject_id: "alice".into(),
            client_id: "web".into(),
            creation_time: OffsetDateTime::UNIX_EPOCH,
            expiration: None,
            data: "v1".into(),
        };
        let mut entity = PersistedGrantEntity::from(&grant);
        assert!(entity.id.is_empty());
        entity.id = "doc-1".into();

        let updated = PersistedGrant {
            data: "v2".into(),
            ..grant
        };
        entity.apply(&updated);
        assert_eq!(entity.id, "doc-1");
        assert_eq!(entity.data, "v2");
        assert_eq!(PersistedGrant::from(entity), updated);
    }
}
