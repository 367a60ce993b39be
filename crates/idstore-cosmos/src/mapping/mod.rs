//! Conversions between domain types and stored entities.
//!
//! Domain to entity leaves `id` empty; ids are assigned when a document is
//! first inserted. Entity to domain drops the id. Nested entity lists are
//! flattened to plain string lists and enum codes are decoded, with unknown
//! codes falling back to the domain default.

mod client;
mod grant;
mod resource;

use idstore_core::Secret;

use crate::entities::{PropertyEntity, SecretEntity, UserClaimEntity};
use std::collections::BTreeMap;

impl From<&Secret> for SecretEntity {
    fn from(secret: &Secret) -> Self {
        Self {
            description: secret.description.clone(),
            value: secret.value.clone(),
            expiration: secret.expiration,
            secret_type: secret.secret_type.clone(),
        }
    }
}

impl From<SecretEntity> for Secret {
    fn from(entity: SecretEntity) -> Self {
        Self {
            value: entity.value,
            description: entity.description,
            expiration: entity.expiration,
            secret_type: entity.secret_type,
        }
    }
}

pub(crate) fn user_claims_to_entities(claims: &[String]) -> Vec<UserClaimEntity> {
    claims
        .iter()
        .map(|claim_type| UserClaimEntity {
            claim_type: claim_type.clone(),
        })
        .collect()
}

pub(crate) fn user_claims_from_entities(claims: Vec<UserClaimEntity>) -> Vec<String> {
    claims.into_iter().map(|c| c.claim_type).collect()
}

pub(crate) fn properties_to_entities(properties: &BTreeMap<String, String>) -> Vec<PropertyEntity> {
    properties
        .iter()
        .map(|(key, value)| PropertyEntity {
            key: key.clone(),
            value: value.clone(),
        })
        .collect()
}

/// Later duplicates of a key win.
pub(crate) fn properties_from_entities(
    properties: Vec<PropertyEntity>,
) -> BTreeMap<String, String> {
    properties.into_iter().map(|p| (p.key, p.value)).collect()
}
