use idstore_core::{ApiResource, IdentityResource, Scope};

use super::{
    properties_from_entities, properties_to_entities, user_claims_from_entities,
    user_claims_to_entities,
};
use crate::entities::{ApiResourceEntity, ApiScopeEntity, IdentityResourceEntity};

// ===== API resources =====

impl From<&Scope> for ApiScopeEntity {
    fn from(scope: &Scope) -> Self {
        Self {
            name: scope.name.clone(),
            display_name: scope.display_name.clone(),
            description: scope.description.clone(),
            required: scope.required,
            emphasize: scope.emphasize,
            show_in_discovery_document: scope.show_in_discovery_document,
            user_claims: user_claims_to_entities(&scope.user_claims),
        }
    }
}

impl From<ApiScopeEntity> for Scope {
    fn from(entity: ApiScopeEntity) -> Self {
        Self {
            name: entity.name,
            display_name: entity.display_name,
            description: entity.description,
            required: entity.required,
            emphasize: entity.emphasize,
            show_in_discovery_document: entity.show_in_discovery_document,
            user_claims: user_claims_from_entities(entity.user_claims),
        }
    }
}

impl From<&ApiResource> for ApiResourceEntity {
    fn from(resource: &ApiResource) -> Self {
        Self {
            id: String::new(),
            name: resource.name.clone(),
            enabled: resource.enabled,
            display_name: resource.display_name.clone(),
            description: resource.description.clone(),
            secrets: resource.api_secrets.iter().map(Into::into).collect(),
            scopes: resource.scopes.iter().map(Into::into).collect(),
            user_claims: user_claims_to_entities(&resource.user_claims),
            properties: properties_to_entities(&resource.properties),
        }
    }
}

impl From<ApiResourceEntity> for ApiResource {
    fn from(entity: ApiResourceEntity) -> Self {
        Self {
            name: entity.name,
            enabled: entity.enabled,
            display_name: entity.display_name,
            description: entity.description,
            api_secrets: entity.secrets.into_iter().map(Into::into).collect(),
            scopes: entity.scopes.into_iter().map(Into::into).collect(),
            user_claims: user_claims_from_entities(entity.user_claims),
            properties: properties_from_entities(entity.properties),
        }
    }
}

// ===== Identity resources =====

impl From<&IdentityResource> for IdentityResourceEntity {
    fn from(resource: &IdentityResource) -> Self {
        Self {
            id: String::new(),
            name: resource.name.clone(),
            enabled: resource.enabled,
            display_name: resource.display_name.clone(),
            description: resource.description.clone(),
            required: resource.required,
            emphasize: resource.emphasize,
            show_in_discovery_document: resource.show_in_discovery_document,
            user_claims: user_claims_to_entities(&resource.user_claims),
            properties: properties_to_entities(&resource.properties),
        }
    }
}

impl From<IdentityResourceEntity> for IdentityResource {
    fn from(entity: IdentityResourceEntity) -> Self {
        Self {
            name: entity.name,
            enabled: entity.enabled,
            display_name: entity.display_name,
            description: entity.description,
            required: entity.required,
            emphasize: entity.emphasize,
            show_in_discovery_document: entity.show_in_discovery_document,
            user_claims: user_claims_from_entities(entity.user_claims),
            properties: properties_from_entities(entity.properties),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use idstore_core::Secret;

    #[test]
    fn test_api_resource_nesting() {
        let mut api = ApiResource::new("orders");
        api.user_claims = vec!["role".into()];
        api.api_secrets = vec![Secret::shared("hash")];
        api.scopes[0].user_claims = vec!["tenant".into()];
        api.properties.insert("tier".into(), "gold".into());

        let entity = ApiResourceEntity::from(&api);
        let json = serde_json::to_value(&entity).unwrap();
        assert_eq!(json["userClaims"][0]["type"], "role");
        assert_eq!(json["scopes"][0]["userClaims"][0]["type"], "tenant");
        assert_eq!(json["secrets"][0]["type"], "SharedSecret");
        assert_eq!(json["properties"][0]["key"], "tier");

        assert_eq!(ApiResource::from(entity), api);
    }

    #[test]
    fn test_identity_resource_claims() {
        let resource = IdentityResource::new("profile", ["name", "family_name"]);
        let entity = IdentityResourceEntity::from(&resource);
        assert_eq!(entity.user_claims.len(), 2);
        assert_eq!(entity.user_claims[1].claim_type, "family_name");
        assert_eq!(IdentityResource::from(entity), resource);
    }
}
