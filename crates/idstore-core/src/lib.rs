//! # idstore-core
//!
//! Domain model and storage contract shared by the authorization server and
//! its persistence backends.
//!
//! This crate provides:
//! - OAuth 2.0 / OpenID Connect configuration types (clients, API resources,
//!   identity resources)
//! - The persisted grant record backing refresh tokens, authorization codes,
//!   reference tokens and consent
//! - Store traits the authorization server consumes
//! - The [`StoreError`] taxonomy every backend reports through
//!
//! ## Modules
//!
//! - [`types`] - Domain types
//! - [`storage`] - Store traits implemented by backends
//! - [`error`] - Error taxonomy

pub mod error;
pub mod storage;
pub mod types;

pub use error::StoreError;
pub use storage::{ClientStore, PersistedGrantStore, ResourceStore};
pub use types::{
    AccessTokenType, ApiResource, Client, ClientClaim, IdentityResource, PersistedGrant,
    Resources, Scope, Secret, TokenExpiration, TokenUsage,
};

/// Result type for storage operations.
pub type StoreResult<T> = Result<T, StoreError>;
