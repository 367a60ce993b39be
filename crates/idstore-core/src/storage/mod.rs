//! Storage traits consumed by the authorization server.
//!
//! This module defines storage interfaces for:
//!
//! - Client lookup by client id
//! - Identity and API resource lookup by scope or name
//! - Persisted grants (store/get/remove)
//!
//! # Implementations
//!
//! Storage implementations are provided in separate crates:
//!
//! - `idstore-cosmos` - partitioned document store backend

pub mod client;
pub mod grant;
pub mod resource;

pub use client::ClientStore;
pub use grant::PersistedGrantStore;
pub use resource::ResourceStore;
