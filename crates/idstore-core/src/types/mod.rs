//! Domain types consumed by the authorization server.
//!
//! ## Configuration
//!
//! - [`Client`] - OAuth 2.0 / OIDC client registration
//! - [`ApiResource`] and [`Scope`] - protected APIs and the scopes they expose
//! - [`IdentityResource`] - identity scopes (`openid`, `profile`, ...)
//! - [`Resources`] - the union returned by "all resources" lookups
//!
//! ## Runtime state
//!
//! - [`PersistedGrant`] - server-side record behind refresh tokens,
//!   authorization codes, reference tokens and consent

pub mod client;
pub mod grant;
pub mod resource;
pub mod secret;

pub use client::{AccessTokenType, Client, ClientClaim, TokenExpiration, TokenUsage};
pub use grant::PersistedGrant;
pub use resource::{ApiResource, IdentityResource, Resources, Scope};
pub use secret::Secret;
