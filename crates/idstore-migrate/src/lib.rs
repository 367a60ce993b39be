//! Migration of configuration data from a relational database
//!
//! Reads clients, API resources and identity resources from an
//! IdentityServer Entity Framework schema and writes them through the
//! configuration store's add operations.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use idstore_migrate::{Migrator, PostgresSource};
//!
//! let source = PostgresSource::connect("postgres://localhost/identityserver").await?;
//! let migrator = Migrator::new(Arc::new(source), storage.configuration());
//! if !migrator.migrate().await {
//!     std::process::exit(1);
//! }
//! ```

pub mod error;
pub mod migrator;
pub mod postgres;
pub mod source;

pub use error::MigrationError;
pub use migrator::{MigrationReport, Migrator};
pub use postgres::{PgPool, PostgresSource};
pub use source::{ConfigurationSource, StaticSource};
