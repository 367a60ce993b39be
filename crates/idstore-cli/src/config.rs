use idstore_cosmos::{CosmosDbConfig, TokenCleanupConfig};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub cosmos: CosmosDbConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub cleanup: TokenCleanupConfig,
    #[serde(default)]
    pub migration: MigrationConfig,
}

impl AppConfig {
    pub fn validate(&self) -> Result<(), String> {
        self.cosmos.validate().map_err(|e| e.to_string())?;
        self.cleanup.validate()?;
        let lvl = self.logging.level.to_ascii_lowercase();
        let valid_levels = ["trace", "debug", "info", "warn", "error", "off"];
        if !valid_levels.contains(&lvl.as_str()) {
            return Err(format!("logging.level must be one of {valid_levels:?}"));
        }
        if self
            .migration
            .source_url
            .as_deref()
            .is_some_and(|u| u.trim().is_empty())
        {
            return Err("migration.source_url must not be empty".into());
        }
        Ok(())
    }

    /// Copy safe to print: the account key is masked.
    pub fn redacted(&self) -> Self {
        let mut cfg = self.clone();
        if cfg.cosmos.primary_key.is_some() {
            cfg.cosmos.primary_key = Some("********".into());
        }
        cfg
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}
fn default_log_level() -> String {
    "info".into()
}
impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct MigrationConfig {
    /// PostgreSQL URL of the IdentityServer database to migrate from.
    #[serde(default)]
    pub source_url: Option<String>,
}

pub mod loader {
    use super::AppConfig;
    use config::{Config, Environment, File};
    use std::path::Path;

    /// Loads the file at `path` if it exists, then applies environment
    /// overrides, e.g. `IDSTORE__COSMOS__DATABASE_NAME=Identity`.
    pub fn load_config(path: &Path) -> Result<AppConfig, String> {
        let mut builder = Config::builder();
        if path.exists() {
            builder = builder.add_source(File::from(path));
        }
        builder = builder.add_source(
            Environment::with_prefix("IDSTORE")
                .try_parsing(true)
                .separator("__"),
        );
        let cfg = builder
            .build()
            .map_err(|e| format!("config build error: {e}"))?;
        let merged: AppConfig = cfg
            .try_deserialize()
            .map_err(|e| format!("config deserialize error: {e}"))?;
        merged.validate()?;
        Ok(merged)
    }
}
