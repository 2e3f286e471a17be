//! Builds the `AppConfig` from layered TOML files plus environment variables.
//! `config/base.toml` is overlaid by the `APP_ENVIRONMENT`-selected file, and
//! the record-store credentials come from the environment only.
//! Gets initialized with `OnceLock` so it only needs to get initialized once.

mod data;
mod error;

use std::sync::OnceLock;

use secrecy::SecretString;
use toml::{Table, Value};
use tracing::info;

// Re-export config structs
pub use data::{AppConfig, Environment, NetConfig, StoreConfig};
pub use error::{ConfigError, ConfigResult};

/// Environment variable holding the record store API key.
pub const STORE_API_KEY_ENV: &str = "STORE_API_KEY";
/// Environment variable holding the record store base identifier.
pub const STORE_BASE_ID_ENV: &str = "STORE_BASE_ID";

/// Allocates a static `OnceLock` containing `AppConfig`.
/// This ensures configuration only gets initialized the first time we call this function.
/// Every other caller gets a &'static ref to AppConfig.
/// Panics if anything goes wrong.
pub fn get_or_init_config() -> &'static AppConfig {
    static CONFIG_INIT: OnceLock<AppConfig> = OnceLock::new();
    CONFIG_INIT.get_or_init(|| {
        info!(
            "{:<20} - Initializing the configuration",
            "get_or_init_config"
        );
        let base_path = std::env::current_dir().expect("Failed to determine the current DIR.");
        let config_dir = base_path.join("config");

        let environment: Environment = std::env::var("APP_ENVIRONMENT")
            .unwrap_or_else(|_| "local".into())
            .try_into()
            .expect("Failed to parse APP_ENVIRONMENT.");
        let environment_filename = format!("{}.toml", environment.as_ref().to_lowercase());

        let mut config = build_from_files(&[
            config_dir.join("base.toml"),
            config_dir.join(environment_filename),
        ])
        .unwrap_or_else(|er| panic!("Fatal Error: Building config: {er}"));

        // The store credentials never live in the config files. Their absence is
        // not fatal here: the intake handler reports it per request instead.
        config.store_config.api_key = std::env::var(STORE_API_KEY_ENV).ok().map(SecretString::from);
        config.store_config.base_id = std::env::var(STORE_BASE_ID_ENV).ok();

        config
    })
}

/// Reads the given TOML files in order, overlaying each one over the previous,
/// and deserializes the merged table into an `AppConfig`.
fn build_from_files(paths: &[std::path::PathBuf]) -> ConfigResult<AppConfig> {
    let mut merged = Table::new();
    for path in paths {
        let content = std::fs::read_to_string(path)?;
        let table: Table = toml::from_str(&content)?;
        overlay_table(&mut merged, table);
    }

    let config = Value::Table(merged).try_into()?;
    Ok(config)
}

/// Overlays `other` over `base`, recursing into tables present in both.
fn overlay_table(base: &mut Table, other: Table) {
    for (key, value) in other {
        match (base.get_mut(&key), value) {
            (Some(Value::Table(base_inner)), Value::Table(other_inner)) => {
                overlay_table(base_inner, other_inner)
            }
            (_, value) => {
                base.insert(key, value);
            }
        }
    }
}
