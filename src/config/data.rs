//! The configuration structs used to build the AppConfig, and their impls.

use secrecy::SecretString;
use serde::Deserialize;
use strum_macros::AsRefStr;

use crate::config::ConfigError;

// ###################################
// ->   STRUCTS
// ###################################
#[derive(AsRefStr)]
pub enum Environment {
    Local,
    Production,
}

#[derive(Deserialize, Clone, Debug)]
pub struct AppConfig {
    pub net_config: NetConfig,
    pub store_config: StoreConfig,
}

#[derive(Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct NetConfig {
    pub host: [u8; 4],
    pub app_port: u16,
}

/// Where Signup Records live: an external hosted tabular API.
/// The file-sourced part names the service and the table; the credentials
/// (`api_key`, `base_id`) are filled in from the environment after loading
/// and stay `None` when the variables are unset.
#[derive(Deserialize, Clone, Debug)]
pub struct StoreConfig {
    pub url: String,
    pub table: String,
    pub timeout_millis: u64,

    #[serde(default)]
    pub api_key: Option<SecretString>,
    #[serde(default)]
    pub base_id: Option<String>,
}

// ###################################
// ->   IMPLs
// ###################################
impl StoreConfig {
    pub fn timeout(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.timeout_millis)
    }

    /// Both credentials, or `None` if either is missing.
    pub fn credentials(&self) -> Option<(SecretString, String)> {
        match (&self.api_key, &self.base_id) {
            (Some(api_key), Some(base_id)) => Some((api_key.clone(), base_id.clone())),
            _ => None,
        }
    }
}

// ###################################
// ->   TRY FROMs
// ###################################
impl TryFrom<String> for Environment {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.to_ascii_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "production" => Ok(Self::Production),
            _ => Err(Self::Error::StringToEnvironmentFail),
        }
    }
}
