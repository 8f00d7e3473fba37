//! Configuration model loaded from external sources.

use std::time::Duration;

use serde::Deserialize;

use crate::view_model::ListSettings;

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
/// Settings of the API client and the list views it feeds.
pub struct ClientConfig {
    pub api_base_url: String,
    pub timeout_secs: u64,
    pub debounce_ms: u64,
    pub stale_time_secs: u64,
    /// Idle time after which a cached list is dropped.
    pub gc_time_secs: u64,
    /// Bearer token sent with every request.
    pub api_token: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://127.0.0.1:8000".to_string(),
            timeout_secs: 30,
            debounce_ms: 350,
            stale_time_secs: 30,
            gc_time_secs: 300,
            api_token: None,
        }
    }
}

impl ClientConfig {
    pub fn list_settings(&self) -> ListSettings {
        ListSettings {
            debounce: Duration::from_millis(self.debounce_ms),
            stale_time: Duration::from_secs(self.stale_time_secs),
        }
    }

    pub fn gc_time(&self) -> Duration {
        Duration::from_secs(self.gc_time_secs)
    }
}

#[cfg(feature = "http")]
impl ClientConfig {
    /// Reads `config/default.yaml` (or the file named by `TPKA_CONFIG`), then
    /// `TPKA__*` environment overrides.
    pub fn load() -> Result<Self, config::ConfigError> {
        let path = std::env::var("TPKA_CONFIG").unwrap_or_else(|_| "config/default".into());

        config::Config::builder()
            .add_source(config::File::with_name(&path).required(false))
            .add_source(config::Environment::with_prefix("TPKA").separator("__"))
            .build()?
            .try_deserialize()
    }
}
