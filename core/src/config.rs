//! Session configuration shared by every request.
//!
//! Built once, never mutated, and handed to `CarsClient` and
//! `UreqTransport` by reference. `load` layers an optional file and
//! `CARANGAS_*` environment variables over the built-in defaults.

use std::path::Path;
use std::time::Duration;

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use tracing::debug;

pub const DEFAULT_BASE_URL: &str = "https://carangas.herokuapp.com/cars";
pub const DEFAULT_BRANDS_URL: &str = "https://fipeapi.appspot.com/api/1/carros/marcas.json";

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ClientConfig {
    pub base_url: String,
    pub brands_url: String,
    pub timeout_secs: u64,
    pub max_connections_per_host: usize,
    pub content_type: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            brands_url: DEFAULT_BRANDS_URL.to_string(),
            timeout_secs: 10,
            max_connections_per_host: 5,
            content_type: "application/json".to_string(),
        }
    }
}

impl ClientConfig {
    /// Configuration pointing at a different backend, other settings default.
    pub fn with_base_url(base_url: &str) -> Self {
        Self {
            base_url: base_url.to_string(),
            ..Self::default()
        }
    }

    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path).required(true));
        }
        let settings = builder
            .add_source(Environment::with_prefix("CARANGAS").try_parsing(true))
            .build()?;

        let config: ClientConfig = settings.try_deserialize()?;
        debug!(
            base_url = %config.base_url,
            brands_url = %config.brands_url,
            timeout_secs = config.timeout_secs,
            "Loaded client configuration"
        );
        Ok(config)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
