use crate::errors::{Error, Result};
use std::env;

pub const DEFAULT_LATITUDE: f64 = 51.5074;
pub const DEFAULT_LONGITUDE: f64 = -0.1278;
pub const DEFAULT_API_CONN_ID: &str = "open_meteo_api";
pub const DEFAULT_POSTGRES_CONN_ID: &str = "postgres_default";
pub const OPEN_METEO_BASE_URL: &str = "https://api.open-meteo.com";

const CONN_ENV_PREFIX: &str = "ETL_CONN_";

/// Per-run settings handed to every stage.
#[derive(Debug, Clone, PartialEq)]
pub struct EtlConfig {
    pub latitude: f64,
    pub longitude: f64,
    pub api_conn_id: String,
    pub postgres_conn_id: String,
}

impl Default for EtlConfig {
    fn default() -> Self {
        Self {
            latitude: DEFAULT_LATITUDE,
            longitude: DEFAULT_LONGITUDE,
            api_conn_id: DEFAULT_API_CONN_ID.to_string(),
            postgres_conn_id: DEFAULT_POSTGRES_CONN_ID.to_string(),
        }
    }
}

impl EtlConfig {
    pub fn validate(&self) -> Result<()> {
        if !(-90.0..=90.0).contains(&self.latitude) {
            return Err(Error::Config(format!(
                "Latitude {} out of range [-90, 90]",
                self.latitude
            )));
        }

        if !(-180.0..=180.0).contains(&self.longitude) {
            return Err(Error::Config(format!(
                "Longitude {} out of range [-180, 180]",
                self.longitude
            )));
        }

        if self.api_conn_id.trim().is_empty() || self.postgres_conn_id.trim().is_empty() {
            return Err(Error::Config("Connection id cannot be empty".to_string()));
        }

        Ok(())
    }
}

/// Resolves named connection targets to URLs.
///
/// A conn id `foo_bar` is looked up in `ETL_CONN_FOO_BAR`. The environment
/// is read on every [`Connections::resolve`] call, not at construction.
#[derive(Debug, Clone, Default)]
pub struct Connections {
    overrides: Vec<(String, String)>,
}

impl Connections {
    /// Pin a connection id to a fixed URL, ahead of the environment.
    pub fn with(mut self, conn_id: &str, url: impl Into<String>) -> Self {
        self.overrides.push((conn_id.to_string(), url.into()));
        self
    }

    pub fn env_var_name(conn_id: &str) -> String {
        format!("{}{}", CONN_ENV_PREFIX, conn_id.to_uppercase().replace('-', "_"))
    }

    pub fn resolve(&self, conn_id: &str) -> Result<String> {
        if let Some((_, url)) = self.overrides.iter().find(|(id, _)| id == conn_id) {
            return Ok(url.clone());
        }

        let var = Self::env_var_name(conn_id);
        match env::var(&var) {
            Ok(url) if !url.trim().is_empty() => Ok(url),
            _ => Err(Error::Config(format!(
                "Connection '{}' is not configured (set {})",
                conn_id, var
            ))),
        }
    }

    /// Base URL of the weather API, without trailing slash.
    pub fn api_base_url(&self, config: &EtlConfig) -> Result<String> {
        let url = match self.resolve(&config.api_conn_id) {
            Ok(url) => url,
            Err(_) if config.api_conn_id == DEFAULT_API_CONN_ID => OPEN_METEO_BASE_URL.to_string(),
            Err(e) => return Err(e),
        };
        Ok(url.trim_end_matches('/').to_string())
    }

    pub fn database_url(&self, config: &EtlConfig) -> Result<String> {
        self.resolve(&config.postgres_conn_id)
    }
}

/// Strip credentials from a connection URL for logging.
pub fn redact(url: &str) -> &str {
    url.rsplit('@').next().unwrap_or("***")
}
