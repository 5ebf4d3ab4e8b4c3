//! Process configuration from the environment.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use crate::routing::OrsConfig;

const DEFAULT_STATIONS_FILE: &str = "data/stations.json";
const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";
const DEFAULT_REFRESH_SECS: u64 = 5 * 60;

/// Error reading process configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} is not set")]
    Missing(&'static str),

    #[error("{name}={value:?} is invalid: {reason}")]
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },
}

/// Everything `main` needs to start serving.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub ors: OrsConfig,
    /// Station snapshot to load at start-up and on every refresh.
    pub stations_file: PathBuf,
    /// How often to reload the snapshot. `None` disables reloading.
    pub station_refresh: Option<Duration>,
    /// Live status older than this counts as missing.
    pub station_max_age: Option<chrono::Duration>,
    pub bind_addr: SocketAddr,
}

impl ServerConfig {
    /// Read configuration from process environment variables.
    ///
    /// | Variable | Default |
    /// |---|---|
    /// | `ORS_API_KEY` | required |
    /// | `ORS_BASE_URL` | public OpenRouteService endpoint |
    /// | `STATIONS_FILE` | `data/stations.json` |
    /// | `STATION_REFRESH_SECS` | 300, `0` disables reloading |
    /// | `STATION_MAX_AGE_SECS` | unset: live data never goes stale |
    /// | `BIND_ADDR` | `127.0.0.1:3000` |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read configuration through `lookup`, which maps a variable name to
    /// its value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let api_key = get("ORS_API_KEY").ok_or(ConfigError::Missing("ORS_API_KEY"))?;
        let mut ors = OrsConfig::new(api_key);
        if let Some(url) = get("ORS_BASE_URL") {
            ors = ors.with_base_url(url);
        }

        let stations_file = get("STATIONS_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_STATIONS_FILE));

        let station_refresh = match get("STATION_REFRESH_SECS") {
            Some(value) => parse_secs("STATION_REFRESH_SECS", &value)?,
            None => DEFAULT_REFRESH_SECS,
        };
        let station_refresh = (station_refresh > 0).then(|| Duration::from_secs(station_refresh));

        let station_max_age = get("STATION_MAX_AGE_SECS")
            .map(|value| {
                let secs = parse_secs("STATION_MAX_AGE_SECS", &value)?;
                i64::try_from(secs)
                    .ok()
                    .and_then(chrono::Duration::try_seconds)
                    .ok_or_else(|| invalid("STATION_MAX_AGE_SECS", &value, "out of range"))
            })
            .transpose()?;

        let bind_value = get("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind_value
            .parse()
            .map_err(|e: std::net::AddrParseError| invalid("BIND_ADDR", &bind_value, e))?;

        Ok(Self {
            ors,
            stations_file,
            station_refresh,
            station_max_age,
            bind_addr,
        })
    }
}

fn parse_secs(name: &'static str, value: &str) -> Result<u64, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|e: std::num::ParseIntError| invalid(name, value, e))
}

fn invalid(name: &'static str, value: &str, reason: impl ToString) -> ConfigError {
    ConfigError::Invalid {
        name,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}
