//! Planner configuration parsed from environment variables.

use std::time::Duration;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
/// How long a search requested before the route exists may wait for it.
pub const DEFAULT_ROUTE_WAIT_MS: u64 = 10_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HttpTimeouts {
    pub request: Duration,
    pub connect: Duration,
}

impl Default for HttpTimeouts {
    fn default() -> Self {
        Self {
            request: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            connect: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannerConfig {
    pub api_base_url: String,
    /// Directions credential. `None` leaves route computation to an injected service.
    pub maps_api_key: Option<String>,
    pub timeouts: HttpTimeouts,
    pub route_wait: Duration,
}

impl PlannerConfig {
    /// Build typed planner config from environment variables.
    ///
    /// - `TRIP_API_BASE_URL`: planner backend, default `http://localhost:8000`
    /// - `GOOGLE_MAPS_API_KEY`: directions credential (optional)
    /// - `TRIP_REQUEST_TIMEOUT_SECS`: default 60
    /// - `TRIP_CONNECT_TIMEOUT_SECS`: default 10
    /// - `ROUTE_WAIT_MS`: default 10000
    #[must_use]
    pub fn from_env() -> Self {
        let api_base_url = std::env::var("TRIP_API_BASE_URL")
            .unwrap_or_else(|_| DEFAULT_API_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();
        let maps_api_key = std::env::var("GOOGLE_MAPS_API_KEY")
            .ok()
            .filter(|k| !k.trim().is_empty());
        let timeouts = HttpTimeouts {
            request: Duration::from_secs(env_parse("TRIP_REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS)),
            connect: Duration::from_secs(env_parse("TRIP_CONNECT_TIMEOUT_SECS", DEFAULT_CONNECT_TIMEOUT_SECS)),
        };
        let route_wait = Duration::from_millis(env_parse("ROUTE_WAIT_MS", DEFAULT_ROUTE_WAIT_MS));

        Self { api_base_url, maps_api_key, timeouts, route_wait }
    }
}

pub(crate) fn env_parse<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

/// Serializes tests that read or mutate process environment variables.
#[cfg(test)]
pub(crate) static ENV_LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
