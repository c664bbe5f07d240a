//! Server configuration parsed from environment variables.

pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_CORS_ORIGINS: &str = "http://localhost:3000";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub port: u16,
    /// Google Maps web-service key. `None` disables both endpoints.
    pub google_api_key: Option<String>,
    pub cors_origins: Vec<String>,
}

impl ServerConfig {
    /// Build typed server config from environment variables.
    ///
    /// - `PORT`: default 8000
    /// - `GOOGLE_API_KEY`: Geocoding and Places credential (optional)
    /// - `CORS_ORIGINS`: comma-separated, default `http://localhost:3000`
    #[must_use]
    pub fn from_env() -> Self {
        let port = env_parse("PORT", DEFAULT_PORT);
        let google_api_key = std::env::var("GOOGLE_API_KEY")
            .ok()
            .filter(|k| !k.trim().is_empty());
        let cors_origins = parse_origins(&std::env::var("CORS_ORIGINS").unwrap_or_else(|_| DEFAULT_CORS_ORIGINS.into()));
        Self { port, google_api_key, cors_origins }
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|o| o.trim().trim_end_matches('/'))
        .filter(|o| !o.is_empty())
        .map(str::to_owned)
        .collect()
}

pub(crate) fn env_parse<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse::<T>().ok())
        .unwrap_or(default)
}

/// Serializes tests that mutate process environment variables.
#[cfg(test)]
pub(crate) static ENV_LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
