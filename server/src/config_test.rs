use super::*;

/// # Safety
/// Callers hold `ENV_LOCK`.
unsafe fn clear_server_env() {
    unsafe {
        std::env::remove_var("PORT");
        std::env::remove_var("GOOGLE_API_KEY");
        std::env::remove_var("CORS_ORIGINS");
    }
}

#[test]
fn from_env_defaults() {
    let _env = ENV_LOCK.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
    unsafe { clear_server_env() };

    let cfg = ServerConfig::from_env();
    assert_eq!(cfg.port, DEFAULT_PORT);
    assert!(cfg.google_api_key.is_none());
    assert_eq!(cfg.cors_origins, vec!["http://localhost:3000".to_string()]);
}

#[test]
fn from_env_reads_overrides() {
    let _env = ENV_LOCK.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
    unsafe {
        clear_server_env();
        std::env::set_var("PORT", "9100");
        std::env::set_var("GOOGLE_API_KEY", "maps-key");
        std::env::set_var("CORS_ORIGINS", "http://localhost:3000/, https://trips.example.com ,");
    }

    let cfg = ServerConfig::from_env();
    assert_eq!(cfg.port, 9100);
    assert_eq!(cfg.google_api_key.as_deref(), Some("maps-key"));
    assert_eq!(cfg.cors_origins, vec!["http://localhost:3000".to_string(), "https://trips.example.com".to_string()]);

    unsafe { clear_server_env() };
}

#[test]
fn invalid_port_falls_back() {
    let _env = ENV_LOCK.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
    unsafe {
        clear_server_env();
        std::env::set_var("PORT", "not-a-port");
        std::env::set_var("GOOGLE_API_KEY", "   ");
    }

    let cfg = ServerConfig::from_env();
    assert_eq!(cfg.port, DEFAULT_PORT);
    assert!(cfg.google_api_key.is_none());

    unsafe { clear_server_env() };
}
