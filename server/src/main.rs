mod config;
mod llm;
mod maps;
mod routes;
mod services;
mod state;
#[cfg(test)]
mod test_helpers;

use std::sync::Arc;

use crate::llm::LlmChat;
use crate::maps::MapsApi;

#[tokio::main]
async fn main() {
    // A missing .env is normal outside development.
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt::init();

    let config = config::ServerConfig::from_env();

    // Both clients are optional: endpoints that need a missing one answer 500.
    let llm: Option<Arc<dyn LlmChat>> = match llm::LlmClient::from_env() {
        Ok(client) => {
            tracing::info!(model = client.model(), "LLM client initialized");
            Some(Arc::new(client))
        }
        Err(e) => {
            tracing::warn!(error = %e, "LLM client not configured; voice and place search disabled");
            None
        }
    };
    let maps: Option<Arc<dyn MapsApi>> = match config.google_api_key.clone() {
        Some(key) => {
            let client = maps::GoogleMapsClient::new(key).expect("maps client init failed");
            Some(Arc::new(client))
        }
        None => {
            tracing::warn!("GOOGLE_API_KEY not set; voice and place search disabled");
            None
        }
    };

    let state = state::AppState::new(llm, maps);
    let app = routes::app(state, &config.cors_origins);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port))
        .await
        .expect("failed to bind");

    tracing::info!(port = config.port, origins = ?config.cors_origins, "trip planner api listening");
    axum::serve(listener, app).await.expect("server failed");
}
