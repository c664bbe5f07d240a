//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor. Both
//! upstream clients are optional: the server starts without credentials and
//! the endpoints that need a missing client answer 500 with a `detail`
//! naming the missing variable.

use std::sync::Arc;

use crate::llm::LlmChat;
use crate::maps::MapsApi;

#[derive(Clone, Default)]
pub struct AppState {
    /// `None` if LLM env vars are not configured.
    pub llm: Option<Arc<dyn LlmChat>>,
    /// `None` if `GOOGLE_API_KEY` is not set.
    pub maps: Option<Arc<dyn MapsApi>>,
}

impl AppState {
    #[must_use]
    pub fn new(llm: Option<Arc<dyn LlmChat>>, maps: Option<Arc<dyn MapsApi>>) -> Self {
        Self { llm, maps }
    }
}
