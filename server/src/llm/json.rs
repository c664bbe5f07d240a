//! JSON replies from a chat model.
//!
//! Models wrap JSON in markdown fences often enough that every reply is
//! unfenced before decoding.

use serde::de::DeserializeOwned;
use tracing::debug;

use super::types::{LlmChat, LlmError, Message};

/// Reply budget for the short JSON documents requested here.
pub const JSON_REPLY_MAX_TOKENS: u32 = 1024;

/// Send `prompt` as a single user turn and decode the reply as `T`.
///
/// # Errors
///
/// Propagates transport errors from the provider and returns
/// [`LlmError::ReplyFormat`] when the reply does not decode as `T`.
pub async fn complete_json<T: DeserializeOwned>(llm: &dyn LlmChat, system: &str, prompt: &str) -> Result<T, LlmError> {
    let response = llm
        .chat(JSON_REPLY_MAX_TOKENS, system, &[Message::user(prompt)])
        .await?;
    debug!(model = %response.model, output_tokens = response.output_tokens, "llm: json reply");
    decode_reply(&response.text)
}

/// Decode a model reply, tolerating a markdown fence around the JSON.
///
/// # Errors
///
/// Returns [`LlmError::ReplyFormat`] when the unfenced text is not valid `T`.
pub fn decode_reply<T: DeserializeOwned>(text: &str) -> Result<T, LlmError> {
    serde_json::from_str(strip_fences(text)).map_err(|e| LlmError::ReplyFormat(e.to_string()))
}

#[must_use]
pub fn strip_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

#[cfg(test)]
#[path = "json_test.rs"]
mod tests;
