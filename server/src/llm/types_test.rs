use super::*;

#[test]
fn user_message_has_user_role() {
    let msg = Message::user("hi");
    assert_eq!(msg.role, "user");
    assert_eq!(msg.content, "hi");
}

#[test]
fn message_serializes_flat() {
    let json = serde_json::to_value(Message::user("find coffee")).unwrap();
    assert_eq!(json, serde_json::json!({ "role": "user", "content": "find coffee" }));
}

#[test]
fn retryable_covers_transport_and_server_errors() {
    assert!(LlmError::ApiRequest("timeout".into()).retryable());
    assert!(LlmError::ApiResponse { status: 429, body: String::new() }.retryable());
    assert!(LlmError::ApiResponse { status: 503, body: String::new() }.retryable());
    assert!(!LlmError::ApiResponse { status: 400, body: String::new() }.retryable());
    assert!(!LlmError::ReplyFormat("nope".into()).retryable());
}

#[test]
fn missing_key_names_variable() {
    let err = LlmError::MissingApiKey { var: "ANTHROPIC_API_KEY".into() };
    assert_eq!(err.to_string(), "missing API key: env var ANTHROPIC_API_KEY not set");
}
