use super::*;

// ===== chat completions =====

#[test]
fn cc_parse_text_response() {
    let json = serde_json::json!({
        "model": "gpt-4o",
        "choices": [{
            "index": 0,
            "message": { "role": "assistant", "content": "{\"origin\": \"UCSD\"}" },
            "finish_reason": "stop"
        }],
        "usage": { "prompt_tokens": 10, "completion_tokens": 5 }
    })
    .to_string();
    let resp = parse_chat_completions_response(&json).unwrap();
    assert_eq!(resp.text, "{\"origin\": \"UCSD\"}");
    assert_eq!(resp.stop_reason, "end_turn");
    assert_eq!(resp.input_tokens, 10);
    assert_eq!(resp.output_tokens, 5);
}

#[test]
fn cc_parse_length_stop() {
    let json = serde_json::json!({
        "model": "gpt-4o",
        "choices": [{ "message": { "content": "{\"orig" }, "finish_reason": "length" }]
    })
    .to_string();
    let resp = parse_chat_completions_response(&json).unwrap();
    assert_eq!(resp.stop_reason, "max_tokens");
}

#[test]
fn cc_parse_missing_choices() {
    let json = serde_json::json!({ "model": "gpt-4o", "choices": [] }).to_string();
    let err = parse_chat_completions_response(&json).unwrap_err();
    assert!(err.to_string().contains("missing choices[0]"));
}

#[test]
fn cc_messages_prepend_system() {
    let msgs = build_chat_completions_messages("be terse", &[Message::user("hi")]);
    assert_eq!(msgs.len(), 2);
    assert_eq!(msgs[0].role, "system");
    assert_eq!(msgs[1].content, "hi");
}

#[test]
fn cc_messages_skip_blank_system() {
    let msgs = build_chat_completions_messages("  ", &[Message::user("hi")]);
    assert_eq!(msgs.len(), 1);
}

// ===== responses =====

#[test]
fn resp_parse_text_response() {
    let json = serde_json::json!({
        "model": "gpt-4o",
        "output": [{
            "type": "message",
            "content": [{ "type": "output_text", "text": "Done!" }]
        }],
        "usage": { "input_tokens": 15, "output_tokens": 8 }
    })
    .to_string();
    let resp = parse_responses_response(&json).unwrap();
    assert_eq!(resp.text, "Done!");
    assert_eq!(resp.input_tokens, 15);
}

#[test]
fn resp_parse_skips_non_message_items() {
    let json = serde_json::json!({
        "model": "gpt-4o",
        "output": [
            { "type": "reasoning", "summary": [] },
            { "type": "message", "content": [{ "type": "output_text", "text": "ok" }] }
        ]
    })
    .to_string();
    assert_eq!(parse_responses_response(&json).unwrap().text, "ok");
}

#[test]
fn resp_parse_output_text_fallback() {
    let json = serde_json::json!({
        "model": "gpt-4o",
        "output_text": "Fallback text",
        "usage": { "input_tokens": 5, "output_tokens": 3 }
    })
    .to_string();
    assert_eq!(parse_responses_response(&json).unwrap().text, "Fallback text");
}

#[test]
fn resp_parse_truncated() {
    let json = serde_json::json!({
        "model": "gpt-4o",
        "output_text": "{",
        "incomplete_details": { "reason": "max_output_tokens" }
    })
    .to_string();
    assert_eq!(parse_responses_response(&json).unwrap().stop_reason, "max_tokens");
}
