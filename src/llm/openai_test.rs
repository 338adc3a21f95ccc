use super::*;

fn to_json<T: Serialize>(value: &T) -> Value {
    serde_json::to_value(value).unwrap()
}

// =============================================================================
// chat completions
// =============================================================================

#[test]
fn cc_parse_text_response() {
    let json = serde_json::json!({
        "model": "gpt-4o",
        "choices": [{ "message": { "role": "assistant", "content": "Olá!" }, "finish_reason": "stop" }],
        "usage": { "prompt_tokens": 10, "completion_tokens": 5 }
    })
    .to_string();
    let resp = parse_chat_completions_response(&json).unwrap();
    assert_eq!(resp.text(), "Olá!");
    assert_eq!(resp.stop_reason, "end_turn");
    assert_eq!(resp.input_tokens, 10);
    assert_eq!(resp.output_tokens, 5);
}

#[test]
fn cc_parse_tool_call() {
    let json = serde_json::json!({
        "model": "gpt-4o",
        "choices": [{
            "message": {
                "role": "assistant",
                "content": null,
                "tool_calls": [{
                    "id": "call_1",
                    "type": "function",
                    "function": { "name": "createTransaction", "arguments": "{\"amount\":50}" }
                }]
            },
            "finish_reason": "tool_calls"
        }]
    })
    .to_string();
    let resp = parse_chat_completions_response(&json).unwrap();
    assert_eq!(resp.stop_reason, "tool_use");
    assert!(matches!(
        &resp.content[0],
        ContentBlock::ToolUse { id, name, input } if id == "call_1" && name == "createTransaction" && input["amount"] == 50
    ));
}

#[test]
fn cc_parse_length_is_max_tokens() {
    let json = serde_json::json!({
        "choices": [{ "message": { "content": "cut" }, "finish_reason": "length" }]
    })
    .to_string();
    assert_eq!(parse_chat_completions_response(&json).unwrap().stop_reason, "max_tokens");
}

#[test]
fn cc_parse_missing_choices() {
    let json = serde_json::json!({ "model": "gpt-4o", "choices": [] }).to_string();
    assert!(matches!(parse_chat_completions_response(&json), Err(LlmError::ApiParse(_))));
}

#[test]
fn cc_messages_put_system_first_and_split_tool_results() {
    let messages = vec![
        Message::user("gastei 10 no almoço"),
        Message {
            role: "assistant".into(),
            content: Content::Blocks(vec![ContentBlock::ToolUse {
                id: "call_1".into(),
                name: "createTransaction".into(),
                input: serde_json::json!({"amount": 10}),
            }]),
        },
        Message::user_blocks(vec![ContentBlock::ToolResult {
            tool_use_id: "call_1".into(),
            content: "ok".into(),
            is_error: None,
        }]),
    ];
    let out = to_json(&build_chat_messages("sys", &messages).unwrap());
    assert_eq!(out[0], serde_json::json!({ "role": "system", "content": "sys" }));
    assert_eq!(out[1]["content"], "gastei 10 no almoço");
    assert_eq!(out[2]["tool_calls"][0]["function"]["name"], "createTransaction");
    assert!(out[2].get("content").is_none());
    assert_eq!(out[3], serde_json::json!({ "role": "tool", "content": "ok", "tool_call_id": "call_1" }));
}

#[test]
fn cc_messages_map_media_to_parts() {
    let messages = vec![Message::user_blocks(vec![
        ContentBlock::Text { text: "leia".into() },
        ContentBlock::Image { source: MediaSource::base64("image/png", "IMG") },
        ContentBlock::Audio { source: MediaSource::base64("audio/mpeg", "AUD") },
    ])];
    let out = to_json(&build_chat_messages("", &messages).unwrap());
    let parts = &out[0]["content"];
    assert_eq!(parts[0], serde_json::json!({ "type": "text", "text": "leia" }));
    assert_eq!(parts[1]["image_url"]["url"], "data:image/png;base64,IMG");
    assert_eq!(parts[2], serde_json::json!({ "type": "input_audio", "input_audio": { "data": "AUD", "format": "mp3" } }));
}

#[test]
fn audio_format_from_mime() {
    assert_eq!(audio_format(&MediaSource::base64("audio/x-wav", "")), "wav");
    assert_eq!(audio_format(&MediaSource::base64("audio/mp3", "")), "mp3");
    assert_eq!(audio_format(&MediaSource::base64("audio/webm", "")), "webm");
}

// =============================================================================
// responses API
// =============================================================================

#[test]
fn resp_parse_text_response() {
    let json = serde_json::json!({
        "model": "gpt-4o",
        "output": [
            { "type": "reasoning", "summary": [] },
            { "type": "message", "content": [{ "type": "output_text", "text": "Pronto!" }] }
        ],
        "usage": { "input_tokens": 15, "output_tokens": 8 }
    })
    .to_string();
    let resp = parse_responses_response(&json).unwrap();
    assert_eq!(resp.content.len(), 1);
    assert_eq!(resp.text(), "Pronto!");
    assert_eq!(resp.stop_reason, "end_turn");
}

#[test]
fn resp_parse_function_call() {
    let json = serde_json::json!({
        "output": [{ "type": "function_call", "call_id": "fc_1", "name": "createTransaction", "arguments": "{}" }]
    })
    .to_string();
    let resp = parse_responses_response(&json).unwrap();
    assert_eq!(resp.stop_reason, "tool_use");
    assert!(matches!(&resp.content[0], ContentBlock::ToolUse { id, .. } if id == "fc_1"));
}

#[test]
fn resp_parse_output_text_fallback() {
    let json = serde_json::json!({ "output_text": "Fallback" }).to_string();
    assert_eq!(parse_responses_response(&json).unwrap().text(), "Fallback");
}

#[test]
fn resp_parse_incomplete_is_max_tokens() {
    let json = serde_json::json!({
        "output": [],
        "incomplete_details": { "reason": "max_output_tokens" }
    })
    .to_string();
    assert_eq!(parse_responses_response(&json).unwrap().stop_reason, "max_tokens");
}

#[test]
fn resp_input_maps_images_and_rejects_audio() {
    let image = vec![Message::user_blocks(vec![ContentBlock::Image { source: MediaSource::base64("image/jpeg", "X") }])];
    let out = to_json(&build_responses_input(&image).unwrap());
    assert_eq!(out[0]["content"][0], serde_json::json!({ "type": "input_image", "image_url": "data:image/jpeg;base64,X" }));

    let audio = vec![Message::user_blocks(vec![ContentBlock::Audio { source: MediaSource::base64("audio/wav", "X") }])];
    assert!(matches!(build_responses_input(&audio), Err(LlmError::UnsupportedInput(_))));
}
