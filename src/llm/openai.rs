//! OpenAI-compatible API client.
//!
//! Supports `/chat/completions` (text, images, audio) and `/responses`
//! (text, images). Works against any base URL that speaks either dialect.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::config::{LlmTimeouts, OpenAiApiMode};
use super::types::{ChatResponse, Content, ContentBlock, LlmError, MediaSource, Message, Tool};

pub struct OpenAiClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
    mode: OpenAiApiMode,
}

impl OpenAiClient {
    /// # Errors
    ///
    /// Returns `HttpClientBuild` when the TLS client cannot be built.
    pub fn new(api_key: String, mode: OpenAiApiMode, base_url: String, timeouts: LlmTimeouts) -> Result<Self, LlmError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeouts.request_secs))
            .connect_timeout(Duration::from_secs(timeouts.connect_secs))
            .build()
            .map_err(|e| LlmError::HttpClientBuild(e.to_string()))?;
        Ok(Self { http, api_key, base_url, mode })
    }

    pub async fn chat(
        &self,
        model: &str,
        max_tokens: u32,
        system: &str,
        messages: &[Message],
        tools: Option<&[Tool]>,
    ) -> Result<ChatResponse, LlmError> {
        match self.mode {
            OpenAiApiMode::ChatCompletions => {
                let msgs = build_chat_messages(system, messages)?;
                let tool_defs: Option<Vec<CcToolDef<'_>>> = tools.map(|t| t.iter().map(CcToolDef::from).collect());
                let body = CcRequest { model, max_tokens, messages: &msgs, tools: tool_defs.as_deref() };
                let text = self.send_json("/chat/completions", &body).await?;
                parse_chat_completions_response(&text)
            }
            OpenAiApiMode::Responses => {
                let input = build_responses_input(messages)?;
                let tool_defs: Option<Vec<RespToolDef<'_>>> = tools.map(|t| t.iter().map(RespToolDef::from).collect());
                let body = RespRequest {
                    model,
                    max_output_tokens: max_tokens,
                    instructions: system,
                    input: &input,
                    tools: tool_defs.as_deref(),
                };
                let text = self.send_json("/responses", &body).await?;
                parse_responses_response(&text)
            }
        }
    }

    async fn send_json(&self, path: &str, body: &impl Serialize) -> Result<String, LlmError> {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .http
            .post(url)
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| LlmError::ApiRequest(e.to_string()))?;

        let status = response.status().as_u16();
        let text = response.text().await.map_err(|e| LlmError::ApiRequest(e.to_string()))?;
        if status != 200 {
            return Err(LlmError::ApiResponse { status, body: text });
        }
        Ok(text)
    }
}

/// `input_audio.format` from a MIME type: `audio/mpeg` -> `mp3`, `audio/x-wav` -> `wav`.
fn audio_format(source: &MediaSource) -> String {
    let subtype = source
        .media_type
        .split_once('/')
        .map_or(source.media_type.as_str(), |(_, sub)| sub);
    match subtype.trim_start_matches("x-") {
        "mpeg" | "mp3" => "mp3".into(),
        "wave" | "wav" => "wav".into(),
        other => other.to_owned(),
    }
}

fn arguments_json(input: &Value) -> String {
    serde_json::to_string(input).unwrap_or_else(|_| "{}".into())
}

fn parse_arguments(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::Object(serde_json::Map::default()))
}

// =============================================================================
// CHAT COMPLETIONS: REQUEST
// =============================================================================

#[derive(Serialize)]
struct CcRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: &'a [CcMessage],
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<&'a [CcToolDef<'a>]>,
}

#[derive(Serialize)]
struct CcMessage {
    role: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    content: Option<CcContent>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tool_calls: Vec<CcToolCall>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<String>,
}

impl CcMessage {
    fn new(role: &str, content: Option<CcContent>) -> Self {
        Self { role: role.to_owned(), content, tool_calls: Vec::new(), tool_call_id: None }
    }
}

#[derive(Serialize)]
#[serde(untagged)]
enum CcContent {
    Text(String),
    Parts(Vec<CcPart>),
}

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum CcPart {
    Text { text: String },
    ImageUrl { image_url: CcImageUrl },
    InputAudio { input_audio: CcInputAudio },
}

#[derive(Serialize)]
struct CcImageUrl {
    url: String,
}

#[derive(Serialize)]
struct CcInputAudio {
    data: String,
    format: String,
}

#[derive(Serialize)]
struct CcToolCall {
    id: String,
    #[serde(rename = "type")]
    call_type: &'static str,
    function: CcFunctionCall,
}

#[derive(Serialize)]
struct CcFunctionCall {
    name: String,
    arguments: String,
}

#[derive(Serialize)]
struct CcToolDef<'a> {
    #[serde(rename = "type")]
    tool_type: &'static str,
    function: CcFunctionDef<'a>,
}

#[derive(Serialize)]
struct CcFunctionDef<'a> {
    name: &'a str,
    description: &'a str,
    parameters: &'a Value,
}

impl<'a> From<&'a Tool> for CcToolDef<'a> {
    fn from(tool: &'a Tool) -> Self {
        Self {
            tool_type: "function",
            function: CcFunctionDef { name: &tool.name, description: &tool.description, parameters: &tool.input_schema },
        }
    }
}

fn build_chat_messages(system: &str, messages: &[Message]) -> Result<Vec<CcMessage>, LlmError> {
    let mut out = Vec::new();
    if !system.trim().is_empty() {
        out.push(CcMessage::new("system", Some(CcContent::Text(system.to_owned()))));
    }
    for message in messages {
        let blocks = match &message.content {
            Content::Text(text) => {
                out.push(CcMessage::new(&message.role, Some(CcContent::Text(text.clone()))));
                continue;
            }
            Content::Blocks(blocks) => blocks,
        };

        let mut parts = Vec::new();
        let mut turn = CcMessage::new(&message.role, None);
        let mut tool_results = Vec::new();
        for block in blocks {
            match block {
                ContentBlock::Text { text } => parts.push(CcPart::Text { text: text.clone() }),
                ContentBlock::Image { source } => {
                    parts.push(CcPart::ImageUrl { image_url: CcImageUrl { url: source.data_url() } });
                }
                ContentBlock::Audio { source } => parts.push(CcPart::InputAudio {
                    input_audio: CcInputAudio { data: source.data.clone(), format: audio_format(source) },
                }),
                ContentBlock::ToolUse { id, name, input } => turn.tool_calls.push(CcToolCall {
                    id: id.clone(),
                    call_type: "function",
                    function: CcFunctionCall { name: name.clone(), arguments: arguments_json(input) },
                }),
                ContentBlock::ToolResult { tool_use_id, content, .. } => tool_results.push(CcMessage {
                    tool_call_id: Some(tool_use_id.clone()),
                    ..CcMessage::new("tool", Some(CcContent::Text(content.clone())))
                }),
                ContentBlock::Thinking { .. } | ContentBlock::Unknown => {}
            }
        }

        turn.content = if parts.is_empty() {
            None
        } else if let [CcPart::Text { text }] = parts.as_slice() {
            Some(CcContent::Text(text.clone()))
        } else {
            Some(CcContent::Parts(parts))
        };
        if turn.content.is_some() || !turn.tool_calls.is_empty() {
            out.push(turn);
        }
        out.extend(tool_results);
    }
    Ok(out)
}

// =============================================================================
// CHAT COMPLETIONS: RESPONSE
// =============================================================================

#[derive(Deserialize)]
struct CcResponse {
    #[serde(default)]
    model: String,
    #[serde(default)]
    choices: Vec<CcChoice>,
    #[serde(default)]
    usage: CcUsage,
}

#[derive(Deserialize)]
struct CcChoice {
    message: CcReply,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct CcReply {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    tool_calls: Vec<CcReplyCall>,
}

#[derive(Deserialize)]
struct CcReplyCall {
    #[serde(default)]
    id: Option<String>,
    function: CcReplyFunction,
}

#[derive(Deserialize)]
struct CcReplyFunction {
    name: String,
    #[serde(default)]
    arguments: String,
}

#[derive(Deserialize, Default)]
struct CcUsage {
    #[serde(default)]
    prompt_tokens: u64,
    #[serde(default)]
    completion_tokens: u64,
}

fn stop_reason(content: &[ContentBlock], truncated: bool) -> String {
    if content.iter().any(|b| matches!(b, ContentBlock::ToolUse { .. })) {
        "tool_use".into()
    } else if truncated {
        "max_tokens".into()
    } else {
        "end_turn".into()
    }
}

pub(crate) fn parse_chat_completions_response(json_text: &str) -> Result<ChatResponse, LlmError> {
    let api: CcResponse = serde_json::from_str(json_text).map_err(|e| LlmError::ApiParse(e.to_string()))?;
    let Some(choice) = api.choices.into_iter().next() else {
        return Err(LlmError::ApiParse("chat_completions: missing choices[0]".into()));
    };

    let mut content = Vec::new();
    if let Some(text) = choice.message.content.filter(|t| !t.is_empty()) {
        content.push(ContentBlock::Text { text });
    }
    for call in choice.message.tool_calls {
        let id = call
            .id
            .ok_or_else(|| LlmError::ApiParse("chat_completions: tool call missing id".into()))?;
        content.push(ContentBlock::ToolUse { id, name: call.function.name, input: parse_arguments(&call.function.arguments) });
    }

    let truncated = choice.finish_reason.as_deref() == Some("length");
    Ok(ChatResponse {
        stop_reason: stop_reason(&content, truncated),
        content,
        model: api.model,
        input_tokens: api.usage.prompt_tokens,
        output_tokens: api.usage.completion_tokens,
    })
}

// =============================================================================
// RESPONSES: REQUEST
// =============================================================================

#[derive(Serialize)]
struct RespRequest<'a> {
    model: &'a str,
    max_output_tokens: u32,
    instructions: &'a str,
    input: &'a [RespInputItem],
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<&'a [RespToolDef<'a>]>,
}

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum RespInputItem {
    Message { role: String, content: Vec<RespInputPart> },
    FunctionCall { call_id: String, name: String, arguments: String },
    FunctionCallOutput { call_id: String, output: String },
}

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum RespInputPart {
    InputText { text: String },
    InputImage { image_url: String },
}

#[derive(Serialize)]
struct RespToolDef<'a> {
    #[serde(rename = "type")]
    tool_type: &'static str,
    name: &'a str,
    description: &'a str,
    parameters: &'a Value,
}

impl<'a> From<&'a Tool> for RespToolDef<'a> {
    fn from(tool: &'a Tool) -> Self {
        Self { tool_type: "function", name: &tool.name, description: &tool.description, parameters: &tool.input_schema }
    }
}

fn build_responses_input(messages: &[Message]) -> Result<Vec<RespInputItem>, LlmError> {
    let mut out = Vec::new();
    for message in messages {
        let blocks = match &message.content {
            Content::Text(text) => {
                out.push(RespInputItem::Message {
                    role: message.role.clone(),
                    content: vec![RespInputPart::InputText { text: text.clone() }],
                });
                continue;
            }
            Content::Blocks(blocks) => blocks,
        };

        let mut parts = Vec::new();
        for block in blocks {
            match block {
                ContentBlock::Text { text } => parts.push(RespInputPart::InputText { text: text.clone() }),
                ContentBlock::Image { source } => parts.push(RespInputPart::InputImage { image_url: source.data_url() }),
                ContentBlock::Audio { .. } => {
                    return Err(LlmError::UnsupportedInput("responses API does not accept audio input".into()));
                }
                ContentBlock::ToolUse { id, name, input } => out.push(RespInputItem::FunctionCall {
                    call_id: id.clone(),
                    name: name.clone(),
                    arguments: arguments_json(input),
                }),
                ContentBlock::ToolResult { tool_use_id, content, .. } => out.push(RespInputItem::FunctionCallOutput {
                    call_id: tool_use_id.clone(),
                    output: content.clone(),
                }),
                ContentBlock::Thinking { .. } | ContentBlock::Unknown => {}
            }
        }
        if !parts.is_empty() {
            out.push(RespInputItem::Message { role: message.role.clone(), content: parts });
        }
    }
    Ok(out)
}

// =============================================================================
// RESPONSES: RESPONSE
// =============================================================================

#[derive(Deserialize)]
struct RespResponse {
    #[serde(default)]
    model: String,
    #[serde(default)]
    output: Option<Vec<RespOutputItem>>,
    #[serde(default)]
    output_text: Option<String>,
    #[serde(default)]
    usage: RespUsage,
    #[serde(default)]
    incomplete_details: Option<RespIncomplete>,
}

#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum RespOutputItem {
    Message {
        #[serde(default)]
        content: Vec<RespOutputPart>,
    },
    FunctionCall {
        #[serde(default)]
        call_id: Option<String>,
        #[serde(default)]
        id: Option<String>,
        name: String,
        #[serde(default)]
        arguments: String,
    },
    #[serde(other)]
    Other,
}

#[derive(Deserialize)]
struct RespOutputPart {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: String,
}

#[derive(Deserialize, Default)]
struct RespUsage {
    #[serde(default)]
    input_tokens: u64,
    #[serde(default)]
    output_tokens: u64,
}

#[derive(Deserialize)]
struct RespIncomplete {
    #[serde(default)]
    reason: Option<String>,
}

pub(crate) fn parse_responses_response(json_text: &str) -> Result<ChatResponse, LlmError> {
    let api: RespResponse = serde_json::from_str(json_text).map_err(|e| LlmError::ApiParse(e.to_string()))?;

    let mut content = Vec::new();
    if let Some(items) = api.output {
        for item in items {
            match item {
                RespOutputItem::Message { content: parts } => content.extend(
                    parts
                        .into_iter()
                        .filter(|p| matches!(p.kind.as_str(), "output_text" | "text") && !p.text.is_empty())
                        .map(|p| ContentBlock::Text { text: p.text }),
                ),
                RespOutputItem::FunctionCall { call_id, id, name, arguments } => {
                    let id = call_id
                        .or(id)
                        .ok_or_else(|| LlmError::ApiParse("responses: function_call missing call_id".into()))?;
                    content.push(ContentBlock::ToolUse { id, name, input: parse_arguments(&arguments) });
                }
                RespOutputItem::Other => {}
            }
        }
    } else if let Some(text) = api.output_text.filter(|t| !t.is_empty()) {
        content.push(ContentBlock::Text { text });
    }

    let truncated = api
        .incomplete_details
        .and_then(|d| d.reason)
        .is_some_and(|reason| reason == "max_output_tokens");
    Ok(ChatResponse {
        stop_reason: stop_reason(&content, truncated),
        content,
        model: api.model,
        input_tokens: api.usage.input_tokens,
        output_tokens: api.usage.output_tokens,
    })
}

#[cfg(test)]
#[path = "openai_test.rs"]
mod tests;
