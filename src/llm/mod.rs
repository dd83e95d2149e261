pub mod anthropic;
pub mod client;

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::error::ResearchError;

pub use client::LlmClient;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One content block exactly as it travels on the wire.
///
/// Blocks are kept as raw JSON objects so that an assistant turn can be
/// replayed to the service verbatim, including kinds this crate does not
/// interpret (server tool calls, search results, citations).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Block(Value);

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolInvocation {
    pub id: String,
    pub name: String,
}

#[derive(Debug, PartialEq)]
pub enum BlockKind<'a> {
    Text(&'a str),
    ToolInvocation(ToolInvocation),
    Other(&'a str),
}

impl Block {
    pub fn text(text: impl Into<String>) -> Self {
        Self(json!({ "type": "text", "text": text.into() }))
    }

    pub fn tool_use(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self(json!({ "type": "tool_use", "id": id.into(), "name": name.into(), "input": {} }))
    }

    pub fn tool_result(tool_use_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self(json!({
            "type": "tool_result",
            "tool_use_id": tool_use_id.into(),
            "content": content.into(),
        }))
    }

    pub fn from_value(value: Value) -> Self {
        Self(value)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn kind(&self) -> BlockKind<'_> {
        let block_type = self.0["type"].as_str().unwrap_or("");
        match block_type {
            "text" => BlockKind::Text(self.0["text"].as_str().unwrap_or("")),
            "tool_use" => BlockKind::ToolInvocation(ToolInvocation {
                id: self.0["id"].as_str().unwrap_or("").to_string(),
                name: self.0["name"].as_str().unwrap_or("").to_string(),
            }),
            other => BlockKind::Other(other),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TurnContent {
    Text(String),
    Blocks(Vec<Block>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub content: TurnContent,
}

impl Turn {
    pub fn user_text(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: TurnContent::Text(text.into()),
        }
    }

    pub fn user_blocks(blocks: Vec<Block>) -> Self {
        Self {
            role: Role::User,
            content: TurnContent::Blocks(blocks),
        }
    }

    pub fn assistant_blocks(blocks: Vec<Block>) -> Self {
        Self {
            role: Role::Assistant,
            content: TurnContent::Blocks(blocks),
        }
    }
}

/// A capability the service may invoke on its own during a response.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolDeclaration {
    #[serde(rename = "type")]
    pub tool_type: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct MessagesRequest {
    pub model: String,
    pub max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    pub system: String,
    pub messages: Vec<Turn>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<ToolDeclaration>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Usage {
    #[serde(default)]
    pub input_tokens: u32,
    #[serde(default)]
    pub output_tokens: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct MessagesResponse {
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub stop_reason: Option<String>,
    pub content: Vec<Block>,
    #[serde(default)]
    pub usage: Usage,
}

impl MessagesResponse {
    /// Decodes a success body. A body without a `content` array is treated
    /// as a response with zero blocks.
    pub fn from_body(body: &[u8]) -> Self {
        match serde_json::from_slice::<MessagesResponse>(body) {
            Ok(resp) => resp,
            Err(err) => {
                tracing::warn!(
                    error = %err,
                    body_bytes = body.len(),
                    "Malformed messages response, treating as empty"
                );
                let stop_reason = serde_json::from_slice::<Value>(body)
                    .ok()
                    .and_then(|v| v["stop_reason"].as_str().map(str::to_string));
                MessagesResponse {
                    stop_reason,
                    ..Default::default()
                }
            }
        }
    }

    pub fn text_blocks(&self) -> impl Iterator<Item = &str> {
        self.content.iter().filter_map(|block| match block.kind() {
            BlockKind::Text(text) => Some(text),
            _ => None,
        })
    }

    pub fn tool_invocations(&self) -> Vec<ToolInvocation> {
        self.content
            .iter()
            .filter_map(|block| match block.kind() {
                BlockKind::ToolInvocation(invocation) => Some(invocation),
                _ => None,
            })
            .collect()
    }

    pub fn stopped_for_tool_use(&self) -> bool {
        self.stop_reason.as_deref() == Some("tool_use")
    }
}

#[async_trait::async_trait]
pub trait Provider: Send + Sync {
    async fn create_message(&self, req: &MessagesRequest) -> Result<MessagesResponse, ResearchError>;
    fn name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_kinds() {
        assert_eq!(Block::text("hello").kind(), BlockKind::Text("hello"));
        assert_eq!(
            Block::tool_use("toolu_1", "web_search").kind(),
            BlockKind::ToolInvocation(ToolInvocation {
                id: "toolu_1".to_string(),
                name: "web_search".to_string(),
            })
        );
        let search = Block::from_value(json!({"type": "server_tool_use", "id": "srvtoolu_1"}));
        assert_eq!(search.kind(), BlockKind::Other("server_tool_use"));
    }

    #[test]
    fn test_block_keeps_unknown_fields() {
        let raw = json!({
            "type": "text",
            "text": "Acme leads the market.",
            "citations": [{"url": "https://example.com"}],
        });
        let block: Block = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(serde_json::to_value(&block).unwrap(), raw);
    }

    #[test]
    fn test_request_serialization() {
        let req = MessagesRequest {
            model: "claude-sonnet-4-20250514".to_string(),
            max_tokens: 4000,
            temperature: Some(0.5),
            system: "be helpful".to_string(),
            messages: vec![Turn::user_text("hi")],
            tools: vec![ToolDeclaration {
                tool_type: "web_search_20250305".to_string(),
                name: "web_search".to_string(),
            }],
        };
        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(value["temperature"], 0.5);
        assert_eq!(value["messages"][0]["role"], "user");
        assert_eq!(value["messages"][0]["content"], "hi");
        assert_eq!(value["tools"][0]["type"], "web_search_20250305");
        assert_eq!(value["tools"][0]["name"], "web_search");
    }

    #[test]
    fn test_request_omits_absent_temperature_and_tools() {
        let req = MessagesRequest {
            model: "m".to_string(),
            max_tokens: 10,
            temperature: None,
            system: String::new(),
            messages: vec![],
            tools: vec![],
        };
        let value = serde_json::to_value(&req).unwrap();
        assert!(value.get("temperature").is_none());
        assert!(value.get("tools").is_none());
    }

    #[test]
    fn test_response_decoding() {
        let body = br#"{
            "model": "claude-sonnet-4-20250514",
            "stop_reason": "tool_use",
            "content": [
                {"type": "text", "text": "Searching."},
                {"type": "tool_use", "id": "toolu_9", "name": "web_search", "input": {"query": "x"}}
            ],
            "usage": {"input_tokens": 12, "output_tokens": 34}
        }"#;
        let resp = MessagesResponse::from_body(body);
        assert!(resp.stopped_for_tool_use());
        assert_eq!(resp.text_blocks().collect::<Vec<_>>(), vec!["Searching."]);
        assert_eq!(resp.tool_invocations()[0].id, "toolu_9");
        assert_eq!(resp.usage.output_tokens, 34);
    }

    #[test]
    fn test_malformed_response_is_empty() {
        let resp = MessagesResponse::from_body(br#"{"stop_reason": "end_turn", "content": "oops"}"#);
        assert!(resp.content.is_empty());
        assert_eq!(resp.stop_reason.as_deref(), Some("end_turn"));

        let resp = MessagesResponse::from_body(b"not json");
        assert!(resp.content.is_empty());
        assert_eq!(resp.stop_reason, None);
    }
}
