use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatRequest {
    pub message: String,
    pub conversation_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ToolResultEvent {
    pub tool_name: String,
    /// Either string-encoded JSON or an already structured value.
    #[serde(default)]
    pub result: Value,
    #[serde(default)]
    pub successful: bool,
}

/// One `data:` frame of the chat stream.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamEvent {
    TextDelta {
        #[serde(default)]
        delta: String,
    },
    ToolResult(ToolResultEvent),
    Error {
        #[serde(default)]
        message: String,
    },
}
