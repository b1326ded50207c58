//! MCP payloads carried inside JSON-RPC messages.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sfmcp_tools::ToolDescriptor;

/// Protocol revision announced when the client does not ask for one.
pub const DEFAULT_PROTOCOL_VERSION: &str = "2025-06-18";

/// Name and version reported in `initialize`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerInfo {
    pub name: String,
    pub version: String,
}

impl Default for ServerInfo {
    fn default() -> Self {
        Self {
            name: "salesforce-mcp-server".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerCapabilities {
    pub tools: Map<String, Value>,
    pub resources: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeResult {
    pub protocol_version: String,
    pub capabilities: ServerCapabilities,
    pub server_info: ServerInfo,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeParams {
    #[serde(default)]
    pub protocol_version: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListToolsResult {
    pub tools: Vec<ToolDescriptor>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CallToolParams {
    pub name: String,
    /// Absent arguments are treated as an empty bag.
    #[serde(default = "empty_arguments")]
    pub arguments: Value,
}

fn empty_arguments() -> Value {
    Value::Object(Map::new())
}

/// One block of tool output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Content {
    Text { text: String },
}

impl Content {
    pub fn text(text: impl Into<String>) -> Self {
        Content::Text { text: text.into() }
    }

    pub fn as_text(&self) -> &str {
        match self {
            Content::Text { text } => text,
        }
    }
}

/// The tool-invocation envelope.
///
/// Successful results carry no `isError` member at all; failures carry
/// `"isError": true`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallToolResult {
    pub content: Vec<Content>,
    #[serde(
        rename = "isError",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub is_error: Option<bool>,
}

impl CallToolResult {
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            content: vec![Content::text(text)],
            is_error: None,
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            content: vec![Content::text(text)],
            is_error: Some(true),
        }
    }

    pub fn is_error(&self) -> bool {
        self.is_error.unwrap_or(false)
    }

    /// Text of the first content block.
    pub fn text(&self) -> &str {
        self.content.first().map(Content::as_text).unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resource {
    pub uri: String,
    pub name: String,
    pub description: String,
    pub mime_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListResourcesResult {
    pub resources: Vec<Resource>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ReadResourceParams {
    pub uri: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceContents {
    pub uri: String,
    pub mime_type: String,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadResourceResult {
    pub contents: Vec<ResourceContents>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_success_envelope_has_no_is_error() {
        let value = serde_json::to_value(CallToolResult::success("{}")).unwrap();
        assert_eq!(value, json!({"content": [{"type": "text", "text": "{}"}]}));
    }

    #[test]
    fn test_error_envelope() {
        let value = serde_json::to_value(CallToolResult::error("Unknown tool: bogus_tool")).unwrap();
        assert_eq!(
            value,
            json!({
                "content": [{"type": "text", "text": "Unknown tool: bogus_tool"}],
                "isError": true
            })
        );
    }

    #[test]
    fn test_initialize_result_shape() {
        let result = InitializeResult {
            protocol_version: DEFAULT_PROTOCOL_VERSION.to_string(),
            capabilities: ServerCapabilities::default(),
            server_info: ServerInfo {
                name: "salesforce-mcp-server".to_string(),
                version: "0.1.0".to_string(),
            },
        };
        assert_eq!(
            serde_json::to_value(result).unwrap(),
            json!({
                "protocolVersion": "2025-06-18",
                "capabilities": {"tools": {}, "resources": {}},
                "serverInfo": {"name": "salesforce-mcp-server", "version": "0.1.0"}
            })
        );
    }

    #[test]
    fn test_call_params_default_to_empty_arguments() {
        let params: CallToolParams = serde_json::from_value(json!({"name": "query"})).unwrap();
        assert_eq!(params.arguments, json!({}));

        assert!(serde_json::from_value::<CallToolParams>(json!({"arguments": {}})).is_err());
        assert!(serde_json::from_value::<CallToolParams>(json!({"name": 7})).is_err());
    }
}
