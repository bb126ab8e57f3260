//! Tool Types
//!
//! Tool definitions, call parameters, and call results.
//! Per MCP 2025-06-18 schema lines 2167-2310.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::content::Content;

/// Definition of a tool the client can call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tool {
    pub name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    pub input_schema: ToolSchema,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub annotations: Option<ToolAnnotations>,
}

impl Tool {
    /// Create a tool that takes no arguments.
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            title: None,
            description: Some(description.into()),
            input_schema: ToolSchema::empty(),
            annotations: None,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Replace the input schema with a hand-written JSON Schema object.
    pub fn with_input_schema(mut self, schema: ToolSchema) -> Self {
        self.input_schema = schema;
        self
    }

    pub fn with_annotations(mut self, annotations: ToolAnnotations) -> Self {
        self.annotations = Some(annotations);
        self
    }
}

/// JSON Schema for tool input. Always `"type": "object"` at the top level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolSchema {
    #[serde(rename = "type")]
    pub schema_type: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<serde_json::Map<String, Value>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<Vec<String>>,
}

impl ToolSchema {
    /// Object schema with no properties.
    pub fn empty() -> Self {
        Self {
            schema_type: "object".to_string(),
            properties: None,
            required: None,
        }
    }

    /// Build from a `json!` object, keeping `properties` and `required`.
    pub fn from_value(value: Value) -> Self {
        let properties = value.get("properties").and_then(|p| p.as_object()).cloned();
        let required = value.get("required").and_then(|r| r.as_array()).map(|items| {
            items
                .iter()
                .filter_map(|v| v.as_str().map(String::from))
                .collect()
        });

        Self {
            schema_type: "object".to_string(),
            properties,
            required,
        }
    }
}

/// Behaviour hints for clients. Untrusted; informational only.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolAnnotations {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub read_only_hint: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub destructive_hint: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub idempotent_hint: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub open_world_hint: Option<bool>,
}

/// Parameters of `tools/call`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallToolParams {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arguments: Option<Value>,
}

/// Result of `tools/call`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallToolResult {
    pub content: Vec<Content>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_error: Option<bool>,
}

impl CallToolResult {
    /// Successful result with a single text block.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content: vec![Content::text(text)],
            is_error: None,
        }
    }

    /// Tool-level failure reported inside a successful JSON-RPC reply.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            content: vec![Content::text(message)],
            is_error: Some(true),
        }
    }

    /// Concatenated text of all text blocks.
    pub fn text_content(&self) -> String {
        self.content
            .iter()
            .filter_map(Content::as_text)
            .collect::<Vec<_>>()
            .join("")
    }
}

/// Result of `tools/list`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListToolsResult {
    pub tools: Vec<Tool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<String>,
}

impl ListToolsResult {
    /// All tools in one page.
    pub fn all(tools: Vec<Tool>) -> Self {
        Self {
            tools,
            next_cursor: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_tool_serialization() {
        let tool = Tool::new("convert", "Convert a document")
            .with_title("Convert")
            .with_input_schema(ToolSchema::from_value(json!({
                "type": "object",
                "properties": { "contents": { "type": "string" } },
                "required": ["contents"]
            })))
            .with_annotations(ToolAnnotations {
                open_world_hint: Some(true),
                ..Default::default()
            });

        let json = serde_json::to_value(&tool).unwrap();
        assert_eq!(json["name"], "convert");
        assert_eq!(json["inputSchema"]["type"], "object");
        assert_eq!(json["inputSchema"]["required"][0], "contents");
        assert_eq!(json["annotations"]["openWorldHint"], true);
        assert!(json["annotations"].get("readOnlyHint").is_none());
    }

    #[test]
    fn test_empty_schema() {
        let json = serde_json::to_value(ToolSchema::empty()).unwrap();
        assert_eq!(json, json!({ "type": "object" }));
    }

    #[test]
    fn test_call_tool_result_text() {
        let result = CallToolResult::text("done");
        let json = serde_json::to_value(&result).unwrap();

        assert_eq!(json["content"][0]["type"], "text");
        assert_eq!(json["content"][0]["text"], "done");
        assert!(json.get("isError").is_none());
        assert_eq!(result.text_content(), "done");
    }

    #[test]
    fn test_call_tool_result_error() {
        let json = serde_json::to_value(CallToolResult::error("nope")).unwrap();
        assert_eq!(json["isError"], true);
    }

    #[test]
    fn test_call_tool_params_without_arguments() {
        let params: CallToolParams = serde_json::from_value(json!({ "name": "convert" })).unwrap();
        assert_eq!(params.name, "convert");
        assert!(params.arguments.is_none());
    }
}
