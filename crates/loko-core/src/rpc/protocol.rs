//! JSON-RPC 2.0 envelope types and the line-delimited stdio framing:
//! newline-delimited JSON objects on stdin/stdout.
//!
//! Hand-rolled rather than routed through an MCP SDK (see DESIGN.md): tool
//! failures must surface as genuine JSON-RPC error objects (code
//! `-32000`), which diverges from SDKs whose `CallToolResult::error`
//! reports failures as a *successful* response with `isError: true` in the
//! payload.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Protocol version advertised by `initialize`, a date-stamped string.
pub const PROTOCOL_VERSION: &str = "2025-06-18";

pub const PARSE_ERROR: i64 = -32700;
pub const INVALID_REQUEST: i64 = -32600;
pub const METHOD_NOT_FOUND: i64 = -32601;
pub const INVALID_PARAMS: i64 = -32602;
pub const TOOL_FAILURE: i64 = -32000;

#[derive(Debug, Clone, Deserialize)]
pub struct JsonRpcRequest {
    #[serde(default)]
    pub jsonrpc: Option<String>,
    /// Absent on notifications; loko's CLI-facing host treats every
    /// request as call-and-respond, so a missing `id` is echoed back as
    /// `null` rather than suppressing the response.
    #[serde(default)]
    pub id: Value,
    pub method: String,
    #[serde(default)]
    pub params: Value,
}

#[derive(Debug, Clone, Serialize)]
pub struct JsonRpcError {
    pub code: i64,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl JsonRpcError {
    pub fn new(code: i64, message: impl Into<String>) -> Self {
        JsonRpcError { code, message: message.into(), data: None }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: &'static str,
    pub id: Value,
    #[serde(flatten)]
    pub outcome: Outcome,
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum Outcome {
    Result { result: Value },
    Error { error: JsonRpcError },
}

impl JsonRpcResponse {
    pub fn ok(id: Value, result: Value) -> Self {
        JsonRpcResponse { jsonrpc: "2.0", id, outcome: Outcome::Result { result } }
    }

    pub fn err(id: Value, error: JsonRpcError) -> Self {
        JsonRpcResponse { jsonrpc: "2.0", id, outcome: Outcome::Error { error } }
    }
}

/// Wraps a tool result as the `{ content: [{ type: "text", text: ... }] }`
/// shape, matching the established wire format.
pub fn wrap_tool_content(value: &Value) -> Value {
    serde_json::json!({
        "content": [
            { "type": "text", "text": serde_json::to_string(value).unwrap_or_default() }
        ]
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_minimal_request() {
        let req: JsonRpcRequest =
            serde_json::from_str(r#"{"jsonrpc":"2.0","id":1,"method":"tools/list"}"#).unwrap();
        assert_eq!(req.method, "tools/list");
        assert_eq!(req.id, Value::from(1));
    }

    #[test]
    fn ok_response_serializes_result_not_error() {
        let resp = JsonRpcResponse::ok(Value::from(1), serde_json::json!({"a": 1}));
        let encoded = serde_json::to_string(&resp).unwrap();
        assert!(encoded.contains("\"result\""));
        assert!(!encoded.contains("\"error\""));
    }

    #[test]
    fn error_response_serializes_error_not_result() {
        let resp = JsonRpcResponse::err(Value::from(1), JsonRpcError::new(METHOD_NOT_FOUND, "nope"));
        let encoded = serde_json::to_string(&resp).unwrap();
        assert!(encoded.contains("\"error\""));
        assert!(!encoded.contains("\"result\""));
    }

    #[test]
    fn tool_content_wraps_json_as_text() {
        let wrapped = wrap_tool_content(&serde_json::json!({"systems": 3}));
        assert_eq!(wrapped["content"][0]["type"], "text");
        assert!(wrapped["content"][0]["text"].as_str().unwrap().contains("systems"));
    }
}
