//! The JSON-RPC tool host: a line-oriented server over stdio exposing the
//! use-case layer as named tools, with a per-project graph cache invalidated
//! by every mutating tool call. The cache is owned by `ToolHost` itself, not
//! a module-level global, so multiple hosts never share state.

use std::collections::HashMap;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use indexmap::IndexMap;
use serde_json::Value;

use crate::build::pdf::PdfRenderer;
use crate::diagram::{DiagramRenderer, RenderCache};
use crate::error::{LokoError, Result};
use crate::graph::ArchitectureGraph;
use crate::repository::FsRepository;
use crate::templates::TemplateEngine;

use super::protocol::{
    self, JsonRpcError, JsonRpcRequest, JsonRpcResponse, INVALID_PARAMS, INVALID_REQUEST,
    METHOD_NOT_FOUND, PARSE_ERROR, PROTOCOL_VERSION, TOOL_FAILURE,
};
use super::tools::{self, ToolSpec};

/// Everything a tool handler needs, gathered in one place so registration
/// stays a plain function pointer.
pub struct ToolHost {
    pub renderer: Box<dyn DiagramRenderer>,
    pub pdf_renderer: Box<dyn PdfRenderer>,
    pub renderer_version: String,
    pub templates: TemplateEngine,
    pub render_cache: RenderCache,
    graph_cache: RwLock<HashMap<PathBuf, ArchitectureGraph>>,
    registry: IndexMap<&'static str, ToolSpec>,
}

impl ToolHost {
    pub fn new(
        renderer: Box<dyn DiagramRenderer>,
        pdf_renderer: Box<dyn PdfRenderer>,
        renderer_version: String,
        templates: TemplateEngine,
    ) -> Self {
        ToolHost {
            renderer,
            pdf_renderer,
            renderer_version,
            templates,
            render_cache: RenderCache::new(),
            graph_cache: RwLock::new(HashMap::new()),
            registry: tools::registry(),
        }
    }

    /// Returns the cached graph for `root`, building and populating it on a
    /// miss.
    pub fn graph_for(&self, root: &Path) -> Result<ArchitectureGraph> {
        let key = root.to_path_buf();
        if let Some(graph) = self.graph_cache.read().unwrap().get(&key) {
            return Ok(graph.clone());
        }
        let fallback_name = root
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "project".to_string());
        let (project, _report) = FsRepository::load_project(root, &fallback_name)?;
        let (graph, _build_report) = crate::graph::build(&project);
        self.graph_cache.write().unwrap().insert(key, graph.clone());
        Ok(graph)
    }

    /// Invalidates the cached graph for `root`. Every mutating tool must
    /// call this for its project root after a write.
    pub fn invalidate(&self, root: &Path) {
        self.graph_cache.write().unwrap().remove(root);
    }

    fn initialize_result(&self) -> Value {
        serde_json::json!({
            "protocolVersion": PROTOCOL_VERSION,
            "serverInfo": { "name": "loko", "version": env!("CARGO_PKG_VERSION") },
            "capabilities": { "tools": {} },
        })
    }

    fn tools_list_result(&self) -> Value {
        let tools: Vec<Value> = self
            .registry
            .values()
            .map(|spec| {
                serde_json::json!({
                    "name": spec.name,
                    "description": spec.description,
                    "inputSchema": (spec.input_schema)(),
                })
            })
            .collect();
        serde_json::json!({ "tools": tools })
    }

    fn call_tool(&self, params: &Value) -> std::result::Result<Value, JsonRpcError> {
        let name = params
            .get("name")
            .and_then(Value::as_str)
            .ok_or_else(|| JsonRpcError::new(INVALID_PARAMS, "missing tool name"))?;
        let arguments = params.get("arguments").cloned().unwrap_or(Value::Null);

        let spec = self
            .registry
            .get(name)
            .ok_or_else(|| JsonRpcError::new(METHOD_NOT_FOUND, format!("unknown tool '{name}'")))?;

        (spec.handler)(self, arguments)
            .map(|result| protocol::wrap_tool_content(&result))
            .map_err(|e| match e {
                LokoError::InvalidParams(msg) => JsonRpcError::new(INVALID_PARAMS, msg),
                other => JsonRpcError::new(TOOL_FAILURE, other.to_string()),
            })
    }

    /// Dispatches one already-parsed request to its handler.
    pub fn dispatch(&self, req: &JsonRpcRequest) -> JsonRpcResponse {
        let outcome = match req.method.as_str() {
            "initialize" => Ok(self.initialize_result()),
            "tools/list" => Ok(self.tools_list_result()),
            "tools/call" => self.call_tool(&req.params),
            other => Err(JsonRpcError::new(METHOD_NOT_FOUND, format!("unknown method '{other}'"))),
        };
        match outcome {
            Ok(result) => JsonRpcResponse::ok(req.id.clone(), result),
            Err(error) => JsonRpcResponse::err(req.id.clone(), error),
        }
    }

    /// Runs the line-oriented stdio loop: one JSON-RPC request per line in,
    /// one response per line out.
    /// Stops at EOF or when `cancel` is observed between requests.
    pub fn serve(&self, input: &mut dyn BufRead, output: &mut dyn Write, cancel: &crate::cancel::CancelToken) -> Result<()> {
        let mut line = String::new();
        loop {
            if cancel.is_cancelled() {
                return Ok(());
            }
            line.clear();
            let bytes = input
                .read_line(&mut line)
                .map_err(|e| LokoError::io(Path::new("<stdin>"), e))?;
            if bytes == 0 {
                return Ok(()); // EOF
            }
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }

            let response = match serde_json::from_str::<JsonRpcRequest>(trimmed) {
                Ok(req) => {
                    if req.jsonrpc.as_deref().is_some_and(|v| v != "2.0") {
                        JsonRpcResponse::err(req.id, JsonRpcError::new(INVALID_REQUEST, "jsonrpc must be \"2.0\""))
                    } else {
                        self.dispatch(&req)
                    }
                }
                Err(e) => JsonRpcResponse::err(Value::Null, JsonRpcError::new(PARSE_ERROR, format!("invalid JSON: {e}"))),
            };

            let encoded = serde_json::to_string(&response)
                .map_err(|e| LokoError::ProtocolError(format!("failed to encode response: {e}")))?;
            writeln!(output, "{encoded}").map_err(|e| LokoError::io(Path::new("<stdout>"), e))?;
            output.flush().map_err(|e| LokoError::io(Path::new("<stdout>"), e))?;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build::pdf::UnavailablePdfRenderer;
    use crate::diagram::renderer::UnavailableRenderer;
    use std::io::Cursor;

    fn host() -> ToolHost {
        ToolHost::new(
            Box::new(UnavailableRenderer),
            Box::new(UnavailablePdfRenderer),
            "test".to_string(),
            TemplateEngine::new(None),
        )
    }

    #[test]
    fn initialize_advertises_tools_capability() {
        let h = host();
        let req = JsonRpcRequest { jsonrpc: Some("2.0".into()), id: Value::from(1), method: "initialize".into(), params: Value::Null };
        let resp = h.dispatch(&req);
        let encoded = serde_json::to_value(&resp).unwrap();
        assert!(encoded["result"]["capabilities"]["tools"].is_object());
    }

    #[test]
    fn tools_list_is_non_empty() {
        let h = host();
        let req = JsonRpcRequest { jsonrpc: Some("2.0".into()), id: Value::from(1), method: "tools/list".into(), params: Value::Null };
        let resp = h.dispatch(&req);
        let encoded = serde_json::to_value(&resp).unwrap();
        assert!(encoded["result"]["tools"].as_array().unwrap().len() > 5);
    }

    #[test]
    fn unknown_method_is_method_not_found() {
        let h = host();
        let req = JsonRpcRequest { jsonrpc: Some("2.0".into()), id: Value::from(1), method: "nope".into(), params: Value::Null };
        let resp = h.dispatch(&req);
        let encoded = serde_json::to_value(&resp).unwrap();
        assert_eq!(encoded["error"]["code"], METHOD_NOT_FOUND);
    }

    #[test]
    fn unknown_tool_is_method_not_found() {
        let h = host();
        let req = JsonRpcRequest {
            jsonrpc: Some("2.0".into()),
            id: Value::from(1),
            method: "tools/call".into(),
            params: serde_json::json!({"name": "does_not_exist", "arguments": {}}),
        };
        let resp = h.dispatch(&req);
        let encoded = serde_json::to_value(&resp).unwrap();
        assert_eq!(encoded["error"]["code"], METHOD_NOT_FOUND);
    }

    #[test]
    fn malformed_json_line_is_a_parse_error() {
        let h = host();
        let mut input = Cursor::new(b"not json\n".to_vec());
        let mut output = Vec::new();
        h.serve(&mut input, &mut output, &crate::cancel::CancelToken::new()).unwrap();
        let text = String::from_utf8(output).unwrap();
        let value: Value = serde_json::from_str(text.trim()).unwrap();
        assert_eq!(value["error"]["code"], PARSE_ERROR);
    }

    #[test]
    fn query_project_round_trip_over_stdio() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("loko.toml"),
            "[project]\nname = \"acme\"\nversion=\"0.1.0\"\ndescription=\"\"\n",
        )
        .unwrap();
        let h = host();
        let request_line = serde_json::json!({
            "jsonrpc": "2.0", "id": 1, "method": "tools/call",
            "params": { "name": "query_project", "arguments": { "project": dir.path() } }
        });
        let mut input = Cursor::new(format!("{}\n", request_line).into_bytes());
        let mut output = Vec::new();
        h.serve(&mut input, &mut output, &crate::cancel::CancelToken::new()).unwrap();
        let text = String::from_utf8(output).unwrap();
        let value: Value = serde_json::from_str(text.trim()).unwrap();
        assert!(value.get("result").is_some());
    }
}
