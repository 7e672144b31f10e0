//! MCP-style JSON-RPC surface over the relationship graph.
//!
//! [`McpServer::handle_request`] dispatches one request. Protocol problems
//! (unknown method, bad params) become JSON-RPC errors; failures inside a
//! resource or tool never do. They are reported as `{"error": ...}`
//! documents, and storage outages additionally degrade the store handle.

pub mod documents;
pub mod prompts;
pub mod protocol;
pub mod resources;
pub mod tools;

use std::sync::Arc;

use serde_json::{Value, json};
use thiserror::Error;
use tracing::{debug, warn};

use lila::models::ValidationError;
use lila::storage::{StorageError, StoreHandle};

use documents::{ErrorDocument, to_value};
use prompts::Prompt;
use protocol::{
    DEFAULT_PROTOCOL_VERSION, INVALID_PARAMS, INVALID_REQUEST, JSONRPC_VERSION, JsonRpcRequest,
    JsonRpcResponse, METHOD_NOT_FOUND, PromptGetParams, ResourceReadParams, ToolCallParams,
};
use resources::ResourceAddress;
use tools::{Tool, parse_args};

pub const SERVER_NAME: &str = "lila-mcp-server";

/// Failure inside a resource read or tool call
#[derive(Debug, Error)]
pub enum OperationError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("{0}")]
    Invalid(String),
}

impl From<ValidationError> for OperationError {
    fn from(err: ValidationError) -> Self {
        OperationError::Invalid(err.0)
    }
}

/// Request dispatcher
#[derive(Debug, Clone)]
pub struct McpServer {
    handle: Arc<StoreHandle>,
    started_in_fallback: bool,
}

impl McpServer {
    pub fn new(handle: Arc<StoreHandle>, started_in_fallback: bool) -> Self {
        Self {
            handle,
            started_in_fallback,
        }
    }

    pub fn handle(&self) -> &Arc<StoreHandle> {
        &self.handle
    }

    /// Decode and dispatch a raw request body. `None` for notifications.
    pub async fn handle_message(&self, body: &[u8]) -> Option<JsonRpcResponse> {
        let value: Value = match serde_json::from_slice(body) {
            Ok(value) => value,
            Err(e) => return Some(JsonRpcResponse::parse_error(e)),
        };

        let id = value.get("id").cloned().unwrap_or(Value::Null);
        match serde_json::from_value::<JsonRpcRequest>(value) {
            Ok(request) => self.handle_request(request).await,
            Err(e) => Some(JsonRpcResponse::error(
                id,
                INVALID_REQUEST,
                format!("invalid request: {e}"),
            )),
        }
    }

    pub async fn handle_request(&self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        if request.jsonrpc != JSONRPC_VERSION {
            return Some(JsonRpcResponse::error(
                request.id.unwrap_or(Value::Null),
                INVALID_REQUEST,
                "invalid jsonrpc version",
            ));
        }

        if request.is_notification() {
            debug!(method = %request.method, "Notification received");
            return None;
        }

        let id = request.id.clone().unwrap_or(Value::Null);
        debug!(method = %request.method, "Handling request");

        let response = match request.method.as_str() {
            "initialize" => JsonRpcResponse::success(id, self.initialize_result(&request.params)),
            "ping" => JsonRpcResponse::success(id, json!({})),
            "resources/list" => {
                JsonRpcResponse::success(id, resources::list_result(self.started_in_fallback))
            }
            "resources/templates/list" => {
                JsonRpcResponse::success(id, resources::templates_result())
            }
            "resources/read" => self.handle_resources_read(id, request.params).await,
            "tools/list" => JsonRpcResponse::success(id, tools::list_result()),
            "tools/call" => self.handle_tools_call(id, request.params).await,
            "prompts/list" => JsonRpcResponse::success(id, prompts::list_result()),
            "prompts/get" => self.handle_prompts_get(id, request.params),
            _ => JsonRpcResponse::error(id, METHOD_NOT_FOUND, "method not found"),
        };
        Some(response)
    }

    fn initialize_result(&self, params: &Value) -> Value {
        let protocol_version = params
            .get("protocolVersion")
            .and_then(Value::as_str)
            .unwrap_or(DEFAULT_PROTOCOL_VERSION);

        json!({
            "protocolVersion": protocol_version,
            "serverInfo": {"name": SERVER_NAME, "version": crate::VERSION},
            "capabilities": {
                "tools": {"listChanged": false},
                "resources": {"subscribe": false, "listChanged": false},
                "prompts": {"listChanged": false}
            }
        })
    }

    async fn handle_resources_read(&self, id: Value, params: Value) -> JsonRpcResponse {
        let parsed: ResourceReadParams = match serde_json::from_value(params) {
            Ok(v) => v,
            Err(e) => return JsonRpcResponse::error(id, INVALID_PARAMS, format!("invalid params: {e}")),
        };
        let Some(address) = ResourceAddress::parse(&parsed.uri) else {
            return JsonRpcResponse::error(id, INVALID_PARAMS, "unknown resource uri");
        };

        let store = self.handle.store().await;
        let document =
            match resources::read(store.as_ref(), &address, &parsed.uri, self.started_in_fallback)
                .await
            {
                Ok(doc) => doc,
                Err(e) => self.error_document(address.label(), e).await,
            };

        JsonRpcResponse::success(id, resources::contents(&parsed.uri, &document))
    }

    async fn handle_tools_call(&self, id: Value, params: Value) -> JsonRpcResponse {
        let parsed: ToolCallParams = match serde_json::from_value(params) {
            Ok(v) => v,
            Err(e) => return JsonRpcResponse::error(id, INVALID_PARAMS, format!("invalid params: {e}")),
        };
        let Some(tool) = Tool::from_name(&parsed.name) else {
            return JsonRpcResponse::error(
                id,
                INVALID_PARAMS,
                format!("unknown tool: {}", parsed.name),
            );
        };

        match self.call_tool(tool, parsed.arguments).await {
            Ok(Ok(document)) => JsonRpcResponse::success(id, tools::call_result(&document, false)),
            Ok(Err(e)) => {
                let document = self.error_document(tool.name(), e).await;
                JsonRpcResponse::success(id, tools::call_result(&document, true))
            }
            Err(e) => JsonRpcResponse::error(
                id,
                INVALID_PARAMS,
                format!("invalid arguments for {}: {e}", tool.name()),
            ),
        }
    }

    /// Outer error: the arguments did not decode. Inner: the tool failed.
    async fn call_tool(
        &self,
        tool: Tool,
        arguments: Option<Value>,
    ) -> Result<Result<Value, OperationError>, serde_json::Error> {
        let (store, mode) = self.handle.snapshot().await;
        let store = store.as_ref();

        Ok(match tool {
            Tool::UpdateRelationshipMetrics => {
                tools::update_relationship_metrics(store, parse_args(arguments)?).await
            }
            Tool::RecordInteraction => tools::record_interaction(store, parse_args(arguments)?).await,
            Tool::AnalyzePersonaCompatibility => {
                tools::analyze_persona_compatibility(store, parse_args(arguments)?).await
            }
            Tool::ScorePersonaCompatibility => {
                tools::score_persona_compatibility(store, parse_args(arguments)?).await
            }
            Tool::AutonomousStrategySelection => {
                tools::autonomous_strategy_selection(store, parse_args(arguments)?).await
            }
            Tool::AssessGoalProgress => {
                tools::assess_goal_progress(store, parse_args(arguments)?).await
            }
            Tool::GenerateContextualResponse => {
                tools::generate_contextual_response(store, parse_args(arguments)?).await
            }
            Tool::CommitRelationshipState => {
                tools::commit_relationship_state(store, parse_args(arguments)?).await
            }
            Tool::FinalizeDemoSession => tools::finalize_demo_session(store, mode).await,
        })
    }

    fn handle_prompts_get(&self, id: Value, params: Value) -> JsonRpcResponse {
        let parsed: PromptGetParams = match serde_json::from_value(params) {
            Ok(v) => v,
            Err(e) => return JsonRpcResponse::error(id, INVALID_PARAMS, format!("invalid params: {e}")),
        };
        let Some(prompt) = Prompt::from_name(&parsed.name) else {
            return JsonRpcResponse::error(
                id,
                INVALID_PARAMS,
                format!("unknown prompt: {}", parsed.name),
            );
        };

        match prompt.render(parsed.arguments) {
            Ok(text) => JsonRpcResponse::success(id, prompt.get_result(text)),
            Err(e) => JsonRpcResponse::error(
                id,
                INVALID_PARAMS,
                format!("invalid arguments for {}: {e}", prompt.name()),
            ),
        }
    }

    /// Log the failure, let the handle judge whether the backend is gone,
    /// and render the error document.
    async fn error_document(&self, operation: &str, err: OperationError) -> Value {
        warn!(operation, error = %err, "Operation failed");
        if let OperationError::Storage(storage_err) = &err {
            self.handle.observe(storage_err).await;
        }
        to_value(&ErrorDocument::new(err.to_string()))
    }
}
