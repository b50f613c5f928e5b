//! MCP Server implementation
//!
//! Reads newline-delimited JSON-RPC from a reader, handles each line on its
//! own task and funnels every response through a single writer.

use std::sync::Arc;

use gitgate_core::Gateway;
use serde_json::{Value, json};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;

use crate::protocol::{
    INTERNAL_ERROR, INVALID_PARAMS, INVALID_REQUEST, InitializeResult, JsonRpcRequest,
    JsonRpcResponse, METHOD_NOT_FOUND, PARSE_ERROR, PROTOCOL_VERSION, ServerCapabilities,
    ServerInfo, ToolCallParams, ToolsCapability,
};
use crate::tools::{ToolResult, tool_definitions};
use crate::{Error, Result};

/// MCP server exposing the gateway's git tools.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use gitgate_mcp::{GitMcpServer, ServerConfig};
///
/// #[tokio::main]
/// async fn main() -> gitgate_mcp::Result<()> {
///     let config = ServerConfig::load_or_default(None)?;
///     Arc::new(GitMcpServer::new(config.build_gateway())).run().await
/// }
/// ```
pub struct GitMcpServer {
    gateway: Arc<Gateway>,
}

impl GitMcpServer {
    pub fn new(gateway: Gateway) -> Self {
        Self {
            gateway: Arc::new(gateway),
        }
    }

    pub fn gateway(&self) -> &Gateway {
        &self.gateway
    }

    /// Serve MCP over stdin/stdout until stdin closes.
    pub async fn run(self: Arc<Self>) -> Result<()> {
        tracing::info!(
            repositories = self.gateway.registry().len(),
            backend = %self.gateway.backend_kind(),
            write_access = self.gateway.write_access(),
            "MCP server ready, listening on stdio"
        );
        let stdin = BufReader::new(tokio::io::stdin());
        let mut stdout = tokio::io::stdout();
        self.serve(stdin, &mut stdout).await
    }

    /// Serve MCP over an arbitrary line reader and writer.
    ///
    /// Responses are written as they complete, so their order may differ
    /// from the order of the requests.
    pub async fn serve<R, W>(self: Arc<Self>, reader: R, mut writer: W) -> Result<()>
    where
        R: AsyncBufRead + Unpin + Send + 'static,
        W: AsyncWrite + Unpin,
    {
        let (tx, mut rx) = mpsc::unbounded_channel::<String>();

        let server = Arc::clone(&self);
        let reader_task = tokio::spawn(async move {
            let mut lines = reader.lines();
            while let Some(line) = lines.next_line().await? {
                if line.trim().is_empty() {
                    continue;
                }
                tracing::debug!(request = %line, "Received message");

                let server = Arc::clone(&server);
                let tx = tx.clone();
                tokio::spawn(async move {
                    let response = match server.handle_message(&line).await {
                        Ok(response) => response,
                        Err(e) => internal_error(None, &e),
                    };
                    if !response.is_empty() {
                        // The writer only goes away once every sender is dropped
                        let _ = tx.send(response);
                    }
                });
            }
            Ok::<(), std::io::Error>(())
        });

        while let Some(response) = rx.recv().await {
            writer.write_all(response.as_bytes()).await?;
            writer.write_all(b"\n").await?;
            writer.flush().await?;
        }

        reader_task
            .await
            .map_err(|e| Error::Internal(e.to_string()))??;
        tracing::info!("Input closed, shutting down");
        Ok(())
    }

    /// Handle a single MCP message
    ///
    /// Returns the serialized response, or an empty string for notifications.
    pub async fn handle_message(&self, message: &str) -> Result<String> {
        let value: Value = match serde_json::from_str(message) {
            Ok(value) => value,
            Err(e) => {
                let response =
                    JsonRpcResponse::error(None, PARSE_ERROR, format!("Parse error: {e}"));
                return Ok(serde_json::to_string(&response)?);
            }
        };

        let id = value.get("id").cloned().filter(|id| !id.is_null());
        let request: JsonRpcRequest = match serde_json::from_value(value) {
            Ok(request) => request,
            Err(e) => {
                let response =
                    JsonRpcResponse::error(id, INVALID_REQUEST, format!("Invalid Request: {e}"));
                return Ok(serde_json::to_string(&response)?);
            }
        };

        if request.is_notification()
            || matches!(
                request.method.as_str(),
                "initialized" | "notifications/initialized"
            )
        {
            tracing::debug!(method = %request.method, "Notification received");
            return Ok(String::new());
        }

        let id = request.id.clone();
        let response = match self.dispatch(request).await {
            Ok(response) => response,
            Err(e) => {
                tracing::error!(error = %e, "Request failed");
                return Ok(internal_error(id, &e));
            }
        };

        serde_json::to_string(&response).map_err(Error::from)
    }

    async fn dispatch(&self, request: JsonRpcRequest) -> Result<JsonRpcResponse> {
        match request.method.as_str() {
            "initialize" => self.handle_initialize(request.id),
            "ping" => Ok(JsonRpcResponse::success(request.id, json!({}))),
            "tools/list" => Ok(self.handle_tools_list(request.id)),
            "tools/call" => self.handle_tools_call(request.id, request.params).await,
            _ => Ok(JsonRpcResponse::error(
                request.id,
                METHOD_NOT_FOUND,
                format!("Method not found: {}", request.method),
            )),
        }
    }

    fn handle_initialize(&self, id: Option<Value>) -> Result<JsonRpcResponse> {
        let result = InitializeResult {
            protocol_version: PROTOCOL_VERSION.to_string(),
            capabilities: ServerCapabilities {
                tools: ToolsCapability {
                    list_changed: false,
                },
            },
            server_info: ServerInfo {
                name: "gitgate-mcp".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
            instructions: Some(
                "Git tools scoped to the configured repositories. \
                 Call git_list_repositories to see which ones are available."
                    .to_string(),
            ),
        };

        Ok(JsonRpcResponse::success(id, serde_json::to_value(result)?))
    }

    fn handle_tools_list(&self, id: Option<Value>) -> JsonRpcResponse {
        let tools = tool_definitions(self.gateway.registry(), self.gateway.write_access());
        JsonRpcResponse::success(id, json!({ "tools": tools }))
    }

    /// Run a tool on the blocking pool. Gateway failures become error
    /// results, never JSON-RPC errors.
    async fn handle_tools_call(&self, id: Option<Value>, params: Value) -> Result<JsonRpcResponse> {
        let params: ToolCallParams = match serde_json::from_value(params) {
            Ok(params) => params,
            Err(e) => {
                return Ok(JsonRpcResponse::error(
                    id,
                    INVALID_PARAMS,
                    format!("Invalid params: {e}"),
                ));
            }
        };

        let gateway = Arc::clone(&self.gateway);
        let name = params.name.clone();
        let outcome =
            tokio::task::spawn_blocking(move || gateway.call(&params.name, &params.arguments))
                .await
                .map_err(|e| Error::Internal(e.to_string()))?;

        let result = match outcome {
            Ok(text) => ToolResult::text(text),
            Err(e) => {
                tracing::debug!(tool = %name, error = %e, "Tool call returned an error");
                ToolResult::error(e.to_string())
            }
        };
        Ok(JsonRpcResponse::success(id, serde_json::to_value(result)?))
    }
}

fn internal_error(id: Option<Value>, error: &Error) -> String {
    let response = JsonRpcResponse::error(id, INTERNAL_ERROR, format!("Internal error: {error}"));
    serde_json::to_string(&response).unwrap_or_default()
}
