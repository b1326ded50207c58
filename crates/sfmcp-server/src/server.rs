//! MCP server over a line-delimited JSON-RPC stream.

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::{debug, info, warn};

use crate::dispatcher::Dispatcher;
use crate::error::{ResourceError, ServerResult};
use crate::jsonrpc::{INVALID_REQUEST, JSONRPC_VERSION, Request, Response, RpcError};
use crate::protocol::{
    CallToolParams, DEFAULT_PROTOCOL_VERSION, InitializeParams, InitializeResult,
    ListResourcesResult, ListToolsResult, ReadResourceParams, ServerCapabilities, ServerInfo,
};
use crate::resources;

/// MCP server exposing a [`Dispatcher`] to one client.
///
/// Requests are handled one at a time in arrival order.
#[derive(Debug)]
pub struct McpServer {
    dispatcher: Dispatcher,
    server_info: ServerInfo,
}

impl McpServer {
    pub fn new(dispatcher: Dispatcher) -> Self {
        Self {
            dispatcher,
            server_info: ServerInfo::default(),
        }
    }

    pub fn with_info(dispatcher: Dispatcher, server_info: ServerInfo) -> Self {
        Self {
            dispatcher,
            server_info,
        }
    }

    pub fn info(&self) -> &ServerInfo {
        &self.server_info
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Serve on the process's stdin and stdout until stdin closes.
    pub async fn serve_stdio(&self) -> ServerResult<()> {
        self.serve(tokio::io::stdin(), tokio::io::stdout()).await
    }

    /// Read one message per line from `reader`, writing one response per
    /// line to `writer`, until `reader` reaches end of stream.
    pub async fn serve<R, W>(&self, reader: R, mut writer: W) -> ServerResult<()>
    where
        R: AsyncRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        info!(
            server = %self.server_info.name,
            version = %self.server_info.version,
            tools = self.dispatcher.registry().len(),
            "Starting MCP server"
        );

        let mut lines = BufReader::new(reader).lines();
        while let Some(line) = lines.next_line().await? {
            let Some(reply) = self.handle_line(&line).await else {
                continue;
            };
            writer.write_all(reply.as_bytes()).await?;
            writer.write_all(b"\n").await?;
            writer.flush().await?;
        }

        info!("Input closed, stopping MCP server");
        Ok(())
    }

    /// Handle one raw line, returning the serialized response if one is due.
    pub async fn handle_line(&self, line: &str) -> Option<String> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }

        let response = match serde_json::from_str::<Value>(line) {
            Err(e) => {
                warn!(error = %e, "Unparseable message");
                Some(Response::err(RpcError::parse_error(), Value::Null))
            }
            Ok(message) => self.handle_message(message).await,
        }?;

        match serde_json::to_string(&response) {
            Ok(text) => Some(text),
            Err(e) => {
                warn!(error = %e, "Failed to serialize response");
                let fallback = Response::err(RpcError::internal_error(e.to_string()), response.id);
                serde_json::to_string(&fallback).ok()
            }
        }
    }

    async fn handle_message(&self, message: Value) -> Option<Response> {
        let id = message.get("id").cloned().unwrap_or(Value::Null);
        match serde_json::from_value::<Request>(message) {
            Ok(request) => self.handle_request(request).await,
            Err(e) => {
                debug!(error = %e, "Malformed request object");
                Some(Response::err(RpcError::invalid_request(), id))
            }
        }
    }

    /// Handle a decoded request. Notifications yield `None`.
    pub async fn handle_request(&self, request: Request) -> Option<Response> {
        let Some(id) = request.id.clone() else {
            debug!(method = %request.method, "Notification received");
            return None;
        };

        if request.jsonrpc != JSONRPC_VERSION {
            return Some(Response::err(RpcError::invalid_request(), id));
        }

        debug!(method = %request.method, id = %id, "Request received");
        let outcome = match request.method.as_str() {
            "initialize" => self.initialize(request.params),
            "ping" => Ok(json!({})),
            "tools/list" => to_value(&ListToolsResult {
                tools: self.dispatcher.registry().list(),
            }),
            "tools/call" => self.call_tool(request.params).await,
            "resources/list" => to_value(&ListResourcesResult {
                resources: resources::catalog(),
            }),
            "resources/read" => self.read_resource(request.params).await,
            other => Err(RpcError::method_not_found(other)),
        };

        Some(match outcome {
            Ok(result) => Response::new(result, id),
            Err(error) => Response::err(error, id),
        })
    }

    fn initialize(&self, params: Option<Value>) -> Result<Value, RpcError> {
        let params: InitializeParams = match params {
            Some(params) => parse_params(params)?,
            None => InitializeParams::default(),
        };
        let protocol_version = params
            .protocol_version
            .unwrap_or_else(|| DEFAULT_PROTOCOL_VERSION.to_string());

        info!(
            protocol_version = %protocol_version,
            "Client initialized"
        );

        to_value(&InitializeResult {
            protocol_version,
            capabilities: ServerCapabilities::default(),
            server_info: self.server_info.clone(),
        })
    }

    async fn call_tool(&self, params: Option<Value>) -> Result<Value, RpcError> {
        let params: CallToolParams = parse_params(params.unwrap_or(Value::Null))?;
        let result = self
            .dispatcher
            .call_tool(&params.name, &params.arguments)
            .await;
        to_value(&result)
    }

    async fn read_resource(&self, params: Option<Value>) -> Result<Value, RpcError> {
        let params: ReadResourceParams = parse_params(params.unwrap_or(Value::Null))?;
        match self.dispatcher.read_resource(&params.uri).await {
            Ok(result) => to_value(&result),
            Err(error @ ResourceError::UnknownResource(_)) => {
                Err(RpcError::new(INVALID_REQUEST, error.to_string()))
            }
            Err(error @ ResourceError::Remote(_)) => {
                warn!(uri = %params.uri, error = %error, "Resource read failed");
                Err(RpcError::internal_error(error.to_string()))
            }
        }
    }
}

fn parse_params<T: DeserializeOwned>(params: Value) -> Result<T, RpcError> {
    serde_json::from_value(params)
        .map_err(|e| RpcError::invalid_params(format!("Invalid params: {e}")))
}

fn to_value<T: Serialize>(result: &T) -> Result<Value, RpcError> {
    serde_json::to_value(result).map_err(|e| RpcError::internal_error(e.to_string()))
}
