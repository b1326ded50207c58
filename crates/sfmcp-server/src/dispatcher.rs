//! Tool dispatch.
//!
//! A `tools/call` request moves through
//! `Idle -> ToolResolved -> ArgumentsValidated -> Authenticated ->
//! HandlerInvoked -> Responded`:
//!
//! 1. the tool is looked up by exact name
//! 2. the arguments are decoded into a typed input
//! 3. a session is ensured according to the [`SessionPolicy`]
//! 4. the handler runs; if the org reports the session as expired, the
//!    session is dropped, a fresh login is made and the handler runs once more
//!
//! A failure at any step short-circuits to an error envelope. Steps 1 and 2
//! never touch the remote capability.

use serde_json::Value;
use sfmcp_core::{
    SalesforceApi, SalesforceError, SalesforceResult, SessionPolicy, ToolError, ToolResult,
    ensure_authenticated,
};
use sfmcp_tools::ToolRegistry;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::error::ResourceError;
use crate::protocol::{CallToolResult, ReadResourceResult, ResourceContents};
use crate::resources::{self, OBJECTS_MIME_TYPE};

/// Routes tool calls and resource reads to the remote capability.
pub struct Dispatcher {
    registry: ToolRegistry,
    api: Arc<dyn SalesforceApi>,
    policy: SessionPolicy,
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("registry", &self.registry)
            .field("policy", &self.policy)
            .finish()
    }
}

impl Dispatcher {
    pub fn new(registry: ToolRegistry, api: Arc<dyn SalesforceApi>, policy: SessionPolicy) -> Self {
        Self {
            registry,
            api,
            policy,
        }
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    pub fn policy(&self) -> SessionPolicy {
        self.policy
    }

    /// Invoke a tool and wrap the outcome in an envelope. Never fails.
    pub async fn call_tool(&self, name: &str, arguments: &Value) -> CallToolResult {
        match self.execute(name, arguments).await {
            Ok(value) => match serde_json::to_string_pretty(&value) {
                Ok(text) => {
                    debug!(tool = %name, "Tool call succeeded");
                    CallToolResult::success(text)
                }
                Err(e) => CallToolResult::error(format!(
                    "Salesforce API error: failed to serialize result: {e}"
                )),
            },
            Err(error) => {
                warn!(
                    tool = %name,
                    category = error.category(),
                    error = %error,
                    "Tool call failed"
                );
                CallToolResult::error(error.to_string())
            }
        }
    }

    /// Invoke a tool, returning its raw result.
    pub async fn execute(&self, name: &str, arguments: &Value) -> ToolResult<Value> {
        let tool = self
            .registry
            .find(name)
            .ok_or_else(|| ToolError::UnknownTool(name.to_string()))?;

        let input = tool.decode(arguments)?;

        self.authenticate().await.map_err(ToolError::Authentication)?;

        debug!(tool = %name, "Invoking tool");
        match tool.invoke(self.api.as_ref(), input.clone()).await {
            Err(ToolError::Remote(error)) if error.is_session_expired() => {
                info!(tool = %name, reason = %error, "Session rejected, logging in again");
                self.reauthenticate()
                    .await
                    .map_err(ToolError::Authentication)?;
                tool.invoke(self.api.as_ref(), input).await
            }
            outcome => outcome,
        }
    }

    /// Read a resource by URI. The contents carry the URI as requested.
    pub async fn read_resource(&self, uri: &str) -> Result<ReadResourceResult, ResourceError> {
        if !resources::is_objects_uri(uri) {
            return Err(ResourceError::UnknownResource(uri.to_string()));
        }

        self.authenticate().await?;
        let describe_global = match self.api.describe_global().await {
            Err(error) if error.is_session_expired() => {
                self.reauthenticate().await?;
                self.api.describe_global().await?
            }
            outcome => outcome?,
        };

        let objects = resources::queryable_objects(&describe_global);
        debug!(count = objects.len(), "Listed queryable objects");
        let text = serde_json::to_string_pretty(&objects).map_err(|e| {
            SalesforceError::InvalidResponse(format!("failed to serialize objects: {e}"))
        })?;

        Ok(ReadResourceResult {
            contents: vec![ResourceContents {
                uri: uri.to_string(),
                mime_type: OBJECTS_MIME_TYPE.to_string(),
                text,
            }],
        })
    }

    async fn authenticate(&self) -> SalesforceResult<()> {
        ensure_authenticated(self.api.as_ref(), self.policy)
            .await
            .map(|_| ())
    }

    async fn reauthenticate(&self) -> SalesforceResult<()> {
        self.api.invalidate_session().await;
        self.api.login().await
    }
}
