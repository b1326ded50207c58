use async_trait::async_trait;
use serde_json::Value;
use sfmcp_core::{SalesforceApi, ToolInput, ToolResult, ValidationError};

/// A tool exposed through `tools/list` and invoked through `tools/call`.
///
/// Invocation is split in two so the dispatcher can reject bad arguments
/// before any remote call, including login:
///
/// 1. [`decode`](SalesforceTool::decode) turns the raw argument bag into a
///    typed [`ToolInput`] or a [`ValidationError`]
/// 2. [`invoke`](SalesforceTool::invoke) runs the remote operation(s) on an
///    authenticated capability
#[async_trait]
pub trait SalesforceTool: Send + Sync {
    /// Unique, case-sensitive tool name.
    fn name(&self) -> &'static str;

    /// Human readable description advertised to clients.
    fn description(&self) -> &'static str;

    /// JSON Schema of the argument bag. Advertised only; not enforced.
    fn input_schema(&self) -> Value;

    /// Validate and type the argument bag. Must not perform I/O.
    fn decode(&self, arguments: &Value) -> Result<ToolInput, ValidationError>;

    /// Run the tool against an authenticated capability.
    async fn invoke(&self, api: &dyn SalesforceApi, input: ToolInput) -> ToolResult<Value>;
}
