//! SOQL against the data API and the Tooling API.

use async_trait::async_trait;
use serde_json::{Value, json};
use sfmcp_core::validation::{decode_query_args, decode_tooling_query_args};
use sfmcp_core::{SalesforceApi, ToolInput, ToolResult, ValidationError};
use tracing::debug;

use crate::tool::SalesforceTool;

/// `query`: run SOQL against the data API.
#[derive(Debug, Clone, Copy, Default)]
pub struct QueryTool;

#[async_trait]
impl SalesforceTool for QueryTool {
    fn name(&self) -> &'static str {
        "query"
    }

    fn description(&self) -> &'static str {
        "Execute a SOQL query on Salesforce"
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "SOQL query to execute"
                }
            },
            "required": ["query"]
        })
    }

    fn decode(&self, arguments: &Value) -> Result<ToolInput, ValidationError> {
        decode_query_args(arguments).map(ToolInput::Query)
    }

    async fn invoke(&self, api: &dyn SalesforceApi, input: ToolInput) -> ToolResult<Value> {
        let ToolInput::Query(args) = input else {
            return Err(super::mismatched(self.name()));
        };
        debug!(soql = %args.query, "Running SOQL query");
        Ok(api.query(&args.query).await?)
    }
}

/// `tooling_query`: run SOQL against the Tooling API.
#[derive(Debug, Clone, Copy, Default)]
pub struct ToolingQueryTool;

#[async_trait]
impl SalesforceTool for ToolingQueryTool {
    fn name(&self) -> &'static str {
        "tooling_query"
    }

    fn description(&self) -> &'static str {
        "Execute a query against the Salesforce Tooling API"
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "Tooling API query to execute"
                }
            },
            "required": ["query"]
        })
    }

    fn decode(&self, arguments: &Value) -> Result<ToolInput, ValidationError> {
        decode_tooling_query_args(arguments).map(ToolInput::ToolingQuery)
    }

    async fn invoke(&self, api: &dyn SalesforceApi, input: ToolInput) -> ToolResult<Value> {
        let ToolInput::ToolingQuery(args) = input else {
            return Err(super::mismatched(self.name()));
        };
        debug!(soql = %args.query, "Running Tooling API query");
        Ok(api.tooling_query(&args.query).await?)
    }
}
