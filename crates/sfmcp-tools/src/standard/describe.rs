use async_trait::async_trait;
use serde_json::{Value, json};
use sfmcp_core::validation::decode_describe_object_args;
use sfmcp_core::{MetadataType, SalesforceApi, ToolInput, ToolResult, ValidationError};
use tracing::debug;

use crate::tool::SalesforceTool;

/// `describe_object`: describe an sObject.
///
/// With `detailed: true` on a custom object (`__c`), the `CustomObject`
/// metadata is read alongside the describe and both are returned as
/// `{"describe": ..., "metadata": ...}`. Any other combination returns the
/// describe result unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct DescribeObjectTool;

#[async_trait]
impl SalesforceTool for DescribeObjectTool {
    fn name(&self) -> &'static str {
        "describe_object"
    }

    fn description(&self) -> &'static str {
        "Get detailed metadata about a Salesforce object"
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "objectName": {
                    "type": "string",
                    "description": "API name of the object to describe"
                },
                "detailed": {
                    "type": "boolean",
                    "description": "Whether to return full metadata (optional)",
                    "default": false
                }
            },
            "required": ["objectName"]
        })
    }

    fn decode(&self, arguments: &Value) -> Result<ToolInput, ValidationError> {
        decode_describe_object_args(arguments).map(ToolInput::DescribeObject)
    }

    async fn invoke(&self, api: &dyn SalesforceApi, input: ToolInput) -> ToolResult<Value> {
        let ToolInput::DescribeObject(args) = input else {
            return Err(super::mismatched(self.name()));
        };

        if !(args.detailed && args.is_custom_object()) {
            debug!(object = %args.object_name, "Describing object");
            return Ok(api.describe(&args.object_name).await?);
        }

        debug!(object = %args.object_name, "Describing custom object with metadata");
        let full_names = [args.object_name.clone()];
        let (describe, mut records) = tokio::try_join!(
            api.describe(&args.object_name),
            api.metadata_read(MetadataType::CustomObject, &full_names),
        )?;

        // One name was requested, so at most one record comes back
        let metadata = if records.is_empty() {
            Value::Null
        } else {
            records.swap_remove(0)
        };

        Ok(json!({
            "describe": describe,
            "metadata": metadata,
        }))
    }
}
