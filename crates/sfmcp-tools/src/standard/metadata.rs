use async_trait::async_trait;
use serde_json::{Value, json};
use sfmcp_core::validation::decode_metadata_retrieve_args;
use sfmcp_core::{MetadataType, SalesforceApi, ToolInput, ToolResult, ValidationError};
use tracing::debug;

use crate::tool::SalesforceTool;

/// `metadata_retrieve`: read named metadata components of one type.
#[derive(Debug, Clone, Copy, Default)]
pub struct MetadataRetrieveTool;

#[async_trait]
impl SalesforceTool for MetadataRetrieveTool {
    fn name(&self) -> &'static str {
        "metadata_retrieve"
    }

    fn description(&self) -> &'static str {
        "Retrieve metadata components from Salesforce"
    }

    fn input_schema(&self) -> Value {
        let types: Vec<&str> = MetadataType::all().iter().map(|t| t.as_str()).collect();
        json!({
            "type": "object",
            "properties": {
                "type": {
                    "type": "string",
                    "description": "Metadata type (e.g., Flow, CustomObject)",
                    "enum": types
                },
                "fullNames": {
                    "type": "array",
                    "items": {"type": "string"},
                    "description": "Array of component names to retrieve"
                }
            },
            "required": ["type", "fullNames"]
        })
    }

    fn decode(&self, arguments: &Value) -> Result<ToolInput, ValidationError> {
        decode_metadata_retrieve_args(arguments).map(ToolInput::MetadataRetrieve)
    }

    async fn invoke(&self, api: &dyn SalesforceApi, input: ToolInput) -> ToolResult<Value> {
        let ToolInput::MetadataRetrieve(args) = input else {
            return Err(super::mismatched(self.name()));
        };

        debug!(
            metadata_type = %args.metadata_type,
            names = ?args.full_names,
            "Retrieving metadata"
        );
        let records = api
            .metadata_read(args.metadata_type, &args.full_names)
            .await?;
        Ok(Value::Array(records))
    }
}
