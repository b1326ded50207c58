use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;

use crate::standard::{DescribeObjectTool, MetadataRetrieveTool, QueryTool, ToolingQueryTool};
use crate::tool::SalesforceTool;

/// What `tools/list` advertises for a tool.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolDescriptor {
    pub name: String,
    pub description: String,
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
}

/// Registry construction failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("tool '{0}' is already registered")]
    DuplicateTool(String),
}

/// Ordered collection of tools, built once at startup.
///
/// Lookup is by exact, case-sensitive name. Listing preserves registration
/// order.
///
/// # Example
///
/// ```rust
/// use sfmcp_tools::ToolRegistry;
///
/// let registry = ToolRegistry::standard();
/// assert!(registry.find("query").is_some());
/// assert!(registry.find("Query").is_none());
/// ```
#[derive(Clone, Default)]
pub struct ToolRegistry {
    tools: Vec<Arc<dyn SalesforceTool>>,
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tools", &self.tool_names())
            .finish()
    }
}

impl ToolRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the standard catalog: `query`, `tooling_query`,
    /// `describe_object` and `metadata_retrieve`, in that order.
    pub fn standard() -> Self {
        let tools: Vec<Arc<dyn SalesforceTool>> = vec![
            Arc::new(QueryTool),
            Arc::new(ToolingQueryTool),
            Arc::new(DescribeObjectTool),
            Arc::new(MetadataRetrieveTool),
        ];
        Self { tools }
    }

    /// Add a tool using the builder pattern.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::DuplicateTool` if a tool with the same name is
    /// already registered.
    pub fn try_with_tool(mut self, tool: Arc<dyn SalesforceTool>) -> Result<Self, RegistryError> {
        if self.find(tool.name()).is_some() {
            return Err(RegistryError::DuplicateTool(tool.name().to_string()));
        }
        self.tools.push(tool);
        Ok(self)
    }

    /// Tool registered under exactly `name`.
    pub fn find(&self, name: &str) -> Option<&Arc<dyn SalesforceTool>> {
        self.tools.iter().find(|tool| tool.name() == name)
    }

    /// Descriptors of every tool, in registration order.
    pub fn list(&self) -> Vec<ToolDescriptor> {
        self.tools
            .iter()
            .map(|tool| ToolDescriptor {
                name: tool.name().to_string(),
                description: tool.description().to_string(),
                input_schema: tool.input_schema(),
            })
            .collect()
    }

    pub fn tool_names(&self) -> Vec<&'static str> {
        self.tools.iter().map(|tool| tool.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}
