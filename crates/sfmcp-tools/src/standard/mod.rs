//! # Standard Tool Catalog
//!
//! - **Queries**: SOQL against the data API and the Tooling API
//! - **Describe**: sObject describe, optionally with custom object metadata
//! - **Metadata**: `readMetadata` for the supported component types
//!
//! ## Usage
//!
//! ```rust
//! use sfmcp_tools::{DescribeObjectTool, QueryTool, ToolRegistry};
//! use std::sync::Arc;
//!
//! let registry = ToolRegistry::new()
//!     .try_with_tool(Arc::new(QueryTool))
//!     .and_then(|registry| registry.try_with_tool(Arc::new(DescribeObjectTool)))
//!     .unwrap();
//! assert_eq!(registry.len(), 2);
//! ```

/// sObject describe
pub mod describe;
/// Metadata component reads
pub mod metadata;
/// Data and Tooling API queries
pub mod query;

pub use describe::DescribeObjectTool;
pub use metadata::MetadataRetrieveTool;
pub use query::{QueryTool, ToolingQueryTool};

use sfmcp_core::{ToolError, ValidationError};

pub(crate) fn mismatched(tool: &str) -> ToolError {
    ToolError::InvalidArguments(ValidationError::MismatchedInput {
        tool: tool.to_string(),
    })
}
