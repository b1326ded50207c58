//! # sfmcp Tools
//!
//! The tool catalog served over MCP.
//!
//! - [`SalesforceTool`]: name, description, input schema, argument decoder
//!   and handler of one tool
//! - [`ToolRegistry`]: ordered, name-unique collection built once at startup
//! - [`standard`]: `query`, `tooling_query`, `describe_object` and
//!   `metadata_retrieve`

/// Tool registry and advertised descriptors.
pub mod registry;
/// Standard Salesforce tools.
pub mod standard;
/// The tool trait.
pub mod tool;

pub use registry::{RegistryError, ToolDescriptor, ToolRegistry};
pub use standard::*;
pub use tool::SalesforceTool;
