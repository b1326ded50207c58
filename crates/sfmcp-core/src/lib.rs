//! # sfmcp Core
//!
//! Shared building blocks for the Salesforce MCP adapter:
//!
//! - [`api::SalesforceApi`]: the remote capability every tool talks to
//! - [`validation`]: argument predicates and typed decoders for the tool catalog
//! - [`metadata::MetadataType`]: the closed set of retrievable metadata kinds
//! - [`error`]: the error taxonomy surfaced through the dispatcher
//!
//! Nothing in this crate performs I/O. The HTTP implementation of the
//! capability lives in `sfmcp-salesforce`.

pub mod api;
pub mod error;
pub mod metadata;
pub mod validation;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use api::{SalesforceApi, SessionPolicy, SessionState, ensure_authenticated};
pub use error::{SalesforceError, SalesforceResult, ToolError, ToolResult, ValidationError};
pub use metadata::MetadataType;
pub use validation::{DescribeObjectArgs, MetadataRetrieveArgs, QueryArgs, ToolInput};
