//! Server error types
//!
//! Per-request failures never reach these types: tool failures become error
//! envelopes and protocol failures become JSON-RPC error objects. What is
//! left is the transport itself failing.

use sfmcp_core::SalesforceError;
use thiserror::Error;

/// Server operation result type
pub type ServerResult<T> = Result<T, ServerError>;

/// Errors that stop the serve loop
#[derive(Debug, Error)]
pub enum ServerError {
    /// Reading from or writing to the transport failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failures of `resources/read`, reported as JSON-RPC errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResourceError {
    #[error("Unknown resource: {0}")]
    UnknownResource(String),

    #[error("Salesforce API error: {0}")]
    Remote(#[from] SalesforceError),
}
