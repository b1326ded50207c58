//! # Error Types
//!
//! Every per-request failure the dispatcher can observe is expressed as a
//! [`ToolError`]. The variants map one-to-one onto the categories clients see:
//! unknown tool, authentication failure, invalid arguments and remote API
//! failure. All of them end up as plain text inside an error envelope; only
//! configuration errors (defined next to the configuration loader) are fatal.

use thiserror::Error;

/// Result type for calls against the Salesforce capability.
pub type SalesforceResult<T> = Result<T, SalesforceError>;

/// Result type for tool execution.
pub type ToolResult<T> = Result<T, ToolError>;

/// Failures reported by the remote Salesforce capability.
///
/// The `Display` output is the raw remote message where one exists, so the
/// text a client sees matches what Salesforce returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SalesforceError {
    /// The login call was rejected (bad credentials, locked user, ...).
    #[error("{0}")]
    LoginFailed(String),

    /// The session token is no longer accepted by the org.
    #[error("{0}")]
    SessionExpired(String),

    /// A data-bearing call was attempted without a session.
    #[error("no active Salesforce session")]
    NotAuthenticated,

    /// REST API error response (`[{"errorCode": ..., "message": ...}]`).
    #[error("{error_code}: {message}")]
    Api {
        status: u16,
        error_code: String,
        message: String,
    },

    /// SOAP fault returned by the partner or metadata endpoint.
    #[error("{message}")]
    Fault { fault_code: String, message: String },

    /// Network level failure before a response was received.
    #[error("connection error: {0}")]
    Connection(String),

    /// The request exceeded the configured timeout.
    #[error("request timed out: {0}")]
    Timeout(String),

    /// The response could not be decoded.
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

impl SalesforceError {
    /// Whether re-authenticating could make the failed call succeed.
    pub fn is_session_expired(&self) -> bool {
        matches!(self, SalesforceError::SessionExpired(_) | SalesforceError::NotAuthenticated)
    }

    /// Build an API error from a status code and the first error record of a
    /// REST error body.
    pub fn api(status: u16, error_code: impl Into<String>, message: impl Into<String>) -> Self {
        SalesforceError::Api {
            status,
            error_code: error_code.into(),
            message: message.into(),
        }
    }
}

/// Structural rejection of a tool's argument bag.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Arguments were `null`, a primitive or an array.
    #[error("Invalid {tool} arguments: expected an object")]
    NotAnObject { tool: String },

    /// A required field is absent.
    #[error("Invalid {tool} arguments: missing required field '{field}'")]
    MissingField { tool: String, field: String },

    /// A field is present with the wrong JSON type.
    #[error("Invalid {tool} arguments: field '{field}' must be {expected}")]
    WrongType {
        tool: String,
        field: String,
        expected: &'static str,
    },

    /// `type` is not one of the supported metadata kinds.
    #[error("Invalid metadata type: {0}")]
    InvalidMetadataType(String),

    /// A handler received input decoded for a different tool.
    #[error("Invalid {tool} arguments: input was decoded for another tool")]
    MismatchedInput { tool: String },
}

/// Errors surfaced by the dispatcher as error envelopes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ToolError {
    /// The requested tool is not registered.
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    /// Login was rejected or unreachable.
    #[error("Salesforce API error: {0}")]
    Authentication(SalesforceError),

    /// The argument bag failed validation.
    #[error("{0}")]
    InvalidArguments(#[from] ValidationError),

    /// The remote call itself failed.
    #[error("Salesforce API error: {0}")]
    Remote(#[from] SalesforceError),
}

impl ToolError {
    /// Short category label used in structured logs.
    pub fn category(&self) -> &'static str {
        match self {
            ToolError::UnknownTool(_) => "unknown_tool",
            ToolError::Authentication(_) => "authentication",
            ToolError::InvalidArguments(_) => "invalid_arguments",
            ToolError::Remote(_) => "remote_api",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_tool_message() {
        let err = ToolError::UnknownTool("bogus_tool".to_string());
        assert_eq!(err.to_string(), "Unknown tool: bogus_tool");
        assert_eq!(err.category(), "unknown_tool");
    }

    #[test]
    fn test_remote_errors_are_prefixed() {
        let err = ToolError::Remote(SalesforceError::api(400, "MALFORMED_QUERY", "unexpected token"));
        assert_eq!(
            err.to_string(),
            "Salesforce API error: MALFORMED_QUERY: unexpected token"
        );

        let err = ToolError::Authentication(SalesforceError::LoginFailed(
            "INVALID_LOGIN: Invalid username, password, security token; or user locked out."
                .to_string(),
        ));
        assert!(err.to_string().starts_with("Salesforce API error: INVALID_LOGIN"));
    }

    #[test]
    fn test_validation_message_is_not_prefixed() {
        let err: ToolError = ValidationError::InvalidMetadataType("NotARealType".to_string()).into();
        assert_eq!(err.to_string(), "Invalid metadata type: NotARealType");
        assert_eq!(err.category(), "invalid_arguments");
    }

    #[test]
    fn test_session_expiry_detection() {
        assert!(SalesforceError::SessionExpired("Session expired or invalid".into()).is_session_expired());
        assert!(SalesforceError::NotAuthenticated.is_session_expired());
        assert!(!SalesforceError::Connection("refused".into()).is_session_expired());
    }
}
