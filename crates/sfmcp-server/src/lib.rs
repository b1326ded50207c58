//! # sfmcp Server
//!
//! Exposes the Salesforce tool catalog over the Model Context Protocol on a
//! line-delimited JSON-RPC 2.0 stream (stdin/stdout in production).
//!
//! ## Supported methods
//!
//! | Method | Result |
//! |--------|--------|
//! | `initialize` | protocol version, capabilities and server info |
//! | `ping` | `{}` |
//! | `tools/list` | the registered tools |
//! | `tools/call` | a tool-invocation envelope |
//! | `resources/list` | `salesforce://Account/objects` |
//! | `resources/read` | queryable objects of the org |
//!
//! Notifications are accepted and never answered. Tool failures are
//! reported inside the envelope with `isError: true`; only protocol problems
//! become JSON-RPC errors.
//!
//! ## Example
//!
//! ```rust,ignore
//! use sfmcp_server::{Dispatcher, McpServer};
//! use sfmcp_tools::ToolRegistry;
//! use std::sync::Arc;
//!
//! let dispatcher = Dispatcher::new(ToolRegistry::standard(), Arc::new(client), policy);
//! McpServer::new(dispatcher).serve_stdio().await?;
//! ```

pub mod dispatcher;
pub mod error;
pub mod jsonrpc;
pub mod protocol;
pub mod resources;
pub mod server;
pub mod shutdown;

pub use dispatcher::Dispatcher;
pub use error::{ResourceError, ServerError, ServerResult};
pub use protocol::{CallToolResult, Content, DEFAULT_PROTOCOL_VERSION, ServerInfo};
pub use server::McpServer;
pub use shutdown::shutdown_signal;
