//! # sfmcp
//!
//! Salesforce query, describe and metadata APIs exposed as Model Context
//! Protocol tools over stdio.
//!
//! This crate re-exports the workspace members:
//!
//! - [`core`]: the remote capability trait, argument validation and errors
//! - [`salesforce`]: the HTTP client for the SOAP and REST APIs
//! - [`tools`]: the tool catalog
//! - [`server`]: the JSON-RPC dispatcher and stdio loop
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use sfmcp::salesforce::{SalesforceClient, SalesforceConfig};
//! use sfmcp::server::{Dispatcher, McpServer};
//! use sfmcp::tools::ToolRegistry;
//! use std::sync::Arc;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = SalesforceConfig::from_env()?;
//! let client = SalesforceClient::new(config)?;
//! let policy = client.session_policy();
//!
//! let dispatcher = Dispatcher::new(ToolRegistry::standard(), Arc::new(client), policy);
//! McpServer::new(dispatcher).serve_stdio().await?;
//! # Ok(())
//! # }
//! ```

pub use sfmcp_core as core;
pub use sfmcp_salesforce as salesforce;
pub use sfmcp_server as server;
pub use sfmcp_tools as tools;

pub use sfmcp_core::{SalesforceApi, SessionPolicy, ToolError};
pub use sfmcp_salesforce::{SalesforceClient, SalesforceConfig};
pub use sfmcp_server::{Dispatcher, McpServer};
pub use sfmcp_tools::ToolRegistry;
