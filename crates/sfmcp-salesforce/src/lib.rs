//! # sfmcp Salesforce
//!
//! The production [`sfmcp_core::SalesforceApi`]: partner SOAP login, REST
//! query and describe calls, and metadata reads over the Metadata SOAP API.
//!
//! ```rust,ignore
//! use sfmcp_salesforce::{SalesforceClient, SalesforceConfig};
//!
//! let config = SalesforceConfig::from_env()?;
//! let client = SalesforceClient::new(config)?;
//! client.login().await?;
//! let accounts = client.query("SELECT Id FROM Account LIMIT 1").await?;
//! ```

pub mod client;
pub mod config;
pub mod soap;
pub mod xml;

pub use client::SalesforceClient;
pub use config::{ConfigError, Credentials, SalesforceConfig, SalesforceConfigBuilder, load_env_file};
