//! # Environment-Based Configuration
//!
//! The credential set and endpoint settings are read once at startup and are
//! immutable afterwards. A missing credential is fatal.
//!
//! ## Environment Variables
//!
//! - `SF_USERNAME` - Login username (required)
//! - `SF_PASSWORD` - Login password (required)
//! - `SF_SECURITY_TOKEN` - Security token appended to the password (required)
//! - `SF_LOGIN_URL` - Login endpoint (default: `https://login.salesforce.com`)
//! - `SF_API_VERSION` - API version without the `v` prefix (default: `59.0`)
//! - `SF_REQUEST_TIMEOUT_SECS` - Per-request timeout, 1-600 (default: 120)
//! - `SF_SESSION_POLICY` - `cached` or `per_call` (default: `cached`)
//!
//! A `.env` file is honoured through [`load_env_file`]; variables already set
//! in the process environment take precedence over the file.

use secrecy::{ExposeSecret, SecretString};
use sfmcp_core::SessionPolicy;
use std::path::{Path, PathBuf};
use std::{env, time::Duration};
use url::Url;

pub const DEFAULT_LOGIN_URL: &str = "https://login.salesforce.com";
pub const DEFAULT_API_VERSION: &str = "59.0";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 120;
const MAX_REQUEST_TIMEOUT_SECS: u64 = 600;

/// Error type for configuration loading
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variables: {}", .0.join(", "))]
    MissingEnvVars(Vec<String>),

    #[error("Invalid environment variable '{key}': {message}")]
    InvalidEnvVar { key: String, message: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),

    #[error("Failed to load env file '{path}': {message}")]
    EnvFile { path: String, message: String },
}

/// The single credential set used for every login.
#[derive(Debug)]
pub struct Credentials {
    username: String,
    password: SecretString,
    security_token: SecretString,
}

impl Credentials {
    pub fn new(
        username: impl Into<String>,
        password: impl Into<String>,
        security_token: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            password: SecretString::from(password.into()),
            security_token: SecretString::from(security_token.into()),
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    /// Password with the security token appended, as the login call expects.
    pub fn login_password(&self) -> SecretString {
        SecretString::from(format!(
            "{}{}",
            self.password.expose_secret(),
            self.security_token.expose_secret()
        ))
    }
}

/// Validated client configuration.
#[derive(Debug)]
pub struct SalesforceConfig {
    pub credentials: Credentials,
    pub login_url: Url,
    pub api_version: String,
    pub request_timeout: Duration,
    pub session_policy: SessionPolicy,
}

impl SalesforceConfig {
    /// Load and validate configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` when a credential is missing or a value is invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        SalesforceConfigBuilder::from_env()?.build()
    }

    /// Builder preloaded with defaults and no credentials.
    pub fn builder() -> SalesforceConfigBuilder {
        SalesforceConfigBuilder::default()
    }
}

/// Builder for `SalesforceConfig` with environment variable support
#[derive(Debug)]
pub struct SalesforceConfigBuilder {
    username: Option<String>,
    password: Option<String>,
    security_token: Option<String>,
    login_url: String,
    api_version: String,
    request_timeout_secs: u64,
    session_policy: SessionPolicy,
}

impl Default for SalesforceConfigBuilder {
    fn default() -> Self {
        Self {
            username: None,
            password: None,
            security_token: None,
            login_url: DEFAULT_LOGIN_URL.to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            session_policy: SessionPolicy::default(),
        }
    }
}

impl SalesforceConfigBuilder {
    /// Load configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if any environment variable has an invalid value.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        // Empty values count as unset
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let mut builder = Self::default();
        builder.username = get("SF_USERNAME");
        builder.password = get("SF_PASSWORD");
        builder.security_token = get("SF_SECURITY_TOKEN");

        if let Some(login_url) = get("SF_LOGIN_URL") {
            builder = builder.login_url(login_url);
        }
        if let Some(version) = get("SF_API_VERSION") {
            builder = builder.api_version(version);
        }
        if let Some(timeout) = get("SF_REQUEST_TIMEOUT_SECS") {
            let timeout = timeout
                .trim()
                .parse::<u64>()
                .map_err(|e| ConfigError::InvalidEnvVar {
                    key: "SF_REQUEST_TIMEOUT_SECS".to_string(),
                    message: format!("invalid integer '{timeout}': {e}"),
                })?;
            builder = builder.request_timeout_secs(timeout);
        }
        if let Some(policy) = get("SF_SESSION_POLICY") {
            let policy = policy
                .parse::<SessionPolicy>()
                .map_err(|message| ConfigError::InvalidEnvVar {
                    key: "SF_SESSION_POLICY".to_string(),
                    message,
                })?;
            builder = builder.session_policy(policy);
        }

        Ok(builder)
    }

    /// Set all three credential parts
    #[must_use]
    pub fn credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
        security_token: impl Into<String>,
    ) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self.security_token = Some(security_token.into());
        self
    }

    #[must_use]
    pub fn login_url(mut self, login_url: impl Into<String>) -> Self {
        self.login_url = login_url.into();
        self
    }

    #[must_use]
    pub fn api_version(mut self, version: impl Into<String>) -> Self {
        self.api_version = version.into();
        self
    }

    #[must_use]
    pub fn request_timeout_secs(mut self, timeout: u64) -> Self {
        self.request_timeout_secs = timeout;
        self
    }

    #[must_use]
    pub fn session_policy(mut self, policy: SessionPolicy) -> Self {
        self.session_policy = policy;
        self
    }

    /// Validate configuration and build `SalesforceConfig`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingEnvVars` listing every absent credential,
    /// or `ConfigError::ValidationError` for malformed values.
    pub fn build(self) -> Result<SalesforceConfig, ConfigError> {
        let missing: Vec<String> = [
            ("SF_USERNAME", self.username.is_none()),
            ("SF_PASSWORD", self.password.is_none()),
            ("SF_SECURITY_TOKEN", self.security_token.is_none()),
        ]
        .into_iter()
        .filter(|(_, absent)| *absent)
        .map(|(key, _)| key.to_string())
        .collect();

        let (Some(username), Some(password), Some(security_token)) =
            (self.username, self.password, self.security_token)
        else {
            return Err(ConfigError::MissingEnvVars(missing));
        };

        let login_url = Url::parse(self.login_url.trim()).map_err(|e| {
            ConfigError::ValidationError(format!("login_url '{}' is not a URL: {e}", self.login_url))
        })?;
        if !matches!(login_url.scheme(), "http" | "https") {
            return Err(ConfigError::ValidationError(format!(
                "login_url must use http or https, got '{}'",
                login_url.scheme()
            )));
        }

        let api_version = self.api_version.trim().trim_start_matches('v').to_string();
        if !is_api_version(&api_version) {
            return Err(ConfigError::ValidationError(format!(
                "api_version must look like '59.0', got '{}'",
                self.api_version
            )));
        }

        if self.request_timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "request_timeout_secs must be greater than 0".to_string(),
            ));
        }
        if self.request_timeout_secs > MAX_REQUEST_TIMEOUT_SECS {
            return Err(ConfigError::ValidationError(format!(
                "request_timeout_secs must be <= {MAX_REQUEST_TIMEOUT_SECS}"
            )));
        }

        Ok(SalesforceConfig {
            credentials: Credentials::new(username, password, security_token),
            login_url,
            api_version,
            request_timeout: Duration::from_secs(self.request_timeout_secs),
            session_policy: self.session_policy,
        })
    }
}

/// Seed the process environment from a `.env` file.
///
/// With an explicit `path` the file must exist. Without one, a `.env` in the
/// current directory or its parents is used when present.
///
/// # Returns
///
/// The path of the file that was loaded, if any.
pub fn load_env_file(path: Option<&Path>) -> Result<Option<PathBuf>, ConfigError> {
    match path {
        Some(path) => dotenvy::from_path(path)
            .map(|()| Some(path.to_path_buf()))
            .map_err(|e| ConfigError::EnvFile {
                path: path.display().to_string(),
                message: e.to_string(),
            }),
        None => match dotenvy::dotenv() {
            Ok(found) => Ok(Some(found)),
            Err(e) if e.not_found() => Ok(None),
            Err(e) => Err(ConfigError::EnvFile {
                path: ".env".to_string(),
                message: e.to_string(),
            }),
        },
    }
}

fn is_api_version(version: &str) -> bool {
    match version.split_once('.') {
        Some((major, minor)) => {
            !major.is_empty()
                && !minor.is_empty()
                && major.chars().all(|c| c.is_ascii_digit())
                && minor.chars().all(|c| c.is_ascii_digit())
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    const CREDENTIALS: [(&str, &str); 3] = [
        ("SF_USERNAME", "integration@example.com"),
        ("SF_PASSWORD", "hunter2"),
        ("SF_SECURITY_TOKEN", "TOKEN123"),
    ];

    #[test]
    fn test_defaults() {
        let config = SalesforceConfigBuilder::from_lookup(lookup(&CREDENTIALS))
            .unwrap()
            .build()
            .unwrap();

        assert_eq!(config.login_url.as_str(), "https://login.salesforce.com/");
        assert_eq!(config.api_version, "59.0");
        assert_eq!(config.request_timeout, Duration::from_secs(120));
        assert_eq!(config.session_policy, SessionPolicy::Cached);
        assert_eq!(config.credentials.username(), "integration@example.com");
        assert_eq!(
            config.credentials.login_password().expose_secret(),
            "hunter2TOKEN123"
        );
    }

    #[test]
    fn test_missing_credentials_are_all_reported() {
        let err = SalesforceConfigBuilder::from_lookup(lookup(&[("SF_USERNAME", "a@b.c")]))
            .unwrap()
            .build()
            .unwrap_err();

        match err {
            ConfigError::MissingEnvVars(keys) => {
                assert_eq!(keys, vec!["SF_PASSWORD", "SF_SECURITY_TOKEN"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_blank_values_count_as_missing() {
        let mut vars = CREDENTIALS.to_vec();
        vars[2] = ("SF_SECURITY_TOKEN", "  ");
        let err = SalesforceConfigBuilder::from_lookup(lookup(&vars))
            .unwrap()
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("SF_SECURITY_TOKEN"));
    }

    #[test]
    fn test_overrides() {
        let mut vars = CREDENTIALS.to_vec();
        vars.extend([
            ("SF_LOGIN_URL", "https://test.salesforce.com"),
            ("SF_API_VERSION", "v60.0"),
            ("SF_REQUEST_TIMEOUT_SECS", "15"),
            ("SF_SESSION_POLICY", "per_call"),
        ]);
        let config = SalesforceConfigBuilder::from_lookup(lookup(&vars))
            .unwrap()
            .build()
            .unwrap();

        assert_eq!(config.login_url.host_str(), Some("test.salesforce.com"));
        assert_eq!(config.api_version, "60.0");
        assert_eq!(config.request_timeout, Duration::from_secs(15));
        assert_eq!(config.session_policy, SessionPolicy::PerCall);
    }

    #[test]
    fn test_invalid_values() {
        let mut vars = CREDENTIALS.to_vec();
        vars.push(("SF_REQUEST_TIMEOUT_SECS", "soon"));
        assert!(matches!(
            SalesforceConfigBuilder::from_lookup(lookup(&vars)),
            Err(ConfigError::InvalidEnvVar { .. })
        ));

        let mut vars = CREDENTIALS.to_vec();
        vars.push(("SF_SESSION_POLICY", "sometimes"));
        assert!(SalesforceConfigBuilder::from_lookup(lookup(&vars)).is_err());

        let builder = SalesforceConfig::builder().credentials("u", "p", "t");
        assert!(builder.login_url("ftp://login.salesforce.com").build().is_err());

        let builder = SalesforceConfig::builder().credentials("u", "p", "t");
        assert!(builder.api_version("latest").build().is_err());

        let builder = SalesforceConfig::builder().credentials("u", "p", "t");
        assert!(builder.request_timeout_secs(0).build().is_err());
    }

    #[test]
    fn test_credentials_are_redacted_in_debug() {
        let credentials = Credentials::new("u@example.com", "hunter2", "TOKEN123");
        let debug = format!("{credentials:?}");
        assert!(!debug.contains("hunter2"));
        assert!(!debug.contains("TOKEN123"));
    }
}
