//! HTTP implementation of [`SalesforceApi`].
//!
//! # Endpoints
//!
//! | Operation | Request |
//! |-----------|---------|
//! | login | `POST {login_url}/services/Soap/u/{version}` (partner SOAP) |
//! | query | `GET {instance}/services/data/v{version}/query?q=` |
//! | tooling query | `GET {instance}/services/data/v{version}/tooling/query?q=` |
//! | describe | `GET {instance}/services/data/v{version}/sobjects/{name}/describe` |
//! | describe global | `GET {instance}/services/data/v{version}/sobjects` |
//! | metadata read | `POST {metadata_server_url}` (`readMetadata` SOAP) |
//!
//! # Error Handling
//!
//! | Response | Error |
//! |----------|-------|
//! | 401, or `INVALID_SESSION_ID` in a REST body or SOAP fault | `SessionExpired` |
//! | REST error body `[{"errorCode", "message"}]` | `Api` |
//! | SOAP fault | `Fault` (`LoginFailed` for the login call) |
//! | request exceeded the timeout | `Timeout` |
//! | any other transport failure | `Connection` |
//!
//! Every request carries the configured timeout. Nothing is retried here;
//! re-authentication after `SessionExpired` is the dispatcher's job.

use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::Value;
use sfmcp_core::{
    MetadataType, SalesforceApi, SalesforceError, SalesforceResult, SessionPolicy, SessionState,
};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use url::Url;

use crate::config::{Credentials, SalesforceConfig};
use crate::soap;

const SOAP_CONTENT_TYPE: &str = "text/xml; charset=utf-8";

/// Longest slice of an unparseable error body kept in error messages.
const MAX_ERROR_BODY: usize = 512;

/// An authenticated session.
struct Session {
    access_token: SecretString,
    instance_url: Url,
    metadata_url: String,
    expires_at: Option<Instant>,
}

/// Salesforce client holding a single session for one credential set.
pub struct SalesforceClient {
    http: Client,
    login_url: Url,
    api_version: String,
    credentials: Credentials,
    session_policy: SessionPolicy,
    session: Mutex<Option<Arc<Session>>>,
}

impl std::fmt::Debug for SalesforceClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SalesforceClient")
            .field("login_url", &self.login_url.as_str())
            .field("api_version", &self.api_version)
            .field("username", &self.credentials.username())
            .finish()
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RestError {
    error_code: String,
    message: String,
}

impl SalesforceClient {
    /// Create a client from validated configuration. No request is made.
    pub fn new(config: SalesforceConfig) -> SalesforceResult<Self> {
        let http = Client::builder()
            .timeout(config.request_timeout)
            .user_agent(format!("sfmcp/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| {
                SalesforceError::Connection(format!("Failed to create HTTP client: {e}"))
            })?;

        Ok(Self {
            http,
            login_url: config.login_url,
            api_version: config.api_version,
            credentials: config.credentials,
            session_policy: config.session_policy,
            session: Mutex::new(None),
        })
    }

    /// Session policy the dispatcher should apply to this client.
    pub fn session_policy(&self) -> SessionPolicy {
        self.session_policy
    }

    fn login_endpoint(&self) -> String {
        format!(
            "{}/services/Soap/u/{}",
            self.login_url.as_str().trim_end_matches('/'),
            self.api_version
        )
    }

    async fn current_session(&self) -> SalesforceResult<Arc<Session>> {
        self.session
            .lock()
            .await
            .as_ref()
            .map(Arc::clone)
            .ok_or(SalesforceError::NotAuthenticated)
    }

    /// `{instance}/services/data/v{version}/{segments...}`
    fn rest_url(&self, session: &Session, segments: &[&str]) -> SalesforceResult<Url> {
        let version = format!("v{}", self.api_version);
        let mut url = session.instance_url.clone();
        url.path_segments_mut()
            .map_err(|()| {
                SalesforceError::InvalidResponse(format!(
                    "instance URL '{}' cannot carry a path",
                    session.instance_url
                ))
            })?
            .pop_if_empty()
            .extend(["services", "data", version.as_str()])
            .extend(segments);
        Ok(url)
    }

    async fn rest_get(&self, segments: &[&str], soql: Option<&str>) -> SalesforceResult<Value> {
        let session = self.current_session().await?;
        let url = self.rest_url(&session, segments)?;

        debug!(url = %url, "Sending Salesforce REST request");

        let mut request = self
            .http
            .get(url)
            .bearer_auth(session.access_token.expose_secret())
            .header(ACCEPT, "application/json");
        if let Some(soql) = soql {
            request = request.query(&[("q", soql)]);
        }

        let response = request.send().await.map_err(transport_error)?;
        let status = response.status();
        if !status.is_success() {
            return Err(rest_error(status, response).await);
        }

        response.json().await.map_err(|e| {
            SalesforceError::InvalidResponse(format!("Failed to parse REST response: {e}"))
        })
    }

    async fn soap_post(&self, url: &str, envelope: String) -> SalesforceResult<(StatusCode, String)> {
        let response = self
            .http
            .post(url)
            .header(CONTENT_TYPE, SOAP_CONTENT_TYPE)
            .header("SOAPAction", "\"\"")
            .body(envelope)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        let body = response.text().await.map_err(transport_error)?;
        Ok((status, body))
    }
}

#[async_trait]
impl SalesforceApi for SalesforceClient {
    async fn session_state(&self) -> SessionState {
        match self.session.lock().await.as_ref() {
            Some(session) => SessionState::Authenticated {
                expires_at: session.expires_at,
            },
            None => SessionState::Unauthenticated,
        }
    }

    async fn login(&self) -> SalesforceResult<()> {
        // Held across the request so concurrent callers do not log in twice
        let mut slot = self.session.lock().await;

        let endpoint = self.login_endpoint();
        debug!(url = %endpoint, username = %self.credentials.username(), "Logging in");

        let password = self.credentials.login_password();
        let envelope = soap::login_envelope(self.credentials.username(), password.expose_secret());
        let (status, body) = self.soap_post(&endpoint, envelope).await?;

        let login = match soap::parse_login_response(&body) {
            Ok(login) if status.is_success() => login,
            Err(e @ SalesforceError::LoginFailed(_)) => return Err(e),
            Err(e) if status.is_success() => return Err(e),
            _ => {
                return Err(SalesforceError::LoginFailed(format!(
                    "login failed with HTTP {status}: {}",
                    truncate(&body)
                )));
            }
        };

        let instance_url = Url::parse(&login.instance_url).map_err(|e| {
            SalesforceError::InvalidResponse(format!("invalid instance URL: {e}"))
        })?;
        let expires_at = login
            .session_seconds_valid
            .map(|seconds| Instant::now() + Duration::from_secs(seconds));

        info!(
            instance_url = %instance_url,
            user_id = login.user_id.as_deref().unwrap_or_default(),
            organization_id = login.organization_id.as_deref().unwrap_or_default(),
            session_seconds_valid = login.session_seconds_valid,
            "Logged in to Salesforce"
        );

        *slot = Some(Arc::new(Session {
            access_token: login.session_id,
            instance_url,
            metadata_url: login.metadata_server_url,
            expires_at,
        }));
        Ok(())
    }

    async fn invalidate_session(&self) {
        if self.session.lock().await.take().is_some() {
            debug!("Dropped Salesforce session");
        }
    }

    async fn query(&self, soql: &str) -> SalesforceResult<Value> {
        self.rest_get(&["query"], Some(soql)).await
    }

    async fn tooling_query(&self, soql: &str) -> SalesforceResult<Value> {
        self.rest_get(&["tooling", "query"], Some(soql)).await
    }

    async fn describe(&self, object_name: &str) -> SalesforceResult<Value> {
        self.rest_get(&["sobjects", object_name, "describe"], None)
            .await
    }

    async fn describe_global(&self) -> SalesforceResult<Value> {
        self.rest_get(&["sobjects"], None).await
    }

    async fn metadata_read(
        &self,
        metadata_type: MetadataType,
        full_names: &[String],
    ) -> SalesforceResult<Vec<Value>> {
        let session = self.current_session().await?;

        debug!(
            metadata_type = %metadata_type,
            count = full_names.len(),
            "Reading metadata"
        );

        let envelope = soap::read_metadata_envelope(
            session.access_token.expose_secret(),
            metadata_type,
            full_names,
        );
        let (status, body) = self.soap_post(&session.metadata_url, envelope).await?;

        let parsed = soap::parse_read_metadata_response(&body);
        if status.is_success() {
            return parsed;
        }
        match parsed {
            Err(e @ (SalesforceError::SessionExpired(_) | SalesforceError::Fault { .. })) => Err(e),
            _ => Err(status_error(status, &body)),
        }
    }
}

fn transport_error(error: reqwest::Error) -> SalesforceError {
    if error.is_timeout() {
        SalesforceError::Timeout(error.to_string())
    } else {
        SalesforceError::Connection(error.to_string())
    }
}

/// Map a non-success REST response.
async fn rest_error(status: StatusCode, response: reqwest::Response) -> SalesforceError {
    let body = response.text().await.unwrap_or_default();

    let first = serde_json::from_str::<Vec<RestError>>(&body)
        .ok()
        .and_then(|errors| errors.into_iter().next());

    match first {
        Some(error) if status == StatusCode::UNAUTHORIZED || error.error_code == "INVALID_SESSION_ID" => {
            SalesforceError::SessionExpired(error.message)
        }
        Some(error) => {
            warn!(status = status.as_u16(), error_code = %error.error_code, "Salesforce API error");
            SalesforceError::api(status.as_u16(), error.error_code, error.message)
        }
        None if status == StatusCode::UNAUTHORIZED => {
            SalesforceError::SessionExpired(format!("HTTP {status}"))
        }
        None => status_error(status, &body),
    }
}

fn status_error(status: StatusCode, body: &str) -> SalesforceError {
    SalesforceError::api(
        status.as_u16(),
        format!("HTTP_{}", status.as_u16()),
        truncate(body),
    )
}

fn truncate(body: &str) -> String {
    let body = body.trim();
    match body.char_indices().nth(MAX_ERROR_BODY) {
        Some((index, _)) => format!("{}...", &body[..index]),
        None => body.to_string(),
    }
}
