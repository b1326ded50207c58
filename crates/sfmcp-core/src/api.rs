//! The remote Salesforce capability.
//!
//! Tools never talk HTTP themselves; they receive a `&dyn SalesforceApi` and
//! call its operations. The production implementation is
//! `sfmcp_salesforce::SalesforceClient`; tests use
//! [`crate::testing::MockSalesforceApi`].

use async_trait::async_trait;
use serde_json::Value;
use std::str::FromStr;
use std::time::Instant;
use tracing::debug;

use crate::error::SalesforceResult;
use crate::metadata::MetadataType;

/// Authentication state of the capability's session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No login has succeeded yet, or the session was invalidated.
    Unauthenticated,
    /// A session token is held. `expires_at` is `None` when the org did not
    /// report a lifetime.
    Authenticated { expires_at: Option<Instant> },
}

impl SessionState {
    /// Whether the session can be used for a call made at `now`.
    pub fn is_valid_at(&self, now: Instant) -> bool {
        match self {
            SessionState::Unauthenticated => false,
            SessionState::Authenticated { expires_at: None } => true,
            SessionState::Authenticated {
                expires_at: Some(expires_at),
            } => now < *expires_at,
        }
    }
}

/// When the dispatcher logs in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionPolicy {
    /// Reuse the session until it expires or the org rejects it.
    #[default]
    Cached,
    /// Log in before every invocation.
    PerCall,
}

impl FromStr for SessionPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "cached" => Ok(SessionPolicy::Cached),
            "per_call" | "per-call" => Ok(SessionPolicy::PerCall),
            other => Err(format!(
                "invalid session policy '{other}', expected 'cached' or 'per_call'"
            )),
        }
    }
}

/// Operations the adapter needs from a Salesforce org.
///
/// Implementations own their session. `login` replaces any existing session;
/// data-bearing calls fail with `SalesforceError::NotAuthenticated` when no
/// session is held and `SalesforceError::SessionExpired` when the org rejects
/// the token.
#[async_trait]
pub trait SalesforceApi: Send + Sync {
    /// Current authentication state.
    async fn session_state(&self) -> SessionState;

    /// Authenticate with the configured credential set.
    async fn login(&self) -> SalesforceResult<()>;

    /// Drop the held session so the next call logs in again.
    async fn invalidate_session(&self);

    /// Execute a SOQL query against the data API.
    async fn query(&self, soql: &str) -> SalesforceResult<Value>;

    /// Execute a query against the Tooling API.
    async fn tooling_query(&self, soql: &str) -> SalesforceResult<Value>;

    /// Describe a single sObject.
    async fn describe(&self, object_name: &str) -> SalesforceResult<Value>;

    /// Describe every sObject visible to the user.
    async fn describe_global(&self) -> SalesforceResult<Value>;

    /// Read metadata components of one type, one record per requested name.
    async fn metadata_read(
        &self,
        metadata_type: MetadataType,
        full_names: &[String],
    ) -> SalesforceResult<Vec<Value>>;
}

/// Make sure `api` holds a usable session according to `policy`.
///
/// Returns `true` when a login call was issued.
pub async fn ensure_authenticated(
    api: &dyn SalesforceApi,
    policy: SessionPolicy,
) -> SalesforceResult<bool> {
    let needs_login = match policy {
        SessionPolicy::PerCall => true,
        SessionPolicy::Cached => !api.session_state().await.is_valid_at(Instant::now()),
    };

    if needs_login {
        debug!(?policy, "Logging in to Salesforce");
        api.login().await?;
    }
    Ok(needs_login)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_session_state_validity() {
        let now = Instant::now();
        assert!(!SessionState::Unauthenticated.is_valid_at(now));
        assert!(SessionState::Authenticated { expires_at: None }.is_valid_at(now));

        let expires_at = now + Duration::from_secs(60);
        let state = SessionState::Authenticated {
            expires_at: Some(expires_at),
        };
        assert!(state.is_valid_at(now));
        assert!(!state.is_valid_at(expires_at));
    }

    #[test]
    fn test_session_policy_parsing() {
        assert_eq!("cached".parse(), Ok(SessionPolicy::Cached));
        assert_eq!("PER_CALL".parse(), Ok(SessionPolicy::PerCall));
        assert_eq!("per-call".parse(), Ok(SessionPolicy::PerCall));
        assert!("sometimes".parse::<SessionPolicy>().is_err());
        assert_eq!(SessionPolicy::default(), SessionPolicy::Cached);
    }
}
