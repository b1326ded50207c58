//! In-memory [`SalesforceApi`] for tests.
//!
//! Every call is recorded so tests can assert exactly which remote
//! operations a dispatch issued, and in which order.

use async_trait::async_trait;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use crate::api::{SalesforceApi, SessionState};
use crate::error::{SalesforceError, SalesforceResult};
use crate::metadata::MetadataType;

/// A remote operation observed by the mock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockCall {
    Login,
    InvalidateSession,
    Query(String),
    ToolingQuery(String),
    Describe(String),
    DescribeGlobal,
    MetadataRead(MetadataType, Vec<String>),
}

/// Operation selector for failure injection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MockOperation {
    Login,
    Query,
    ToolingQuery,
    Describe,
    DescribeGlobal,
    MetadataRead,
}

#[derive(Default)]
struct MockState {
    authenticated: bool,
    calls: Vec<MockCall>,
    failures: HashMap<MockOperation, SalesforceError>,
    expire_next_call: bool,
}

/// Scriptable Salesforce capability.
pub struct MockSalesforceApi {
    query_result: Value,
    tooling_query_result: Value,
    describe_results: HashMap<String, Value>,
    describe_global_result: Value,
    state: Mutex<MockState>,
}

impl Default for MockSalesforceApi {
    fn default() -> Self {
        Self::new()
    }
}

impl MockSalesforceApi {
    pub fn new() -> Self {
        Self {
            query_result: json!({"totalSize": 0, "done": true, "records": []}),
            tooling_query_result: json!({"size": 0, "totalSize": 0, "done": true, "records": []}),
            describe_results: HashMap::new(),
            describe_global_result: json!({"encoding": "UTF-8", "sobjects": []}),
            state: Mutex::new(MockState::default()),
        }
    }

    /// Result returned by every `query` call.
    pub fn with_query_result(mut self, result: Value) -> Self {
        self.query_result = result;
        self
    }

    /// Result returned by every `tooling_query` call.
    pub fn with_tooling_query_result(mut self, result: Value) -> Self {
        self.tooling_query_result = result;
        self
    }

    /// Describe result for one object. Unconfigured objects describe as
    /// `{"name": <object>}`.
    pub fn with_describe_result(mut self, object_name: &str, result: Value) -> Self {
        self.describe_results.insert(object_name.to_string(), result);
        self
    }

    pub fn with_describe_global_result(mut self, result: Value) -> Self {
        self.describe_global_result = result;
        self
    }

    /// Make every call of `operation` fail with `error`.
    pub fn with_failure(self, operation: MockOperation, error: SalesforceError) -> Self {
        self.lock().failures.insert(operation, error);
        self
    }

    /// Start with an authenticated session.
    pub fn authenticated(self) -> Self {
        self.lock().authenticated = true;
        self
    }

    /// Reject the next data call with `SessionExpired`, as an org does when
    /// a token is revoked server side.
    pub fn expire_session_on_next_call(&self) {
        self.lock().expire_next_call = true;
    }

    /// All calls observed so far.
    pub fn calls(&self) -> Vec<MockCall> {
        self.lock().calls.clone()
    }

    /// Number of observed calls matching `predicate`.
    pub fn count(&self, predicate: impl Fn(&MockCall) -> bool) -> usize {
        self.lock().calls.iter().filter(|call| predicate(call)).count()
    }

    pub fn login_count(&self) -> usize {
        self.count(|call| matches!(call, MockCall::Login))
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        // a poisoned mock only happens after a test already panicked
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn record(&self, call: MockCall, operation: MockOperation) -> SalesforceResult<()> {
        let mut state = self.lock();
        state.calls.push(call);
        if let Some(error) = state.failures.get(&operation) {
            return Err(error.clone());
        }
        if operation == MockOperation::Login {
            return Ok(());
        }
        if !state.authenticated {
            return Err(SalesforceError::NotAuthenticated);
        }
        if state.expire_next_call {
            state.expire_next_call = false;
            state.authenticated = false;
            return Err(SalesforceError::SessionExpired(
                "INVALID_SESSION_ID: Session expired or invalid".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl SalesforceApi for MockSalesforceApi {
    async fn session_state(&self) -> SessionState {
        if self.lock().authenticated {
            SessionState::Authenticated { expires_at: None }
        } else {
            SessionState::Unauthenticated
        }
    }

    async fn login(&self) -> SalesforceResult<()> {
        self.record(MockCall::Login, MockOperation::Login)?;
        self.lock().authenticated = true;
        Ok(())
    }

    async fn invalidate_session(&self) {
        let mut state = self.lock();
        state.calls.push(MockCall::InvalidateSession);
        state.authenticated = false;
    }

    async fn query(&self, soql: &str) -> SalesforceResult<Value> {
        self.record(MockCall::Query(soql.to_string()), MockOperation::Query)?;
        Ok(self.query_result.clone())
    }

    async fn tooling_query(&self, soql: &str) -> SalesforceResult<Value> {
        self.record(
            MockCall::ToolingQuery(soql.to_string()),
            MockOperation::ToolingQuery,
        )?;
        Ok(self.tooling_query_result.clone())
    }

    async fn describe(&self, object_name: &str) -> SalesforceResult<Value> {
        self.record(
            MockCall::Describe(object_name.to_string()),
            MockOperation::Describe,
        )?;
        Ok(self
            .describe_results
            .get(object_name)
            .cloned()
            .unwrap_or_else(|| json!({"name": object_name})))
    }

    async fn describe_global(&self) -> SalesforceResult<Value> {
        self.record(MockCall::DescribeGlobal, MockOperation::DescribeGlobal)?;
        Ok(self.describe_global_result.clone())
    }

    async fn metadata_read(
        &self,
        metadata_type: MetadataType,
        full_names: &[String],
    ) -> SalesforceResult<Vec<Value>> {
        self.record(
            MockCall::MetadataRead(metadata_type, full_names.to_vec()),
            MockOperation::MetadataRead,
        )?;
        Ok(full_names
            .iter()
            .map(|name| json!({"fullName": name, "type": metadata_type.as_str()}))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_data_calls_require_login() {
        let api = MockSalesforceApi::new();
        assert_eq!(
            api.query("SELECT Id FROM Account").await,
            Err(SalesforceError::NotAuthenticated)
        );

        api.login().await.unwrap();
        assert!(api.query("SELECT Id FROM Account").await.is_ok());
        assert_eq!(api.login_count(), 1);
    }

    #[tokio::test]
    async fn test_expired_session_is_reported_once() {
        let api = MockSalesforceApi::new().authenticated();
        api.expire_session_on_next_call();

        let err = api.describe("Account").await.unwrap_err();
        assert!(err.is_session_expired());
        assert_eq!(api.session_state().await, SessionState::Unauthenticated);
    }
}
