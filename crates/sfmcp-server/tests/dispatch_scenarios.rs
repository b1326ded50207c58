//! Envelope contract of `tools/call` against the in-memory capability.

use serde_json::{Value, json};
use sfmcp_core::SessionPolicy;
use sfmcp_core::testing::{MockCall, MockSalesforceApi};
use sfmcp_server::Dispatcher;
use sfmcp_tools::ToolRegistry;
use std::sync::Arc;

fn dispatcher(api: &Arc<MockSalesforceApi>) -> Dispatcher {
    Dispatcher::new(ToolRegistry::standard(), api.clone(), SessionPolicy::Cached)
}

fn envelope(result: &sfmcp_server::CallToolResult) -> Value {
    serde_json::to_value(result).unwrap()
}

#[tokio::test]
async fn query_result_is_the_success_envelope_content() {
    let remote = json!({
        "totalSize": 1,
        "done": true,
        "records": [{"Id": "001000000000001"}]
    });
    let api = Arc::new(MockSalesforceApi::new().with_query_result(remote.clone()));

    let result = dispatcher(&api)
        .call_tool("query", &json!({"query": "SELECT Id FROM Account LIMIT 1"}))
        .await;

    let value = envelope(&result);
    assert!(value.get("isError").is_none());
    assert_eq!(value["content"][0]["type"], "text");

    let text = value["content"][0]["text"].as_str().unwrap();
    assert_eq!(serde_json::from_str::<Value>(text).unwrap(), remote);
    assert_eq!(
        api.count(|call| *call == MockCall::Query("SELECT Id FROM Account LIMIT 1".to_string())),
        1
    );
}

#[tokio::test]
async fn unknown_tool_envelope() {
    let api = Arc::new(MockSalesforceApi::new());

    let result = dispatcher(&api).call_tool("bogus_tool", &json!({})).await;

    assert_eq!(
        envelope(&result),
        json!({
            "content": [{"type": "text", "text": "Unknown tool: bogus_tool"}],
            "isError": true
        })
    );
    assert!(api.calls().is_empty());
}

#[tokio::test]
async fn unsupported_metadata_type_makes_no_remote_call() {
    let api = Arc::new(MockSalesforceApi::new());

    let result = dispatcher(&api)
        .call_tool(
            "metadata_retrieve",
            &json!({"type": "NotARealType", "fullNames": ["X"]}),
        )
        .await;

    assert_eq!(
        envelope(&result),
        json!({
            "content": [{"type": "text", "text": "Invalid metadata type: NotARealType"}],
            "isError": true
        })
    );
    assert!(api.calls().is_empty());
}

#[tokio::test]
async fn detailed_custom_object_combines_both_results() {
    let api = Arc::new(
        MockSalesforceApi::new()
            .with_describe_result("Invoice__c", json!({"name": "Invoice__c", "fields": []})),
    );

    let result = dispatcher(&api)
        .call_tool(
            "describe_object",
            &json!({"objectName": "Invoice__c", "detailed": true}),
        )
        .await;

    assert!(!result.is_error());
    let content: Value = serde_json::from_str(result.text()).unwrap();
    assert_eq!(content["describe"], json!({"name": "Invoice__c", "fields": []}));
    assert_eq!(content["metadata"]["fullName"], "Invoice__c");
    assert_eq!(
        api.count(|call| matches!(call, MockCall::MetadataRead(..))),
        1
    );
}

#[tokio::test]
async fn describe_is_idempotent() {
    let api = Arc::new(MockSalesforceApi::new().with_describe_result(
        "Account",
        json!({"name": "Account", "queryable": true, "fields": [{"name": "Id"}]}),
    ));
    let dispatcher = dispatcher(&api);
    let arguments = json!({"objectName": "Account"});

    let first = serde_json::to_string(&dispatcher.call_tool("describe_object", &arguments).await)
        .unwrap();
    let second = serde_json::to_string(&dispatcher.call_tool("describe_object", &arguments).await)
        .unwrap();

    assert_eq!(first, second);
}

#[tokio::test]
async fn legacy_sql_field_still_runs_the_query() {
    let api = Arc::new(MockSalesforceApi::new());

    let result = dispatcher(&api)
        .call_tool("query", &json!({"sql": "SELECT Id FROM Opportunity"}))
        .await;

    assert!(!result.is_error());
    assert_eq!(
        api.calls(),
        vec![
            MockCall::Login,
            MockCall::Query("SELECT Id FROM Opportunity".to_string())
        ]
    );
}
