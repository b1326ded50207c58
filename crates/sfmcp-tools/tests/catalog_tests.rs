//! The advertised catalog and end-to-end tool behaviour against the mock
//! capability.

use serde_json::json;
use sfmcp_core::testing::{MockCall, MockSalesforceApi};
use sfmcp_core::{ToolError, ValidationError};
use sfmcp_tools::ToolRegistry;

#[test]
fn catalog_matches_published_schemas() {
    let catalog = serde_json::to_value(ToolRegistry::standard().list()).unwrap();

    assert_eq!(catalog[0]["name"], "query");
    assert_eq!(catalog[0]["inputSchema"]["required"], json!(["query"]));

    assert_eq!(catalog[1]["name"], "tooling_query");
    assert_eq!(
        catalog[1]["description"],
        "Execute a query against the Salesforce Tooling API"
    );

    assert_eq!(catalog[2]["name"], "describe_object");
    assert_eq!(
        catalog[2]["inputSchema"]["properties"]["detailed"]["default"],
        json!(false)
    );
    assert_eq!(catalog[2]["inputSchema"]["required"], json!(["objectName"]));

    assert_eq!(catalog[3]["name"], "metadata_retrieve");
    assert_eq!(
        catalog[3]["inputSchema"]["required"],
        json!(["type", "fullNames"])
    );
    assert_eq!(
        catalog[3]["inputSchema"]["properties"]["fullNames"]["items"],
        json!({"type": "string"})
    );
}

#[tokio::test]
async fn query_passes_soql_through_unchanged() {
    let registry = ToolRegistry::standard();
    let result = json!({"totalSize": 1, "done": true, "records": [{"Id": "001000000000001"}]});
    let api = MockSalesforceApi::new()
        .authenticated()
        .with_query_result(result.clone());

    let tool = registry.find("query").unwrap();
    let input = tool
        .decode(&json!({"query": "SELECT Id FROM Account LIMIT 1"}))
        .unwrap();
    let output = tool.invoke(&api, input).await.unwrap();

    assert_eq!(output, result);
    assert_eq!(
        api.calls(),
        vec![MockCall::Query("SELECT Id FROM Account LIMIT 1".to_string())]
    );
}

#[test]
fn every_tool_rejects_non_object_arguments() {
    let registry = ToolRegistry::standard();
    for name in registry.tool_names() {
        let tool = registry.find(name).unwrap();
        for bag in [json!(null), json!(true), json!("text"), json!([1, 2])] {
            let err = tool.decode(&bag).unwrap_err();
            assert!(
                matches!(err, ValidationError::NotAnObject { .. }),
                "{name} accepted {bag}"
            );
        }
    }
}

#[test]
fn validation_errors_become_invalid_arguments() {
    let registry = ToolRegistry::standard();
    let tool = registry.find("describe_object").unwrap();

    let err: ToolError = tool.decode(&json!({})).unwrap_err().into();

    assert_eq!(err.category(), "invalid_arguments");
    assert_eq!(
        err.to_string(),
        "Invalid describe_object arguments: missing required field 'objectName'"
    );
}
