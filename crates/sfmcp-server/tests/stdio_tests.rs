//! Full sessions over an in-memory duplex stream.

use serde_json::{Value, json};
use sfmcp_core::SessionPolicy;
use sfmcp_core::testing::{MockCall, MockSalesforceApi};
use sfmcp_server::{Dispatcher, McpServer};
use sfmcp_tools::ToolRegistry;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, duplex};

/// Feed `lines` to a server and collect every line it writes back.
async fn run_session(api: Arc<MockSalesforceApi>, lines: &[&str]) -> Vec<Value> {
    let server = McpServer::new(Dispatcher::new(
        ToolRegistry::standard(),
        api,
        SessionPolicy::Cached,
    ));

    let (mut client_in, server_in) = duplex(64 * 1024);
    let (server_out, client_out) = duplex(64 * 1024);

    let input = lines.join("\n") + "\n";
    let writer = tokio::spawn(async move {
        client_in.write_all(input.as_bytes()).await.unwrap();
        // dropping closes the server's input
    });

    server.serve(server_in, server_out).await.unwrap();
    writer.await.unwrap();

    let mut replies = Vec::new();
    let mut reader = BufReader::new(client_out).lines();
    while let Some(line) = reader.next_line().await.unwrap() {
        replies.push(serde_json::from_str(&line).unwrap());
    }
    replies
}

#[tokio::test]
async fn handshake_list_and_call() {
    let api = Arc::new(MockSalesforceApi::new().with_query_result(json!({
        "totalSize": 1,
        "done": true,
        "records": [{"Id": "001000000000001"}]
    })));

    let replies = run_session(
        api.clone(),
        &[
            r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{"protocolVersion":"2025-06-18","capabilities":{},"clientInfo":{"name":"t","version":"0"}}}"#,
            r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#,
            r#"{"jsonrpc":"2.0","id":2,"method":"tools/list"}"#,
            r#"{"jsonrpc":"2.0","id":3,"method":"tools/call","params":{"name":"query","arguments":{"query":"SELECT Id FROM Account LIMIT 1"}}}"#,
            r#"{"jsonrpc":"2.0","id":4,"method":"tools/call","params":{"name":"bogus_tool","arguments":{}}}"#,
        ],
    )
    .await;

    // The notification produced no reply
    assert_eq!(replies.len(), 4);
    let ids: Vec<&Value> = replies.iter().map(|reply| &reply["id"]).collect();
    assert_eq!(ids, vec![&json!(1), &json!(2), &json!(3), &json!(4)]);

    assert_eq!(replies[0]["result"]["protocolVersion"], "2025-06-18");

    let names: Vec<&str> = replies[1]["result"]["tools"]
        .as_array()
        .unwrap()
        .iter()
        .map(|tool| tool["name"].as_str().unwrap())
        .collect();
    assert_eq!(
        names,
        vec!["query", "tooling_query", "describe_object", "metadata_retrieve"]
    );

    let call = &replies[2]["result"];
    assert!(call.get("isError").is_none());
    let text = call["content"][0]["text"].as_str().unwrap();
    assert_eq!(serde_json::from_str::<Value>(text).unwrap()["totalSize"], 1);

    assert_eq!(replies[3]["result"]["isError"], true);
    assert_eq!(
        replies[3]["result"]["content"][0]["text"],
        "Unknown tool: bogus_tool"
    );

    assert_eq!(
        api.calls(),
        vec![
            MockCall::Login,
            MockCall::Query("SELECT Id FROM Account LIMIT 1".to_string())
        ]
    );
}

#[tokio::test]
async fn bad_lines_do_not_stop_the_loop() {
    let api = Arc::new(MockSalesforceApi::new());

    let replies = run_session(
        api,
        &[
            "this is not json",
            "",
            r#"{"jsonrpc":"2.0","id":7,"method":"shutdown_everything"}"#,
            r#"{"jsonrpc":"2.0","id":8,"method":"ping"}"#,
        ],
    )
    .await;

    assert_eq!(replies.len(), 3);
    assert_eq!(replies[0]["error"]["code"], -32700);
    assert_eq!(replies[0]["id"], Value::Null);
    assert_eq!(replies[1]["error"]["code"], -32601);
    assert_eq!(replies[2]["result"], json!({}));
}

#[tokio::test]
async fn objects_resource_round_trip() {
    let api = Arc::new(MockSalesforceApi::new().with_describe_global_result(json!({
        "sobjects": [
            {"name": "Contact", "label": "Contact", "custom": false, "queryable": true},
            {"name": "Invoice__c", "label": "Invoice", "custom": true, "queryable": true}
        ]
    })));

    let replies = run_session(
        api,
        &[r#"{"jsonrpc":"2.0","id":"r1","method":"resources/read","params":{"uri":"salesforce://Account/objects"}}"#],
    )
    .await;

    let contents = &replies[0]["result"]["contents"][0];
    assert_eq!(contents["uri"], "salesforce://Account/objects");
    assert_eq!(contents["mimeType"], "application/json");
    let objects: Value = serde_json::from_str(contents["text"].as_str().unwrap()).unwrap();
    assert_eq!(objects[1]["name"], "Invoice__c");
    assert_eq!(objects[1]["custom"], true);
}
