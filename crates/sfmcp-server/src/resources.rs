//! The queryable-objects resource.

use serde::Serialize;
use serde_json::Value;

use crate::protocol::Resource;

pub const OBJECTS_URI: &str = "salesforce://Account/objects";
pub const OBJECTS_MIME_TYPE: &str = "application/json";

/// Short form accepted by `resources/read` but not advertised.
pub const OBJECTS_URI_ALIAS: &str = "salesforce://objects";

/// Whether `uri` names the queryable-objects resource.
pub fn is_objects_uri(uri: &str) -> bool {
    uri == OBJECTS_URI || uri == OBJECTS_URI_ALIAS
}

/// Resources advertised by `resources/list`.
pub fn catalog() -> Vec<Resource> {
    vec![Resource {
        uri: OBJECTS_URI.to_string(),
        name: "Available Salesforce Objects".to_string(),
        description: "List of queryable Salesforce objects in your organization".to_string(),
        mime_type: OBJECTS_MIME_TYPE.to_string(),
    }]
}

/// Summary of one sObject.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ObjectSummary {
    pub name: String,
    pub label: String,
    pub custom: bool,
    pub queryable: bool,
}

/// Queryable objects of a `describeGlobal` result, in the order returned.
///
/// Entries without a name are skipped.
pub fn queryable_objects(describe_global: &Value) -> Vec<ObjectSummary> {
    let Some(sobjects) = describe_global.get("sobjects").and_then(Value::as_array) else {
        return Vec::new();
    };

    sobjects
        .iter()
        .filter(|sobject| flag(sobject, "queryable"))
        .filter_map(|sobject| {
            let name = sobject.get("name")?.as_str()?.to_string();
            let label = sobject
                .get("label")
                .and_then(Value::as_str)
                .unwrap_or(&name)
                .to_string();
            Some(ObjectSummary {
                label,
                custom: flag(sobject, "custom"),
                queryable: true,
                name,
            })
        })
        .collect()
}

fn flag(sobject: &Value, field: &str) -> bool {
    sobject.get(field).and_then(Value::as_bool).unwrap_or(false)
}
