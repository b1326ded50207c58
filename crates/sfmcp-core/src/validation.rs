//! Argument validation for the tool catalog.
//!
//! Arguments arrive as an untyped JSON bag. Each tool has a decoder that
//! either produces a typed value or a [`ValidationError`], and a boolean
//! predicate built on top of it. Schemas are open: unknown fields are ignored.
//! `null`, primitives and arrays are never valid argument bags.

use serde_json::{Map, Value};
use tracing::warn;

use crate::error::ValidationError;
use crate::metadata::MetadataType;

/// Arguments of `query` and `tooling_query`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryArgs {
    pub query: String,
}

/// Arguments of `describe_object`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DescribeObjectArgs {
    pub object_name: String,
    pub detailed: bool,
}

impl DescribeObjectArgs {
    /// Custom objects carry the `__c` suffix.
    pub fn is_custom_object(&self) -> bool {
        self.object_name.ends_with("__c")
    }
}

/// Arguments of `metadata_retrieve`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataRetrieveArgs {
    pub metadata_type: MetadataType,
    pub full_names: Vec<String>,
}

/// Validated input, one variant per standard tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolInput {
    Query(QueryArgs),
    ToolingQuery(QueryArgs),
    DescribeObject(DescribeObjectArgs),
    MetadataRetrieve(MetadataRetrieveArgs),
}

impl ToolInput {
    /// Name of the tool this input was decoded for.
    pub fn tool_name(&self) -> &'static str {
        match self {
            ToolInput::Query(_) => "query",
            ToolInput::ToolingQuery(_) => "tooling_query",
            ToolInput::DescribeObject(_) => "describe_object",
            ToolInput::MetadataRetrieve(_) => "metadata_retrieve",
        }
    }
}

/// Legacy field name accepted by `query` when `query` itself is absent.
pub const LEGACY_QUERY_FIELD: &str = "sql";

/// Decode `query` arguments.
///
/// `query` is canonical. The deprecated `sql` alias is honoured only when
/// `query` is absent, and each use is logged.
pub fn decode_query_args(args: &Value) -> Result<QueryArgs, ValidationError> {
    let (query, used_alias) = query_fields(args)?;
    if used_alias {
        warn!(
            field = LEGACY_QUERY_FIELD,
            "'sql' is a deprecated alias for 'query' and will be removed"
        );
    }
    Ok(QueryArgs { query })
}

/// Decode `tooling_query` arguments.
pub fn decode_tooling_query_args(args: &Value) -> Result<QueryArgs, ValidationError> {
    let tool = "tooling_query";
    let fields = as_object(tool, args)?;
    let query = required_string(tool, fields, "query")?;
    Ok(QueryArgs { query })
}

/// Decode `describe_object` arguments.
pub fn decode_describe_object_args(args: &Value) -> Result<DescribeObjectArgs, ValidationError> {
    let tool = "describe_object";
    let fields = as_object(tool, args)?;
    let object_name = required_string(tool, fields, "objectName")?;
    let detailed = optional_bool(tool, fields, "detailed")?.unwrap_or(false);
    Ok(DescribeObjectArgs {
        object_name,
        detailed,
    })
}

/// Decode `metadata_retrieve` arguments.
///
/// Structure is checked before the type name, so a missing `fullNames` is
/// reported even when `type` is also wrong.
pub fn decode_metadata_retrieve_args(
    args: &Value,
) -> Result<MetadataRetrieveArgs, ValidationError> {
    let tool = "metadata_retrieve";
    let fields = as_object(tool, args)?;
    let type_name = required_string(tool, fields, "type")?;
    let full_names = required_string_array(tool, fields, "fullNames")?;
    let metadata_type = type_name.parse::<MetadataType>()?;
    Ok(MetadataRetrieveArgs {
        metadata_type,
        full_names,
    })
}

pub fn is_valid_query_args(args: &Value) -> bool {
    query_fields(args).is_ok()
}

pub fn is_valid_tooling_query_args(args: &Value) -> bool {
    decode_tooling_query_args(args).is_ok()
}

pub fn is_valid_describe_object_args(args: &Value) -> bool {
    decode_describe_object_args(args).is_ok()
}

pub fn is_valid_metadata_retrieve_args(args: &Value) -> bool {
    decode_metadata_retrieve_args(args).is_ok()
}

pub fn is_valid_metadata_type(name: &str) -> bool {
    MetadataType::from_name(name).is_some()
}

fn query_fields(args: &Value) -> Result<(String, bool), ValidationError> {
    let tool = "query";
    let fields = as_object(tool, args)?;
    if fields.contains_key("query") {
        return Ok((required_string(tool, fields, "query")?, false));
    }
    if fields.contains_key(LEGACY_QUERY_FIELD) {
        return Ok((required_string(tool, fields, LEGACY_QUERY_FIELD)?, true));
    }
    Err(ValidationError::MissingField {
        tool: tool.to_string(),
        field: "query".to_string(),
    })
}

fn as_object<'a>(tool: &str, args: &'a Value) -> Result<&'a Map<String, Value>, ValidationError> {
    args.as_object().ok_or_else(|| ValidationError::NotAnObject {
        tool: tool.to_string(),
    })
}

fn required_string(
    tool: &str,
    fields: &Map<String, Value>,
    field: &str,
) -> Result<String, ValidationError> {
    match fields.get(field) {
        Some(Value::String(value)) => Ok(value.clone()),
        Some(_) => Err(wrong_type(tool, field, "a string")),
        None => Err(ValidationError::MissingField {
            tool: tool.to_string(),
            field: field.to_string(),
        }),
    }
}

// `null` counts as absent for optional fields.
fn optional_bool(
    tool: &str,
    fields: &Map<String, Value>,
    field: &str,
) -> Result<Option<bool>, ValidationError> {
    match fields.get(field) {
        Some(Value::Bool(value)) => Ok(Some(*value)),
        Some(Value::Null) | None => Ok(None),
        Some(_) => Err(wrong_type(tool, field, "a boolean")),
    }
}

fn required_string_array(
    tool: &str,
    fields: &Map<String, Value>,
    field: &str,
) -> Result<Vec<String>, ValidationError> {
    let items = match fields.get(field) {
        Some(Value::Array(items)) => items,
        Some(_) => return Err(wrong_type(tool, field, "an array of strings")),
        None => {
            return Err(ValidationError::MissingField {
                tool: tool.to_string(),
                field: field.to_string(),
            });
        }
    };

    items
        .iter()
        .map(|item| {
            item.as_str()
                .map(str::to_string)
                .ok_or_else(|| wrong_type(tool, field, "an array of strings"))
        })
        .collect()
}

fn wrong_type(tool: &str, field: &str, expected: &'static str) -> ValidationError {
    ValidationError::WrongType {
        tool: tool.to_string(),
        field: field.to_string(),
        expected,
    }
}
