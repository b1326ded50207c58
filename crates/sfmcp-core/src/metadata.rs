//! Metadata component kinds accepted by `metadata_retrieve`.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::ValidationError;

/// The closed set of metadata types the adapter can read.
///
/// Parsing is case-sensitive: `"flow"` is rejected, `"Flow"` is accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MetadataType {
    CustomObject,
    Flow,
    FlowDefinition,
    CustomField,
    ValidationRule,
    ApexClass,
    ApexTrigger,
    WorkflowRule,
    Layout,
}

impl MetadataType {
    /// API name of the metadata type, as sent to the metadata endpoint.
    pub fn as_str(&self) -> &'static str {
        match self {
            MetadataType::CustomObject => "CustomObject",
            MetadataType::Flow => "Flow",
            MetadataType::FlowDefinition => "FlowDefinition",
            MetadataType::CustomField => "CustomField",
            MetadataType::ValidationRule => "ValidationRule",
            MetadataType::ApexClass => "ApexClass",
            MetadataType::ApexTrigger => "ApexTrigger",
            MetadataType::WorkflowRule => "WorkflowRule",
            MetadataType::Layout => "Layout",
        }
    }

    /// Try to parse an API name into a metadata type.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "CustomObject" => Some(MetadataType::CustomObject),
            "Flow" => Some(MetadataType::Flow),
            "FlowDefinition" => Some(MetadataType::FlowDefinition),
            "CustomField" => Some(MetadataType::CustomField),
            "ValidationRule" => Some(MetadataType::ValidationRule),
            "ApexClass" => Some(MetadataType::ApexClass),
            "ApexTrigger" => Some(MetadataType::ApexTrigger),
            "WorkflowRule" => Some(MetadataType::WorkflowRule),
            "Layout" => Some(MetadataType::Layout),
            _ => None,
        }
    }

    /// All supported metadata types, in the order they are advertised.
    pub fn all() -> &'static [MetadataType] {
        &[
            MetadataType::CustomObject,
            MetadataType::Flow,
            MetadataType::FlowDefinition,
            MetadataType::CustomField,
            MetadataType::ValidationRule,
            MetadataType::ApexClass,
            MetadataType::ApexTrigger,
            MetadataType::WorkflowRule,
            MetadataType::Layout,
        ]
    }
}

impl std::fmt::Display for MetadataType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for MetadataType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s).ok_or_else(|| ValidationError::InvalidMetadataType(s.to_string()))
    }
}
