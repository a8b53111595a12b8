//! Field-level validation constraints.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleKind {
    Required,
    MinLength,
    MaxLength,
    /// Numeric lower bound; `metadata["inclusive"]` tells which.
    Minimum,
    /// Numeric upper bound; `metadata["inclusive"]` tells which.
    Maximum,
    Email,
    Pattern,
    /// Server-side predicate with no client equivalent.
    Custom,
}

/// One (type, property, kind) constraint with an opaque value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationRule {
    pub type_name: String,
    pub property: String,
    pub kind: RuleKind,
    #[serde(default)]
    pub value: serde_json::Value,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ValidationRule {
    pub fn new(type_name: &str, property: &str, kind: RuleKind, value: serde_json::Value) -> Self {
        Self {
            type_name: type_name.to_string(),
            property: property.to_string(),
            kind,
            value,
            metadata: BTreeMap::new(),
            message: None,
        }
    }

    pub fn with_metadata(self, key: &str, value: serde_json::Value) -> Self {
        let mut metadata = self.metadata;
        metadata.insert(key.to_string(), value);
        Self { metadata, ..self }
    }

    pub fn with_message(self, message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            ..self
        }
    }

    /// For numeric bounds: whether the bound itself is allowed. Defaults to true.
    pub fn is_inclusive(&self) -> bool {
        self.metadata
            .get("inclusive")
            .and_then(|v| v.as_bool())
            .unwrap_or(true)
    }
}

/// All fixed-shape constraints of one property.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PropertyValidationRules {
    pub type_name: String,
    pub property: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum: Option<f64>,
    #[serde(default)]
    pub minimum_exclusive: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maximum: Option<f64>,
    #[serde(default)]
    pub maximum_exclusive: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    #[serde(default)]
    pub email: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl PropertyValidationRules {
    pub fn is_empty(&self) -> bool {
        !self.required
            && self.min_length.is_none()
            && self.max_length.is_none()
            && self.minimum.is_none()
            && self.maximum.is_none()
            && self.pattern.is_none()
            && !self.email
    }
}
