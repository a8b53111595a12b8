//! Exported operations.

use crate::types::TypeInfo;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpVerb {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpVerb {
    pub const ALL: [HttpVerb; 5] = [
        HttpVerb::Get,
        HttpVerb::Post,
        HttpVerb::Put,
        HttpVerb::Patch,
        HttpVerb::Delete,
    ];

    /// Wire form (`GET`).
    pub fn as_str(self) -> &'static str {
        match self {
            HttpVerb::Get => "GET",
            HttpVerb::Post => "POST",
            HttpVerb::Put => "PUT",
            HttpVerb::Patch => "PATCH",
            HttpVerb::Delete => "DELETE",
        }
    }

    /// Pascal-case form used in C# names (`Get`).
    pub fn pascal(self) -> &'static str {
        match self {
            HttpVerb::Get => "Get",
            HttpVerb::Post => "Post",
            HttpVerb::Put => "Put",
            HttpVerb::Patch => "Patch",
            HttpVerb::Delete => "Delete",
        }
    }

    /// Read verbs are rendered as queries, everything else as mutations.
    pub fn is_read(self) -> bool {
        matches!(self, HttpVerb::Get)
    }

    /// From a verb marker attribute name (`HttpGet`).
    pub fn from_marker(name: &str) -> Option<Self> {
        let rest = name.strip_prefix("Http")?;
        Self::ALL.into_iter().find(|v| v.pascal() == rest)
    }

    /// From a fluent registration call name (`MapGet`).
    pub fn from_map_call(name: &str) -> Option<Self> {
        let rest = name.strip_prefix("Map")?;
        Self::ALL.into_iter().find(|v| v.pascal() == rest)
    }
}

impl fmt::Display for HttpVerb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a parameter's value travels on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterSource {
    Route,
    Query,
    Body,
    Header,
    Form,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterInfo {
    pub name: String,
    pub type_info: TypeInfo,
    pub is_required: bool,
    pub source: ParameterSource,
}

/// Which declaration shape produced an endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Idiom {
    /// Verb marker attribute on a method (`[HttpGet("{id}")]`).
    MethodAttached,
    /// Fluent registration call (`group.MapGet("/{id}", GetUser)`).
    FluentRegistration,
}

/// One exported operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EndpointInfo {
    pub verb: HttpVerb,
    /// Route template, may hold `{name}` / `{name:constraint}` tokens.
    pub route: String,
    /// Name of the owning declaration (controller or endpoint class).
    pub container: String,
    pub operation: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_type: Option<TypeInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_type: Option<TypeInfo>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<ParameterInfo>,
    pub requires_auth: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    pub group: String,
    #[serde(default)]
    pub upload: bool,
    #[serde(default)]
    pub download: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    pub idiom: Idiom,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<PathBuf>,
}

impl EndpointInfo {
    /// Uniqueness key within a run.
    pub fn key(&self) -> (&str, &str) {
        (&self.operation, &self.group)
    }

    pub fn parameters_from(&self, source: ParameterSource) -> impl Iterator<Item = &ParameterInfo> {
        self.parameters.iter().filter(move |p| p.source == source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verb_names() {
        assert_eq!(HttpVerb::from_marker("HttpGet"), Some(HttpVerb::Get));
        assert_eq!(HttpVerb::from_marker("HttpDelete"), Some(HttpVerb::Delete));
        assert_eq!(HttpVerb::from_marker("Route"), None);
        assert_eq!(HttpVerb::from_map_call("MapPatch"), Some(HttpVerb::Patch));
        assert_eq!(HttpVerb::from_map_call("MapGroup"), None);
        assert!(HttpVerb::Get.is_read());
        assert!(!HttpVerb::Post.is_read());
    }
}
