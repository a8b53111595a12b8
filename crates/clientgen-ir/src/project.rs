//! Accumulated IR of one run.

use crate::diagnostics::{Diagnostic, DiagnosticSink};
use crate::endpoint::EndpointInfo;
use crate::types::TypeInfo;
use crate::validation::{PropertyValidationRules, ValidationRule};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectIr {
    #[serde(default)]
    pub endpoints: Vec<EndpointInfo>,
    /// Type definitions to render.
    #[serde(default)]
    pub types: Vec<TypeInfo>,
    #[serde(default)]
    pub validation: Vec<PropertyValidationRules>,
    /// Constraints that do not fit the fixed per-property shape.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extra_rules: Vec<ValidationRule>,
    /// Declared types that failed the naming allow-list. They are only
    /// rendered if something exported references them.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unlisted_types: Vec<TypeInfo>,
}

impl ProjectIr {
    pub fn new() -> Self {
        Self::default()
    }

    /// Concatenate partial results in order.
    ///
    /// The first endpoint with a given (operation, group) wins; later ones are
    /// dropped with a warning. Types and validation tables are deduplicated by
    /// name the same way.
    pub fn merge(parts: impl IntoIterator<Item = ProjectIr>, sink: &dyn DiagnosticSink) -> Self {
        let mut merged = ProjectIr::new();
        let mut endpoint_keys: HashSet<(String, String)> = HashSet::new();
        let mut type_names: HashSet<String> = HashSet::new();
        let mut unlisted_names: HashSet<String> = HashSet::new();
        let mut rule_keys: HashSet<(String, String)> = HashSet::new();

        for part in parts {
            for endpoint in part.endpoints {
                let key = (endpoint.operation.clone(), endpoint.group.clone());
                if endpoint_keys.insert(key) {
                    merged.endpoints.push(endpoint);
                } else {
                    let mut d = Diagnostic::warning(format!(
                        "duplicate operation '{}' in group '{}', keeping the first",
                        endpoint.operation, endpoint.group
                    ))
                    .at(format!("{}.{}", endpoint.container, endpoint.operation));
                    if let Some(file) = &endpoint.source {
                        d = d.in_file(file);
                    }
                    sink.report(d);
                }
            }
            for ty in part.types {
                if type_names.insert(ty.name.clone()) {
                    merged.types.push(ty);
                } else {
                    sink.report(
                        Diagnostic::info(format!("type '{}' declared more than once", ty.name))
                            .at(ty.full_name.clone()),
                    );
                }
            }
            for ty in part.unlisted_types {
                if unlisted_names.insert(ty.name.clone()) {
                    merged.unlisted_types.push(ty);
                }
            }
            for rules in part.validation {
                let key = (rules.type_name.clone(), rules.property.clone());
                if rule_keys.insert(key) {
                    merged.validation.push(rules);
                }
            }
            merged.extra_rules.extend(part.extra_rules);
        }
        merged
    }

    pub fn type_named(&self, name: &str) -> Option<&TypeInfo> {
        self.types.iter().find(|t| t.name == name)
    }

    /// Fixed-shape rules declared for a type, in declaration order.
    pub fn rules_for<'a>(
        &'a self,
        type_name: &'a str,
    ) -> impl Iterator<Item = &'a PropertyValidationRules> + 'a {
        self.validation
            .iter()
            .filter(move |r| r.type_name == type_name)
    }

    /// Extra rules declared for a type.
    pub fn extra_rules_for<'a>(
        &'a self,
        type_name: &'a str,
    ) -> impl Iterator<Item = &'a ValidationRule> + 'a {
        self.extra_rules
            .iter()
            .filter(move |r| r.type_name == type_name)
    }

    /// Whether at least one rule was extracted for a type.
    pub fn has_rules(&self, type_name: &str) -> bool {
        self.rules_for(type_name).any(|r| !r.is_empty())
            || self.extra_rules_for(type_name).next().is_some()
    }

    /// Names of types that have at least one rule, sorted.
    pub fn validated_type_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .validation
            .iter()
            .filter(|r| !r.is_empty())
            .map(|r| r.type_name.clone())
            .chain(self.extra_rules.iter().map(|r| r.type_name.clone()))
            .collect();
        names.sort();
        names.dedup();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::Diagnostics;
    use crate::endpoint::{HttpVerb, Idiom};

    fn endpoint(operation: &str, group: &str) -> EndpointInfo {
        EndpointInfo {
            verb: HttpVerb::Get,
            route: "/x".into(),
            container: format!("{}Controller", group),
            operation: operation.into(),
            request_type: None,
            response_type: None,
            parameters: vec![],
            requires_auth: false,
            tags: vec![],
            group: group.into(),
            upload: false,
            download: false,
            summary: None,
            idiom: Idiom::MethodAttached,
            source: None,
        }
    }

    #[test]
    fn test_merge_drops_duplicate_operations() {
        let a = ProjectIr {
            endpoints: vec![endpoint("GetUser", "Users")],
            ..Default::default()
        };
        let b = ProjectIr {
            endpoints: vec![endpoint("GetUser", "Users"), endpoint("GetUser", "Admin")],
            ..Default::default()
        };
        let sink = Diagnostics::new();
        let merged = ProjectIr::merge([a, b], &sink);
        assert_eq!(merged.endpoints.len(), 2);
        assert_eq!(merged.endpoints[1].group, "Admin");
        assert_eq!(sink.len(), 1);
    }

    #[test]
    fn test_has_rules_ignores_empty_tables() {
        let ir = ProjectIr {
            validation: vec![PropertyValidationRules {
                type_name: "A".into(),
                property: "X".into(),
                ..Default::default()
            }],
            ..Default::default()
        };
        assert!(!ir.has_rules("A"));
        assert!(ir.validated_type_names().is_empty());
    }
}
