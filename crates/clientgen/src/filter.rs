//! Endpoint and type exclusion patterns.
//!
//! Patterns are globs where `*` matches any run of characters. Matching is
//! case-insensitive and anchored at both ends: endpoints match on their full
//! route, types on their simple name.

use clientgen_ir::ProjectIr;
use regex::Regex;

#[derive(Debug, thiserror::Error)]
#[error("invalid exclusion pattern '{pattern}': {source}")]
pub struct PatternError {
    pub pattern: String,
    #[source]
    pub source: regex::Error,
}

/// Compile one glob into an anchored, case-insensitive regex.
pub fn glob_to_regex(pattern: &str) -> Result<Regex, PatternError> {
    let body: Vec<String> = pattern.split('*').map(regex::escape).collect();
    Regex::new(&format!("(?i)^{}$", body.join(".*"))).map_err(|source| PatternError {
        pattern: pattern.to_string(),
        source,
    })
}

#[derive(Debug, Clone, Default)]
pub struct Exclusions {
    endpoints: Vec<Regex>,
    types: Vec<Regex>,
}

impl Exclusions {
    pub fn new(endpoints: &[String], types: &[String]) -> Result<Self, PatternError> {
        let compile = |patterns: &[String]| {
            patterns
                .iter()
                .map(|p| glob_to_regex(p))
                .collect::<Result<Vec<_>, _>>()
        };
        Ok(Self {
            endpoints: compile(endpoints)?,
            types: compile(types)?,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty() && self.types.is_empty()
    }

    pub fn excludes_route(&self, route: &str) -> bool {
        self.endpoints.iter().any(|r| r.is_match(route))
    }

    pub fn excludes_type(&self, name: &str) -> bool {
        self.types.iter().any(|r| r.is_match(name))
    }

    /// A copy of `ir` without the excluded endpoints and types. Validation
    /// entries keyed to an excluded type go with it.
    pub fn apply(&self, ir: &ProjectIr) -> ProjectIr {
        if self.is_empty() {
            return ir.clone();
        }
        let kept = ProjectIr {
            endpoints: ir
                .endpoints
                .iter()
                .filter(|e| !self.excludes_route(&e.route))
                .cloned()
                .collect(),
            types: ir
                .types
                .iter()
                .filter(|t| !self.excludes_type(&t.name))
                .cloned()
                .collect(),
            validation: ir
                .validation
                .iter()
                .filter(|v| !self.excludes_type(&v.type_name))
                .cloned()
                .collect(),
            extra_rules: ir
                .extra_rules
                .iter()
                .filter(|r| !self.excludes_type(&r.type_name))
                .cloned()
                .collect(),
            unlisted_types: ir
                .unlisted_types
                .iter()
                .filter(|t| !self.excludes_type(&t.name))
                .cloned()
                .collect(),
        };
        tracing::debug!(
            "excluded {} endpoints, {} types",
            ir.endpoints.len() - kept.endpoints.len(),
            ir.types.len() - kept.types.len()
        );
        kept
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clientgen_ir::{EndpointInfo, HttpVerb, Idiom, TypeInfo};

    fn endpoint(route: &str) -> EndpointInfo {
        EndpointInfo {
            verb: HttpVerb::Get,
            route: route.into(),
            container: "Api".into(),
            operation: route.into(),
            request_type: None,
            response_type: None,
            parameters: vec![],
            requires_auth: false,
            tags: vec![],
            group: "Api".into(),
            upload: false,
            download: false,
            summary: None,
            idiom: Idiom::FluentRegistration,
            source: None,
        }
    }

    #[test]
    fn test_glob_to_regex() {
        let re = glob_to_regex("/internal/*").unwrap();
        assert!(re.is_match("/internal/jobs/{id}"));
        assert!(re.is_match("/INTERNAL/x"));
        assert!(!re.is_match("/api/internal/x"));

        // regex metacharacters are literal
        let re = glob_to_regex("/users/{id}").unwrap();
        assert!(re.is_match("/users/{id}"));
        assert!(!re.is_match("/users/7"));
    }

    #[test]
    fn test_apply() {
        let exclusions = Exclusions::new(
            &["/internal/*".to_string()],
            &["*Internal*".to_string()],
        )
        .unwrap();
        let ir = ProjectIr {
            endpoints: vec![endpoint("/internal/jobs"), endpoint("/users")],
            types: vec![
                TypeInfo::definition("UserDto", None, vec![], vec![], None),
                TypeInfo::definition("InternalJobDto", None, vec![], vec![], None),
            ],
            ..Default::default()
        };
        let kept = exclusions.apply(&ir);
        assert_eq!(kept.endpoints.len(), 1);
        assert_eq!(kept.endpoints[0].route, "/users");
        assert_eq!(kept.types.len(), 1);
        assert_eq!(kept.types[0].name, "UserDto");
        // the input is untouched
        assert_eq!(ir.endpoints.len(), 2);
    }
}
