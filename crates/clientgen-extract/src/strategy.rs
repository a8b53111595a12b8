//! Endpoint recognition strategies.
//!
//! Each declaration idiom is one [`EndpointStrategy`]. The extractor offers
//! every method of every container to the strategies in a fixed order; the
//! first that recognizes the site produces its endpoints.

use crate::method_attached::MethodAttached;
use crate::registration::FluentRegistration;
use crate::syntax::{ContainerDecl, MethodDecl, SourceFile};
use clientgen_ir::{Annotation, DiagnosticSink, EndpointInfo};

/// Attribute that opts a declaration into client generation.
pub const EXPORT_MARKER: &str = "ExportClient";

/// One method in its container and file.
#[derive(Debug, Clone, Copy)]
pub struct DeclarationSite<'a> {
    pub file: &'a SourceFile,
    pub container: &'a ContainerDecl,
    pub method: &'a MethodDecl,
}

impl<'a> DeclarationSite<'a> {
    pub fn new(file: &'a SourceFile, container: &'a ContainerDecl, method: &'a MethodDecl) -> Self {
        Self {
            file,
            container,
            method,
        }
    }

    /// `Container.Method`, for diagnostics.
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.container.name, self.method.name)
    }
}

/// A declaration idiom that yields endpoints.
pub trait EndpointStrategy: Send + Sync {
    /// Identifier used in logs.
    fn name(&self) -> &'static str;

    /// Whether the site has this idiom's shape, exported or not.
    fn recognizes(&self, site: &DeclarationSite<'_>) -> bool;

    /// Endpoints declared at the site. Unexported declarations yield nothing.
    fn extract(&self, site: &DeclarationSite<'_>, sink: &dyn DiagnosticSink) -> Vec<EndpointInfo>;
}

/// Method-attached markers first, then fluent registration.
pub fn default_strategies() -> Vec<Box<dyn EndpointStrategy>> {
    vec![Box::new(MethodAttached), Box::new(FluentRegistration)]
}

pub fn export_marker(attributes: &[Annotation]) -> Option<&Annotation> {
    attributes.iter().find(|a| a.name == EXPORT_MARKER)
}

pub fn has_export_marker(attributes: &[Annotation]) -> bool {
    export_marker(attributes).is_some()
}

/// Operation name: method name without a trailing `Async`.
pub fn operation_name(method: &str) -> String {
    match method.strip_suffix("Async") {
        Some(stripped) if !stripped.is_empty() => stripped.to_string(),
        _ => method.to_string(),
    }
}

/// Group label: container name without a `Controller`/`Endpoints` suffix.
pub fn group_name(container: &str) -> String {
    ["Controller", "Endpoints"]
        .iter()
        .find_map(|suffix| container.strip_suffix(suffix).filter(|s| !s.is_empty()))
        .unwrap_or(container)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names() {
        assert_eq!(operation_name("GetUserAsync"), "GetUser");
        assert_eq!(operation_name("Async"), "Async");
        assert_eq!(operation_name("List"), "List");
        assert_eq!(group_name("UsersController"), "Users");
        assert_eq!(group_name("OrderEndpoints"), "Order");
        assert_eq!(group_name("Controller"), "Controller");
        assert_eq!(group_name("Billing"), "Billing");
    }
}
