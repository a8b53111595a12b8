//! Idiom A: verb marker attributes on controller methods.
//!
//! ```csharp
//! [ExportClient]
//! [Route("api/[controller]")]
//! public class UsersController : ControllerBase
//! {
//!     [HttpGet("{id}")]
//!     public Task<ActionResult<UserDto>> GetUser(int id, CancellationToken ct) { ... }
//! }
//! ```

use crate::binding::bind_parameters;
use crate::overlay::overlay;
use crate::response::{ResponseSources, is_binary, resolve_response};
use crate::strategy::{
    DeclarationSite, EndpointStrategy, export_marker, group_name, has_export_marker,
    operation_name,
};
use crate::syntax::{ContainerDecl, MethodDecl, annotation};
use clientgen_ir::literal::{string_list, string_literal};
use clientgen_ir::{
    Annotation, ChainCall, DiagnosticSink, EndpointInfo, HttpVerb, Idiom, join_routes,
};
use std::path::PathBuf;

pub struct MethodAttached;

impl EndpointStrategy for MethodAttached {
    fn name(&self) -> &'static str {
        "method-attached"
    }

    fn recognizes(&self, site: &DeclarationSite<'_>) -> bool {
        verb_marker(&site.method.attributes).is_some()
    }

    fn extract(&self, site: &DeclarationSite<'_>, _sink: &dyn DiagnosticSink) -> Vec<EndpointInfo> {
        let (container, method) = (site.container, site.method);
        if !has_export_marker(&method.attributes) && !has_export_marker(&container.attributes) {
            return Vec::new();
        }
        let Some((verb, marker)) = verb_marker(&method.attributes) else {
            return Vec::new();
        };

        let template = marker
            .positional()
            .next()
            .or_else(|| marker.named_arg("template"))
            .and_then(string_literal)
            .or_else(|| annotation(&method.attributes, "Route").and_then(route_template))
            .unwrap_or_else(|| method.name.clone());
        let prefix = annotation(&container.attributes, "Route")
            .and_then(route_template)
            .unwrap_or_default();
        let route = join_routes(
            &expand_tokens(&prefix, container, method),
            &expand_tokens(&template, container, method),
        );

        let endpoint = describe(Describe {
            verb,
            route,
            container,
            method,
            metadata: &[],
            idiom: Idiom::MethodAttached,
            source: site.file.path.clone(),
        });
        let markers: Vec<&Annotation> = [
            export_marker(&container.attributes),
            export_marker(&method.attributes),
        ]
        .into_iter()
        .flatten()
        .collect();
        vec![overlay(endpoint, &markers)]
    }
}

/// The first verb marker and its verb.
pub(crate) fn verb_marker(attributes: &[Annotation]) -> Option<(HttpVerb, &Annotation)> {
    attributes
        .iter()
        .find_map(|a| HttpVerb::from_marker(&a.name).map(|v| (v, a)))
}

fn route_template(attr: &Annotation) -> Option<String> {
    attr.positional()
        .next()
        .or_else(|| attr.named_arg("template"))
        .and_then(string_literal)
}

/// Replace `[controller]` and `[action]` tokens.
fn expand_tokens(template: &str, container: &ContainerDecl, method: &MethodDecl) -> String {
    template
        .replace("[controller]", &group_name(&container.name))
        .replace("[action]", &operation_name(&method.name))
}

/// Inputs for describing one handler method.
pub(crate) struct Describe<'a> {
    pub verb: HttpVerb,
    pub route: String,
    /// Declaration that owns the endpoint (controller or registration class).
    pub container: &'a ContainerDecl,
    pub method: &'a MethodDecl,
    /// Fluent metadata chained onto a registration call.
    pub metadata: &'a [ChainCall],
    pub idiom: Idiom,
    pub source: Option<PathBuf>,
}

/// The idiom-agnostic part of endpoint extraction: bindings, response,
/// auth, tags and naming from a handler method.
pub(crate) fn describe(input: Describe<'_>) -> EndpointInfo {
    let Describe {
        verb,
        route,
        container,
        method,
        metadata,
        idiom,
        source,
    } = input;

    let bound = bind_parameters(&method.params, &route);
    let response_type = resolve_response(ResponseSources {
        attributes: &method.attributes,
        metadata,
        body: Some(&method.body),
        return_type: method.return_type.as_ref(),
    });
    let download = response_type.as_ref().is_some_and(is_binary);

    let requires_auth = (annotation(&method.attributes, "Authorize").is_some()
        || annotation(&container.attributes, "Authorize").is_some())
        && annotation(&method.attributes, "AllowAnonymous").is_none();

    let tags: Vec<String> = container
        .attributes
        .iter()
        .chain(&method.attributes)
        .filter(|a| a.name == "Tags")
        .flat_map(|a| a.positional().flat_map(string_list).collect::<Vec<_>>())
        .collect();

    EndpointInfo {
        verb,
        route,
        container: container.name.clone(),
        operation: operation_name(&method.name),
        request_type: bound.request_type,
        response_type,
        parameters: bound.parameters,
        requires_auth,
        tags,
        group: group_name(&container.name),
        upload: bound.upload,
        download,
        summary: method.summary.clone(),
        idiom,
        source,
    }
}
