//! Idiom B: fluent registration calls in route-builder extension methods.
//!
//! ```csharp
//! public static class UserEndpoints
//! {
//!     [ExportClient]
//!     public static void MapUsers(this IEndpointRouteBuilder app)
//!     {
//!         var users = app.MapGroup("/api/users").RequireAuthorization();
//!         users.MapGet("/{id}", GetUser).WithName("GetUser");
//!         users.MapPost("/", (CreateUserRequest req, ISender sender) => ...)
//!             .Produces<UserDto>(201);
//!     }
//! }
//! ```
//!
//! Group prefixes resolve through chained `MapGroup` calls and through
//! locals bound to a group, to any depth.

use crate::binding::route_only_parameters;
use crate::method_attached::{Describe, describe};
use crate::overlay::overlay;
use crate::response::{declared_response, is_binary};
use crate::strategy::{DeclarationSite, EndpointStrategy, export_marker, group_name};
use crate::syntax::{CallChain, ContainerDecl, MethodDecl};
use clientgen_ir::literal::{string_list, string_literal};
use clientgen_ir::{
    Annotation, ChainCall, DiagnosticSink, EndpointInfo, HttpVerb, Idiom, TypeInfo, join_routes,
    route_parameters,
};
use heck::ToUpperCamelCase;
use std::collections::{HashMap, HashSet};

/// Receiver types that make an extension method a registration method.
pub const BUILDER_RECEIVERS: &[&str] = &[
    "IEndpointRouteBuilder",
    "RouteGroupBuilder",
    "WebApplication",
    "IApplicationBuilder",
];

pub struct FluentRegistration;

impl EndpointStrategy for FluentRegistration {
    fn name(&self) -> &'static str {
        "fluent-registration"
    }

    fn recognizes(&self, site: &DeclarationSite<'_>) -> bool {
        is_registration_method(site.method)
    }

    fn extract(&self, site: &DeclarationSite<'_>, sink: &dyn DiagnosticSink) -> Vec<EndpointInfo> {
        let mut synthesized: HashSet<String> = HashSet::new();
        let mut out = Vec::new();

        for registration in registrations(site.method) {
            let resolved = match &registration.handler {
                Handler::Named(text) => resolve_handler(site, text),
                Handler::Lambda(lambda) => Some((None, *lambda)),
                Handler::Unknown => None,
            };

            let mut markers: Vec<&Annotation> = [
                export_marker(&site.container.attributes),
                export_marker(&site.method.attributes),
            ]
            .into_iter()
            .flatten()
            .collect();
            if let Some((owner, handler)) = resolved {
                markers.extend(owner.and_then(|c| export_marker(&c.attributes)));
                markers.extend(export_marker(&handler.attributes));
            }
            if markers.is_empty() {
                continue;
            }

            let base = match resolved {
                Some((_, handler)) => describe(Describe {
                    verb: registration.verb,
                    route: registration.route.clone(),
                    container: site.container,
                    method: handler,
                    metadata: &registration.metadata,
                    idiom: Idiom::FluentRegistration,
                    source: site.file.path.clone(),
                }),
                None => unresolved(site, &registration),
            };

            let mut endpoint = apply_metadata(base, &registration);
            if endpoint.operation.is_empty() {
                let mut name = synthesize_operation(&endpoint.route);
                if !synthesized.insert(name.clone()) {
                    name = format!("{}{}", endpoint.verb.pascal(), name);
                    synthesized.insert(name.clone());
                }
                tracing::debug!(
                    route = %endpoint.route,
                    operation = %name,
                    "synthesized operation name"
                );
                endpoint = EndpointInfo {
                    operation: name,
                    ..endpoint
                };
            }
            if let Handler::Named(text) = &registration.handler {
                if resolved.is_none() {
                    sink.report(
                        clientgen_ir::Diagnostic::info(format!(
                            "handler '{}' not found in '{}', using registration metadata",
                            text, site.container.name
                        ))
                        .at(site.qualified_name()),
                    );
                }
            }
            out.push(overlay(endpoint, &markers));
        }
        out
    }
}

pub fn is_registration_method(method: &MethodDecl) -> bool {
    let receiver = method
        .params
        .first()
        .is_some_and(|p| p.is_receiver && BUILDER_RECEIVERS.contains(&p.type_info.name.as_str()));
    receiver
        && method
            .body
            .chains
            .iter()
            .any(|c| c.calls.iter().any(|call| HttpVerb::from_map_call(&call.name).is_some()))
}

/// Route prefix and inherited metadata of a route group.
#[derive(Debug, Clone, Default)]
struct GroupScope {
    prefix: String,
    tags: Vec<String>,
    requires_auth: Option<bool>,
}

impl GroupScope {
    fn apply(&mut self, call: &ChainCall) {
        match call.name.as_str() {
            "MapGroup" => {
                let segment = call.arg(0).and_then(string_literal).unwrap_or_default();
                self.prefix = join_routes(&self.prefix, &segment);
            }
            "WithTags" => self.tags.extend(call.args.iter().flat_map(|a| string_list(a))),
            "RequireAuthorization" => self.requires_auth = Some(true),
            "AllowAnonymous" => self.requires_auth = Some(false),
            _ => {}
        }
    }
}

#[derive(Debug)]
enum Handler<'a> {
    Named(&'a str),
    Lambda(&'a MethodDecl),
    Unknown,
}

#[derive(Debug)]
struct Registration<'a> {
    verb: HttpVerb,
    route: String,
    handler: Handler<'a>,
    /// Calls chained after the registration call.
    metadata: Vec<ChainCall>,
    scope: GroupScope,
}

/// Every `Map{Verb}` call in a registration method with its resolved group.
fn registrations(method: &MethodDecl) -> Vec<Registration<'_>> {
    let mut scopes: HashMap<&str, GroupScope> = HashMap::new();
    if let Some(receiver) = method.params.first() {
        scopes.insert(receiver.name.as_str(), GroupScope::default());
    }

    let mut out = Vec::new();
    for chain in &method.body.chains {
        let Some(mut scope) = scopes.get(chain.root.as_str()).cloned() else {
            continue;
        };
        let mut current: Option<Registration> = None;
        for (index, call) in chain.calls.iter().enumerate() {
            if let Some(verb) = HttpVerb::from_map_call(&call.name) {
                out.extend(current.take());
                let segment = call.arg(0).and_then(string_literal).unwrap_or_default();
                current = Some(Registration {
                    verb,
                    route: join_routes(&scope.prefix, &segment),
                    handler: handler_of(chain, index, call),
                    metadata: Vec::new(),
                    scope: scope.clone(),
                });
                continue;
            }
            match current.as_mut() {
                Some(registration) => registration.metadata.push(call.clone()),
                None => scope.apply(call),
            }
        }
        match current {
            Some(registration) => out.push(registration),
            None => {
                if let Some(local) = &chain.bound_to {
                    scopes.insert(local.as_str(), scope);
                }
            }
        }
    }
    out
}

fn handler_of<'a>(chain: &'a CallChain, index: usize, call: &'a ChainCall) -> Handler<'a> {
    if let Some(lambda) = chain.lambda_for(index) {
        return Handler::Lambda(lambda);
    }
    match call.arg(1) {
        Some(text) if is_method_reference(text) => Handler::Named(text),
        _ => Handler::Unknown,
    }
}

fn is_method_reference(text: &str) -> bool {
    !text.is_empty()
        && text
            .chars()
            .all(|c| c.is_alphanumeric() || c == '_' || c == '.')
}

/// Find a named handler: `GetUser` in the registration container, or
/// `UserHandlers.GetUser` in another container of the same file.
fn resolve_handler<'a>(
    site: &DeclarationSite<'a>,
    text: &str,
) -> Option<(Option<&'a ContainerDecl>, &'a MethodDecl)> {
    match text.rsplit_once('.') {
        Some((owner, name)) => {
            let owner = owner.rsplit('.').next().unwrap_or(owner);
            let container = site.file.container(owner)?;
            container.method(name).map(|m| (Some(container), m))
        }
        None => site
            .container
            .method(text)
            .map(|m| (Some(site.container), m)),
    }
}

/// Names of methods referenced as handlers by registrations in a container.
pub fn handler_names(container: &ContainerDecl) -> HashSet<String> {
    container
        .methods
        .iter()
        .filter(|m| is_registration_method(m))
        .flat_map(registrations)
        .filter_map(|r| match r.handler {
            Handler::Named(text) => Some(text.rsplit('.').next().unwrap_or(text).to_string()),
            _ => None,
        })
        .collect()
}

/// Endpoint built from the registration call alone.
fn unresolved(site: &DeclarationSite<'_>, registration: &Registration<'_>) -> EndpointInfo {
    let response_type = declared_response(&[], &registration.metadata);
    let download = response_type.as_ref().is_some_and(is_binary);
    EndpointInfo {
        verb: registration.verb,
        route: registration.route.clone(),
        container: site.container.name.clone(),
        operation: String::new(),
        request_type: None,
        response_type,
        parameters: route_only_parameters(&registration.route),
        requires_auth: false,
        tags: Vec::new(),
        group: group_name(&site.container.name),
        upload: false,
        download,
        summary: None,
        idiom: Idiom::FluentRegistration,
        source: site.file.path.clone(),
    }
}

/// Group scope first, then each chained metadata call in order. Values the
/// handler already supplied are kept, except explicit auth calls.
fn apply_metadata(endpoint: EndpointInfo, registration: &Registration<'_>) -> EndpointInfo {
    let scope = &registration.scope;
    let mut operation = endpoint.operation;
    let mut summary = endpoint.summary;
    let mut request_type = endpoint.request_type;
    let mut requires_auth = endpoint.requires_auth || scope.requires_auth == Some(true);
    if scope.requires_auth == Some(false) {
        requires_auth = false;
    }
    let mut tags = endpoint.tags;
    for tag in &scope.tags {
        if !tags.contains(tag) {
            tags.push(tag.clone());
        }
    }

    for call in &registration.metadata {
        match call.name.as_str() {
            "WithName" if operation.is_empty() => {
                operation = call.arg(0).and_then(string_literal).unwrap_or_default();
            }
            "WithSummary" if summary.is_none() => {
                summary = call.arg(0).and_then(string_literal);
            }
            "WithDescription" if summary.is_none() => {
                summary = call.arg(0).and_then(string_literal);
            }
            "WithTags" => {
                for tag in call.args.iter().flat_map(|a| string_list(a)) {
                    if !tags.contains(&tag) {
                        tags.push(tag);
                    }
                }
            }
            "RequireAuthorization" => requires_auth = true,
            "AllowAnonymous" => requires_auth = false,
            "Accepts" if request_type.is_none() => {
                request_type = call.type_args.first().map(|t| TypeInfo::from_display(t));
            }
            _ => {}
        }
    }

    EndpointInfo {
        operation,
        summary,
        request_type,
        requires_auth,
        tags,
        ..endpoint
    }
}

/// `/api/users/{id}` → `ApiUsersById`.
pub fn synthesize_operation(route: &str) -> String {
    let params = route_parameters(route);
    let mut name = String::new();
    let mut rest = route;
    let mut offset = 0;
    for param in &params {
        name.push_str(&static_segments(&rest[..param.start - offset]));
        name.push_str("By");
        name.push_str(&param.name.to_upper_camel_case());
        rest = &route[param.end..];
        offset = param.end;
    }
    name.push_str(&static_segments(rest));
    if name.is_empty() {
        "Root".to_string()
    } else {
        name
    }
}

fn static_segments(text: &str) -> String {
    text.split(['/', '-', '.'])
        .filter(|s| !s.is_empty())
        .map(|s| s.to_upper_camel_case())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::parse_source;
    use clientgen_ir::{Diagnostics, ParameterSource};

    fn extract(source: &str) -> Vec<EndpointInfo> {
        let file = parse_source(None, source).unwrap();
        let sink = Diagnostics::new();
        let mut out = Vec::new();
        for container in &file.containers {
            for method in &container.methods {
                let site = DeclarationSite::new(&file, container, method);
                if FluentRegistration.recognizes(&site) {
                    out.extend(FluentRegistration.extract(&site, &sink));
                }
            }
        }
        out
    }

    #[test]
    fn test_synthesized_names() {
        assert_eq!(synthesize_operation("/api/users/{id}"), "ApiUsersById");
        assert_eq!(
            synthesize_operation("/orders/{orderId:guid}/line-items"),
            "OrdersByOrderIdLineItems"
        );
        assert_eq!(synthesize_operation("/"), "Root");
    }

    #[test]
    fn test_group_locals_and_named_handler() {
        let endpoints = extract(
            r#"
[ExportClient]
public static class UserEndpoints
{
    public static void MapUsers(this IEndpointRouteBuilder app)
    {
        var api = app.MapGroup("/api");
        var users = api.MapGroup("users").WithTags("Users").RequireAuthorization();
        users.MapGet("/{id}", GetUser);
        users.MapDelete("/{id}", (int id) => Results.NoContent()).WithName("DeleteUser").AllowAnonymous();
    }

    /// <summary>Load one user.</summary>
    public static async Task<Results<Ok<UserDto>, NotFound>> GetUser(int id, ISender sender) => null;
}
"#,
        );
        assert_eq!(endpoints.len(), 2);

        let get = &endpoints[0];
        assert_eq!(get.route, "/api/users/{id}");
        assert_eq!(get.operation, "GetUser");
        assert_eq!(get.group, "User");
        assert_eq!(get.response_type.as_ref().unwrap().name, "UserDto");
        assert!(get.requires_auth);
        assert_eq!(get.tags, vec!["Users"]);
        assert_eq!(get.summary.as_deref(), Some("Load one user."));
        assert_eq!(get.idiom, Idiom::FluentRegistration);
        assert_eq!(get.parameters[0].source, ParameterSource::Route);

        let delete = &endpoints[1];
        assert_eq!(delete.verb, HttpVerb::Delete);
        assert_eq!(delete.operation, "DeleteUser");
        assert!(!delete.requires_auth);
    }

    #[test]
    fn test_metadata_only_registration() {
        let endpoints = extract(
            r#"
public static class CatalogEndpoints
{
    [ExportClient]
    public static void MapCatalog(this WebApplication app)
    {
        app.MapGroup("/api").MapGet("/products/{id:int}", Handlers.Find)
            .WithSummary("Find a product")
            .Produces<ProductDto>(200);
        app.MapGet("/products", Handlers.List);
        app.MapPost("/products", Handlers.List);
    }
}
"#,
        );
        assert_eq!(endpoints.len(), 3);
        let find = &endpoints[0];
        assert_eq!(find.route, "/api/products/{id:int}");
        assert_eq!(find.operation, "ApiProductsById");
        assert_eq!(find.summary.as_deref(), Some("Find a product"));
        assert_eq!(find.response_type.as_ref().unwrap().name, "ProductDto");
        assert_eq!(find.parameters[0].name, "id");
        assert_eq!(find.parameters[0].type_info.name, "int");

        assert_eq!(endpoints[1].operation, "Products");
        assert_eq!(endpoints[2].operation, "PostProducts");
    }

    #[test]
    fn test_unexported_registrations_skipped() {
        let endpoints = extract(
            r#"
public static class HealthEndpoints
{
    public static void MapHealth(this IEndpointRouteBuilder app)
    {
        app.MapGet("/health", () => "ok");
    }
}
"#,
        );
        assert!(endpoints.is_empty());
    }

    #[test]
    fn test_lambda_dispatch_response() {
        let endpoints = extract(
            r#"
public static class OrderEndpoints
{
    [ExportClient]
    public static void MapOrders(this RouteGroupBuilder group)
    {
        group.MapPost("/orders", async (CreateOrderCommand command, ISender sender) =>
            await sender.Send<Result<OrderDto>>(command)).WithName("CreateOrder");
    }
}
"#,
        );
        let create = &endpoints[0];
        assert_eq!(create.operation, "CreateOrder");
        assert_eq!(create.request_type.as_ref().unwrap().name, "CreateOrderCommand");
        assert_eq!(create.response_type.as_ref().unwrap().name, "OrderDto");
    }
}
