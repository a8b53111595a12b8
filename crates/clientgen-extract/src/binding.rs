//! Parameter binding sources and request-type selection.

use crate::syntax::{ParamDecl, annotation};
use clientgen_ir::literal::string_literal;
use clientgen_ir::{ParameterInfo, ParameterSource, TypeInfo, route_parameters};
use clientgen_typemap::builtins;

#[derive(Debug, Clone, Default)]
pub struct BoundParameters {
    pub parameters: Vec<ParameterInfo>,
    pub request_type: Option<TypeInfo>,
    pub upload: bool,
}

/// Bind handler parameters against a route template.
///
/// Infrastructure parameters and `[FromServices]` are skipped. The first kept
/// parameter that is not a scalar becomes the request type.
pub fn bind_parameters(params: &[ParamDecl], route: &str) -> BoundParameters {
    let tokens: Vec<String> = route_parameters(route)
        .into_iter()
        .map(|p| p.name.to_ascii_lowercase())
        .collect();

    let mut bound = BoundParameters::default();
    for param in params {
        if param.is_receiver || is_injected(param) {
            continue;
        }
        let (source, wire_name) = binding_source(param, &tokens);
        if source == ParameterSource::Form && is_file(&param.type_info) {
            bound.upload = true;
        }
        if bound.request_type.is_none() && !is_scalar(&param.type_info) {
            bound.request_type = Some(param.type_info.clone());
        }
        bound.parameters.push(ParameterInfo {
            name: wire_name,
            type_info: param.type_info.clone(),
            is_required: !param.type_info.is_nullable && !param.has_default,
            source,
        });
    }
    bound
}

/// Route tokens without a matching handler parameter, typed from their
/// constraint.
pub fn route_only_parameters(route: &str) -> Vec<ParameterInfo> {
    route_parameters(route)
        .into_iter()
        .map(|p| {
            let ty = match p.constraint.as_deref().map(|c| c.trim_end_matches('?')) {
                Some("int") => "int",
                Some("long") => "long",
                Some("decimal") | Some("double") | Some("float") => "double",
                Some("bool") => "bool",
                Some("guid") => "Guid",
                Some("datetime") => "DateTime",
                _ => "string",
            };
            ParameterInfo {
                name: p.name,
                type_info: TypeInfo::reference(ty),
                is_required: true,
                source: ParameterSource::Route,
            }
        })
        .collect()
}

fn is_injected(param: &ParamDecl) -> bool {
    annotation(&param.attributes, "FromServices").is_some()
        || annotation(&param.attributes, "FromKeyedServices").is_some()
        || builtins::is_infrastructure(&param.type_info.name)
}

fn binding_source(param: &ParamDecl, route_tokens: &[String]) -> (ParameterSource, String) {
    const EXPLICIT: [(&str, ParameterSource); 5] = [
        ("FromRoute", ParameterSource::Route),
        ("FromQuery", ParameterSource::Query),
        ("FromBody", ParameterSource::Body),
        ("FromHeader", ParameterSource::Header),
        ("FromForm", ParameterSource::Form),
    ];

    for (marker, source) in EXPLICIT {
        if let Some(attr) = annotation(&param.attributes, marker) {
            let name = attr
                .named_arg("Name")
                .and_then(string_literal)
                .unwrap_or_else(|| param.name.clone());
            return (source, name);
        }
    }

    let source = if route_tokens.contains(&param.name.to_ascii_lowercase()) {
        ParameterSource::Route
    } else if is_file(&param.type_info) {
        ParameterSource::Form
    } else if is_scalar(&param.type_info) {
        ParameterSource::Query
    } else {
        ParameterSource::Body
    };
    (source, param.name.clone())
}

/// Primitives, and collections of primitives.
fn is_scalar(ty: &TypeInfo) -> bool {
    if ty.is_collection {
        return ty.generic_args.first().is_some_and(is_scalar);
    }
    builtins::primitive(&ty.name).is_some()
}

fn is_file(ty: &TypeInfo) -> bool {
    let element = if ty.is_collection {
        ty.generic_args.first()
    } else {
        Some(ty)
    };
    element.is_some_and(|e| matches!(e.name.as_str(), "IFormFile" | "IFormFileCollection"))
}
