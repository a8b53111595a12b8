//! Layered response-type resolution.
//!
//! Three independent sources are consulted in order and the first that yields
//! a type wins; results are never combined:
//!
//! 1. declared responses (`[ProducesResponseType<T>]`, `.Produces<T>()`)
//! 2. a dispatch call in the body (`_mediator.Send<T>(...)`)
//! 3. the declared return type with wrappers peeled off

use crate::syntax::BodyInfo;
use clientgen_ir::literal::number_literal;
use clientgen_ir::{Annotation, ChainCall, TypeInfo};
use clientgen_typemap::builtins;

/// Wrappers unwrapped once around a declared response.
pub const ENVELOPES: &[&str] = &["ApiResponse", "ApiResult", "Envelope"];

/// Calls whose last type argument names the handler's result.
pub const DISPATCH_CALLS: &[&str] = &[
    "Send",
    "SendAsync",
    "Dispatch",
    "DispatchAsync",
    "Query",
    "QueryAsync",
];

#[derive(Debug, Clone, Copy, Default)]
pub struct ResponseSources<'a> {
    pub attributes: &'a [Annotation],
    pub metadata: &'a [ChainCall],
    pub body: Option<&'a BodyInfo>,
    pub return_type: Option<&'a TypeInfo>,
}

pub fn resolve_response(sources: ResponseSources<'_>) -> Option<TypeInfo> {
    declared_response(sources.attributes, sources.metadata)
        .or_else(|| sources.body.and_then(dispatched_response))
        .or_else(|| sources.return_type.and_then(unwrapped_return))
}

/// Layer 1: explicit response declarations with a success status.
pub fn declared_response(attributes: &[Annotation], metadata: &[ChainCall]) -> Option<TypeInfo> {
    let from_attributes = attributes
        .iter()
        .filter(|a| matches!(a.name.as_str(), "ProducesResponseType" | "Produces"))
        .find_map(|a| {
            let mut args: Vec<&str> = a.positional().collect();
            let status = a
                .named_arg("StatusCode")
                .or_else(|| args.iter().copied().find(|p| typeof_target(p).is_none()));
            // `Type = typeof(T)` names the body just like a positional typeof
            args.extend(a.named_arg("Type"));
            declared_type(&a.type_args, &args, status)
        });

    from_attributes
        .or_else(|| {
            metadata
                .iter()
                .filter(|c| c.name == "Produces")
                .find_map(|c| {
                    let args: Vec<&str> = c.args.iter().map(String::as_str).collect();
                    let status = args.iter().copied().find(|a| typeof_target(a).is_none());
                    declared_type(&c.type_args, &args, status)
                })
        })
        .map(unwrap_envelope)
}

fn declared_type(type_args: &[String], args: &[&str], status: Option<&str>) -> Option<TypeInfo> {
    if status.is_some_and(|s| !is_success_status(s)) {
        return None;
    }
    type_args
        .first()
        .map(|t| TypeInfo::from_display(t))
        .or_else(|| {
            args.iter()
                .find_map(|a| typeof_target(a))
                .map(TypeInfo::from_display)
        })
}

fn typeof_target(text: &str) -> Option<&str> {
    text.trim()
        .strip_prefix("typeof(")
        .and_then(|rest| rest.strip_suffix(')'))
        .map(str::trim)
}

/// `200`, `StatusCodes.Status201Created` and the like. Unknown forms pass.
fn is_success_status(text: &str) -> bool {
    let text = text.trim();
    if let Some(code) = number_literal(text) {
        return (200.0..300.0).contains(&code);
    }
    if let Some(pos) = text.find("Status") {
        if let Some(first) = text[pos + "Status".len()..].chars().next() {
            if first.is_ascii_digit() {
                return first == '2';
            }
        }
    }
    true
}

fn unwrap_envelope(ty: TypeInfo) -> TypeInfo {
    if ENVELOPES.contains(&ty.name.as_str()) && ty.generic_args.len() == 1 {
        ty.generic_args.into_iter().next().unwrap_or_else(|| TypeInfo::reference("object"))
    } else {
        ty
    }
}

/// Layer 2: the first dispatch call that names its result type.
pub fn dispatched_response(body: &BodyInfo) -> Option<TypeInfo> {
    let ty = body
        .chains
        .iter()
        .flat_map(|chain| chain.calls.iter())
        .filter(|call| DISPATCH_CALLS.contains(&call.name.as_str()))
        .find_map(|call| call.type_args.last())
        .map(|t| TypeInfo::from_display(t))?;

    if builtins::is_outcome(&ty.name) && ty.generic_args.len() == 1 {
        return ty.generic_args.into_iter().next();
    }
    Some(ty)
}

/// Layer 3: peel async/action-result wrappers outside-in. Outcome wrappers are
/// kept; primitives, infrastructure and empty results yield nothing, except
/// binary payloads, which mark a download.
pub fn unwrapped_return(ty: &TypeInfo) -> Option<TypeInfo> {
    let mut current = ty;
    loop {
        let name = current.name.as_str();
        if builtins::is_erased_wrapper(name) && current.generic_args.len() == 1 {
            current = &current.generic_args[0];
            continue;
        }
        if builtins::is_result_union(name) {
            match current
                .generic_args
                .iter()
                .find(|a| builtins::is_erased_wrapper(&a.name) && !a.generic_args.is_empty())
            {
                Some(success) => {
                    current = success;
                    continue;
                }
                None => return None,
            }
        }
        break;
    }

    let name = current.name.as_str();
    if current.generic_args.is_empty() && builtins::is_empty_result(name) {
        return None;
    }
    if is_binary(current) {
        return Some(current.clone());
    }
    if builtins::primitive(name).is_some() || builtins::is_infrastructure(name) {
        return None;
    }
    Some(current.clone())
}

/// Streams and file results.
pub fn is_binary(ty: &TypeInfo) -> bool {
    builtins::primitive(&ty.name) == Some("Blob")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::CallChain;
    use clientgen_ir::AnnotationArg;

    fn attr(name: &str, type_args: &[&str], args: &[&str]) -> Annotation {
        Annotation {
            name: name.into(),
            type_args: type_args.iter().map(|s| s.to_string()).collect(),
            arguments: args
                .iter()
                .map(|v| AnnotationArg {
                    name: None,
                    value: v.to_string(),
                })
                .collect(),
        }
    }

    #[test]
    fn test_declared_generic_and_typeof() {
        let ty = declared_response(&[attr("ProducesResponseType", &["UserDto"], &["200"])], &[]);
        assert_eq!(ty.unwrap().name, "UserDto");

        let ty = declared_response(
            &[
                attr("ProducesResponseType", &[], &["typeof(ErrorDto)", "404"]),
                attr(
                    "ProducesResponseType",
                    &[],
                    &["typeof(List<UserDto>)", "StatusCodes.Status200OK"],
                ),
            ],
            &[],
        );
        let ty = ty.unwrap();
        assert_eq!(ty.name, "List");
        assert_eq!(ty.generic_args[0].name, "UserDto");
    }

    #[test]
    fn test_declared_named_type_argument() {
        let named = |name: &str, value: &str| AnnotationArg {
            name: Some(name.into()),
            value: value.into(),
        };
        let mut ok = attr("ProducesResponseType", &[], &["StatusCodes.Status200OK"]);
        ok.arguments.push(named("Type", "typeof(UserDto)"));
        let mut missing = attr("ProducesResponseType", &[], &[]);
        missing.arguments = vec![
            named("Type", "typeof(ProblemDetails)"),
            named("StatusCode", "404"),
        ];
        let ty = declared_response(&[missing, ok], &[]).unwrap();
        assert_eq!(ty.name, "UserDto");
    }

    #[test]
    fn test_envelope_unwrapped_once() {
        let ty = declared_response(
            &[attr("ProducesResponseType", &["ApiResponse<ApiResponse<UserDto>>"], &[])],
            &[],
        )
        .unwrap();
        assert_eq!(ty.name, "ApiResponse");
        assert_eq!(ty.generic_args[0].name, "UserDto");
    }

    #[test]
    fn test_produces_metadata_call() {
        let calls = [ChainCall::new("Produces", &["200"]).with_type_args(&["OrderDto"])];
        assert_eq!(declared_response(&[], &calls).unwrap().name, "OrderDto");
        let calls = [ChainCall::new("Produces", &["404"]).with_type_args(&["ProblemDetails"])];
        assert!(declared_response(&[], &calls).is_none());
    }

    #[test]
    fn test_dispatch_unwraps_outcome() {
        let body = BodyInfo {
            chains: vec![CallChain {
                root: "_mediator".into(),
                calls: vec![ChainCall::new("Send", &["query"]).with_type_args(&["Result<UserDto>"])],
                ..Default::default()
            }],
        };
        assert_eq!(dispatched_response(&body).unwrap().name, "UserDto");
    }

    #[test]
    fn test_return_type_peeling() {
        let ty = unwrapped_return(&TypeInfo::from_display("Task<ActionResult<Result<User>>>")).unwrap();
        assert_eq!(ty.name, "Result");
        assert_eq!(ty.generic_args[0].name, "User");

        assert!(unwrapped_return(&TypeInfo::from_display("Task<IActionResult>")).is_none());
        assert!(unwrapped_return(&TypeInfo::from_display("Task")).is_none());
        assert!(unwrapped_return(&TypeInfo::from_display("ValueTask<int>")).is_none());
        assert_eq!(
            unwrapped_return(&TypeInfo::from_display("Results<Ok<UserDto>, NotFound>"))
                .unwrap()
                .name,
            "UserDto"
        );
        assert!(is_binary(
            &unwrapped_return(&TypeInfo::from_display("Task<FileStreamResult>")).unwrap()
        ));
    }

    #[test]
    fn test_layers_do_not_merge() {
        let body = BodyInfo {
            chains: vec![CallChain {
                calls: vec![ChainCall::new("Send", &[]).with_type_args(&["FromDispatch"])],
                ..Default::default()
            }],
        };
        let ret = TypeInfo::from_display("Task<FromReturn>");
        let declared = [attr("ProducesResponseType", &["FromAttribute"], &[])];
        let all = ResponseSources {
            attributes: &declared,
            metadata: &[],
            body: Some(&body),
            return_type: Some(&ret),
        };
        assert_eq!(resolve_response(all).unwrap().name, "FromAttribute");
        let no_decl = ResponseSources {
            attributes: &[],
            ..all
        };
        assert_eq!(resolve_response(no_decl).unwrap().name, "FromDispatch");
        let only_return = ResponseSources {
            body: None,
            ..no_decl
        };
        assert_eq!(resolve_response(only_return).unwrap().name, "FromReturn");
    }
}
