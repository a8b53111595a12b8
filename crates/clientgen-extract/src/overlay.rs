//! Export-marker metadata overlay.
//!
//! Runs after either idiom has produced its endpoint. Named arguments on
//! `[ExportClient(...)]` override what was inferred; each marker is applied
//! in turn, so a method-level marker wins over its container's.

use clientgen_ir::literal::{bool_literal, string_list, string_literal};
use clientgen_ir::{Annotation, EndpointInfo};

pub fn overlay(endpoint: EndpointInfo, markers: &[&Annotation]) -> EndpointInfo {
    markers.iter().fold(endpoint, |acc, marker| apply(acc, marker))
}

fn apply(endpoint: EndpointInfo, marker: &Annotation) -> EndpointInfo {
    let text = |name| marker.named_arg(name).and_then(string_literal);
    let flag = |name| marker.named_arg(name).and_then(bool_literal);
    let tags = marker
        .named_arg("Tags")
        .map(string_list)
        .filter(|t| !t.is_empty());

    EndpointInfo {
        summary: text("Summary").or(endpoint.summary),
        requires_auth: flag("RequiresAuth").unwrap_or(endpoint.requires_auth),
        tags: tags.unwrap_or(endpoint.tags),
        upload: flag("Upload").unwrap_or(endpoint.upload),
        download: flag("Download").unwrap_or(endpoint.download),
        group: text("Group").unwrap_or(endpoint.group),
        ..endpoint
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clientgen_ir::{AnnotationArg, HttpVerb, Idiom};

    fn base() -> EndpointInfo {
        EndpointInfo {
            verb: HttpVerb::Get,
            route: "/users/{id}".into(),
            container: "UsersController".into(),
            operation: "GetUser".into(),
            request_type: None,
            response_type: None,
            parameters: vec![],
            requires_auth: true,
            tags: vec!["Users".into()],
            group: "Users".into(),
            upload: false,
            download: false,
            summary: Some("From docs".into()),
            idiom: Idiom::MethodAttached,
            source: None,
        }
    }

    fn marker(args: &[(&str, &str)]) -> Annotation {
        Annotation {
            name: "ExportClient".into(),
            type_args: vec![],
            arguments: args
                .iter()
                .map(|(n, v)| AnnotationArg {
                    name: Some(n.to_string()),
                    value: v.to_string(),
                })
                .collect(),
        }
    }

    #[test]
    fn test_named_arguments_override() {
        let m = marker(&[
            ("Summary", "\"Fetch one user\""),
            ("RequiresAuth", "false"),
            ("Tags", "new[] { \"Admin\", \"Users\" }"),
            ("Group", "\"Admin\""),
        ]);
        let out = overlay(base(), &[&m]);
        assert_eq!(out.summary.as_deref(), Some("Fetch one user"));
        assert!(!out.requires_auth);
        assert_eq!(out.tags, vec!["Admin", "Users"]);
        assert_eq!(out.group, "Admin");
        assert_eq!(out.operation, "GetUser");
    }

    #[test]
    fn test_bare_marker_keeps_inferred() {
        let out = overlay(base(), &[&marker(&[])]);
        assert_eq!(out, base());
    }

    #[test]
    fn test_method_marker_applied_last() {
        let container = marker(&[("Download", "true"), ("Group", "\"Files\"")]);
        let method = marker(&[("Download", "false")]);
        let out = overlay(base(), &[&container, &method]);
        assert!(!out.download);
        assert_eq!(out.group, "Files");
    }
}
