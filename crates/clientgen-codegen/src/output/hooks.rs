//! TanStack Query bindings: queries for read verbs, mutations otherwise.

use super::client::Operation;
use super::{API_DIR, EndpointGroup, HOOKS_DIR, RenderContext, ts_path, with_imports};
use crate::artifact::{Artifact, ArtifactKind};
use crate::emitter::Emitter;
use crate::imports::Imports;
use crate::naming::{hook_name, quote};
use crate::options::Framework;

/// `None` when the framework has no query adapter.
pub fn render_hooks(cx: &RenderContext<'_>, group: &EndpointGroup<'_>) -> Option<Artifact> {
    let framework = cx.options.framework;
    let package = framework.query_package()?;
    let (query_fn, mutation_fn) = framework.query_factories();

    let mut imports = Imports::new();
    let api_module = format!("../{}/{}", API_DIR, group.stem());
    let mut bodies = Vec::new();
    for endpoint in &group.endpoints {
        let op = Operation::new(cx, endpoint);
        imports.add_value(&api_module, &op.function);
        for arg in &op.args {
            cx.import_types(&mut imports, &arg.ty, false, &[]);
        }
        let body = if endpoint.verb.is_read() {
            imports.add_value(package, query_fn);
            render_query(&op, &group.stem(), query_fn)
        } else {
            imports.add_value(package, mutation_fn);
            render_mutation(&op, mutation_fn)
        };
        bodies.push(body);
    }

    let mut contents = String::new();
    if framework == Framework::Nextjs {
        contents.push_str("'use client';\n\n");
    }
    contents.push_str(&with_imports(&imports, bodies.join("\n")));
    Some(Artifact::new(
        ArtifactKind::Binding,
        ts_path(HOOKS_DIR, &group.stem()),
        contents,
    ))
}

fn render_query(op: &Operation<'_>, group_stem: &str, factory: &str) -> String {
    let mut key = vec![quote(group_stem), quote(&op.function)];
    key.extend(op.args.iter().map(|a| a.ident.clone()));

    let mut e = Emitter::new();
    e.doc(op.endpoint.summary.as_deref());
    e.open(format!(
        "export function {}({}) {{",
        hook_name(&op.function),
        op.parameter_list()
    ));
    e.open(format!("return {}({{", factory));
    e.line(format!("queryKey: [{}],", key.join(", ")));
    e.line(format!(
        "queryFn: () => {}({}),",
        op.function,
        op.call_arguments()
    ));
    e.close("});");
    e.close("}");
    e.finish()
}

fn render_mutation(op: &Operation<'_>, factory: &str) -> String {
    let mutation = match op.args.as_slice() {
        [] => format!("mutationFn: () => {}(),", op.function),
        [single] => format!(
            "mutationFn: ({}) => {}({}),",
            single.declaration(),
            op.function,
            single.ident
        ),
        many => {
            let shape: Vec<String> = many.iter().map(|a| a.declaration()).collect();
            let call: Vec<String> = many
                .iter()
                .map(|a| format!("variables.{}", a.ident))
                .collect();
            format!(
                "mutationFn: (variables: {{ {} }}) => {}({}),",
                shape.join("; "),
                op.function,
                call.join(", ")
            )
        }
    };

    let mut e = Emitter::new();
    e.doc(op.endpoint.summary.as_deref());
    e.open(format!("export function {}() {{", hook_name(&op.function)));
    e.open(format!("return {}({{", factory));
    e.line(mutation);
    e.close("});");
    e.close("}");
    e.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::GenerateOptions;
    use crate::output::group_endpoints;
    use clientgen_ir::{
        EndpointInfo, HttpVerb, Idiom, ParameterInfo, ParameterSource, ProjectIr, TypeInfo,
    };
    use clientgen_typemap::TypeMapper;

    fn ir() -> ProjectIr {
        let base = EndpointInfo {
            verb: HttpVerb::Get,
            route: "/users/{id}".into(),
            container: "UserEndpoints".into(),
            operation: "GetUser".into(),
            request_type: None,
            response_type: Some(TypeInfo::reference("UserDto")),
            parameters: vec![ParameterInfo {
                name: "id".into(),
                type_info: TypeInfo::reference("int"),
                is_required: true,
                source: ParameterSource::Route,
            }],
            requires_auth: false,
            tags: vec![],
            group: "Users".into(),
            upload: false,
            download: false,
            summary: None,
            idiom: Idiom::FluentRegistration,
            source: None,
        };
        let update = EndpointInfo {
            verb: HttpVerb::Put,
            operation: "UpdateUser".into(),
            parameters: vec![
                base.parameters[0].clone(),
                ParameterInfo {
                    name: "request".into(),
                    type_info: TypeInfo::reference("UpdateUserRequest"),
                    is_required: true,
                    source: ParameterSource::Body,
                },
            ],
            response_type: None,
            ..base.clone()
        };
        ProjectIr {
            endpoints: vec![base, update],
            types: vec![
                TypeInfo::definition("UserDto", None, vec![], vec![], None),
                TypeInfo::definition("UpdateUserRequest", None, vec![], vec![], None),
            ],
            ..Default::default()
        }
    }

    fn render(framework: Framework) -> Option<String> {
        let ir = ir();
        let mapper = TypeMapper::new();
        let options = GenerateOptions {
            framework,
            ..Default::default()
        };
        let cx = RenderContext::new(&ir, &mapper, &options);
        let groups = group_endpoints(&ir);
        render_hooks(&cx, &groups[0]).map(|a| a.contents)
    }

    #[test]
    fn test_react_hooks() {
        insta::assert_snapshot!(render(Framework::React).unwrap(), @r"
        import { useMutation, useQuery } from '@tanstack/react-query';
        import { getUser, putUpdateUser } from '../api/users';
        import type { UpdateUserRequest } from '../types/update-user-request';

        export function useGetUser(id: number) {
          return useQuery({
            queryKey: ['users', 'getUser', id],
            queryFn: () => getUser(id),
          });
        }

        export function usePutUpdateUser() {
          return useMutation({
            mutationFn: (variables: { id: number; request: UpdateUserRequest }) => putUpdateUser(variables.id, variables.request),
          });
        }
        ");
    }

    #[test]
    fn test_framework_adapters() {
        assert!(render(Framework::Vanilla).is_none());
        let svelte = render(Framework::Svelte).unwrap();
        assert!(svelte.contains("from '@tanstack/svelte-query';"));
        assert!(svelte.contains("return createQuery({"));
        let next = render(Framework::Nextjs).unwrap();
        assert!(next.starts_with("'use client';\n\n"));
    }
}
