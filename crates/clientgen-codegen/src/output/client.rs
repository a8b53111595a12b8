//! Client functions, one file per endpoint group.
//!
//! ```ts
//! export async function getUser(id: number): Promise<UserDto> {
//!   return apiFetch<UserDto>(`/api/users/${encodeURIComponent(id)}`, {
//!     method: 'GET',
//!   });
//! }
//! ```

use super::{API_DIR, EndpointGroup, RenderContext, VALIDATION_DIR, ts_path, with_imports};
use crate::artifact::{Artifact, ArtifactKind};
use crate::emitter::Emitter;
use crate::imports::Imports;
use crate::naming::{file_stem, function_name, identifier, property_key, quote, schema_name};
use clientgen_ir::{EndpointInfo, ParameterInfo, ParameterSource, TypeInfo, route_parameters};
use clientgen_typemap::builtins::VOID;

/// One function argument.
#[derive(Debug, Clone)]
pub struct Arg<'a> {
    pub ident: String,
    pub ty: String,
    pub optional: bool,
    /// Wire name and binding; route tokens without a parameter carry none.
    pub param: Option<&'a ParameterInfo>,
    pub source: ParameterSource,
    /// A bound object whose properties go on the wire individually.
    pub spread: bool,
}

impl Arg<'_> {
    pub fn declaration(&self) -> String {
        let mark = if self.optional { "?" } else { "" };
        format!("{}{}: {}", self.ident, mark, self.ty)
    }

    fn wire_name(&self) -> &str {
        self.param.map_or(self.ident.as_str(), |p| p.name.as_str())
    }
}

/// The client-side shape of one endpoint.
#[derive(Debug, Clone)]
pub struct Operation<'a> {
    pub endpoint: &'a EndpointInfo,
    pub function: String,
    /// Required arguments first, each group in declaration order.
    pub args: Vec<Arg<'a>>,
    pub returns: String,
}

impl<'a> Operation<'a> {
    pub fn new(cx: &RenderContext<'_>, endpoint: &'a EndpointInfo) -> Self {
        let mut args: Vec<Arg<'a>> = Vec::new();

        for token in route_parameters(&endpoint.route) {
            let param = endpoint.parameters.iter().find(|p| {
                p.source == ParameterSource::Route && p.name.eq_ignore_ascii_case(&token.name)
            });
            args.push(Arg {
                ident: identifier(&token.name),
                ty: param.map_or_else(|| "string".to_string(), |p| cx.map(&p.type_info)),
                optional: false,
                param,
                source: ParameterSource::Route,
                spread: false,
            });
        }
        for param in &endpoint.parameters {
            if param.source == ParameterSource::Route {
                continue;
            }
            args.push(Arg {
                ident: identifier(&param.name),
                ty: cx.map(&param.type_info),
                optional: !param.is_required,
                param: Some(param),
                source: param.source,
                spread: param.source == ParameterSource::Query && is_structured(cx, &param.type_info),
            });
        }
        args.sort_by_key(|a| a.optional);

        let returns = if endpoint.download {
            "Blob".to_string()
        } else {
            endpoint
                .response_type
                .as_ref()
                .map_or_else(|| VOID.to_string(), |t| cx.map(t))
        };

        Self {
            endpoint,
            function: function_name(endpoint.verb, &endpoint.operation),
            args,
            returns,
        }
    }

    pub fn parameter_list(&self) -> String {
        self.args
            .iter()
            .map(Arg::declaration)
            .collect::<Vec<_>>()
            .join(", ")
    }

    pub fn call_arguments(&self) -> String {
        self.args
            .iter()
            .map(|a| a.ident.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Type expressions this operation's signature mentions.
    pub fn signature_types(&self) -> impl Iterator<Item = &str> {
        self.args
            .iter()
            .map(|a| a.ty.as_str())
            .chain(std::iter::once(self.returns.as_str()))
    }

    fn args_from(&self, source: ParameterSource) -> impl Iterator<Item = &Arg<'a>> {
        self.args.iter().filter(move |a| a.source == source)
    }

    /// Route as a template literal with each token percent-encoded. A
    /// catch-all token keeps its `/` separators.
    fn route_expression(&self) -> String {
        let route = &self.endpoint.route;
        let tokens = route_parameters(route);
        if tokens.is_empty() {
            return quote(route);
        }
        let mut out = String::from("`");
        let mut last = 0;
        for token in &tokens {
            out.push_str(&route[last..token.start]);
            let ident = identifier(&token.name);
            if route[token.start..].starts_with("{*") {
                out.push_str(&format!(
                    "${{String({}).split('/').map(encodeURIComponent).join('/')}}",
                    ident
                ));
            } else {
                out.push_str(&format!("${{encodeURIComponent({})}}", ident));
            }
            last = token.end;
        }
        out.push_str(&route[last..]);
        out.push('`');
        out
    }

    /// The argument that carries the request type, if one does.
    fn request_arg(&self) -> Option<&Arg<'a>> {
        let request = self.endpoint.request_type.as_ref()?;
        self.args
            .iter()
            .find(|a| a.param.is_some_and(|p| p.type_info.name == request.name))
    }
}

pub fn render_group(cx: &RenderContext<'_>, group: &EndpointGroup<'_>) -> Artifact {
    let mut imports = Imports::new();
    imports.add_value("../client", "apiFetch");
    let mut bodies = Vec::new();
    for endpoint in &group.endpoints {
        let op = Operation::new(cx, endpoint);
        for ty in op.signature_types() {
            cx.import_types(&mut imports, ty, false, &[]);
        }
        bodies.push(render_function(cx, &op, &mut imports));
    }
    Artifact::new(
        ArtifactKind::Client,
        ts_path(API_DIR, &group.stem()),
        with_imports(&imports, bodies.join("\n")),
    )
}

fn render_function(cx: &RenderContext<'_>, op: &Operation<'_>, imports: &mut Imports) -> String {
    let endpoint = op.endpoint;
    let mut e = Emitter::new();
    e.doc(endpoint.summary.as_deref());
    e.open(format!(
        "export async function {}({}): Promise<{}> {{",
        op.function,
        op.parameter_list(),
        op.returns
    ));

    if let Some(request) = &endpoint.request_type {
        if cx.validates(&request.name) {
            if let Some(arg) = op.request_arg() {
                let schema = schema_name(&request.name);
                imports.add_value(
                    &format!("../{}/{}", VALIDATION_DIR, file_stem(&request.name)),
                    &schema,
                );
                if arg.optional {
                    e.line(format!("if ({} !== undefined) {}.parse({});", arg.ident, schema, arg.ident));
                } else {
                    e.line(format!("{}.parse({});", schema, arg.ident));
                }
            }
        }
    }

    let form: Vec<&Arg<'_>> = op.args_from(ParameterSource::Form).collect();
    if !form.is_empty() {
        e.line("const form = new FormData();");
        for arg in &form {
            append_form_field(&mut e, arg);
        }
    }

    e.open(format!(
        "return apiFetch<{}>({}, {{",
        op.returns,
        op.route_expression()
    ));
    e.line(format!("method: '{}',", endpoint.verb.as_str()));
    if let Some(fields) = object_fields(op.args_from(ParameterSource::Query)) {
        e.line(format!("query: {},", fields));
    }
    if let Some(fields) = object_fields(op.args_from(ParameterSource::Header)) {
        e.line(format!("headers: {},", fields));
    }
    if !form.is_empty() {
        e.line("body: form,");
    } else if let Some(body) = op.args_from(ParameterSource::Body).next() {
        e.line(format!("body: {},", body.ident));
    }
    if endpoint.requires_auth {
        e.line("auth: true,");
    }
    if op.returns == "Blob" {
        e.line("responseType: 'blob',");
    } else if op.returns == VOID {
        e.line("responseType: 'void',");
    }
    e.close("});");
    e.close("}");
    e.finish()
}

/// `{ search, 'X-Tenant': xTenant, ...filter }`, or nothing when empty.
fn object_fields<'a, 'b: 'a>(args: impl Iterator<Item = &'a Arg<'b>>) -> Option<String> {
    let fields: Vec<String> = args
        .map(|a| {
            let key = property_key(a.wire_name());
            if a.spread {
                format!("...{}", a.ident)
            } else if key == a.ident {
                key
            } else {
                format!("{}: {}", key, a.ident)
            }
        })
        .collect();
    if fields.is_empty() {
        None
    } else {
        Some(format!("{{ {} }}", fields.join(", ")))
    }
}

/// A declared object type, as opposed to a scalar, enum or collection.
fn is_structured(cx: &RenderContext<'_>, ty: &TypeInfo) -> bool {
    !ty.is_collection && cx.ir.type_named(&ty.name).is_some_and(|t| !t.is_enum)
}

fn append_form_field(e: &mut Emitter, arg: &Arg<'_>) {
    let name = quote(arg.wire_name());
    let ty = arg.ty.trim_end_matches(" | null");
    let append = if ty == "File[]" {
        format!(
            "for (const item of {}) form.append({}, item);",
            arg.ident, name
        )
    } else if ty == "File" || ty == "Blob" {
        format!("form.append({}, {});", name, arg.ident)
    } else if matches!(ty, "string" | "number" | "boolean") {
        format!("form.append({}, String({}));", name, arg.ident)
    } else {
        format!("form.append({}, JSON.stringify({}));", name, arg.ident)
    };
    if arg.optional {
        e.line(format!("if ({} != null) {}", arg.ident, append));
    } else {
        e.line(append);
    }
}
