//! Whole-IR generation: fan out over IR elements, then add support files and
//! barrels.

use crate::artifact::Artifact;
use crate::error::GenerateError;
use crate::options::GenerateOptions;
use crate::output::barrel::render_barrels;
use crate::output::client::{Operation, render_group};
use crate::output::hooks::render_hooks;
use crate::output::runtime::{render_client_runtime, render_result_type};
use crate::output::schema::render_schema;
use crate::output::server::render_server;
use crate::output::types::render_type;
use crate::output::{EndpointGroup, RenderContext, group_endpoints};
use clientgen_ir::{Diagnostic, DiagnosticSink, NullSink, ProjectIr, TypeInfo};
use clientgen_typemap::TypeMapper;
use rayon::prelude::*;
use std::collections::HashMap;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// One independent rendering job.
enum Unit<'a> {
    Type(&'a TypeInfo),
    Group(EndpointGroup<'a>),
    Schema(String),
}

pub struct Generator {
    options: GenerateOptions,
    mapper: TypeMapper,
    sink: Arc<dyn DiagnosticSink>,
    cancel: CancellationToken,
}

impl Generator {
    pub fn new(options: GenerateOptions) -> Self {
        Self {
            options,
            mapper: TypeMapper::new(),
            sink: Arc::new(NullSink),
            cancel: CancellationToken::new(),
        }
    }

    /// Mapper carrying the caller's override table.
    pub fn with_mapper(self, mapper: TypeMapper) -> Self {
        Self { mapper, ..self }
    }

    pub fn with_sink(self, sink: Arc<dyn DiagnosticSink>) -> Self {
        Self { sink, ..self }
    }

    pub fn with_cancellation(self, cancel: CancellationToken) -> Self {
        Self { cancel, ..self }
    }

    pub fn options(&self) -> &GenerateOptions {
        &self.options
    }

    /// Render every artifact for `ir`, sorted by path.
    ///
    /// A cancelled run returns [`GenerateError::Cancelled`] and no artifacts.
    pub fn generate(&self, ir: &ProjectIr) -> Result<Vec<Artifact>, GenerateError> {
        let enums = ir.types.iter().filter(|t| t.is_enum).map(|t| t.name.clone());
        let declared = ir.types.iter().map(|t| t.name.clone());
        let mapper = self.mapper.clone().with_enums(enums).with_declared(declared);
        let cx = RenderContext::new(ir, &mapper, &self.options);

        let groups = group_endpoints(ir);
        self.report_function_clashes(&cx, &groups);

        let mut units: Vec<Unit<'_>> = ir.types.iter().map(Unit::Type).collect();
        units.extend(groups.into_iter().map(Unit::Group));
        if self.options.features.validation {
            units.extend(ir.validated_type_names().into_iter().map(Unit::Schema));
        }

        let rendered: Vec<Vec<Artifact>> = units
            .par_iter()
            .map(|unit| {
                if self.cancel.is_cancelled() {
                    return Err(GenerateError::Cancelled);
                }
                Ok(self.render_unit(&cx, unit))
            })
            .collect::<Result<_, _>>()?;

        let mut artifacts: Vec<Artifact> = rendered.into_iter().flatten().collect();
        artifacts.push(render_client_runtime(&self.options.base_url));
        artifacts.push(render_result_type());
        let barrels = render_barrels(&artifacts);
        artifacts.extend(barrels);

        if self.cancel.is_cancelled() {
            return Err(GenerateError::Cancelled);
        }
        artifacts.sort_by(|a, b| a.path.cmp(&b.path));
        if let Some(pair) = artifacts.windows(2).find(|w| w[0].path == w[1].path) {
            return Err(GenerateError::PathCollision {
                path: pair[0].path.clone(),
                first: format!("{:?}", pair[0].kind),
                second: format!("{:?}", pair[1].kind),
            });
        }

        tracing::info!(
            "generated {} artifacts ({} endpoints, {} types)",
            artifacts.len(),
            ir.endpoints.len(),
            ir.types.len()
        );
        Ok(artifacts)
    }

    fn render_unit(&self, cx: &RenderContext<'_>, unit: &Unit<'_>) -> Vec<Artifact> {
        match unit {
            Unit::Type(ty) => vec![render_type(cx, ty)],
            Unit::Group(group) => {
                let mut out = vec![render_group(cx, group)];
                if self.options.features.bindings {
                    out.extend(render_hooks(cx, group));
                }
                if self.options.features.server_variants {
                    out.push(render_server(cx, group));
                }
                out
            }
            Unit::Schema(name) => render_schema(cx, name).into_iter().collect(),
        }
    }

    /// `api/index.ts` re-exports every group; the same function name in two
    /// groups makes that barrel ambiguous.
    fn report_function_clashes(&self, cx: &RenderContext<'_>, groups: &[EndpointGroup<'_>]) {
        let mut seen: HashMap<String, &str> = HashMap::new();
        for group in groups {
            for endpoint in &group.endpoints {
                let function = Operation::new(cx, endpoint).function;
                let clash = seen.get(&function).copied().filter(|g| *g != group.name);
                if let Some(other) = clash {
                    self.sink.report(
                        Diagnostic::warning(format!(
                            "function '{}' is generated in groups '{}' and '{}'",
                            function, other, group.name
                        ))
                        .at(format!("{}.{}", endpoint.container, endpoint.operation)),
                    );
                } else {
                    seen.entry(function).or_insert(group.name);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifact::ArtifactKind;
    use crate::options::{Features, Framework};
    use clientgen_ir::{
        Diagnostics, EndpointInfo, HttpVerb, Idiom, ParameterInfo, ParameterSource,
        PropertyInfo, PropertyValidationRules,
    };

    fn endpoint(group: &str, operation: &str) -> EndpointInfo {
        EndpointInfo {
            verb: HttpVerb::Post,
            route: format!("/{}", group.to_lowercase()),
            container: format!("{}Controller", group),
            operation: operation.into(),
            request_type: Some(TypeInfo::reference("CreateUserRequest")),
            response_type: Some(TypeInfo::reference("UserDto")),
            parameters: vec![ParameterInfo {
                name: "request".into(),
                type_info: TypeInfo::reference("CreateUserRequest"),
                is_required: true,
                source: ParameterSource::Body,
            }],
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

    fn ir() -> ProjectIr {
        let email = PropertyInfo {
            name: "Email".into(),
            json_name: "email".into(),
            type_info: TypeInfo::reference("string"),
            is_nullable: false,
            is_required: true,
            annotations: vec![],
            summary: None,
        };
        ProjectIr {
            endpoints: vec![endpoint("Users", "CreateUser")],
            types: vec![
                TypeInfo::definition("CreateUserRequest", None, vec![], vec![email], None),
                TypeInfo::definition("UserDto", None, vec![], vec![], None),
                TypeInfo::definition("Widget", None, vec![], vec![], None),
            ],
            validation: vec![PropertyValidationRules {
                type_name: "CreateUserRequest".into(),
                property: "Email".into(),
                required: true,
                ..Default::default()
            }],
            ..Default::default()
        }
    }

    fn paths(artifacts: &[Artifact]) -> Vec<String> {
        artifacts.iter().map(Artifact::display_path).collect()
    }

    #[test]
    fn test_full_layout() {
        let options = GenerateOptions {
            framework: Framework::React,
            features: Features {
                validation: true,
                bindings: true,
                server_variants: true,
            },
            base_url: "/api".into(),
        };
        let artifacts = Generator::new(options).generate(&ir()).unwrap();
        assert_eq!(
            paths(&artifacts),
            vec![
                "api/index.ts",
                "api/users.ts",
                "client.ts",
                "hooks/index.ts",
                "hooks/users.ts",
                "index.ts",
                "server/index.ts",
                "server/users.ts",
                "types/create-user-request.ts",
                "types/index.ts",
                "types/result.ts",
                "types/user-dto.ts",
                "types/widget.ts",
                "validation/create-user-request.ts",
                "validation/index.ts",
            ]
        );
        let root = artifacts.iter().find(|a| a.display_path() == "index.ts").unwrap();
        assert_eq!(
            root.contents,
            "export * from './api';\nexport * from './client';\nexport * from './hooks';\nexport * from './types';\nexport * from './validation';\nexport * as server from './server';\n"
        );
    }

    #[test]
    fn test_unvalidated_type_gets_no_schema() {
        let artifacts = Generator::new(GenerateOptions::default())
            .generate(&ir())
            .unwrap();
        assert!(!paths(&artifacts).iter().any(|p| p == "validation/widget.ts"));
        let widget = artifacts
            .iter()
            .find(|a| a.display_path() == "types/widget.ts")
            .unwrap();
        assert_eq!(widget.kind, ArtifactKind::Type);
        // vanilla has no query adapter
        assert!(!paths(&artifacts).iter().any(|p| p.starts_with("hooks/")));
    }

    #[test]
    fn test_validation_disabled() {
        let mut options = GenerateOptions::default();
        options.features.validation = false;
        let artifacts = Generator::new(options).generate(&ir()).unwrap();
        assert!(!paths(&artifacts).iter().any(|p| p.starts_with("validation/")));
        let api = artifacts
            .iter()
            .find(|a| a.display_path() == "api/users.ts")
            .unwrap();
        assert!(!api.contents.contains("Schema"));
    }

    #[test]
    fn test_cancelled() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let result = Generator::new(GenerateOptions::default())
            .with_cancellation(cancel)
            .generate(&ir());
        assert!(matches!(result, Err(GenerateError::Cancelled)));
    }

    #[test]
    fn test_path_collision() {
        let mut ir = ir();
        ir.types
            .push(TypeInfo::definition("UserDTO", None, vec![], vec![], None));
        let result = Generator::new(GenerateOptions::default()).generate(&ir);
        assert!(matches!(result, Err(GenerateError::PathCollision { .. })));
    }

    #[test]
    fn test_function_clash_warning() {
        let mut ir = ir();
        ir.endpoints.push(endpoint("Admin", "CreateUser"));
        let sink = Arc::new(Diagnostics::new());
        Generator::new(GenerateOptions::default())
            .with_sink(sink.clone())
            .generate(&ir)
            .unwrap();
        assert_eq!(sink.len(), 1);
    }
}
