//! Artifact renderers.
//!
//! Every renderer reads a shared [`RenderContext`] and returns finished
//! [`Artifact`]s; none of them touch the filesystem.

pub mod barrel;
pub mod client;
pub mod hooks;
pub mod runtime;
pub mod schema;
pub mod server;
pub mod types;

use crate::imports::{Imports, referenced_types};
use crate::naming::file_stem;
use crate::options::GenerateOptions;
use clientgen_ir::{EndpointInfo, ProjectIr, TypeInfo};
use clientgen_typemap::TypeMapper;
use std::collections::HashSet;

/// Output subdirectories, in root-index order.
pub const TYPES_DIR: &str = "types";
pub const API_DIR: &str = "api";
pub const VALIDATION_DIR: &str = "validation";
pub const HOOKS_DIR: &str = "hooks";
pub const SERVER_DIR: &str = "server";

/// Module holding the outcome wrapper, relative to `types/`.
pub const RESULT_STEM: &str = "result";

/// Endpoints sharing one group label, in IR order.
#[derive(Debug, Clone)]
pub struct EndpointGroup<'a> {
    pub name: &'a str,
    pub endpoints: Vec<&'a EndpointInfo>,
}

impl EndpointGroup<'_> {
    pub fn stem(&self) -> String {
        file_stem(self.name)
    }
}

/// Group endpoints by label, groups in first-seen order.
pub fn group_endpoints(ir: &ProjectIr) -> Vec<EndpointGroup<'_>> {
    let mut groups: Vec<EndpointGroup<'_>> = Vec::new();
    for endpoint in &ir.endpoints {
        match groups.iter_mut().find(|g| g.name == endpoint.group) {
            Some(group) => group.endpoints.push(endpoint),
            None => groups.push(EndpointGroup {
                name: &endpoint.group,
                endpoints: vec![endpoint],
            }),
        }
    }
    groups
}

/// Everything a renderer needs, shared read-only across workers.
pub struct RenderContext<'a> {
    pub ir: &'a ProjectIr,
    pub mapper: &'a TypeMapper,
    pub options: &'a GenerateOptions,
    declared: HashSet<&'a str>,
}

impl<'a> RenderContext<'a> {
    pub fn new(ir: &'a ProjectIr, mapper: &'a TypeMapper, options: &'a GenerateOptions) -> Self {
        Self {
            ir,
            mapper,
            options,
            declared: ir.types.iter().map(|t| t.name.as_str()).collect(),
        }
    }

    pub fn map(&self, ty: &TypeInfo) -> String {
        self.mapper.map(ty)
    }

    pub fn is_declared(&self, name: &str) -> bool {
        self.declared.contains(name)
    }

    /// Whether a client function validates a request of this type.
    pub fn validates(&self, type_name: &str) -> bool {
        self.options.features.validation && self.ir.has_rules(type_name)
    }

    /// Add type imports for every declared name in `expr`.
    ///
    /// `from_types` selects sibling (`./x`) versus parent (`../types/x`)
    /// specifiers. Names in `skip` (generic parameters) and undeclared names
    /// are left out so no import dangles.
    pub fn import_types(&self, imports: &mut Imports, expr: &str, from_types: bool, skip: &[&str]) {
        for name in referenced_types(expr) {
            if skip.contains(&name.as_str()) {
                continue;
            }
            let stem = if name == "Result" {
                RESULT_STEM.to_string()
            } else if self.is_declared(&name) {
                file_stem(&name)
            } else {
                tracing::debug!("no declaration for '{}', not importing it", name);
                continue;
            };
            let module = if from_types {
                format!("./{}", stem)
            } else {
                format!("../{}/{}", TYPES_DIR, stem)
            };
            imports.add_type(&module, &name);
        }
    }
}

/// Relative path `dir/stem.ts`.
pub fn ts_path(dir: &str, stem: &str) -> std::path::PathBuf {
    std::path::Path::new(dir).join(format!("{}.ts", stem))
}

/// Imports, a blank line, then the body.
pub fn with_imports(imports: &Imports, body: String) -> String {
    if imports.is_empty() {
        return body;
    }
    let mut out = imports.render().join("\n");
    out.push_str("\n\n");
    out.push_str(&body);
    out
}
