//! Per-project extraction: parallel per-file passes, then one deterministic
//! assembly step.

use crate::error::ExtractError;
use crate::registration::handler_names;
use crate::strategy::{DeclarationSite, EndpointStrategy, default_strategies, has_export_marker};
use crate::syntax::{SourceFile, parse_source};
use crate::types::discover_types;
use crate::validators::{annotation_rules, validator_rules};
use clientgen_ir::{
    Diagnostic, DiagnosticSink, EndpointInfo, ParameterInfo, ProjectIr, PropertyInfo, TracingSink,
    TypeInfo, ValidationRule,
};
use clientgen_validation::fold_rules;
use rayon::prelude::*;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Everything one source file contributes.
#[derive(Debug, Clone, Default)]
pub struct FileExtraction {
    pub path: PathBuf,
    pub endpoints: Vec<EndpointInfo>,
    pub types: Vec<TypeInfo>,
    pub unlisted: Vec<TypeInfo>,
    /// Validator-class rules, unfolded.
    pub rules: Vec<ValidationRule>,
}

pub struct Extractor {
    strategies: Vec<Box<dyn EndpointStrategy>>,
    sink: Arc<dyn DiagnosticSink>,
    cancel: CancellationToken,
}

impl Default for Extractor {
    fn default() -> Self {
        Self::new()
    }
}

impl Extractor {
    pub fn new() -> Self {
        Self {
            strategies: default_strategies(),
            sink: Arc::new(TracingSink),
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_sink(self, sink: Arc<dyn DiagnosticSink>) -> Self {
        Self { sink, ..self }
    }

    pub fn with_cancellation(self, cancel: CancellationToken) -> Self {
        Self { cancel, ..self }
    }

    pub fn with_strategies(self, strategies: Vec<Box<dyn EndpointStrategy>>) -> Self {
        Self { strategies, ..self }
    }

    /// Read and extract a set of files.
    ///
    /// Unreadable or unparseable files are reported and skipped.
    pub fn extract_project(&self, files: &[PathBuf]) -> Result<ProjectIr, ExtractError> {
        let sources: Vec<(PathBuf, String)> = files
            .par_iter()
            .filter_map(|path| match std::fs::read_to_string(path) {
                Ok(source) => Some((path.clone(), source)),
                Err(source) => {
                    let err = ExtractError::Io {
                        path: path.clone(),
                        source,
                    };
                    self.sink
                        .report(Diagnostic::warning(err.to_string()).in_file(path));
                    None
                }
            })
            .collect();
        self.extract_sources(&sources)
    }

    /// Extract already-loaded sources, one rayon task per file.
    pub fn extract_sources(&self, sources: &[(PathBuf, String)]) -> Result<ProjectIr, ExtractError> {
        let files: Vec<Option<FileExtraction>> = sources
            .par_iter()
            .map(|(path, source)| {
                if self.cancel.is_cancelled() {
                    return Err(ExtractError::Cancelled);
                }
                match self.extract_file_source(path, source) {
                    Ok(extraction) => Ok(Some(extraction)),
                    Err(err @ ExtractError::Grammar(_)) => Err(err),
                    Err(err) => {
                        self.sink
                            .report(Diagnostic::warning(err.to_string()).in_file(path));
                        Ok(None)
                    }
                }
            })
            .collect::<Result<_, _>>()?;
        if self.cancel.is_cancelled() {
            return Err(ExtractError::Cancelled);
        }
        Ok(self.assemble(files.into_iter().flatten().collect()))
    }

    pub fn extract_file_source(
        &self,
        path: &Path,
        source: &str,
    ) -> Result<FileExtraction, ExtractError> {
        let file = parse_source(Some(path), source)?;
        for unresolved in &file.unresolved_values {
            self.sink.report(
                Diagnostic::warning(format!(
                    "enum value `{}` is not a constant expression, assuming {}",
                    unresolved.expression, unresolved.assumed
                ))
                .in_file(path)
                .at(format!("{}.{}", unresolved.enum_name, unresolved.member)),
            );
        }
        let discovered = discover_types(&file);
        let extraction = FileExtraction {
            path: path.to_path_buf(),
            endpoints: self.extract_declarations(&file),
            types: discovered.included,
            unlisted: discovered.unlisted,
            rules: validator_rules(&file),
        };
        tracing::debug!(
            "{}: {} endpoints, {} types, {} rules",
            path.display(),
            extraction.endpoints.len(),
            extraction.types.len(),
            extraction.rules.len()
        );
        Ok(extraction)
    }

    /// Offer every method to the strategies in order; the first that
    /// recognizes a site extracts it.
    pub fn extract_declarations(&self, file: &SourceFile) -> Vec<EndpointInfo> {
        let handlers: HashSet<String> = file.containers.iter().flat_map(handler_names).collect();
        let mut endpoints = Vec::new();
        for container in &file.containers {
            for method in &container.methods {
                let site = DeclarationSite::new(file, container, method);
                match self.strategies.iter().find(|s| s.recognizes(&site)) {
                    Some(strategy) => {
                        let found = strategy.extract(&site, self.sink.as_ref());
                        tracing::trace!(
                            strategy = strategy.name(),
                            site = %site.qualified_name(),
                            count = found.len()
                        );
                        endpoints.extend(found);
                    }
                    None if has_export_marker(&method.attributes)
                        && !handlers.contains(&method.name) =>
                    {
                        let mut d = Diagnostic::warning(
                            "exported method has no verb marker or registration call, skipping",
                        )
                        .at(site.qualified_name());
                        if let Some(path) = &file.path {
                            d = d.in_file(path);
                        }
                        self.sink.report(d);
                    }
                    None => {}
                }
            }
        }
        endpoints
    }

    /// Merge per-file results into one IR.
    ///
    /// Files are merged in path order so output does not depend on scheduling.
    /// After merging, enum references are flagged, unlisted types reachable
    /// from the contract are pulled in, and rules are folded per property.
    pub fn assemble(&self, mut files: Vec<FileExtraction>) -> ProjectIr {
        files.sort_by(|a, b| a.path.cmp(&b.path));
        let mut validator_rules_all = Vec::new();
        let parts: Vec<ProjectIr> = files
            .into_iter()
            .map(|f| {
                validator_rules_all.extend(f.rules);
                ProjectIr {
                    endpoints: f.endpoints,
                    types: f.types,
                    unlisted_types: f.unlisted,
                    ..Default::default()
                }
            })
            .collect();
        let merged = ProjectIr::merge(parts, self.sink.as_ref());

        let enums: HashSet<String> = merged
            .types
            .iter()
            .filter(|t| t.is_enum)
            .map(|t| t.name.clone())
            .collect();
        let endpoints: Vec<EndpointInfo> = merged
            .endpoints
            .into_iter()
            .map(|e| resolve_endpoint(e, &enums))
            .collect();
        let validated: Vec<&str> = validator_rules_all
            .iter()
            .map(|r| r.type_name.as_str())
            .collect();
        let (types, unlisted_types) =
            close_references(&endpoints, merged.types, merged.unlisted_types, &validated);
        let types: Vec<TypeInfo> = types
            .into_iter()
            .map(|t| resolve_definition(t, &enums))
            .collect();

        let rules = validator_rules_all
            .into_iter()
            .chain(annotation_rules(&types));
        let (validation, extra_rules) = fold_rules(rules);

        tracing::info!(
            "assembled {} endpoints, {} types, {} validated properties",
            endpoints.len(),
            types.len(),
            validation.len()
        );
        ProjectIr {
            endpoints,
            types,
            validation,
            extra_rules,
            unlisted_types,
        }
    }
}

/// Flag references to declared enums, recursively through generic arguments.
fn resolve_enums(ty: TypeInfo, enums: &HashSet<String>) -> TypeInfo {
    let resolved = TypeInfo {
        generic_args: ty
            .generic_args
            .into_iter()
            .map(|a| resolve_enums(a, enums))
            .collect(),
        ..ty
    };
    if !resolved.is_enum && resolved.generic_args.is_empty() && enums.contains(&resolved.name) {
        resolved.as_enum()
    } else {
        resolved
    }
}

fn resolve_endpoint(endpoint: EndpointInfo, enums: &HashSet<String>) -> EndpointInfo {
    EndpointInfo {
        request_type: endpoint.request_type.map(|t| resolve_enums(t, enums)),
        response_type: endpoint.response_type.map(|t| resolve_enums(t, enums)),
        parameters: endpoint
            .parameters
            .into_iter()
            .map(|p| ParameterInfo {
                type_info: resolve_enums(p.type_info, enums),
                ..p
            })
            .collect(),
        ..endpoint
    }
}

fn resolve_definition(ty: TypeInfo, enums: &HashSet<String>) -> TypeInfo {
    if ty.is_enum {
        return ty;
    }
    TypeInfo {
        properties: ty
            .properties
            .into_iter()
            .map(|p| PropertyInfo {
                type_info: resolve_enums(p.type_info, enums),
                ..p
            })
            .collect(),
        ..ty
    }
}

fn referenced_names<'a>(ty: &'a TypeInfo, out: &mut Vec<&'a str>) {
    out.push(&ty.name);
    for arg in &ty.generic_args {
        referenced_names(arg, out);
    }
}

/// Move unlisted types reachable from endpoints, included types or
/// validators into the rendered set, transitively.
fn close_references(
    endpoints: &[EndpointInfo],
    mut types: Vec<TypeInfo>,
    unlisted: Vec<TypeInfo>,
    validated: &[&str],
) -> (Vec<TypeInfo>, Vec<TypeInfo>) {
    let mut pending: HashMap<String, TypeInfo> =
        unlisted.into_iter().map(|t| (t.name.clone(), t)).collect();
    let mut queue: Vec<String> = Vec::new();
    {
        let mut roots: Vec<&str> = validated.to_vec();
        for e in endpoints {
            for ty in e
                .request_type
                .iter()
                .chain(&e.response_type)
                .chain(e.parameters.iter().map(|p| &p.type_info))
            {
                referenced_names(ty, &mut roots);
            }
        }
        for t in &types {
            for p in &t.properties {
                referenced_names(&p.type_info, &mut roots);
            }
        }
        queue.extend(roots.into_iter().map(str::to_string));
    }

    while let Some(name) = queue.pop() {
        let Some(ty) = pending.remove(&name) else {
            continue;
        };
        let mut next = Vec::new();
        for p in &ty.properties {
            referenced_names(&p.type_info, &mut next);
        }
        queue.extend(next.into_iter().map(str::to_string));
        tracing::debug!("pulling in referenced type {}", ty.name);
        types.push(ty);
    }

    let mut rest: Vec<TypeInfo> = pending.into_values().collect();
    rest.sort_by(|a, b| a.name.cmp(&b.name));
    (types, rest)
}
