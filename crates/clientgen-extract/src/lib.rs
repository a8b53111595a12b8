//! C# declaration extraction.
//!
//! Source files are parsed with tree-sitter and lowered into a small
//! declaration model ([`SourceFile`]). Endpoints are recognized by a fixed
//! list of [`EndpointStrategy`] implementations, one per declaration idiom:
//!
//! - method-attached verb markers on controller methods (`[HttpGet("{id}")]`)
//! - fluent registrations in route-builder extension methods (`app.MapGet(...)`)
//!
//! Wire-contract types and validation rules are discovered alongside, and
//! [`Extractor`] merges the per-file results into one [`ProjectIr`].
//!
//! A file that fails to parse contributes nothing; the failure is reported to
//! the extractor's [`DiagnosticSink`] and the remaining files continue.
//!
//! [`ProjectIr`]: clientgen_ir::ProjectIr
//! [`DiagnosticSink`]: clientgen_ir::DiagnosticSink

mod binding;
mod error;
mod method_attached;
mod overlay;
mod project;
mod registration;
mod response;
mod strategy;
mod syntax;
mod types;
mod validators;

pub use binding::{BoundParameters, bind_parameters, route_only_parameters};
pub use error::ExtractError;
pub use method_attached::MethodAttached;
pub use overlay::overlay;
pub use project::{Extractor, FileExtraction};
pub use registration::{BUILDER_RECEIVERS, FluentRegistration, synthesize_operation};
pub use response::{ResponseSources, resolve_response};
pub use strategy::{
    DeclarationSite, EXPORT_MARKER, EndpointStrategy, default_strategies, group_name,
    operation_name,
};
pub use syntax::{
    BodyInfo, CallChain, ContainerDecl, ContainerKind, MethodDecl, ParamDecl, PropertyDecl, SourceFile,
    UnresolvedValue, parse_source,
};
pub use types::{CONTRACT_SUFFIXES, DiscoveredTypes, discover_types, is_contract_name};
pub use validators::{annotation_rules, validator_rules};
