//! Intermediate representation for backend-to-client translation.
//!
//! `clientgen-ir` holds the records produced by declaration extraction and
//! consumed by code generation, plus the small string utilities both sides
//! must agree on.
//!
//! # Architecture
//!
//! ```text
//! C# sources            IR                   TypeScript artifacts
//! ──────────     ─────────────────     ─────────────────────────────
//! controllers ─┐  EndpointInfo     ┌─> types/*.ts      (interfaces, enums)
//! minimal API ─┼─> TypeInfo ───────┼─> api/*.ts        (client functions)
//! validators  ─┘  PropertyValidation└─> validation/*.ts (zod schemas)
//! ```
//!
//! Records are built once and never mutated in place. Steps that refine a
//! record (metadata overlay, enum resolution) consume it and return a new one.

pub mod chain;
pub mod diagnostics;
pub mod endpoint;
pub mod literal;
pub mod project;
pub mod route;
pub mod typestr;
pub mod types;
pub mod validation;

pub use chain::ChainCall;
pub use diagnostics::{Diagnostic, DiagnosticSink, Diagnostics, NullSink, Severity, TracingSink};
pub use endpoint::{EndpointInfo, HttpVerb, Idiom, ParameterInfo, ParameterSource};
pub use project::ProjectIr;
pub use route::{RouteParam, join_routes, route_parameters};
pub use types::{Annotation, AnnotationArg, EnumMember, PropertyInfo, TypeInfo};
pub use validation::{PropertyValidationRules, RuleKind, ValidationRule};
