//! TypeScript client generation.
//!
//! [`Generator`] renders a [`ProjectIr`] into a set of [`Artifact`]s laid out
//! as a package:
//!
//! ```text
//! client.ts            fetch wrapper and runtime configuration
//! types/*.ts           one interface or enum per contract type
//! api/*.ts             one module of client functions per endpoint group
//! validation/*.ts      zod schemas for validated request types
//! hooks/*.ts           query-library bindings (framework dependent)
//! server/*.ts          server-only variants (optional)
//! index.ts             barrels
//! ```
//!
//! Rendering is pure; writing artifacts to disk is the caller's job.
//!
//! [`ProjectIr`]: clientgen_ir::ProjectIr

mod artifact;
mod emitter;
mod error;
mod generator;
mod imports;
pub mod naming;
mod options;
pub mod output;

pub use artifact::{Artifact, ArtifactKind};
pub use emitter::Emitter;
pub use error::GenerateError;
pub use generator::Generator;
pub use imports::{Imports, referenced_types};
pub use options::{Features, Framework, GenerateOptions};
