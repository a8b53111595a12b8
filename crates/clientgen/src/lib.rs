//! The `clientgen` driver: configuration, source discovery, the extract and
//! generate pipeline, and the artifact writer.
//!
//! The heavy lifting lives in the library crates:
//!
//! - `clientgen-extract` turns C# sources into a [`ProjectIr`]
//! - `clientgen-codegen` renders that IR into TypeScript artifacts
//!
//! [`ProjectIr`]: clientgen_ir::ProjectIr

pub mod config;
pub mod filter;
pub mod pipeline;
pub mod sources;
pub mod writer;

pub use config::{CONFIG_FILE, Config, ConfigError};
pub use filter::{Exclusions, PatternError, glob_to_regex};
pub use pipeline::{Pipeline, PipelineError, RunOutput, RunReport};
pub use sources::discover_sources;
pub use writer::{WriteAction, WriteError, WriteSummary, Writer};
