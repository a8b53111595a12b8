//! End-to-end runs: discover, extract, filter, generate.

use crate::config::Config;
use crate::sources::discover_sources;
use clientgen_codegen::{Artifact, GenerateError, Generator};
use clientgen_extract::{ExtractError, Extractor};
use clientgen_ir::{Diagnostic, DiagnosticSink, Diagnostics, ProjectIr, Severity};
use clientgen_typemap::TypeMapper;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error(transparent)]
    Extract(#[from] ExtractError),

    #[error(transparent)]
    Generate(#[from] GenerateError),
}

/// Diagnostics from one run and the policy that judges them.
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    pub diagnostics: Vec<Diagnostic>,
    /// Treat warnings as errors.
    pub strict: bool,
}

impl RunReport {
    pub fn count(&self, severity: Severity) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == severity)
            .count()
    }

    pub fn errors(&self) -> usize {
        self.count(Severity::Error)
    }

    pub fn warnings(&self) -> usize {
        self.count(Severity::Warning)
    }

    pub fn is_failure(&self) -> bool {
        self.errors() > 0 || (self.strict && self.warnings() > 0)
    }

    /// Forward every diagnostic to `tracing`.
    pub fn log(&self) {
        for diagnostic in &self.diagnostics {
            match diagnostic.severity {
                Severity::Error => tracing::error!("{}", diagnostic),
                Severity::Warning => tracing::warn!("{}", diagnostic),
                Severity::Info => tracing::info!("{}", diagnostic),
            }
        }
    }
}

/// What a successful run produced.
#[derive(Debug)]
pub struct RunOutput {
    pub ir: ProjectIr,
    pub artifacts: Vec<Artifact>,
    pub report: RunReport,
}

pub struct Pipeline {
    config: Config,
    cancel: CancellationToken,
}

impl Pipeline {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_cancellation(self, cancel: CancellationToken) -> Self {
        Self { cancel, ..self }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Extract and filter the IR without generating anything.
    pub fn extract(&self) -> Result<(ProjectIr, RunReport), PipelineError> {
        let sink = Arc::new(Diagnostics::new());
        let ir = self.extract_into(sink.clone())?;
        Ok((ir, self.report(&sink)))
    }

    pub fn run(&self) -> Result<RunOutput, PipelineError> {
        let sink = Arc::new(Diagnostics::new());
        let ir = self.extract_into(sink.clone())?;

        let mapper = TypeMapper::new()
            .with_overrides(self.config.type_overrides.clone())
            .with_sink(sink.clone());
        let artifacts = Generator::new(self.config.options.clone())
            .with_mapper(mapper)
            .with_sink(sink.clone())
            .with_cancellation(self.cancel.clone())
            .generate(&ir)?;

        Ok(RunOutput {
            ir,
            artifacts,
            report: self.report(&sink),
        })
    }

    fn extract_into(&self, sink: Arc<Diagnostics>) -> Result<ProjectIr, PipelineError> {
        let files = discover_sources(&self.config.projects, sink.as_ref());
        if files.is_empty() {
            sink.report(Diagnostic::warning("no C# sources found under the configured projects"));
        }
        let ir = Extractor::new()
            .with_sink(sink)
            .with_cancellation(self.cancel.clone())
            .extract_project(&files)?;
        Ok(self.config.exclusions.apply(&ir))
    }

    fn report(&self, sink: &Diagnostics) -> RunReport {
        RunReport {
            diagnostics: sink.snapshot(),
            strict: self.config.strict,
        }
    }
}
