//! Structured diagnostics collected alongside the IR.
//!
//! Per-unit failures never abort a run. They are reported to a
//! [`DiagnosticSink`] and the caller decides afterwards whether the run failed.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Info => write!(f, "info"),
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

/// One reported problem, with enough context to find its origin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub declaration: Option<String>,
}

impl Diagnostic {
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
            file: None,
            declaration: None,
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(Severity::Info, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(Severity::Error, message)
    }

    /// Attach the source file the diagnostic came from.
    pub fn in_file(self, file: impl AsRef<Path>) -> Self {
        Self {
            file: Some(file.as_ref().to_path_buf()),
            ..self
        }
    }

    /// Attach the declaration (type, method, validator) the diagnostic refers to.
    pub fn at(self, declaration: impl Into<String>) -> Self {
        Self {
            declaration: Some(declaration.into()),
            ..self
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: ", self.severity)?;
        if let Some(file) = &self.file {
            write!(f, "{}: ", file.display())?;
        }
        if let Some(decl) = &self.declaration {
            write!(f, "{}: ", decl)?;
        }
        write!(f, "{}", self.message)
    }
}

/// Receiver for diagnostics.
///
/// Library code reports through this trait instead of printing, so callers
/// can collect, forward to logging, or drop diagnostics.
pub trait DiagnosticSink: Send + Sync {
    fn report(&self, diagnostic: Diagnostic);
}

/// Collecting sink, safe to share across worker threads.
#[derive(Debug, Default)]
pub struct Diagnostics {
    entries: Mutex<Vec<Diagnostic>>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of everything reported so far.
    pub fn snapshot(&self) -> Vec<Diagnostic> {
        self.entries
            .lock()
            .map(|entries| entries.clone())
            .unwrap_or_default()
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.entries.into_inner().unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl DiagnosticSink for Diagnostics {
    fn report(&self, diagnostic: Diagnostic) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.push(diagnostic);
        }
    }
}

/// Forwards diagnostics to `tracing` at the matching level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn report(&self, diagnostic: Diagnostic) {
        match diagnostic.severity {
            Severity::Info => tracing::debug!("{}", diagnostic),
            Severity::Warning => tracing::warn!("{}", diagnostic),
            Severity::Error => tracing::error!("{}", diagnostic),
        }
    }
}

/// Discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl DiagnosticSink for NullSink {
    fn report(&self, _diagnostic: Diagnostic) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collects_in_order() {
        let sink = Diagnostics::new();
        sink.report(Diagnostic::warning("first").in_file("a.cs"));
        sink.report(Diagnostic::info("second").at("UsersController"));
        let all = sink.into_vec();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].message, "first");
        assert_eq!(all[0].file.as_deref(), Some(Path::new("a.cs")));
        assert_eq!(all[1].declaration.as_deref(), Some("UsersController"));
    }

    #[test]
    fn test_display() {
        let d = Diagnostic::warning("no verb marker")
            .in_file("Api/Users.cs")
            .at("GetUser");
        assert_eq!(
            d.to_string(),
            "warning: Api/Users.cs: GetUser: no verb marker"
        );
    }
}
