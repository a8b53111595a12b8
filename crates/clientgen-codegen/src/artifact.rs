//! Rendered output files.

use serde::Serialize;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    Type,
    Enum,
    Client,
    Binding,
    Schema,
    Server,
    Barrel,
    Runtime,
}

/// One generated file, path relative to the output root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Artifact {
    pub kind: ArtifactKind,
    pub path: PathBuf,
    pub contents: String,
}

impl Artifact {
    pub fn new(kind: ArtifactKind, path: impl Into<PathBuf>, contents: String) -> Self {
        Self {
            kind,
            path: path.into(),
            contents,
        }
    }

    /// Path with `/` separators, for import specifiers and logs.
    pub fn display_path(&self) -> String {
        self.path
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/")
    }
}
