//! Writing artifacts under the output directory.
//!
//! The writer only runs after generation has fully succeeded, so a failed or
//! cancelled run never leaves a half-written package. A write error mid-way
//! is not rolled back.

use clientgen_codegen::Artifact;
use clientgen_codegen::output::{API_DIR, HOOKS_DIR, SERVER_DIR, TYPES_DIR, VALIDATION_DIR};
use std::path::{Path, PathBuf};

/// Everything the generator owns in the output directory. `clean` removes
/// these and nothing else.
const OWNED_DIRS: &[&str] = &[TYPES_DIR, API_DIR, VALIDATION_DIR, HOOKS_DIR, SERVER_DIR];
const OWNED_FILES: &[&str] = &["client.ts", "index.ts"];

#[derive(Debug, thiserror::Error)]
pub enum WriteError {
    #[error("failed to create {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to remove {path}: {source}")]
    Remove {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteAction {
    Created,
    Updated,
    Unchanged,
}

#[derive(Debug, Default)]
pub struct WriteSummary {
    /// Output-relative paths with what happened (or would happen) to each.
    pub files: Vec<(PathBuf, WriteAction)>,
    pub removed: Vec<PathBuf>,
}

impl WriteSummary {
    pub fn count(&self, action: WriteAction) -> usize {
        self.files.iter().filter(|(_, a)| *a == action).count()
    }
}

pub struct Writer {
    root: PathBuf,
    dry_run: bool,
    clean: bool,
}

impl Writer {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            dry_run: false,
            clean: false,
        }
    }

    /// Report what would change without touching the filesystem.
    pub fn dry_run(self, dry_run: bool) -> Self {
        Self { dry_run, ..self }
    }

    /// Remove previously generated output first.
    pub fn clean(self, clean: bool) -> Self {
        Self { clean, ..self }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn write(&self, artifacts: &[Artifact]) -> Result<WriteSummary, WriteError> {
        let mut summary = WriteSummary::default();
        if self.clean {
            summary.removed = self.remove_owned()?;
        }
        for artifact in artifacts {
            let path = self.root.join(&artifact.path);
            let action = if summary.removed.is_empty() {
                match std::fs::read_to_string(&path) {
                    Ok(existing) if existing == artifact.contents => WriteAction::Unchanged,
                    Ok(_) => WriteAction::Updated,
                    Err(_) => WriteAction::Created,
                }
            } else {
                WriteAction::Created
            };
            if action != WriteAction::Unchanged && !self.dry_run {
                write_file(&path, &artifact.contents)?;
            }
            summary.files.push((artifact.path.clone(), action));
        }
        tracing::info!(
            "{}{} created, {} updated, {} unchanged in {}",
            if self.dry_run { "[dry run] " } else { "" },
            summary.count(WriteAction::Created),
            summary.count(WriteAction::Updated),
            summary.count(WriteAction::Unchanged),
            self.root.display()
        );
        Ok(summary)
    }

    fn remove_owned(&self) -> Result<Vec<PathBuf>, WriteError> {
        let mut removed = Vec::new();
        for name in OWNED_DIRS.iter().chain(OWNED_FILES) {
            let path = self.root.join(name);
            if !path.exists() {
                continue;
            }
            if !self.dry_run {
                let result = if path.is_dir() {
                    std::fs::remove_dir_all(&path)
                } else {
                    std::fs::remove_file(&path)
                };
                result.map_err(|source| WriteError::Remove {
                    path: path.clone(),
                    source,
                })?;
            }
            removed.push(PathBuf::from(name));
        }
        Ok(removed)
    }
}

fn write_file(path: &Path, contents: &str) -> Result<(), WriteError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|source| WriteError::CreateDir {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    std::fs::write(path, contents).map_err(|source| WriteError::Write {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use clientgen_codegen::ArtifactKind;
    use std::fs;

    fn artifact(path: &str, contents: &str) -> Artifact {
        Artifact::new(ArtifactKind::Type, path, contents.to_string())
    }

    #[test]
    fn test_write_then_rewrite() {
        let dir = tempfile::tempdir().unwrap();
        let writer = Writer::new(dir.path());
        let first = writer
            .write(&[artifact("types/a.ts", "a"), artifact("index.ts", "i")])
            .unwrap();
        assert_eq!(first.count(WriteAction::Created), 2);
        assert_eq!(fs::read_to_string(dir.path().join("types/a.ts")).unwrap(), "a");

        let second = writer
            .write(&[artifact("types/a.ts", "a2"), artifact("index.ts", "i")])
            .unwrap();
        assert_eq!(second.count(WriteAction::Updated), 1);
        assert_eq!(second.count(WriteAction::Unchanged), 1);
    }

    #[test]
    fn test_dry_run_touches_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let summary = Writer::new(dir.path())
            .dry_run(true)
            .write(&[artifact("api/users.ts", "x")])
            .unwrap();
        assert_eq!(summary.count(WriteAction::Created), 1);
        assert!(!dir.path().join("api").exists());
    }

    #[test]
    fn test_clean_removes_only_owned_paths() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("hooks")).unwrap();
        fs::write(dir.path().join("hooks/stale.ts"), "").unwrap();
        fs::write(dir.path().join("package.json"), "{}").unwrap();

        let summary = Writer::new(dir.path())
            .clean(true)
            .write(&[artifact("types/a.ts", "a")])
            .unwrap();
        assert_eq!(summary.removed, vec![PathBuf::from("hooks")]);
        assert!(!dir.path().join("hooks").exists());
        assert!(dir.path().join("package.json").exists());
        assert!(dir.path().join("types/a.ts").exists());
    }
}
