//! Source file discovery.

use clientgen_ir::{Diagnostic, DiagnosticSink};
use ignore::WalkBuilder;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// Build output directories never scanned.
const SKIPPED_DIRS: &[&str] = &["bin", "obj"];

/// Every `.cs` file under `roots`, sorted and deduplicated.
///
/// Hidden directories, build output and gitignored paths are skipped. A root
/// that does not exist is reported and contributes nothing.
pub fn discover_sources(roots: &[PathBuf], sink: &dyn DiagnosticSink) -> Vec<PathBuf> {
    let mut found = BTreeSet::new();
    for root in roots {
        if !root.exists() {
            sink.report(Diagnostic::warning("project root does not exist").in_file(root));
            continue;
        }
        let walker = WalkBuilder::new(root)
            .hidden(true)
            .git_ignore(true)
            .filter_entry(|entry| !is_skipped_dir(entry.path()))
            .build();
        for entry in walker {
            match entry {
                Ok(entry) => {
                    let path = entry.path();
                    if path.is_file() && path.extension().is_some_and(|e| e == "cs") {
                        found.insert(path.to_path_buf());
                    }
                }
                Err(err) => tracing::warn!("walking {}: {}", root.display(), err),
            }
        }
    }
    tracing::debug!("discovered {} source files", found.len());
    found.into_iter().collect()
}

fn is_skipped_dir(path: &Path) -> bool {
    path.is_dir()
        && path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| SKIPPED_DIRS.contains(&n))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clientgen_ir::Diagnostics;
    use std::fs;

    #[test]
    fn test_discovery_skips_build_output() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        for path in [
            "Api/UsersController.cs",
            "Api/Models/UserDto.cs",
            "Api/bin/Debug/Generated.cs",
            "Api/obj/AssemblyInfo.cs",
            "Api/.vs/Cache.cs",
            "Api/README.md",
        ] {
            let path = root.join(path);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(&path, "").unwrap();
        }

        let sink = Diagnostics::new();
        let files = discover_sources(&[root.join("Api"), root.join("Missing")], &sink);
        let names: Vec<&str> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap())
            .collect();
        assert_eq!(names, vec!["UserDto.cs", "UsersController.cs"]);
        assert_eq!(sink.len(), 1);
    }
}
