//! Re-export index files.

use super::{API_DIR, HOOKS_DIR, SERVER_DIR, TYPES_DIR, VALIDATION_DIR};
use crate::artifact::{Artifact, ArtifactKind};
use std::collections::BTreeMap;
use std::path::Path;

/// One `index.ts` per populated subdirectory, plus the root index.
///
/// Entries are alphabetical. Server variants share names with the client
/// functions, so the root index exposes them under a `server` namespace.
pub fn render_barrels(artifacts: &[Artifact]) -> Vec<Artifact> {
    let mut dirs: BTreeMap<&str, Vec<String>> = BTreeMap::new();
    let mut has_client = false;
    for artifact in artifacts {
        let parts: Vec<String> = artifact
            .path
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect();
        match parts.as_slice() {
            [file] if file == "client.ts" => has_client = true,
            [dir, file] => {
                let Some(stem) = file.strip_suffix(".ts").filter(|s| *s != "index") else {
                    continue;
                };
                let dir = match dir.as_str() {
                    TYPES_DIR => TYPES_DIR,
                    API_DIR => API_DIR,
                    VALIDATION_DIR => VALIDATION_DIR,
                    HOOKS_DIR => HOOKS_DIR,
                    SERVER_DIR => SERVER_DIR,
                    _ => continue,
                };
                dirs.entry(dir).or_default().push(stem.to_string());
            }
            _ => {}
        }
    }

    let mut out = Vec::new();
    let mut root = Vec::new();
    if has_client {
        root.push("export * from './client';".to_string());
    }
    for (dir, mut stems) in dirs {
        stems.sort();
        stems.dedup();
        let contents: String = stems
            .iter()
            .map(|s| format!("export * from './{}';\n", s))
            .collect();
        out.push(Artifact::new(
            ArtifactKind::Barrel,
            Path::new(dir).join("index.ts"),
            contents,
        ));
        if dir == SERVER_DIR {
            continue;
        }
        root.push(format!("export * from './{}';", dir));
    }
    root.sort();
    if out.iter().any(|a| a.path.starts_with(SERVER_DIR)) {
        root.push(format!("export * as server from './{}';", SERVER_DIR));
    }
    if !root.is_empty() {
        out.push(Artifact::new(
            ArtifactKind::Barrel,
            "index.ts",
            root.join("\n") + "\n",
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(path: &str) -> Artifact {
        Artifact::new(ArtifactKind::Type, path, String::new())
    }

    #[test]
    fn test_barrels() {
        let barrels = render_barrels(&[
            file("types/user-dto.ts"),
            file("types/address.ts"),
            file("types/result.ts"),
            file("api/users.ts"),
            file("server/users.ts"),
            file("client.ts"),
        ]);
        let paths: Vec<String> = barrels.iter().map(Artifact::display_path).collect();
        assert_eq!(
            paths,
            vec!["api/index.ts", "server/index.ts", "types/index.ts", "index.ts"]
        );
        assert_eq!(
            barrels[2].contents,
            "export * from './address';\nexport * from './result';\nexport * from './user-dto';\n"
        );
        assert_eq!(
            barrels[3].contents,
            "export * from './api';\nexport * from './client';\nexport * from './types';\nexport * as server from './server';\n"
        );
    }
}
