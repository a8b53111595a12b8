//! `clientgen.toml` loading and validation.
//!
//! Example:
//! ```toml
//! output_path = "web/src/api"
//! package_name = "@acme/api"
//! base_url = "https://api.example.com"
//! framework = "react"
//! projects = ["src/Api"]
//! exclude_endpoints = ["/internal/*"]
//! exclude_types = ["*Internal*"]
//!
//! [features]
//! validation = true
//! bindings = true
//! server_variants = false
//!
//! [type_overrides]
//! "NodaTime.Instant" = "string"
//! ```
//!
//! Relative paths resolve against the directory holding the file.

use crate::filter::{Exclusions, PatternError};
use clientgen_codegen::{Features, Framework, GenerateOptions};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = "clientgen.toml";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("missing required setting '{0}'")]
    Missing(&'static str),

    #[error("invalid base_url '{url}': {reason}")]
    BaseUrl { url: String, reason: String },

    #[error(transparent)]
    Pattern(#[from] PatternError),
}

/// The file as written. Every field is optional at this level so missing
/// required settings get a precise error instead of a serde one.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawConfig {
    pub output_path: Option<PathBuf>,
    pub package_name: Option<String>,
    pub base_url: Option<String>,
    pub framework: Framework,
    pub strict: bool,
    pub projects: Vec<PathBuf>,
    pub exclude_endpoints: Vec<String>,
    pub exclude_types: Vec<String>,
    pub features: Features,
    pub type_overrides: BTreeMap<String, String>,
}

/// A validated configuration with paths resolved.
#[derive(Debug, Clone)]
pub struct Config {
    pub output_path: PathBuf,
    pub package_name: String,
    pub projects: Vec<PathBuf>,
    pub strict: bool,
    pub options: GenerateOptions,
    pub exclusions: Exclusions,
    pub type_overrides: BTreeMap<String, String>,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let raw: RawConfig = toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        let base = path.parent().unwrap_or(Path::new("."));
        let config = Self::from_raw(raw, base)?;
        tracing::debug!("loaded {}", path.display());
        Ok(config)
    }

    /// Validate `raw`, resolving relative paths against `base`.
    pub fn from_raw(raw: RawConfig, base: &Path) -> Result<Self, ConfigError> {
        let output_path = raw.output_path.ok_or(ConfigError::Missing("output_path"))?;
        let package_name = raw
            .package_name
            .filter(|n| !n.trim().is_empty())
            .ok_or(ConfigError::Missing("package_name"))?;
        let base_url = raw.base_url.unwrap_or_default();
        check_base_url(&base_url)?;
        let exclusions = Exclusions::new(&raw.exclude_endpoints, &raw.exclude_types)?;

        // No projects listed means the directory holding the config.
        let projects = if raw.projects.is_empty() {
            vec![base.to_path_buf()]
        } else {
            raw.projects.iter().map(|p| base.join(p)).collect()
        };

        Ok(Self {
            output_path: base.join(output_path),
            package_name,
            projects,
            strict: raw.strict,
            options: GenerateOptions {
                framework: raw.framework,
                features: raw.features,
                base_url,
            },
            exclusions,
            type_overrides: raw.type_overrides,
        })
    }
}

/// Empty, a root-relative path, or an absolute http(s) URL.
fn check_base_url(base_url: &str) -> Result<(), ConfigError> {
    if base_url.is_empty() || base_url.starts_with('/') {
        return Ok(());
    }
    let invalid = |reason: String| ConfigError::BaseUrl {
        url: base_url.to_string(),
        reason,
    };
    let parsed = url::Url::parse(base_url).map_err(|e| invalid(e.to_string()))?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        other => Err(invalid(format!("unsupported scheme '{}'", other))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Result<Config, ConfigError> {
        let raw: RawConfig = toml::from_str(text).unwrap();
        Config::from_raw(raw, Path::new("/repo"))
    }

    #[test]
    fn test_full_config() {
        let config = parse(
            r#"
output_path = "web/src/api"
package_name = "@acme/api"
base_url = "https://api.example.com"
framework = "nextjs"
strict = true
projects = ["src/Api"]
exclude_types = ["*Internal*"]

[features]
server_variants = true

[type_overrides]
"NodaTime.Instant" = "string"
"#,
        )
        .unwrap();
        assert_eq!(config.output_path, Path::new("/repo/web/src/api"));
        assert_eq!(config.projects, vec![PathBuf::from("/repo/src/Api")]);
        assert!(config.strict);
        assert_eq!(config.options.framework, Framework::Nextjs);
        assert!(config.options.features.validation);
        assert!(config.options.features.server_variants);
        assert_eq!(config.type_overrides["NodaTime.Instant"], "string");
    }

    #[test]
    fn test_defaults() {
        let config = parse("output_path = \"out\"\npackage_name = \"api\"\n").unwrap();
        assert_eq!(config.options.framework, Framework::Vanilla);
        assert_eq!(config.options.base_url, "");
        assert_eq!(config.projects, vec![PathBuf::from("/repo")]);
        assert!(!config.strict);
    }

    #[test]
    fn test_missing_required() {
        let err = parse("package_name = \"api\"").unwrap_err();
        assert!(matches!(err, ConfigError::Missing("output_path")));
        let err = parse("output_path = \"out\"\npackage_name = \"  \"").unwrap_err();
        assert!(matches!(err, ConfigError::Missing("package_name")));
    }

    #[test]
    fn test_base_url() {
        let ok = "output_path = \"out\"\npackage_name = \"api\"\nbase_url = \"/api\"";
        assert!(parse(ok).is_ok());
        let bad = "output_path = \"out\"\npackage_name = \"api\"\nbase_url = \"not a url\"";
        assert!(matches!(parse(bad), Err(ConfigError::BaseUrl { .. })));
        let ftp = "output_path = \"out\"\npackage_name = \"api\"\nbase_url = \"ftp://x\"";
        assert!(matches!(parse(ftp), Err(ConfigError::BaseUrl { .. })));
    }

    #[test]
    fn test_load_reports_parse_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, "output_path = [").unwrap();
        assert!(matches!(Config::load(&path), Err(ConfigError::Parse { .. })));
        assert!(matches!(
            Config::load(&dir.path().join("missing.toml")),
            Err(ConfigError::Io { .. })
        ));
    }
}
