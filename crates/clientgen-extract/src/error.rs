use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error("tree-sitter init: {0}")]
    Grammar(String),

    #[error("{path}: syntax error at line {line}")]
    Syntax { path: PathBuf, line: usize },

    #[error("{path}: parser produced no tree")]
    NoTree { path: PathBuf },

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("extraction cancelled")]
    Cancelled,
}
