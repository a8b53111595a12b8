use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    #[error("generation cancelled")]
    Cancelled,

    #[error("two artifacts render to {path}: {first} and {second}")]
    PathCollision {
        path: PathBuf,
        first: String,
        second: String,
    },
}
