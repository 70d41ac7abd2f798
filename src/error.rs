use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("target directory does not exist: {0}")]
    NotFound(PathBuf),

    #[error("target path is not a directory: {0}")]
    NotADirectory(PathBuf),

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid scan pattern: {0}")]
    Pattern(#[from] globset::Error),
}

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("not a git repository: {0}")]
    NotARepository(PathBuf),

    #[error("repository has no commits yet")]
    UnbornHead,

    #[error("git error: {0}")]
    Git(#[from] git2::Error),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{name} must be a non-negative integer, got {value:?}")]
    InvalidNumber { name: &'static str, value: String },

    #[error("{name} must be at most {max}, got {value}")]
    OutOfRange { name: &'static str, value: u32, max: u32 },
}
