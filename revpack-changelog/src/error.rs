//! Error types for revpack-changelog.

use std::path::PathBuf;

use thiserror::Error;

/// All errors that can arise while rendering or writing a changelog entry.
#[derive(Debug, Error)]
pub enum ChangelogError {
    /// Tera template engine error.
    #[error("template engine error: {0}")]
    Tera(#[from] tera::Error),

    /// Filesystem error reading templates or rewriting the changelog.
    #[error("changelog io error at {path}: {source}")]
    Io { path: PathBuf, source: std::io::Error },

    /// The rendered entry does not start with a header line.
    #[error("rendered changelog entry is empty")]
    EmptyEntry,
}

pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> ChangelogError {
    ChangelogError::Io {
        path: path.into(),
        source,
    }
}
