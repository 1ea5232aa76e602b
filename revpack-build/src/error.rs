//! Error types for revpack-build.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use revpack_changelog::ChangelogError;
use revpack_core::ConfigError;

/// Stages of a single project build, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuildStage {
    Preflight,
    Tarball,
    Changelog,
    Patch,
    Compile,
    Publish,
}

impl fmt::Display for BuildStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BuildStage::Preflight => "preflight",
            BuildStage::Tarball => "tarball",
            BuildStage::Changelog => "changelog",
            BuildStage::Patch => "patch",
            BuildStage::Compile => "compile",
            BuildStage::Publish => "publish",
        };
        f.write_str(s)
    }
}

/// All errors that can arise while syncing, building or installing one project.
#[derive(Debug, Error)]
pub enum BuildError {
    /// Clone, fetch, checkout or pull failed.
    #[error("sync failed for {project}: {reason}")]
    Sync { project: String, reason: String },

    /// The revision ledger cannot be parsed; it is never reset automatically.
    #[error("revision ledger {path} is corrupt at line {line}: {reason}")]
    LedgerCorrupt {
        path: PathBuf,
        line: usize,
        reason: String,
    },

    /// A non-base revision needs the tarball produced by the base build.
    #[error("original tarball {path} is missing; rebuild from the base revision")]
    MissingTarball { path: PathBuf },

    /// An external packaging step exited non-zero.
    #[error("{stage} failed: {reason}")]
    Packaging { stage: BuildStage, reason: String },

    /// Moving the artifact or replacing the current alias failed.
    #[error("publish failed at {path}: {reason}")]
    Publish { path: PathBuf, reason: String },

    /// A child process could not be started at all.
    #[error("failed to run `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("changelog error: {0}")]
    Changelog(#[from] ChangelogError),

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// An I/O error, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl BuildError {
    /// The stage this error is attributed to, when it belongs to one.
    pub fn stage(&self) -> Option<BuildStage> {
        match self {
            BuildError::LedgerCorrupt { .. } => Some(BuildStage::Preflight),
            BuildError::MissingTarball { .. } => Some(BuildStage::Tarball),
            BuildError::Changelog(_) => Some(BuildStage::Changelog),
            BuildError::Packaging { stage, .. } => Some(*stage),
            BuildError::Publish { .. } => Some(BuildStage::Publish),
            _ => None,
        }
    }
}

/// Convenience constructor for [`BuildError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> BuildError {
    BuildError::Io {
        path: path.into(),
        source,
    }
}
