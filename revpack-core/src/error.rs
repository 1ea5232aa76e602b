//! Error types for revpack-core.

use std::path::PathBuf;

use thiserror::Error;

/// All errors that can arise while loading and validating configuration.
///
/// Every variant is fatal for the whole run: it is raised before any
/// project is synced or built.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Underlying I/O failure, annotated with the offending path.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The configuration file did not exist at the expected path.
    #[error("configuration not found at {path}")]
    NotFound { path: PathBuf },

    /// YAML parse error on load: includes file path and line context from serde_yaml.
    #[error("failed to parse configuration at {path}: {source}")]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// JSON parse error on load.
    #[error("failed to parse configuration at {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// `dirs::home_dir()` returned `None`.
    #[error("cannot determine home directory; set $HOME or equivalent")]
    HomeNotFound,

    /// A required top-level key is absent or empty.
    #[error("missing required key <{key}>")]
    MissingKey { key: &'static str },

    /// A required per-project attribute is absent or empty.
    #[error("missing required project attribute <{field}> for <{project}>")]
    MissingProjectField { project: String, field: &'static str },

    /// A field is present but its value is unusable.
    #[error("invalid value for <{field}>: {reason}")]
    Invalid { field: String, reason: String },

    /// A project name was referenced that is not configured.
    #[error("unknown project <{name}> (configured: {known})")]
    UnknownProject { name: String, known: String },

    /// The workspace directory exists but cannot be written to.
    #[error("workspace <{path}> is not writeable, please check permissions")]
    WorkspaceNotWriteable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Convenience constructor for [`ConfigError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> ConfigError {
    ConfigError::Io {
        path: path.into(),
        source,
    }
}
