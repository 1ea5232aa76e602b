//! Configuration loading and validation.
//!
//! # Storage layout
//!
//! ```text
//! ~/.revpack/
//!   config.yaml     (default location; `.json` files are parsed as JSON)
//! ```
//!
//! # API pattern
//!
//! Every function that needs the home directory has two forms:
//! - `fn_at(home: &Path, …)`: explicit home; used in tests with `TempDir`
//! - `fn(…)`: derives home from `dirs::home_dir()`, delegates to `_at`
//!
//! Tests must NEVER call the no-arg wrappers; always use `_at`.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Component, Path, PathBuf};

use serde::Deserialize;

use crate::error::{io_err, ConfigError};
use crate::types::{Config, Project, ProjectName};

/// Environment variable overriding the configuration location.
pub const CONFIG_ENV: &str = "REVPACK_CONFIG";

pub const DEFAULT_DISTRIBUTION: &str = "trusty";
pub const DEFAULT_PACKAGE_EXT: &str = "deb";
pub const DEFAULT_PACKAGER: &[&str] = &["debuild", "-uc", "-us"];
pub const DEFAULT_INSTALLER: &[&str] = &["dpkg", "-i"];

// ---------------------------------------------------------------------------
// 1. On-disk shape
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct ConfigFile {
    workspace: Option<String>,
    distribution: Option<String>,
    package_ext: Option<String>,
    maintainer: Option<String>,
    packager: Option<Vec<String>>,
    installer: Option<Vec<String>>,
    #[serde(default)]
    install_order: Vec<String>,
    #[serde(default)]
    disabled: Vec<String>,
    #[serde(default)]
    projects: BTreeMap<String, ProjectFile>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct ProjectFile {
    git_remote: Option<String>,
    git_branch: Option<String>,
    git_local: Option<PathBuf>,
    version: Option<String>,
}

// ---------------------------------------------------------------------------
// 2. Path helpers
// ---------------------------------------------------------------------------

/// `<home>/.revpack/config.yaml`: pure, no I/O.
pub fn default_path_at(home: &Path) -> PathBuf {
    home.join(".revpack").join("config.yaml")
}

/// Pick the configuration file: explicit path, then `$REVPACK_CONFIG`, then
/// the default under `home`.
pub fn resolve_path_at(home: &Path, explicit: Option<&Path>) -> PathBuf {
    if let Some(path) = explicit {
        return path.to_path_buf();
    }
    match std::env::var_os(CONFIG_ENV) {
        Some(value) if !value.is_empty() => PathBuf::from(value),
        _ => default_path_at(home),
    }
}

/// Expand the configured workspace: `~` and `~/x` resolve under `home`,
/// other relative paths are taken relative to `home`, absolute paths are kept.
pub fn expand_workspace(home: &Path, raw: &str) -> PathBuf {
    if raw == "~" {
        return home.to_path_buf();
    }
    if let Some(rest) = raw.strip_prefix("~/") {
        return home.join(rest);
    }
    let path = Path::new(raw);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        home.join(path)
    }
}

// ---------------------------------------------------------------------------
// 3. Load
// ---------------------------------------------------------------------------

/// Load and validate the configuration at `path`.
///
/// Returns `ConfigError::NotFound` if absent, `ConfigError::Yaml` /
/// `ConfigError::Json` (with path context) if malformed, and one of the
/// validation variants if a required value is missing or unusable.
pub fn load_at(home: &Path, path: &Path) -> Result<Config, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::NotFound {
            path: path.to_path_buf(),
        });
    }
    let contents = std::fs::read_to_string(path).map_err(|e| io_err(path, e))?;
    let raw = parse(path, &contents)?;
    let config = validate(home, raw)?;
    tracing::debug!(
        path = %path.display(),
        projects = config.projects.len(),
        "loaded configuration"
    );
    Ok(config)
}

/// `load_at` convenience wrapper.
pub fn load(path: Option<&Path>) -> Result<Config, ConfigError> {
    let home = home()?;
    let path = resolve_path_at(&home, path);
    load_at(&home, &path)
}

fn parse(path: &Path, contents: &str) -> Result<ConfigFile, ConfigError> {
    let is_json = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    if is_json {
        serde_json::from_str(contents).map_err(|source| ConfigError::Json {
            path: path.to_path_buf(),
            source,
        })
    } else {
        serde_yaml::from_str(contents).map_err(|source| ConfigError::Yaml {
            path: path.to_path_buf(),
            source,
        })
    }
}

// ---------------------------------------------------------------------------
// 4. Validation
// ---------------------------------------------------------------------------

fn validate(home: &Path, raw: ConfigFile) -> Result<Config, ConfigError> {
    let workspace = non_empty(raw.workspace).ok_or(ConfigError::MissingKey { key: "workspace" })?;
    if raw.projects.is_empty() {
        return Err(ConfigError::MissingKey { key: "projects" });
    }

    let mut projects = Vec::with_capacity(raw.projects.len());
    for (name, attrs) in raw.projects {
        projects.push(validate_project(name, attrs)?);
    }

    let known: BTreeSet<ProjectName> = projects.iter().map(|p| p.name.clone()).collect();
    let disabled = raw
        .disabled
        .into_iter()
        .map(|name| known_name(&known, name))
        .collect::<Result<BTreeSet<_>, _>>()?;
    let install_order = if raw.install_order.is_empty() {
        projects.iter().map(|p| p.name.clone()).collect()
    } else {
        raw.install_order
            .into_iter()
            .map(|name| known_name(&known, name))
            .collect::<Result<Vec<_>, _>>()?
    };

    let package_ext = non_empty(raw.package_ext).unwrap_or_else(|| DEFAULT_PACKAGE_EXT.to_string());
    if package_ext.contains(['/', '.']) {
        return Err(ConfigError::Invalid {
            field: "package-ext".to_string(),
            reason: format!("'{package_ext}' must be a bare extension such as 'deb'"),
        });
    }

    Ok(Config {
        workspace: expand_workspace(home, &workspace),
        distribution: non_empty(raw.distribution)
            .unwrap_or_else(|| DEFAULT_DISTRIBUTION.to_string()),
        package_ext,
        maintainer: non_empty(raw.maintainer).unwrap_or_else(default_maintainer),
        packager: argv("packager", raw.packager, DEFAULT_PACKAGER)?,
        installer: argv("installer", raw.installer, DEFAULT_INSTALLER)?,
        install_order,
        disabled,
        projects,
    })
}

fn validate_project(name: String, attrs: ProjectFile) -> Result<Project, ConfigError> {
    if !is_valid_package_name(&name) {
        return Err(ConfigError::Invalid {
            field: "projects".to_string(),
            reason: format!(
                "'{name}' is not a valid package name (lowercase letters, digits, '+', '-', '.')"
            ),
        });
    }
    let required = |value: Option<String>, field: &'static str| {
        non_empty(value).ok_or_else(|| ConfigError::MissingProjectField {
            project: name.clone(),
            field,
        })
    };
    let git_remote = required(attrs.git_remote, "git-remote")?;
    let git_branch = required(attrs.git_branch, "git-branch")?;
    let version = required(attrs.version, "version")?;
    if version.chars().any(char::is_whitespace) {
        return Err(ConfigError::Invalid {
            field: format!("projects.{name}.version"),
            reason: format!("'{version}' contains whitespace"),
        });
    }

    let git_local = attrs
        .git_local
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from("src").join(&name));
    let escapes = git_local
        .components()
        .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
    if escapes {
        return Err(ConfigError::Invalid {
            field: format!("projects.{name}.git-local"),
            reason: format!(
                "'{}' must be a relative path inside the workspace",
                git_local.display()
            ),
        });
    }

    Ok(Project {
        name: ProjectName::from(name),
        git_remote,
        git_branch,
        git_local,
        version,
    })
}

fn known_name(known: &BTreeSet<ProjectName>, name: String) -> Result<ProjectName, ConfigError> {
    let name = ProjectName::from(name);
    if known.contains(&name) {
        Ok(name)
    } else {
        Err(unknown_project(known.iter(), &name.0))
    }
}

fn argv(
    field: &str,
    value: Option<Vec<String>>,
    default: &[&str],
) -> Result<Vec<String>, ConfigError> {
    match value {
        None => Ok(default.iter().map(|s| s.to_string()).collect()),
        Some(args) if args.first().is_some_and(|program| !program.trim().is_empty()) => Ok(args),
        Some(_) => Err(ConfigError::Invalid {
            field: field.to_string(),
            reason: "command must name a program".to_string(),
        }),
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Debian source package names: `[a-z0-9][a-z0-9+.-]+`.
pub fn is_valid_package_name(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    name.len() >= 2
        && (first.is_ascii_lowercase() || first.is_ascii_digit())
        && chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '+' | '-' | '.'))
}

/// `Developer <$USER@$HOSTNAME>` with local fallbacks.
pub fn default_maintainer() -> String {
    let user = std::env::var("USER")
        .or_else(|_| std::env::var("LOGNAME"))
        .ok();
    let host = std::env::var("HOSTNAME").ok().or_else(|| {
        std::fs::read_to_string("/etc/hostname")
            .ok()
            .map(|s| s.trim().to_string())
    });
    maintainer_from(user, host)
}

fn maintainer_from(user: Option<String>, host: Option<String>) -> String {
    let user = non_empty(user).unwrap_or_else(|| "developer".to_string());
    let host = non_empty(host).unwrap_or_else(|| "localhost".to_string());
    format!("Developer <{user}@{host}>")
}

// ---------------------------------------------------------------------------
// 5. Selection
// ---------------------------------------------------------------------------

/// Resolve the projects a command operates on.
///
/// An empty selection means every enabled project. Otherwise names are
/// returned in the order given (duplicates dropped); disabled projects may
/// be named explicitly. Any unknown name fails the whole selection, and so
/// does a non-empty list made only of blank names.
pub fn resolve_selection<'a>(
    config: &'a Config,
    names: &[String],
) -> Result<Vec<&'a Project>, ConfigError> {
    if names.is_empty() {
        return Ok(config.enabled_projects().collect());
    }

    let mut selected: Vec<&Project> = Vec::with_capacity(names.len());
    for name in names.iter().map(|n| n.trim()).filter(|n| !n.is_empty()) {
        let project = config
            .project(name)
            .ok_or_else(|| unknown_project(config.projects.iter().map(|p| &p.name), name))?;
        if !selected.iter().any(|p| p.name == project.name) {
            selected.push(project);
        }
    }
    if selected.is_empty() {
        return Err(ConfigError::Invalid {
            field: "projects".to_string(),
            reason: "no project names given".to_string(),
        });
    }
    Ok(selected)
}

fn unknown_project<'a>(known: impl Iterator<Item = &'a ProjectName>, name: &str) -> ConfigError {
    let known: Vec<&str> = known.map(|n| n.as_str()).collect();
    ConfigError::UnknownProject {
        name: name.to_string(),
        known: known.join(", "),
    }
}

// ---------------------------------------------------------------------------
// 6. Workspace
// ---------------------------------------------------------------------------

/// Create the workspace directory if needed and make sure it is writeable.
pub fn prepare_workspace(config: &Config) -> Result<(), ConfigError> {
    let dir = &config.workspace;
    std::fs::create_dir_all(dir).map_err(|e| io_err(dir, e))?;
    let probe = dir.join(".revpack.probe");
    std::fs::write(&probe, b"").map_err(|source| ConfigError::WorkspaceNotWriteable {
        path: dir.clone(),
        source,
    })?;
    std::fs::remove_file(&probe).map_err(|e| io_err(&probe, e))?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Private helpers
// ---------------------------------------------------------------------------

fn home() -> Result<PathBuf, ConfigError> {
    dirs::home_dir().ok_or(ConfigError::HomeNotFound)
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
