//! Install the current artifact of each selected project.

use std::path::PathBuf;

use serde::Serialize;

use revpack_core::{
    config, CommandRunner, CommandSpec, Config, ConfigError, Project, ProjectLayout, ProjectName,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum InstallStatus {
    Installed { artifact: PathBuf },
    /// No current alias yet, or it points nowhere.
    Missing { alias: PathBuf },
    Failed { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstallReport {
    pub project: ProjectName,
    #[serde(flatten)]
    pub status: InstallStatus,
}

impl InstallReport {
    /// Missing artifacts count as failures too.
    pub fn is_failure(&self) -> bool {
        !matches!(self.status, InstallStatus::Installed { .. })
    }
}

/// `selected` reordered so names listed in `install-order` come first, in
/// that order; the rest keep their relative order.
pub fn install_sequence<'a>(config: &Config, selected: Vec<&'a Project>) -> Vec<&'a Project> {
    let mut ordered: Vec<&Project> = Vec::with_capacity(selected.len());
    for name in &config.install_order {
        if let Some(project) = selected.iter().copied().find(|p| &p.name == name) {
            if !ordered.iter().any(|p| p.name == project.name) {
                ordered.push(project);
            }
        }
    }
    for project in selected {
        if !ordered.iter().any(|p| p.name == project.name) {
            ordered.push(project);
        }
    }
    ordered
}

/// Run the configured installer on each selected project's current alias.
///
/// Selection errors are returned before anything is installed; installer
/// failures are recorded per project.
pub fn run_install(
    config: &Config,
    runner: &dyn CommandRunner,
    selection: &[String],
) -> Result<Vec<InstallReport>, ConfigError> {
    let selected = config::resolve_selection(config, selection)?;
    let mut reports = Vec::new();
    for project in install_sequence(config, selected) {
        let status = install_one(config, runner, project);
        if let InstallStatus::Failed { reason } = &status {
            tracing::error!(project = %project.name, "install failed: {reason}");
        }
        reports.push(InstallReport {
            project: project.name.clone(),
            status,
        });
    }
    Ok(reports)
}

fn install_one(config: &Config, runner: &dyn CommandRunner, project: &Project) -> InstallStatus {
    let alias = ProjectLayout::new(config, project).current_alias();
    // `exists` follows the link, so a dangling alias counts as missing.
    if !alias.exists() {
        tracing::warn!(project = %project.name, alias = %alias.display(), "no current artifact");
        return InstallStatus::Missing { alias };
    }

    let Some(spec) = CommandSpec::from_argv(&config.installer) else {
        return InstallStatus::Failed {
            reason: "no installer command configured".to_string(),
        };
    };
    let spec = spec.arg(&alias);
    tracing::info!(project = %project.name, command = %spec, "installing");
    match runner.run(&spec) {
        Ok(out) if out.success() => InstallStatus::Installed { artifact: alias },
        Ok(out) => InstallStatus::Failed {
            reason: out.failure_reason(),
        },
        Err(e) => InstallStatus::Failed {
            reason: format!("failed to run `{spec}`: {e}"),
        },
    }
}
