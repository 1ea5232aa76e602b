//! Build orchestrator shared by `revpack build` and the tests.

use std::path::PathBuf;

use serde::Serialize;

use revpack_core::{config, ConfigError, Project, ProjectLayout, ProjectName};

use crate::driver::{build_project, BuildOutcome, BuildServices};
use crate::error::BuildError;
use crate::repo::{sync_repository, ChangeState};

/// Final state of one project in a build run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ProjectStatus {
    Skipped,
    Succeeded { revision: String, artifact: PathBuf },
    Failed { reason: String },
}

impl ProjectStatus {
    pub fn is_failure(&self) -> bool {
        matches!(self, ProjectStatus::Failed { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectReport {
    pub project: ProjectName,
    /// `None` when sync itself failed.
    pub change: Option<ChangeState>,
    #[serde(flatten)]
    pub status: ProjectStatus,
}

/// Per-project results in processing order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BuildReport {
    pub projects: Vec<ProjectReport>,
}

impl BuildReport {
    pub fn has_failures(&self) -> bool {
        self.projects.iter().any(|p| p.status.is_failure())
    }

    pub fn failed(&self) -> usize {
        self.projects.iter().filter(|p| p.status.is_failure()).count()
    }

    pub fn succeeded(&self) -> usize {
        self.projects
            .iter()
            .filter(|p| matches!(p.status, ProjectStatus::Succeeded { .. }))
            .count()
    }

    pub fn skipped(&self) -> usize {
        self.projects
            .iter()
            .filter(|p| matches!(p.status, ProjectStatus::Skipped))
            .count()
    }
}

/// Sync and build every selected project, one after another.
///
/// An empty `selection` means every enabled project. Unknown names and an
/// unusable workspace are reported before any project is touched; after
/// that, failures are recorded per project and never stop the run.
pub fn run_build(
    services: &BuildServices<'_>,
    selection: &[String],
) -> Result<BuildReport, ConfigError> {
    let projects = config::resolve_selection(services.config, selection)?;
    config::prepare_workspace(services.config)?;

    let mut report = BuildReport::default();
    for project in projects {
        log_banner(services, project);
        let (change, result) = sync_and_build(services, project);
        let status = match result {
            Ok(BuildOutcome::Skipped) => ProjectStatus::Skipped,
            Ok(BuildOutcome::Built { revision, artifact }) => ProjectStatus::Succeeded {
                revision: revision.to_string(),
                artifact,
            },
            Err(e) => {
                tracing::error!(project = %project.name, stage = ?e.stage(), "{e}");
                ProjectStatus::Failed {
                    reason: e.to_string(),
                }
            }
        };
        report.projects.push(ProjectReport {
            project: project.name.clone(),
            change,
            status,
        });
    }
    Ok(report)
}

fn sync_and_build(
    services: &BuildServices<'_>,
    project: &Project,
) -> (Option<ChangeState>, Result<BuildOutcome, BuildError>) {
    let layout = ProjectLayout::new(services.config, project);
    let change = match sync_repository(services.runner, project, &layout) {
        Ok(change) => change,
        Err(e) => return (None, Err(e)),
    };
    (Some(change), build_project(services, project, change))
}

fn log_banner(services: &BuildServices<'_>, project: &Project) {
    let layout = ProjectLayout::new(services.config, project);
    tracing::info!("--------------------------------------------------");
    tracing::info!("project:  {}", project.name);
    tracing::info!("remote:   {}", project.git_remote);
    tracing::info!("branch:   {}", project.git_branch);
    tracing::info!("local:    {}", layout.root.display());
    tracing::info!("version:  {}", project.version);
    tracing::info!("--------------------------------------------------");
}
