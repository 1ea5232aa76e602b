//! Read-only project overview for `revpack list`.

use std::path::PathBuf;

use serde::Serialize;

use revpack_core::{Config, ProjectLayout};

use crate::ledger;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectSummary {
    pub name: String,
    pub remote: String,
    pub branch: String,
    pub local: PathBuf,
    pub version: String,
    /// Newest ledger label; `None` before the first build.
    pub latest_revision: Option<String>,
    pub latest_built_at: Option<String>,
    /// Set when the ledger exists but cannot be read.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ledger_error: Option<String>,
    pub disabled: bool,
    /// Target of the current alias, when one exists.
    pub current: Option<PathBuf>,
}

/// One summary per configured project, in configuration order.
pub fn summarize(config: &Config) -> Vec<ProjectSummary> {
    config
        .projects
        .iter()
        .map(|project| {
            let layout = ProjectLayout::new(config, project);
            let (latest, ledger_error) = match ledger::latest(&layout.ledger) {
                Ok(entry) => (entry, None),
                Err(e) => {
                    tracing::warn!(project = %project.name, "{e}");
                    (None, Some(e.to_string()))
                }
            };
            ProjectSummary {
                name: project.name.0.clone(),
                remote: project.git_remote.clone(),
                branch: project.git_branch.clone(),
                local: layout.root.clone(),
                version: project.version.clone(),
                latest_revision: latest.as_ref().map(|e| e.label.to_string()),
                latest_built_at: latest.map(|e| e.timestamp),
                ledger_error,
                disabled: config.is_disabled(&project.name),
                current: current_target(&layout),
            }
        })
        .collect()
}

fn current_target(layout: &ProjectLayout) -> Option<PathBuf> {
    let alias = layout.current_alias();
    match std::fs::read_link(&alias) {
        Ok(target) => Some(target),
        Err(_) if alias.is_file() => Some(alias),
        Err(_) => None,
    }
}
