//! Repository sync: make `<root>/<name>` a working copy of the configured
//! branch and report what changed.

use std::fmt;
use std::path::Path;

use serde::Serialize;

use revpack_core::{CommandOutput, CommandRunner, CommandSpec, Project, ProjectLayout};

use crate::error::{io_err, BuildError};

/// Outcome of a sync, consumed once by the build driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeState {
    /// No working copy existed; it was cloned.
    Cloned,
    /// New commits were fast-forwarded in.
    Updated,
    /// Local and remote tips were already identical.
    Unchanged,
}

impl ChangeState {
    pub fn needs_build(self) -> bool {
        !matches!(self, ChangeState::Unchanged)
    }
}

impl fmt::Display for ChangeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ChangeState::Cloned => "cloned",
            ChangeState::Updated => "updated",
            ChangeState::Unchanged => "unchanged",
        };
        f.write_str(s)
    }
}

// ---------------------------------------------------------------------------
// git helpers
// ---------------------------------------------------------------------------

struct Git<'a> {
    runner: &'a dyn CommandRunner,
    project: &'a str,
}

impl Git<'_> {
    fn run(&self, spec: CommandSpec) -> Result<CommandOutput, BuildError> {
        let out = self.runner.run(&spec).map_err(|source| BuildError::Spawn {
            command: spec.to_string(),
            source,
        })?;
        if !out.success() {
            return Err(BuildError::Sync {
                project: self.project.to_string(),
                reason: format!("`{spec}` failed: {}", out.failure_reason()),
            });
        }
        Ok(out)
    }

    fn in_repo(&self, repo: &Path, args: &[&str]) -> Result<CommandOutput, BuildError> {
        self.run(CommandSpec::new("git").arg("-C").arg(repo).args(args))
    }

    fn rev_parse(&self, repo: &Path, rev: &str) -> Result<String, BuildError> {
        let out = self.in_repo(repo, &["rev-parse", "--verify", rev])?;
        let parsed = out.stdout.trim().to_string();
        if parsed.is_empty() {
            return Err(BuildError::Sync {
                project: self.project.to_string(),
                reason: format!("git rev-parse '{rev}' returned empty output"),
            });
        }
        Ok(parsed)
    }

    fn ensure_branch(&self, repo: &Path, branch: &str) -> Result<(), BuildError> {
        let out = self.in_repo(repo, &["rev-parse", "--abbrev-ref", "HEAD"])?;
        let current = out.stdout.trim();
        if current != branch {
            tracing::info!(project = self.project, from = current, to = branch, "checking out");
            self.in_repo(repo, &["checkout", branch])?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Clone or update the working copy for `project`.
///
/// A fresh clone is never pulled in the same call. An existing copy whose
/// branch tip matches `origin/<branch>` after fetching is left untouched.
pub fn sync_repository(
    runner: &dyn CommandRunner,
    project: &Project,
    layout: &ProjectLayout,
) -> Result<ChangeState, BuildError> {
    let git = Git {
        runner,
        project: project.name.as_str(),
    };
    let repo = layout.source_dir.as_path();
    let branch = project.git_branch.as_str();

    if !repo.exists() {
        std::fs::create_dir_all(&layout.root).map_err(|e| io_err(&layout.root, e))?;
        tracing::info!(project = %project.name, remote = %project.git_remote, "cloning");
        git.run(
            CommandSpec::new("git")
                .arg("clone")
                .arg(&project.git_remote)
                .arg(repo),
        )?;
        git.ensure_branch(repo, branch)?;
        return Ok(ChangeState::Cloned);
    }

    if !repo.join(".git").exists() {
        return Err(BuildError::Sync {
            project: project.name.0.clone(),
            reason: format!("{} exists but is not a git working copy", repo.display()),
        });
    }

    tracing::debug!(project = %project.name, "fetching");
    git.in_repo(repo, &["fetch", "origin"])?;
    git.ensure_branch(repo, branch)?;

    let local = git.rev_parse(repo, &format!("refs/heads/{branch}"))?;
    let remote = git.rev_parse(repo, &format!("refs/remotes/origin/{branch}"))?;
    if local == remote {
        tracing::info!(project = %project.name, commit = %local, "already up to date");
        return Ok(ChangeState::Unchanged);
    }

    tracing::info!(project = %project.name, from = %local, to = %remote, "pulling");
    git.in_repo(repo, &["pull", "--ff-only", "origin", branch])?;
    Ok(ChangeState::Updated)
}
