//! Package build driver: the per-project state machine.
//!
//! ```text
//! PREFLIGHT ──unchanged──▶ SKIP
//!     │
//!     ▼
//! TARBALL ─▶ CHANGELOG ─▶ PATCH ─▶ COMPILE ─▶ PUBLISH
//! ```
//!
//! Any stage may fail; the error carries the stage and the orchestrator
//! records it against the project.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use revpack_changelog::{prepend_entry, ChangelogEntry, ChangelogRenderer};
use revpack_core::{CommandRunner, CommandSpec, Config, Project, ProjectLayout};

use crate::error::{io_err, BuildError, BuildStage};
use crate::ledger::{self, RevisionLabel};
use crate::patch::generate_patch;
use crate::repo::ChangeState;
use crate::tarball::create_orig_tarball;

// ---------------------------------------------------------------------------
// Services
// ---------------------------------------------------------------------------

/// Source of the operator's free-text changelog comment.
pub trait ChangelogPrompt {
    /// `None` or blank means no addendum beyond the standard line.
    fn comment(&self, project: &Project, revision: &RevisionLabel) -> Option<String>;
}

/// Unattended mode: never asks.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPrompt;

impl ChangelogPrompt for NoPrompt {
    fn comment(&self, _project: &Project, _revision: &RevisionLabel) -> Option<String> {
        None
    }
}

pub type Clock = fn() -> DateTime<Utc>;

/// Everything a build needs besides the project itself.
pub struct BuildServices<'a> {
    pub config: &'a Config,
    pub runner: &'a dyn CommandRunner,
    pub renderer: &'a ChangelogRenderer,
    pub prompt: &'a dyn ChangelogPrompt,
    pub clock: Clock,
}

impl<'a> BuildServices<'a> {
    /// Unattended services stamped with the wall clock.
    pub fn new(
        config: &'a Config,
        runner: &'a dyn CommandRunner,
        renderer: &'a ChangelogRenderer,
    ) -> Self {
        BuildServices {
            config,
            runner,
            renderer,
            prompt: &NoPrompt,
            clock: Utc::now,
        }
    }

    pub fn with_prompt(mut self, prompt: &'a dyn ChangelogPrompt) -> Self {
        self.prompt = prompt;
        self
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }
}

// ---------------------------------------------------------------------------
// Outcome
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildOutcome {
    /// Sync reported no change; nothing was touched.
    Skipped,
    /// A new artifact was published at `artifact`.
    Built {
        revision: RevisionLabel,
        artifact: PathBuf,
    },
}

// ---------------------------------------------------------------------------
// Driver
// ---------------------------------------------------------------------------

/// Run the build state machine for one project.
pub fn build_project(
    services: &BuildServices<'_>,
    project: &Project,
    change: ChangeState,
) -> Result<BuildOutcome, BuildError> {
    let config = services.config;

    // PREFLIGHT
    if !change.needs_build() {
        tracing::info!(project = %project.name, "no upstream changes, skipping build");
        return Ok(BuildOutcome::Skipped);
    }
    let layout = ProjectLayout::new(config, project);
    let now = (services.clock)();
    let revision = ledger::next_revision(&layout.ledger, now)?;
    tracing::info!(project = %project.name, revision = %revision, change = %change, "building");

    // TARBALL
    if revision.is_base() {
        stage(project, &revision, BuildStage::Tarball);
        create_orig_tarball(&layout.source_dir, project.name.as_str(), &layout.tarball)?;
    } else if !layout.tarball.exists() {
        return Err(BuildError::MissingTarball {
            path: layout.tarball.clone(),
        });
    }

    // CHANGELOG
    stage(project, &revision, BuildStage::Changelog);
    let comment = services.prompt.comment(project, &revision);
    let revision_str = revision.to_string();
    let entry =
        ChangelogEntry::for_project(config, project, &revision_str, comment.as_deref(), now);
    prepend_entry(&layout.changelog, services.renderer, &entry)?;

    // PATCH
    stage(project, &revision, BuildStage::Patch);
    if let Some(patch) = generate_patch(services.runner, &layout.source_dir, &revision)? {
        tracing::debug!(project = %project.name, patch = %patch.display(), "patch recorded");
    }

    // COMPILE
    stage(project, &revision, BuildStage::Compile);
    compile(services.runner, config, &layout.source_dir)?;

    // PUBLISH
    stage(project, &revision, BuildStage::Publish);
    let artifact = publish(&layout, &revision_str)?;
    tracing::info!(
        project = %project.name,
        revision = %revision,
        artifact = %artifact.display(),
        "published"
    );

    Ok(BuildOutcome::Built { revision, artifact })
}

fn stage(project: &Project, revision: &RevisionLabel, stage: BuildStage) {
    tracing::debug!(project = %project.name, revision = %revision, stage = %stage, "stage");
}

fn compile(runner: &dyn CommandRunner, config: &Config, source_dir: &Path) -> Result<(), BuildError> {
    let spec = CommandSpec::from_argv(&config.packager)
        .ok_or_else(|| BuildError::Packaging {
            stage: BuildStage::Compile,
            reason: "no packager command configured".to_string(),
        })?
        .current_dir(source_dir);
    let out = runner.run(&spec).map_err(|source| BuildError::Spawn {
        command: spec.to_string(),
        source,
    })?;
    if !out.success() {
        return Err(BuildError::Packaging {
            stage: BuildStage::Compile,
            reason: out.failure_reason(),
        });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Publish
// ---------------------------------------------------------------------------

fn publish_err(path: &Path, reason: impl Into<String>) -> BuildError {
    BuildError::Publish {
        path: path.to_path_buf(),
        reason: reason.into(),
    }
}

/// Move the packager output into `build/<version>-<revision>/` and point
/// the project's current alias at it.
pub fn publish(layout: &ProjectLayout, revision: &str) -> Result<PathBuf, BuildError> {
    let produced = layout.packager_output(revision);
    if !produced.is_file() {
        return Err(publish_err(&produced, "packager produced no artifact"));
    }

    let build_dir = layout.build_dir(revision);
    std::fs::create_dir_all(&build_dir).map_err(|e| publish_err(&build_dir, e.to_string()))?;
    let dest = layout.published_artifact(revision);
    move_file(&produced, &dest)?;

    let alias = layout.current_alias();
    if let Some(dir) = alias.parent() {
        std::fs::create_dir_all(dir).map_err(|e| publish_err(dir, e.to_string()))?;
    }
    if std::fs::symlink_metadata(&alias).is_ok() {
        std::fs::remove_file(&alias).map_err(|e| publish_err(&alias, e.to_string()))?;
    }
    link_current(&dest, &alias)?;
    Ok(dest)
}

fn move_file(from: &Path, to: &Path) -> Result<(), BuildError> {
    if std::fs::rename(from, to).is_ok() {
        return Ok(());
    }
    // Cross-device: copy then remove.
    std::fs::copy(from, to).map_err(|e| publish_err(to, e.to_string()))?;
    std::fs::remove_file(from).map_err(|e| io_err(from, e))?;
    Ok(())
}

#[cfg(unix)]
fn link_current(target: &Path, alias: &Path) -> Result<(), BuildError> {
    std::os::unix::fs::symlink(target, alias).map_err(|e| publish_err(alias, e.to_string()))
}

#[cfg(not(unix))]
fn link_current(target: &Path, alias: &Path) -> Result<(), BuildError> {
    std::fs::copy(target, alias)
        .map(|_| ())
        .map_err(|e| publish_err(alias, e.to_string()))
}
