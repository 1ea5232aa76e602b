//! Workspace path layout.
//!
//! ```text
//! <workspace>/
//!   <git-local>/                         project root
//!     revisions.txt                      revision ledger
//!     <name>_<version>.orig.tar.gz       pristine source tarball
//!     <name>_<version>-<rev>_all.<ext>   packager output (transient)
//!     <name>/                            git working copy
//!       debian/changelog
//!       debian/patches/patch_<rev>
//!   build/
//!     <version>-<rev>/<name>_<version>-<rev>_all.<ext>
//!     current/<name>_current_all.<ext>   symlink to the latest artifact
//!   templates/changelog.tera             optional override
//! ```
//!
//! Everything here is pure path arithmetic; nothing touches the disk.

use std::path::{Path, PathBuf};

use crate::types::{Config, Project};

pub const LEDGER_FILE: &str = "revisions.txt";
pub const BUILD_DIR: &str = "build";
pub const CURRENT_DIR: &str = "current";
pub const TEMPLATES_DIR: &str = "templates";

/// Resolved paths for one project inside the workspace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectLayout {
    workspace: PathBuf,
    name: String,
    version: String,
    package_ext: String,
    /// `<workspace>/<git-local>`
    pub root: PathBuf,
    /// `<root>/<name>`: the git working copy and packaging source tree.
    pub source_dir: PathBuf,
    /// `<root>/revisions.txt`
    pub ledger: PathBuf,
    /// `<source_dir>/debian/changelog`
    pub changelog: PathBuf,
    /// `<root>/<name>_<version>.orig.tar.gz`
    pub tarball: PathBuf,
}

impl ProjectLayout {
    pub fn new(config: &Config, project: &Project) -> Self {
        let root = config.workspace.join(&project.git_local);
        let source_dir = root.join(project.name.as_str());
        Self {
            workspace: config.workspace.clone(),
            name: project.name.0.clone(),
            version: project.version.clone(),
            package_ext: config.package_ext.clone(),
            ledger: root.join(LEDGER_FILE),
            changelog: source_dir.join("debian").join("changelog"),
            tarball: root.join(format!("{}_{}.orig.tar.gz", project.name, project.version)),
            source_dir,
            root,
        }
    }

    /// `<source_dir>/debian/patches`
    pub fn patches_dir(&self) -> PathBuf {
        self.source_dir.join("debian").join("patches")
    }

    /// `<name>_<version>-<revision>_all.<ext>`
    pub fn artifact_name(&self, revision: &str) -> String {
        format!(
            "{}_{}-{}_all.{}",
            self.name, self.version, revision, self.package_ext
        )
    }

    /// Where the packager drops its output: next to the source tree.
    pub fn packager_output(&self, revision: &str) -> PathBuf {
        self.root.join(self.artifact_name(revision))
    }

    /// `<workspace>/build/<version>-<revision>`
    pub fn build_dir(&self, revision: &str) -> PathBuf {
        build_root(&self.workspace).join(format!("{}-{}", self.version, revision))
    }

    /// `<workspace>/build/<version>-<revision>/<artifact>`
    pub fn published_artifact(&self, revision: &str) -> PathBuf {
        self.build_dir(revision).join(self.artifact_name(revision))
    }

    /// `<workspace>/build/current/<name>_current_all.<ext>`
    pub fn current_alias(&self) -> PathBuf {
        current_dir(&self.workspace).join(format!("{}_current_all.{}", self.name, self.package_ext))
    }
}

/// `<workspace>/build`
pub fn build_root(workspace: &Path) -> PathBuf {
    workspace.join(BUILD_DIR)
}

/// `<workspace>/build/current`
pub fn current_dir(workspace: &Path) -> PathBuf {
    build_root(workspace).join(CURRENT_DIR)
}

/// `<workspace>/templates`
pub fn templates_dir(workspace: &Path) -> PathBuf {
    workspace.join(TEMPLATES_DIR)
}
