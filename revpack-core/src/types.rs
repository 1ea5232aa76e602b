//! Domain types shared by every revpack crate.
//!
//! All path fields use `PathBuf`; never `&str` or `String` for filesystem paths.
//! These are the validated, immutable forms; the on-disk shapes live in
//! [`crate::config`].

use std::collections::BTreeSet;
use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// A strongly-typed project name. Doubles as the Debian source package name.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ProjectName(pub String);

impl ProjectName {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProjectName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for ProjectName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ProjectName {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

// ---------------------------------------------------------------------------
// Domain structs
// ---------------------------------------------------------------------------

/// One buildable project, immutable for the duration of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Project {
    pub name: ProjectName,
    /// Remote repository URL handed to `git clone`.
    pub git_remote: String,
    /// Branch tracked on the remote.
    pub git_branch: String,
    /// Project root relative to the workspace; the working copy lives in
    /// `<git_local>/<name>`.
    pub git_local: PathBuf,
    /// Upstream version, e.g. `0.1.1`.
    pub version: String,
}

/// Fully validated configuration. Constructed once by
/// [`crate::config::load`] and passed by reference everywhere.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Absolute workspace root.
    pub workspace: PathBuf,
    pub distribution: String,
    pub package_ext: String,
    pub maintainer: String,
    /// Packager argv, run inside the source tree.
    pub packager: Vec<String>,
    /// Installer argv; the artifact path is appended.
    pub installer: Vec<String>,
    pub install_order: Vec<ProjectName>,
    pub disabled: BTreeSet<ProjectName>,
    /// Sorted by name.
    pub projects: Vec<Project>,
}

impl Config {
    /// Look up a configured project by name.
    pub fn project(&self, name: &str) -> Option<&Project> {
        self.projects.iter().find(|p| p.name.0 == name)
    }

    /// Projects not listed under `disabled`.
    pub fn enabled_projects(&self) -> impl Iterator<Item = &Project> {
        self.projects
            .iter()
            .filter(move |p| !self.disabled.contains(&p.name))
    }

    pub fn is_disabled(&self, name: &ProjectName) -> bool {
        self.disabled.contains(name)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn project(name: &str) -> Project {
        Project {
            name: ProjectName::from(name),
            git_remote: format!("https://example.org/{name}.git"),
            git_branch: "master".to_string(),
            git_local: PathBuf::from("src").join(name),
            version: "1.0".to_string(),
        }
    }

    #[test]
    fn newtype_display() {
        assert_eq!(ProjectName::from("foo").to_string(), "foo");
        assert_eq!(ProjectName::from(String::from("bar")).as_str(), "bar");
    }

    #[test]
    fn enabled_projects_excludes_disabled() {
        let config = Config {
            workspace: PathBuf::from("/ws"),
            distribution: "trusty".to_string(),
            package_ext: "deb".to_string(),
            maintainer: "Developer <dev@localhost>".to_string(),
            packager: vec!["debuild".to_string()],
            installer: vec!["dpkg".to_string(), "-i".to_string()],
            install_order: vec![],
            disabled: BTreeSet::from([ProjectName::from("bar")]),
            projects: vec![project("bar"), project("foo")],
        };
        let enabled: Vec<&str> = config.enabled_projects().map(|p| p.name.as_str()).collect();
        assert_eq!(enabled, vec!["foo"]);
        assert!(config.is_disabled(&ProjectName::from("bar")));
        assert!(config.project("bar").is_some());
        assert!(config.project("baz").is_none());
    }
}
