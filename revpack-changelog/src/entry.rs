//! Changelog entry data passed to the template.

use chrono::{DateTime, Utc};
use serde::Serialize;

use revpack_core::{Config, Project};

use crate::error::ChangelogError;

/// Timestamp format shared by changelog trailers and the revision ledger.
pub const DEBIAN_TIMESTAMP: &str = "%a, %d %b %Y %H:%M:%S +0000";

/// Urgency written into every header line.
pub const DEFAULT_URGENCY: &str = "low";

/// `Mon, 06 Jan 2025 14:03:11 +0000`
pub fn debian_timestamp(at: DateTime<Utc>) -> String {
    at.format(DEBIAN_TIMESTAMP).to_string()
}

/// Everything one changelog entry needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChangelogEntry {
    pub package: String,
    pub version: String,
    pub revision: String,
    pub distribution: String,
    pub urgency: String,
    /// Operator comment, one bullet per line; empty in unattended mode.
    pub comment: Vec<String>,
    pub maintainer: String,
    pub timestamp: String,
}

impl ChangelogEntry {
    /// Build an entry for `project` at `revision` using configured defaults.
    pub fn for_project(
        config: &Config,
        project: &Project,
        revision: &str,
        comment: Option<&str>,
        at: DateTime<Utc>,
    ) -> Self {
        ChangelogEntry {
            package: project.name.0.clone(),
            version: project.version.clone(),
            revision: revision.to_string(),
            distribution: config.distribution.clone(),
            urgency: DEFAULT_URGENCY.to_string(),
            comment: comment.map(comment_lines).unwrap_or_default(),
            maintainer: config.maintainer.clone(),
            timestamp: debian_timestamp(at),
        }
    }

    /// `<package> (<version>-<revision>) <distribution>; urgency=<urgency>`
    pub fn header(&self) -> String {
        format!(
            "{} ({}-{}) {}; urgency={}",
            self.package, self.version, self.revision, self.distribution, self.urgency
        )
    }

    /// Convert to a [`tera::Context`] for rendering.
    pub fn to_tera_context(&self) -> Result<tera::Context, ChangelogError> {
        tera::Context::from_serialize(self).map_err(ChangelogError::from)
    }
}

/// Split free text into trimmed, non-empty bullet lines.
pub fn comment_lines(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}
