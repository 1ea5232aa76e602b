//! # revpack-build
//!
//! Revision ledger, repository sync and the package build pipeline.
//!
//! Call [`run_build`] to sync and build the selected projects of a
//! [`revpack_core::Config`], or [`run_install`] to install their current
//! artifacts.

pub mod driver;
pub mod error;
pub mod install;
pub mod ledger;
pub mod listing;
pub mod patch;
pub mod pipeline;
pub mod repo;
pub mod tarball;

#[cfg(test)]
mod test_support;

pub use driver::{build_project, BuildOutcome, BuildServices, ChangelogPrompt, NoPrompt};
pub use error::{BuildError, BuildStage};
pub use install::{run_install, InstallReport, InstallStatus};
pub use ledger::{LedgerEntry, RevisionLabel};
pub use listing::{summarize, ProjectSummary};
pub use pipeline::{run_build, BuildReport, ProjectReport, ProjectStatus};
pub use repo::{sync_repository, ChangeState};
