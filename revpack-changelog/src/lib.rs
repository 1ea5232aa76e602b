//! # revpack-changelog
//!
//! Renders Debian changelog entries with Tera and prepends them to a
//! project's `debian/changelog`.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use chrono::Utc;
//! use revpack_changelog::{prepend_entry, ChangelogEntry, ChangelogRenderer};
//! use revpack_core::{Config, ProjectLayout};
//!
//! fn stamp(config: &Config) -> Result<(), revpack_changelog::ChangelogError> {
//!     let renderer = ChangelogRenderer::for_workspace(&config.workspace)?;
//!     for project in config.enabled_projects() {
//!         let layout = ProjectLayout::new(config, project);
//!         let entry = ChangelogEntry::for_project(config, project, "dev0", None, Utc::now());
//!         prepend_entry(&layout.changelog, &renderer, &entry)?;
//!     }
//!     Ok(())
//! }
//! ```

pub mod engine;
pub mod entry;
pub mod error;
pub mod writer;

pub use engine::ChangelogRenderer;
pub use entry::{debian_timestamp, ChangelogEntry};
pub use error::ChangelogError;
pub use writer::{latest_header, prepend_entry};
