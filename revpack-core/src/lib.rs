//! revpack core library: domain types, configuration, workspace layout,
//! and the external command seam.
//!
//! - [`types`]: newtypes and the validated [`Config`]
//! - [`config`]: load / validate / select projects
//! - [`layout`]: per-project and per-build paths
//! - [`command`]: [`CommandRunner`] and [`SystemRunner`]
//! - [`error`]: [`ConfigError`]

pub mod command;
pub mod config;
pub mod error;
pub mod layout;
pub mod types;

pub use command::{CommandOutput, CommandRunner, CommandSpec, SystemRunner};
pub use error::ConfigError;
pub use layout::ProjectLayout;
pub use types::{Config, Project, ProjectName};
