pub mod build;
pub mod install;
pub mod list;

use std::path::Path;

use anyhow::{Context, Result};
use clap::Args;

use revpack_core::{config, Config};

/// `-p/--projects`, shared by `build` and `install`.
#[derive(Args, Debug, Default)]
pub struct Selection {
    /// Projects to process, comma separated or repeated.
    /// Defaults to every enabled project.
    #[arg(short, long = "projects", value_name = "NAMES", value_delimiter = ',')]
    pub projects: Vec<String>,
}

pub(crate) fn load_config(path: Option<&Path>) -> Result<Config> {
    config::load(path).context("failed to load configuration")
}
