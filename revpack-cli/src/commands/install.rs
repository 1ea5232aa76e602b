//! `revpack install`: install the current package of each project.

use std::path::Path;

use anyhow::{bail, Context, Result};
use clap::Args;
use colored::Colorize;
use tabled::{settings::Style, Table, Tabled};

use revpack_build::{run_install, InstallReport, InstallStatus};
use revpack_core::SystemRunner;

use super::{load_config, Selection};

/// Arguments for `revpack install`.
#[derive(Args, Debug)]
pub struct InstallArgs {
    #[command(flatten)]
    pub selection: Selection,
}

impl InstallArgs {
    pub fn run(self, config_path: Option<&Path>) -> Result<()> {
        let config = load_config(config_path)?;
        let reports = run_install(&config, &SystemRunner, &self.selection.projects)
            .context("install aborted before any project was processed")?;
        print_reports(&reports);

        let failed = reports.iter().filter(|r| r.is_failure()).count();
        if failed > 0 {
            bail!("{failed} of {} projects were not installed", reports.len());
        }
        Ok(())
    }
}

#[derive(Tabled)]
struct InstallRow {
    #[tabled(rename = "project")]
    project: String,
    #[tabled(rename = "result")]
    result: String,
    #[tabled(rename = "detail")]
    detail: String,
}

fn print_reports(reports: &[InstallReport]) {
    if reports.is_empty() {
        println!("No projects selected.");
        return;
    }
    let rows: Vec<InstallRow> = reports
        .iter()
        .map(|r| {
            let (result, detail) = match &r.status {
                InstallStatus::Installed { artifact } => {
                    ("installed".green().to_string(), artifact.display().to_string())
                }
                InstallStatus::Missing { alias } => (
                    "missing".yellow().to_string(),
                    format!("{} not found; run `revpack build` first", alias.display()),
                ),
                InstallStatus::Failed { reason } => {
                    ("failed".red().bold().to_string(), reason.clone())
                }
            };
            InstallRow {
                project: r.project.to_string(),
                result,
                detail,
            }
        })
        .collect();
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{table}");
}
