//! `revpack list`: configured projects and their latest builds.

use std::path::Path;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use tabled::{settings::Style, Table, Tabled};

use revpack_build::{summarize, ProjectSummary};

use super::load_config;

/// Arguments for `revpack list`.
#[derive(Args, Debug)]
pub struct ListArgs {
    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

impl ListArgs {
    pub fn run(self, config_path: Option<&Path>) -> Result<()> {
        let config = load_config(config_path)?;
        let summaries = summarize(&config);

        if self.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&summaries).context("failed to serialize list JSON")?
            );
            return Ok(());
        }

        println!(
            "revpack v{} | workspace {} | {} projects",
            env!("CARGO_PKG_VERSION"),
            config.workspace.display(),
            summaries.len()
        );
        print_table(summaries);
        Ok(())
    }
}

#[derive(Tabled)]
struct ListRow {
    #[tabled(rename = "project")]
    project: String,
    #[tabled(rename = "branch")]
    branch: String,
    #[tabled(rename = "version")]
    version: String,
    #[tabled(rename = "revision")]
    revision: String,
    #[tabled(rename = "current")]
    current: String,
    #[tabled(rename = "remote")]
    remote: String,
}

fn print_table(summaries: Vec<ProjectSummary>) {
    let rows: Vec<ListRow> = summaries
        .into_iter()
        .map(|s| {
            let project = if s.disabled {
                format!("{} (disabled)", s.name).bright_black().to_string()
            } else {
                s.name.bold().to_string()
            };
            let revision = match (s.latest_revision, s.ledger_error) {
                (Some(rev), _) => rev,
                (None, Some(_)) => "corrupt".red().to_string(),
                (None, None) => "never built".bright_black().to_string(),
            };
            ListRow {
                project,
                branch: s.branch,
                version: s.version,
                revision,
                current: s
                    .current
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| "-".to_string()),
                remote: s.remote,
            }
        })
        .collect();
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{table}");
}
