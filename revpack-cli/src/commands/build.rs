//! `revpack build`: sync every selected project and build what changed.

use std::io::{BufRead, IsTerminal, Write};
use std::path::Path;

use anyhow::{bail, Context, Result};
use clap::Args;
use colored::Colorize;
use tabled::{settings::Style, Table, Tabled};

use revpack_build::{
    run_build, BuildReport, BuildServices, ChangelogPrompt, NoPrompt, ProjectStatus, RevisionLabel,
};
use revpack_changelog::ChangelogRenderer;
use revpack_core::{Project, SystemRunner};

use super::{load_config, Selection};

/// Arguments for `revpack build`.
#[derive(Args, Debug)]
pub struct BuildArgs {
    #[command(flatten)]
    pub selection: Selection,

    /// Never ask for a changelog comment.
    #[arg(long)]
    pub auto: bool,
}

impl BuildArgs {
    pub fn run(self, config_path: Option<&Path>) -> Result<()> {
        let config = load_config(config_path)?;
        let renderer = ChangelogRenderer::for_workspace(&config.workspace)
            .context("failed to load changelog template")?;

        let interactive = !self.auto && std::io::stdin().is_terminal();
        let prompt: &dyn ChangelogPrompt = if interactive { &StdinPrompt } else { &NoPrompt };
        let services = BuildServices::new(&config, &SystemRunner, &renderer).with_prompt(prompt);

        let report = run_build(&services, &self.selection.projects)
            .context("build aborted before any project was processed")?;
        print_report(&report);

        if report.has_failures() {
            bail!(
                "{} of {} projects failed",
                report.failed(),
                report.projects.len()
            );
        }
        Ok(())
    }
}

/// Reads one line from stdin per build.
struct StdinPrompt;

impl ChangelogPrompt for StdinPrompt {
    fn comment(&self, project: &Project, revision: &RevisionLabel) -> Option<String> {
        eprint!(
            "Changelog comment for {} {}-{} (empty for none): ",
            project.name, project.version, revision
        );
        let _ = std::io::stderr().flush();
        let mut line = String::new();
        std::io::stdin().lock().read_line(&mut line).ok()?;
        let line = line.trim();
        (!line.is_empty()).then(|| line.to_string())
    }
}

#[derive(Tabled)]
struct BuildRow {
    #[tabled(rename = "project")]
    project: String,
    #[tabled(rename = "sync")]
    sync: String,
    #[tabled(rename = "result")]
    result: String,
    #[tabled(rename = "detail")]
    detail: String,
}

fn print_report(report: &BuildReport) {
    if report.projects.is_empty() {
        println!("No projects selected.");
        return;
    }

    let rows: Vec<BuildRow> = report
        .projects
        .iter()
        .map(|p| {
            let (result, detail) = match &p.status {
                ProjectStatus::Skipped => (
                    "skipped".yellow().to_string(),
                    "no upstream changes".to_string(),
                ),
                ProjectStatus::Succeeded { revision, artifact } => (
                    "succeeded".green().to_string(),
                    format!("{revision} → {}", artifact.display()),
                ),
                ProjectStatus::Failed { reason } => {
                    ("failed".red().bold().to_string(), reason.clone())
                }
            };
            BuildRow {
                project: p.project.to_string(),
                sync: p.change.map(|c| c.to_string()).unwrap_or_else(|| "-".to_string()),
                result,
                detail,
            }
        })
        .collect();

    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{table}");
    println!(
        "{} succeeded, {} skipped, {} failed",
        report.succeeded(),
        report.skipped(),
        report.failed()
    );
}
