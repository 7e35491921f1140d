//! `forgesync bulk`: ensure + mirror every repository named on stdin.

use std::io::{self, BufRead, IsTerminal};

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use tabled::{settings::Style, Table, Tabled};

use forgesync_forge::MirrorOutcome;
use forgesync_sync::{BatchReport, Provisioned};

use crate::console;
use crate::{PlatformArgs, VisibilityArgs};

/// Read repository names from stdin, one per line, and create each on the
/// primary host when absent before registering its mirror. A failing
/// repository does not stop the batch.
#[derive(Args, Debug)]
pub struct BulkArgs {
    #[command(flatten)]
    pub visibility: VisibilityArgs,

    #[command(flatten)]
    pub platform: PlatformArgs,
}

#[derive(Tabled)]
struct BatchRow {
    #[tabled(rename = "repository")]
    repository: String,
    #[tabled(rename = "result")]
    result: String,
    #[tabled(rename = "detail")]
    detail: String,
}

impl BulkArgs {
    pub fn run(self) -> Result<()> {
        let stdin = io::stdin();
        if stdin.is_terminal() {
            println!("Enter repository names (one per line, Ctrl+D when done):");
        }
        let names = stdin
            .lock()
            .lines()
            .collect::<io::Result<Vec<String>>>()
            .context("failed to read repository names from stdin")?;

        let report = super::orchestrator()?
            .provision_batch(&names, self.visibility.visibility(), self.platform.platform())
            .context("bulk run failed")?;

        println!();
        println!("{}", render_table(&report));
        println!(
            "{} Completed {}/{} repositories",
            "✓".green(),
            report.completed(),
            report.total()
        );
        Ok(())
    }
}

fn render_table(report: &BatchReport) -> String {
    let rows = report.entries.iter().map(|entry| match &entry.result {
        Ok(done) => BatchRow {
            repository: entry.repository.clone(),
            result: "ok".to_string(),
            detail: describe(done.primary, done.mirror),
        },
        Err(err) => BatchRow {
            repository: entry.repository.clone(),
            result: "failed".to_string(),
            detail: err.to_string(),
        },
    });
    Table::new(rows).with(Style::psql()).to_string()
}

fn describe(primary: Option<Provisioned>, mirror: MirrorOutcome) -> String {
    let repo = match primary {
        Some(Provisioned::Created) => "created",
        Some(Provisioned::AlreadyExisted) | None => "existed",
    };
    let mirror = match mirror {
        MirrorOutcome::Registered => "mirror registered",
        MirrorOutcome::AlreadyRegistered => "mirror already registered",
    };
    format!("{repo}, {mirror}")
}
