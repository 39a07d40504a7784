use std::fs::File;
use std::io;
use std::path::Path;

use anyhow::Context;
use serde_json::json;

use crate::cli::utils::output_success;
use crate::cli::OutputFormat;
use crate::config;
use crate::database::service;
use crate::database::{DatabaseManager, PgRepository};
use crate::roster::{self, ReconcileOptions};

pub async fn import(path: &Path, output_format: OutputFormat) -> anyhow::Result<()> {
    let file = File::open(path).with_context(|| format!("cannot open {}", path.display()))?;
    let rows = roster::read_roster(file)?;

    let repository = PgRepository::new(DatabaseManager::pool().await?);
    let options = ReconcileOptions::from_config(config::config());
    let report = roster::reconcile(&repository, &rows, &options).await?;

    if output_format == OutputFormat::Text {
        for error in &report.errors {
            eprintln!("  {error}");
        }
        if report.deactivation_skipped {
            eprintln!("  No usable emails in roster; deactivation sweep skipped");
        }
    }

    output_success(
        output_format,
        &format!(
            "Imported {} of {} rows: {} created, {} updated, {} unchanged, {} failed, {} vendors created, {} deactivated",
            report.processed,
            report.total_rows,
            report.created,
            report.updated,
            report.unchanged,
            report.error_count,
            report.vendors_created,
            report.deactivated
        ),
        Some(json!({ "report": report })),
    )
}

pub async fn export(output: Option<&Path>, output_format: OutputFormat) -> anyhow::Result<()> {
    let pool = DatabaseManager::pool().await?;
    let students = service::export_students(&pool).await?;

    match output {
        Some(path) => {
            let file = File::create(path).with_context(|| format!("cannot create {}", path.display()))?;
            roster::write_roster(file, &students)?;
            output_success(
                output_format,
                &format!("Exported {} students to {}", students.len(), path.display()),
                Some(json!({ "exported": students.len(), "path": path.display().to_string() })),
            )
        }
        // Stdout carries the CSV itself
        None => Ok(roster::write_roster(io::stdout().lock(), &students)?),
    }
}
