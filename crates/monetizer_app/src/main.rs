mod cli;
mod logging;
mod settings;

use std::env;
use std::io::{self, Read, Write};

use anyhow::{bail, Context, Result};
use clap::Parser;
use monetizer_core::{RouterConfig, RunStats};
use monetizer_engine::{
    output_names, run_batch, BatchReport, BatchSettings, DocumentInput, DocumentOutcome, Ledger,
    OutputDir,
};
use monetizer_logging::{monetizer_info, monetizer_warn};
use serde_json::json;

use crate::cli::Cli;
use crate::logging::LogDestination;
use crate::settings::{build_router_config, RouterFile};

fn main() -> Result<()> {
    let cli = Cli::parse();

    let destination = match &cli.log_file {
        Some(path) => LogDestination::TerminalAndFile(path.clone()),
        None => LogDestination::Terminal,
    };
    logging::initialize(destination, logging::level_for_verbosity(cli.verbose));

    let file = cli.config.as_deref().map(RouterFile::load).transpose()?;
    let config = build_router_config(file, |key| env::var(key).ok())
        .context("invalid router configuration")?;

    let mut settings = BatchSettings {
        force: cli.force,
        disclosure: cli.disclosure,
        brand: cli.brand.clone(),
        ..BatchSettings::default()
    };
    if let Some(jobs) = cli.jobs {
        settings.workers = jobs.max(1);
    }

    if cli.reads_stdin() {
        run_stdin(&cli, &config, &settings)
    } else {
        run_files(&cli, &config, &settings)
    }
}

/// Monetize stdin to stdout. The ledger is not consulted or updated.
fn run_stdin(cli: &Cli, config: &RouterConfig, settings: &BatchSettings) -> Result<()> {
    let mut html = String::new();
    io::stdin()
        .read_to_string(&mut html)
        .context("failed to read HTML from stdin")?;

    let inputs = [DocumentInput::inline("stdin", html)];
    let settings = BatchSettings {
        force: true,
        ..settings.clone()
    };
    let report = run_batch(&inputs, config, &Ledger::new(&cli.out_dir), &settings);

    if let Some(doc) = report.documents.first() {
        if let DocumentOutcome::Monetized { html, .. } = &doc.outcome {
            io::stdout()
                .write_all(html.as_bytes())
                .context("failed to write monetized HTML to stdout")?;
        }
    }
    if cli.stats_json {
        eprintln!("{}", stats_json(&report)?);
    } else {
        monetizer_info!("{}", report.totals);
    }
    Ok(())
}

fn run_files(cli: &Cli, config: &RouterConfig, settings: &BatchSettings) -> Result<()> {
    let names = output_names(&cli.inputs)?;
    let out_dir = OutputDir::open(&cli.out_dir)?;
    let inputs: Vec<DocumentInput> = cli.inputs.iter().map(DocumentInput::file).collect();

    let mut ledger = Ledger::load(&cli.out_dir);
    let report = run_batch(&inputs, config, &ledger, settings);

    out_dir
        .write_report(&report, &names)
        .context("failed to write monetized documents")?;

    report.record_into(&mut ledger);
    if report.monetized() > 0 {
        ledger.save().context("failed to save ledger")?;
    }

    if cli.stats_json {
        println!("{}", stats_json(&report)?);
    } else {
        println!("{}", report.summary());
    }

    if report.failed() > 0 {
        for doc in &report.documents {
            if let DocumentOutcome::Failed(err) = &doc.outcome {
                monetizer_warn!("{}: {}", doc.source, err);
            }
        }
        bail!("{} of {} documents failed", report.failed(), report.documents.len());
    }
    Ok(())
}

fn stats_json(report: &BatchReport) -> Result<String> {
    let documents: Vec<_> = report
        .documents
        .iter()
        .map(|doc| match &doc.outcome {
            DocumentOutcome::Monetized { stats, .. } => json!({
                "source": doc.source,
                "status": "monetized",
                "stats": stats,
            }),
            DocumentOutcome::AlreadyProcessed => json!({
                "source": doc.source,
                "status": "already_processed",
                "stats": RunStats::default(),
            }),
            DocumentOutcome::Failed(err) => json!({
                "source": doc.source,
                "status": "failed",
                "error": err.to_string(),
            }),
        })
        .collect();

    Ok(serde_json::to_string_pretty(&json!({
        "documents": documents,
        "totals": report.totals,
    }))?)
}
