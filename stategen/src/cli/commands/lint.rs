//! `stategen lint` — standalone diagram syntax checking

use super::print_diagnostics;
use anyhow::Result;
use clap::Args;
use stategen_core::pipeline::Orchestrator;
use stategen_core::validation::DiagramValidator;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct LintArgs {
    /// Source file or directory containing diagram documents
    pub input: PathBuf,

    /// Treat naming-convention violations as errors
    #[arg(long)]
    pub strict: bool,
}

pub async fn execute(args: LintArgs) -> Result<()> {
    let validator = DiagramValidator::new().with_strict(args.strict);
    let sources = Orchestrator::discover_sources(&args.input);
    if sources.is_empty() {
        anyhow::bail!("no diagram documents found under {}", args.input.display());
    }

    let mut total_errors = 0usize;
    let mut total_warnings = 0usize;

    for path in &sources {
        let text = tokio::fs::read_to_string(path).await?;
        let report = validator.validate_document(&text);
        if report.diagnostics.is_empty() {
            continue;
        }
        println!("{}:", path.display());
        let (errors, warnings) = report.diagnostics.partition();
        print_diagnostics(&errors, "error");
        print_diagnostics(&warnings, "warning");
        total_errors += report.error_count;
        total_warnings += report.warning_count;
    }

    println!(
        "Checked {} documents: {} errors, {} warnings",
        sources.len(),
        total_errors,
        total_warnings
    );
    if total_errors > 0 {
        anyhow::bail!("lint found {} errors", total_errors);
    }
    Ok(())
}
