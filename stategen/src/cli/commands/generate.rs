//! `stategen generate` — run the full compile pipeline

use super::print_diagnostics;
use anyhow::{Context, Result};
use clap::Args;
use stategen_core::CompilerConfig;
use stategen_core::emit::GeneratedFile;
use stategen_core::pipeline::{ArtifactSink, Orchestrator};
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct GenerateArgs {
    /// Source file or directory containing diagram documents
    pub input: PathBuf,

    /// Output directory for generated artifacts
    #[arg(short, long, default_value = "generated")]
    pub out: PathBuf,

    /// Treat naming-convention violations as errors
    #[arg(long)]
    pub strict: bool,

    /// Re-emit everything, ignoring the build manifest
    #[arg(long)]
    pub force: bool,

    /// Skip test-suite emission
    #[arg(long)]
    pub no_tests: bool,

    /// Skip demo-harness emission
    #[arg(long)]
    pub no_demos: bool,

    /// Skip service-wrapper emission
    #[arg(long)]
    pub no_services: bool,

    /// Print the batch summary as JSON
    #[arg(long)]
    pub json: bool,
}

/// Writes proposed artifacts beneath the output directory
struct FsSink;

impl ArtifactSink for FsSink {
    fn write(&mut self, file: &GeneratedFile) -> Result<()> {
        if let Some(parent) = file.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        fs::write(&file.path, &file.content)
            .with_context(|| format!("Failed to write {}", file.path.display()))?;
        Ok(())
    }
}

pub async fn execute(args: GenerateArgs) -> Result<()> {
    let config = CompilerConfig {
        out_dir: args.out.clone(),
        strict: args.strict,
        force: args.force,
        emit_tests: !args.no_tests,
        emit_demos: !args.no_demos,
        emit_services: !args.no_services,
        ..CompilerConfig::default()
    };

    let mut orchestrator = Orchestrator::new(config);
    let summary = orchestrator.compile_root(&args.input, &mut FsSink).await;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else if summary.skipped {
        println!("Everything up to date, nothing generated.");
    } else {
        println!(
            "Generated {} machines into {} files ({} lines) in {} ms",
            summary.stats.machines_generated,
            summary.stats.files_created,
            summary.stats.lines_of_code,
            summary.stats.duration_ms
        );
        if !summary.warnings.is_empty() {
            println!("{} warnings:", summary.warnings.len());
            print_diagnostics(&summary.warnings, "warning");
        }
        if !summary.errors.is_empty() {
            println!("{} errors:", summary.errors.len());
            print_diagnostics(&summary.errors, "error");
        }
    }

    if !summary.errors.is_empty() {
        anyhow::bail!("generation finished with {} errors", summary.errors.len());
    }
    Ok(())
}
