//! `stategen status` — change summary against the build manifest

use anyhow::Result;
use clap::Args;
use stategen_core::CompilerConfig;
use stategen_core::pipeline::Orchestrator;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct StatusArgs {
    /// Source file or directory containing diagram documents
    pub input: PathBuf,

    /// Output directory whose manifest should be consulted
    #[arg(short, long, default_value = "generated")]
    pub out: PathBuf,
}

pub fn execute(args: StatusArgs) -> Result<()> {
    let config = CompilerConfig { out_dir: args.out, ..CompilerConfig::default() };
    let orchestrator = Orchestrator::new(config);
    let sources = Orchestrator::discover_sources(&args.input);

    if orchestrator.is_up_to_date(&sources) {
        println!("Up to date ({} sources tracked).", sources.len());
        return Ok(());
    }

    let changes = orchestrator.detect_changes(&sources)?;
    for path in &changes.added {
        println!("new:      {}", path.display());
    }
    for path in &changes.modified {
        println!("modified: {}", path.display());
    }
    for path in &changes.deleted {
        println!("deleted:  {}", path.display());
    }
    if !changes.has_changes {
        println!("Sources unchanged, but generated artifacts need a rebuild.");
    }
    Ok(())
}
