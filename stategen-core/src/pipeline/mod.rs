//! Compile orchestration
//!
//! Sequences extraction, parsing, validation, IR generation and emission;
//! aggregates statistics and diagnostics; hands generated files to the
//! caller's [`ArtifactSink`]. A batch compile always returns a summary,
//! even on total failure.

use crate::CompilerConfig;
use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::diagram::{DiagramParser, ParsedMachine};
use crate::emit::{self, GeneratedFile};
use crate::incremental::ChangeTracker;
use crate::semantic::SemanticGenerator;
use crate::validation::{BusinessRuleValidator, DiagramValidator};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Receives generated-file proposals. Overwrite and backup policy belong
/// to the implementation, never to the compiler.
pub trait ArtifactSink {
    fn write(&mut self, file: &GeneratedFile) -> anyhow::Result<()>;
}

/// Sink that only collects proposals; used by tests and dry runs
#[derive(Debug, Default)]
pub struct CollectingSink {
    pub files: Vec<GeneratedFile>,
}

impl ArtifactSink for CollectingSink {
    fn write(&mut self, file: &GeneratedFile) -> anyhow::Result<()> {
        self.files.push(file.clone());
        Ok(())
    }
}

/// Aggregate statistics for one batch compile
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchStats {
    pub machines_generated: usize,
    pub files_created: usize,
    pub lines_of_code: usize,
    pub duration_ms: u64,
}

/// Result of one batch compile
#[derive(Debug, Default, Serialize)]
pub struct BatchSummary {
    pub generated_files: Vec<GeneratedFile>,
    pub errors: Vec<Diagnostic>,
    pub warnings: Vec<Diagnostic>,
    pub stats: BatchStats,
    /// True when the manifest proved every artifact current and emission
    /// was skipped entirely
    pub skipped: bool,
}

/// Sequences the compiler stages over a batch of source documents
pub struct Orchestrator {
    config: CompilerConfig,
    parser: DiagramParser,
    generator: SemanticGenerator,
    diagram_validator: DiagramValidator,
    rule_validator: BusinessRuleValidator,
    tracker: ChangeTracker,
}

impl Orchestrator {
    pub fn new(config: CompilerConfig) -> Self {
        let manifest_path = config.out_dir.join(".build-manifest.json");
        Self::with_manifest_path(config, manifest_path)
    }

    pub fn with_manifest_path(config: CompilerConfig, manifest_path: PathBuf) -> Self {
        Self {
            diagram_validator: DiagramValidator::new().with_strict(config.strict),
            rule_validator: BusinessRuleValidator::with_limits(
                config.max_states,
                config.max_transitions_per_state,
            ),
            parser: DiagramParser::new(),
            generator: SemanticGenerator::new(),
            tracker: ChangeTracker::load(manifest_path),
            config,
        }
    }

    /// Find diagram documents under a root (or accept a single file)
    pub fn discover_sources(root: &Path) -> Vec<PathBuf> {
        if root.is_file() {
            return vec![root.to_path_buf()];
        }
        let mut sources: Vec<PathBuf> = walkdir::WalkDir::new(root)
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_file())
            .map(|entry| entry.into_path())
            .filter(|path| {
                matches!(
                    path.extension().and_then(|e| e.to_str()),
                    Some("md") | Some("markdown") | Some("mmd")
                )
            })
            .collect();
        sources.sort();
        sources
    }

    /// Compile a batch of documents, writing artifacts through the sink.
    pub async fn compile_sources(
        &mut self,
        sources: &[PathBuf],
        sink: &mut dyn ArtifactSink,
    ) -> BatchSummary {
        let started = Instant::now();
        let mut diagnostics = Diagnostics::new();

        if !self.config.force && self.tracker.is_up_to_date(sources) {
            tracing::info!("All {} sources up to date, skipping emission", sources.len());
            let mut summary = BatchSummary { skipped: true, ..BatchSummary::default() };
            summary.stats.duration_ms = started.elapsed().as_millis() as u64;
            return summary;
        }

        let mut machines: Vec<ParsedMachine> = Vec::new();
        let mut read_sources: Vec<PathBuf> = Vec::new();

        for path in sources {
            let text = match tokio::fs::read_to_string(path).await {
                Ok(text) => text,
                Err(error) => {
                    diagnostics.push(Diagnostic::error(format!(
                        "Failed to read {}: {}",
                        path.display(),
                        error
                    )));
                    continue;
                }
            };
            read_sources.push(path.clone());

            let lint = self.diagram_validator.validate_document(&text);
            diagnostics.extend(lint.diagnostics);

            let fallback = path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("machine")
                .to_string();
            let outcome = self.parser.parse_document(&text, &fallback);
            diagnostics.extend(outcome.diagnostics);
            machines.extend(outcome.machines);
        }

        let cross = self.rule_validator.validate_cross_machine(&machines);
        diagnostics.extend(cross.diagnostics);

        let mut generated_files = Vec::new();
        let mut machines_generated = 0usize;

        for machine in &machines {
            let report = self.rule_validator.validate_machine(machine);
            let blocked = !report.is_valid;
            diagnostics.extend(report.diagnostics);
            if blocked {
                tracing::warn!("Skipping emission for '{}' due to validation errors", machine.id);
                continue;
            }

            let generated = self.generator.generate(machine);
            machines_generated += 1;

            for emitter in emit::registry(&self.config) {
                let content = match emitter.render(&generated) {
                    Ok(content) => content,
                    Err(error) => {
                        diagnostics.push(Diagnostic::error(format!(
                            "Emitter {:?} failed for '{}': {}",
                            emitter.kind(),
                            generated.id,
                            error
                        )));
                        continue;
                    }
                };
                let path = emit::output_path(&self.config.out_dir, &generated, emitter.kind());
                let file = GeneratedFile::new(path, emitter.kind().artifact_kind(), content);
                match sink.write(&file) {
                    Ok(()) => generated_files.push(file),
                    Err(error) => diagnostics.push(Diagnostic::error(format!(
                        "Failed to write {}: {}",
                        file.path.display(),
                        error
                    ))),
                }
            }
        }

        let (errors, warnings) = diagnostics.partition();

        // The manifest only advances after a fully successful emission.
        if errors.is_empty() {
            let generated_paths: Vec<PathBuf> =
                generated_files.iter().map(|f| f.path.clone()).collect();
            if let Err(error) = self.tracker.commit(&read_sources, &generated_paths) {
                tracing::warn!("Could not persist build manifest: {}", error);
            }
        }

        let stats = BatchStats {
            machines_generated,
            files_created: generated_files.len(),
            lines_of_code: generated_files.iter().map(|f| f.content.lines().count()).sum(),
            duration_ms: started.elapsed().as_millis() as u64,
        };

        tracing::info!(
            "Generated {} machines, {} files, {} errors, {} warnings",
            stats.machines_generated,
            stats.files_created,
            errors.len(),
            warnings.len()
        );

        BatchSummary { generated_files, errors, warnings, stats, skipped: false }
    }

    /// Discover and compile everything under a root path
    pub async fn compile_root(&mut self, root: &Path, sink: &mut dyn ArtifactSink) -> BatchSummary {
        let sources = Self::discover_sources(root);
        self.compile_sources(&sources, sink).await
    }

    /// Change summary for the given sources, without compiling
    pub fn detect_changes(
        &self,
        sources: &[PathBuf],
    ) -> crate::incremental::Result<crate::incremental::ChangeSet> {
        self.tracker.detect_changes(sources)
    }

    pub fn is_up_to_date(&self, sources: &[PathBuf]) -> bool {
        self.tracker.is_up_to_date(sources)
    }
}
