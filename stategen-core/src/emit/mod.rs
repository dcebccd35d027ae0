//! Artifact emitters
//!
//! Six renderers share one [`Emitter`] trait and consume the semantic IR
//! read-only. Each render produces an isolated, byte-complete text blob;
//! rendering the same machine twice yields identical output.

pub mod boundary;
pub mod demo;
pub mod machine;
pub mod service;
pub mod smoke;
pub mod transitions;

pub use boundary::BoundaryTestEmitter;
pub use demo::DemoEmitter;
pub use machine::MachineEmitter;
pub use service::ServiceEmitter;
pub use smoke::SmokeTestEmitter;
pub use transitions::TransitionTestEmitter;

use crate::CompilerConfig;
use crate::semantic::GeneratedMachine;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Kind of artifact, as reported to the file-writing collaborator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactKind {
    Machine,
    Test,
    Demo,
    Service,
}

/// Closed set of emitters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EmitterKind {
    Machine,
    SmokeTests,
    TransitionTests,
    BoundaryTests,
    Demo,
    Service,
}

impl EmitterKind {
    pub const ALL: [EmitterKind; 6] = [
        Self::Machine,
        Self::SmokeTests,
        Self::TransitionTests,
        Self::BoundaryTests,
        Self::Demo,
        Self::Service,
    ];

    pub fn artifact_kind(&self) -> ArtifactKind {
        match self {
            Self::Machine => ArtifactKind::Machine,
            Self::SmokeTests | Self::TransitionTests | Self::BoundaryTests => ArtifactKind::Test,
            Self::Demo => ArtifactKind::Demo,
            Self::Service => ArtifactKind::Service,
        }
    }

    /// Fixed per-kind filename suffix convention
    pub fn file_name(&self, module_base: &str) -> String {
        match self {
            Self::Machine => format!("{}.machine.ts", module_base),
            Self::SmokeTests => format!("{}.machine.test.ts", module_base),
            Self::TransitionTests => format!("{}.transitions.test.ts", module_base),
            Self::BoundaryTests => format!("{}.boundaries.test.ts", module_base),
            Self::Demo => format!("{}.demo.ts", module_base),
            Self::Service => format!("{}.service.ts", module_base),
        }
    }
}

/// A generated-file proposal. The compiler never writes it; overwrite and
/// backup policy belong to the collaborator receiving the record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedFile {
    pub path: PathBuf,
    pub kind: ArtifactKind,
    pub content: String,
    pub size: usize,
}

impl GeneratedFile {
    pub fn new(path: PathBuf, kind: ArtifactKind, content: String) -> Self {
        Self { path, kind, size: content.len(), content }
    }
}

/// Renderer from IR to one artifact text
pub trait Emitter {
    fn kind(&self) -> EmitterKind;
    fn render(&self, machine: &GeneratedMachine) -> Result<String>;
}

/// Emitters enabled by a configuration, in emission order
pub fn registry(config: &CompilerConfig) -> Vec<Box<dyn Emitter>> {
    let mut emitters: Vec<Box<dyn Emitter>> = vec![Box::new(MachineEmitter::new())];
    if config.emit_tests {
        emitters.push(Box::new(SmokeTestEmitter::new()));
        emitters.push(Box::new(TransitionTestEmitter::new()));
        emitters.push(Box::new(BoundaryTestEmitter::new()));
    }
    if config.emit_demos {
        emitters.push(Box::new(DemoEmitter::new()));
    }
    if config.emit_services {
        emitters.push(Box::new(ServiceEmitter::new()));
    }
    emitters
}

/// File-stem base shared by all of a machine's artifacts
/// (`user_registration_machine` → `user-registration`)
pub fn module_base(machine: &GeneratedMachine) -> String {
    machine.id.trim_end_matches("_machine").replace('_', "-")
}

/// Proposed output path: category subdirectory, machine directory, then
/// the per-kind file name.
pub fn output_path(out_dir: &Path, machine: &GeneratedMachine, kind: EmitterKind) -> PathBuf {
    let base = module_base(machine);
    out_dir.join(machine.category.subdirectory()).join(&base).join(kind.file_name(&base))
}

/// Helpers shared by the emitters
pub mod codegen {
    use crate::semantic::{EventSpec, FieldKind};

    /// Indent every non-empty line
    pub fn indent(code: &str, spaces: usize) -> String {
        let pad = " ".repeat(spaces);
        code.lines()
            .map(|line| if line.is_empty() { line.to_string() } else { format!("{}{}", pad, line) })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Escape text for a single-quoted TS string literal
    pub fn ts_string(text: &str) -> String {
        let escaped = text
            .replace('\\', "\\\\")
            .replace('\'', "\\'")
            .replace('\n', "\\n")
            .replace('\r', "\\r");
        format!("'{}'", escaped)
    }

    /// Representative literal for a payload field, used by generated tests
    /// and demos when they need a syntactically valid event.
    pub fn sample_value(kind: FieldKind) -> &'static str {
        match kind {
            FieldKind::Text => "'1'",
            FieldKind::Number => "1",
            FieldKind::Bool => "true",
            FieldKind::Opaque => "{}",
        }
    }

    /// Event object literal with representative payload values
    pub fn sample_event_literal(event: &EventSpec) -> String {
        let mut parts = vec![format!("type: {}", ts_string(&event.name))];
        for field in &event.payload {
            parts.push(format!("{}: {}", field.name, sample_value(field.kind)));
        }
        format!("{{ {} }}", parts.join(", "))
    }
}
