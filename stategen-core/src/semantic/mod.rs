//! Semantic IR for generated machines
//!
//! [`GeneratedMachine`] is the fully-resolved, emitter-agnostic
//! representation built once per parsed machine and then consumed
//! read-only by every emitter. Emitters never re-derive information; all
//! of it lives here.

pub mod generator;
pub mod naming;

pub use generator::SemanticGenerator;

use crate::diagram::MachineCategory;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Semantic type of a context or payload field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldKind {
    Text,
    Number,
    Bool,
    Opaque,
}

impl FieldKind {
    /// Type name used in emitted source
    pub fn ts_type(&self) -> &'static str {
        match self {
            Self::Text => "string",
            Self::Number => "number",
            Self::Bool => "boolean",
            Self::Opaque => "unknown",
        }
    }
}

/// One field of an event payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayloadField {
    pub name: String,
    pub kind: FieldKind,
    pub optional: bool,
}

/// One inferred context field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextField {
    pub name: String,
    pub kind: FieldKind,
    /// Default literal in emitted source
    pub default: String,
    pub optional: bool,
    pub doc: String,
}

impl ContextField {
    pub fn new(name: &str, kind: FieldKind, default: &str, doc: &str) -> Self {
        Self {
            name: name.to_string(),
            kind,
            default: default.to_string(),
            optional: false,
            doc: doc.to_string(),
        }
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }
}

/// One event in the machine's catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventSpec {
    pub name: String,
    pub payload: Vec<PayloadField>,
    pub doc: String,
}

/// State kind in the generated machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StateKind {
    Normal,
    Final,
    Parallel,
    Compound,
}

/// One entry of a state's outgoing transition table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransitionSpec {
    pub event: String,
    pub target: Option<String>,
    pub guard: Option<String>,
    pub actions: Vec<String>,
}

/// One state of the generated machine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateSpec {
    pub name: String,
    pub kind: StateKind,
    pub entry_actions: Vec<String>,
    pub exit_actions: Vec<String>,
    pub transitions: Vec<TransitionSpec>,
}

/// Fully-resolved machine IR
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedMachine {
    /// Sanitized machine identifier (see [`naming::sanitize_machine_ident`])
    pub id: String,

    pub display_name: String,
    pub category: MachineCategory,

    pub context_fields: Vec<ContextField>,
    pub events: Vec<EventSpec>,
    pub states: Vec<StateSpec>,

    pub initial_state: String,

    pub guards: BTreeSet<String>,
    pub actions: BTreeSet<String>,
    pub actors: BTreeSet<String>,

    /// Names imported from the runtime library by the machine module
    pub required_imports: Vec<String>,
}

impl GeneratedMachine {
    pub fn state(&self, name: &str) -> Option<&StateSpec> {
        self.states.iter().find(|s| s.name == name)
    }

    pub fn event(&self, name: &str) -> Option<&EventSpec> {
        self.events.iter().find(|e| e.name == name)
    }
}
