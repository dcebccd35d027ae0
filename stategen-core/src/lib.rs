//! Core functionality for stategen
//!
//! This crate contains the compiler core for the stategen tool: diagram
//! parsing, semantic IR construction, validation, artifact emission, and
//! incremental build tracking.

pub mod diagnostics;
pub mod diagram;
pub mod emit;
pub mod incremental;
pub mod pipeline;
pub mod semantic;
pub mod validation;

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for a compile run
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CompilerConfig {
    /// Root directory generated artifacts are proposed under
    pub out_dir: PathBuf,

    /// Treat naming-convention violations as errors
    pub strict: bool,

    /// Emit test suites alongside machine modules
    pub emit_tests: bool,

    /// Emit interactive demo harnesses
    pub emit_demos: bool,

    /// Emit service wrappers
    pub emit_services: bool,

    /// Re-emit everything, ignoring the build manifest
    pub force: bool,

    /// Soft ceiling on states per machine
    pub max_states: usize,

    /// Soft ceiling on outgoing transitions per state
    pub max_transitions_per_state: usize,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            out_dir: PathBuf::from("generated"),
            strict: false,
            emit_tests: true,
            emit_demos: true,
            emit_services: true,
            force: false,
            max_states: 50,
            max_transitions_per_state: 20,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = CompilerConfig::default();
        assert!(!config.strict);
        assert!(config.emit_tests);
        assert_eq!(config.max_states, 50);
        assert_eq!(config.max_transitions_per_state, 20);
    }
}
