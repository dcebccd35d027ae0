//! Validation layer
//!
//! Two independent validators that never share state: a syntax-level
//! diagram validator working on raw text (usable standalone for lint
//! workflows) and a business-rule validator working on assembled machines.

pub mod diagram;
pub mod rules;

pub use diagram::DiagramValidator;
pub use rules::BusinessRuleValidator;

use crate::diagnostics::Diagnostics;
use serde::{Deserialize, Serialize};

/// Scored result of one validation pass
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationReport {
    pub diagnostics: Diagnostics,
    pub error_count: usize,
    pub warning_count: usize,
    /// True when the pass produced zero errors; warnings never invalidate
    pub is_valid: bool,
}

impl ValidationReport {
    pub fn from_diagnostics(diagnostics: Diagnostics) -> Self {
        let error_count = diagnostics.error_count();
        let warning_count = diagnostics.warning_count();
        Self { error_count, warning_count, is_valid: error_count == 0, diagnostics }
    }

    /// Combine two reports, preserving diagnostic order
    pub fn merge(mut self, other: ValidationReport) -> Self {
        self.diagnostics.extend(other.diagnostics);
        Self::from_diagnostics(self.diagnostics)
    }
}

impl Default for ValidationReport {
    fn default() -> Self {
        Self::from_diagnostics(Diagnostics::new())
    }
}
