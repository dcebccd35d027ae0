//! Diagram parsing engine
//!
//! This module turns restricted flowchart diagram text into assembled
//! [`ParsedMachine`] values: block extraction from host documents, a line
//! tokenizer producing typed statements, and a graph assembler that
//! resolves statements into states and transitions.

pub mod assembler;
pub mod extract;
pub mod lexer;
pub mod model;

pub use extract::DiagramBlock;
pub use model::*;

use crate::diagnostics::Diagnostics;

/// Result of parsing one host document
#[derive(Debug, Clone)]
pub struct ParseOutcome {
    pub machines: Vec<ParsedMachine>,
    pub diagnostics: Diagnostics,
}

/// Parser for diagram documents
#[derive(Debug, Default)]
pub struct DiagramParser;

impl DiagramParser {
    pub fn new() -> Self {
        Self
    }

    /// Parse every diagram block embedded in a document.
    ///
    /// `fallback_name` (typically the file stem) names machines whose block
    /// has no preceding heading. A document without diagram blocks yields
    /// an empty outcome, not an error.
    pub fn parse_document(&self, document: &str, fallback_name: &str) -> ParseOutcome {
        let mut machines = Vec::new();
        let mut diagnostics = Diagnostics::new();

        for block in extract::extract_blocks(document, fallback_name) {
            let (statements, block_diagnostics) = lexer::tokenize(&block.source, block.fence_line);
            diagnostics.extend(block_diagnostics);
            machines.push(assembler::assemble(
                &block.name_hint,
                block.fence_line + 1,
                statements,
                &mut diagnostics,
            ));
        }

        ParseOutcome { machines, diagnostics }
    }

    /// Parse a single isolated diagram block
    pub fn parse_block(&self, source: &str, name: &str, line_offset: usize) -> ParseOutcome {
        let mut diagnostics = Diagnostics::new();
        let (statements, block_diagnostics) = lexer::tokenize(source, line_offset);
        diagnostics.extend(block_diagnostics);
        let machine = assembler::assemble(name, line_offset + 1, statements, &mut diagnostics);
        ParseOutcome { machines: vec![machine], diagnostics }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_document_with_two_blocks() {
        let document = "# Registration\n\n```mermaid\nflowchart TD\nStart-->Menu\n```\n\n# Balance\n\n```mermaid\nflowchart TD\nIdle-->Shown\n```\n";
        let parser = DiagramParser::new();
        let outcome = parser.parse_document(document, "doc");
        assert_eq!(outcome.machines.len(), 2);
        assert_eq!(outcome.machines[0].display_name, "Registration");
        assert_eq!(outcome.machines[1].display_name, "Balance");
        assert!(!outcome.diagnostics.has_errors());
    }

    #[test]
    fn test_parse_document_without_diagrams() {
        let outcome = DiagramParser::new().parse_document("just prose\n", "doc");
        assert!(outcome.machines.is_empty());
        assert!(outcome.diagnostics.is_empty());
    }

    #[test]
    fn test_diagnostic_lines_point_into_document() {
        let document = "# Flow\n\n```mermaid\nflowchart TD\n1bad[Oops]\n```\n";
        let outcome = DiagramParser::new().parse_document(document, "doc");
        assert_eq!(outcome.diagnostics.error_count(), 1);
        let diagnostic = outcome.diagnostics.iter().next().unwrap();
        assert_eq!(diagnostic.line, Some(5));
    }

    #[test]
    fn test_parse_block_directly() {
        let outcome = DiagramParser::new().parse_block("flowchart TD\nA-->B", "Lint target", 0);
        assert_eq!(outcome.machines.len(), 1);
        assert_eq!(outcome.machines[0].id, "lint-target");
    }
}
