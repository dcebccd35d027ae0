//! Syntax-level diagram validation over raw text
//!
//! Deliberately independent of the parser: the validator re-tokenizes the
//! text line by line so it can lint documents that the parser would refuse
//! or mangle.

use super::ValidationReport;
use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::diagram::extract::is_diagram_source;
use regex_utils::{identifiers, labels};

const DIRECTIONS: [&str; 5] = ["TD", "TB", "BT", "RL", "LR"];

/// Raw-text diagram validator
#[derive(Debug, Default, Clone)]
pub struct DiagramValidator {
    strict: bool,
}

impl DiagramValidator {
    pub fn new() -> Self {
        Self::default()
    }

    /// In strict mode naming-convention violations become errors
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Validate a whole host document: fence integrity plus every embedded
    /// diagram block.
    pub fn validate_document(&self, document: &str) -> ValidationReport {
        let mut diagnostics = Diagnostics::new();

        let mut fence_open: Option<usize> = None;
        let mut block = String::new();
        let mut found_block = false;

        for (index, raw_line) in document.lines().enumerate() {
            let line = index + 1;
            let trimmed = raw_line.trim();
            if trimmed.starts_with("```") {
                match fence_open.take() {
                    Some(open_line) => {
                        if is_diagram_source(&block) {
                            found_block = true;
                            self.check_block(&block, open_line, &mut diagnostics);
                        }
                        block.clear();
                    }
                    None => fence_open = Some(line),
                }
                continue;
            }
            if fence_open.is_some() {
                block.push_str(raw_line);
                block.push('\n');
            }
        }

        if let Some(open_line) = fence_open {
            diagnostics.push(
                Diagnostic::error("Unterminated fenced block")
                    .at_line(open_line)
                    .with_suggestion("close the block with a matching ``` fence"),
            );
        }

        // Bare diagram input without fences is validated as one block.
        if !found_block && is_diagram_source(document) {
            self.check_block(document, 0, &mut diagnostics);
        }

        ValidationReport::from_diagnostics(diagnostics)
    }

    /// Validate one isolated diagram block
    pub fn validate_block(&self, source: &str, line_offset: usize) -> ValidationReport {
        let mut diagnostics = Diagnostics::new();
        self.check_block(source, line_offset, &mut diagnostics);
        ValidationReport::from_diagnostics(diagnostics)
    }

    fn check_block(&self, source: &str, line_offset: usize, diagnostics: &mut Diagnostics) {
        let mut header_count = 0usize;

        for (index, raw_line) in source.lines().enumerate() {
            let line = line_offset + index + 1;
            let trimmed = raw_line.trim();
            if trimmed.is_empty() || trimmed.starts_with("%%") {
                continue;
            }

            let first_word = trimmed.split_whitespace().next().unwrap_or("");
            if first_word == "flowchart" || first_word == "graph" {
                header_count += 1;
                if header_count > 1 {
                    diagnostics.error("Multiple diagram start lines in one block", Some(line));
                }
                match trimmed.split_whitespace().nth(1) {
                    Some(direction) if DIRECTIONS.contains(&direction) => {}
                    Some(direction) => diagnostics.push(
                        Diagnostic::error(format!("Invalid flow direction '{}'", direction))
                            .at_line(line)
                            .with_suggestion("use one of TD, TB, BT, RL, LR"),
                    ),
                    None => diagnostics.error("Diagram start line is missing a direction", Some(line)),
                }
                continue;
            }

            if !brackets_balanced(trimmed) {
                diagnostics.error(format!("Unbalanced brackets in '{}'", trimmed), Some(line));
            }

            if first_word == "classDef" || first_word == "class" || trimmed.contains("@{") {
                continue;
            }

            self.check_statement_names(trimmed, line, diagnostics);
        }

        if header_count == 0 {
            diagnostics.push(
                Diagnostic::error("Diagram block has no start line")
                    .at_line(line_offset + 1)
                    .with_suggestion("begin the block with 'flowchart TD' or 'graph LR'"),
            );
        }
    }

    fn check_statement_names(&self, statement: &str, line: usize, diagnostics: &mut Diagnostics) {
        match split_edge(statement) {
            Some((lhs, rhs, label)) => {
                self.check_state_name(lhs, line, diagnostics);
                self.check_state_name(rhs, line, diagnostics);
                if let Some(label) = label {
                    self.check_event_name(&label, line, diagnostics);
                }
            }
            None => self.check_state_name(statement, line, diagnostics),
        }
    }

    fn check_state_name(&self, token: &str, line: usize, diagnostics: &mut Diagnostics) {
        let token = token.trim();
        let id = match token.find(['[', '(', '{']) {
            Some(pos) => token[..pos].trim(),
            None => token,
        };
        if id.is_empty() || !identifiers::is_valid_state_id(id) {
            return;
        }
        if !identifiers::is_pascal_case(id) {
            self.convention(
                format!("State name '{}' should be PascalCase", id),
                line,
                diagnostics,
            );
        }
    }

    fn check_event_name(&self, label: &str, line: usize, diagnostics: &mut Diagnostics) {
        let display = labels::strip_annotations(label);
        if display.is_empty() {
            return;
        }
        if !identifiers::is_upper_snake(&display) {
            self.convention(
                format!("Event label '{}' should be UPPER_SNAKE_CASE", display),
                line,
                diagnostics,
            );
        }
    }

    fn convention(&self, message: String, line: usize, diagnostics: &mut Diagnostics) {
        if self.strict {
            diagnostics.error(message, Some(line));
        } else {
            diagnostics.warning(message, Some(line));
        }
    }
}

/// Split an edge statement into (lhs, rhs, label) without interpreting it
fn split_edge(statement: &str) -> Option<(&str, &str, Option<String>)> {
    let (lhs, rhs) = if let Some(idx) = statement.find("-.->") {
        (&statement[..idx], &statement[idx + 4..])
    } else if let Some(idx) = statement.find("-->") {
        (&statement[..idx], &statement[idx + 3..])
    } else if let Some(idx) = statement.find("->") {
        (&statement[..idx], &statement[idx + 2..])
    } else {
        return None;
    };

    let mut label = None;
    let mut lhs = lhs.trim();
    if let Some(idx) = lhs.find(" -- ") {
        label = Some(lhs[idx + 4..].trim().trim_matches('"').to_string());
        lhs = lhs[..idx].trim();
    }

    let mut rhs = rhs.trim();
    if let Some(rest) = rhs.strip_prefix('|') {
        if let Some(end) = rest.find('|') {
            label = Some(rest[..end].trim().to_string());
            rhs = rest[end + 1..].trim();
        }
    }

    Some((lhs, rhs, label))
}

/// Check bracket pairing within one line
fn brackets_balanced(line: &str) -> bool {
    let mut stack = Vec::new();
    for ch in line.chars() {
        match ch {
            '[' | '(' | '{' => stack.push(ch),
            ']' => {
                if stack.pop() != Some('[') {
                    return false;
                }
            }
            ')' => {
                if stack.pop() != Some('(') {
                    return false;
                }
            }
            '}' => {
                if stack.pop() != Some('{') {
                    return false;
                }
            }
            _ => {}
        }
    }
    stack.is_empty()
}
