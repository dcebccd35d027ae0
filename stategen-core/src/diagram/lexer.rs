//! Line tokenizer for the diagram notation
//!
//! Each significant line is matched against the statement forms in a fixed
//! priority order (header, class definition, class assignment, styling
//! directive, edge, node declaration) and lowered into a typed [`Statement`].
//! Malformed statements are skipped with a diagnostic; scanning continues.

use super::model::NodeShape;
use crate::diagnostics::Diagnostics;
use regex_utils::identifiers;

/// Flow direction accepted after a diagram header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    TD,
    TB,
    BT,
    RL,
    LR,
}

impl Direction {
    pub fn parse(token: &str) -> Option<Self> {
        match token {
            "TD" => Some(Self::TD),
            "TB" => Some(Self::TB),
            "BT" => Some(Self::BT),
            "RL" => Some(Self::RL),
            "LR" => Some(Self::LR),
            _ => None,
        }
    }
}

/// A node reference on an edge endpoint, possibly carrying an inline
/// bracket declaration (`Start[Session start]`)
#[derive(Debug, Clone, PartialEq)]
pub struct NodeToken {
    pub id: String,
    pub label: Option<String>,
    pub shape: Option<NodeShape>,
}

/// One recognized diagram statement
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Header { direction: Direction },
    NodeDecl { id: String, label: Option<String>, shape: NodeShape },
    EdgeDecl { from: NodeToken, to: NodeToken, label: Option<String>, dashed: bool },
    ClassDef { name: String, styles: String },
    ClassAssign { ids: Vec<String>, class_name: String },
    StyleDirective { id: String, shape: Option<NodeShape>, class_name: Option<String> },
}

/// Tokenize diagram source into statements plus diagnostics.
///
/// `line_offset` is added to every reported line number so diagnostics can
/// point into the enclosing document.
pub fn tokenize(source: &str, line_offset: usize) -> (Vec<(usize, Statement)>, Diagnostics) {
    let mut statements = Vec::new();
    let mut diagnostics = Diagnostics::new();

    for (index, raw_line) in source.lines().enumerate() {
        let line = line_offset + index + 1;
        let trimmed = raw_line.trim();
        if trimmed.is_empty() || trimmed.starts_with("%%") {
            continue;
        }

        for piece in trimmed.split(';') {
            let statement = piece.trim();
            if statement.is_empty() {
                continue;
            }
            scan_statement(statement, line, &mut statements, &mut diagnostics);
        }
    }

    (statements, diagnostics)
}

fn scan_statement(
    statement: &str,
    line: usize,
    statements: &mut Vec<(usize, Statement)>,
    diagnostics: &mut Diagnostics,
) {
    let first_word = statement.split_whitespace().next().unwrap_or("");

    if first_word == "flowchart" || first_word == "graph" {
        let direction = statement.split_whitespace().nth(1).and_then(Direction::parse);
        match direction {
            Some(direction) => statements.push((line, Statement::Header { direction })),
            None => diagnostics.push(
                crate::diagnostics::Diagnostic::error(format!(
                    "Missing or invalid flow direction in '{}'",
                    statement
                ))
                .at_line(line)
                .with_suggestion("use one of TD, TB, BT, RL, LR"),
            ),
        }
        return;
    }

    if first_word == "classDef" {
        match parse_class_def(statement) {
            Some(parsed) => statements.push((line, parsed)),
            None => diagnostics.warning(format!("Malformed classDef statement: {}", statement), Some(line)),
        }
        return;
    }

    if first_word == "class" {
        match parse_class_assign(statement, line, diagnostics) {
            Some(parsed) => statements.push((line, parsed)),
            None => {}
        }
        return;
    }

    if statement.contains("@{") {
        match parse_style_directive(statement, line, diagnostics) {
            Some(parsed) => statements.push((line, parsed)),
            None => {}
        }
        return;
    }

    if statement.contains("->") {
        match parse_edge(statement) {
            Some((from, to, label, dashed)) => {
                if check_id(&from.id, line, diagnostics) && check_id(&to.id, line, diagnostics) {
                    statements.push((line, Statement::EdgeDecl { from, to, label, dashed }));
                }
            }
            None => {
                diagnostics.warning(format!("Unparseable edge statement: {}", statement), Some(line))
            }
        }
        return;
    }

    match parse_node_token(statement) {
        Some(token) => {
            if check_id(&token.id, line, diagnostics) {
                statements.push((
                    line,
                    Statement::NodeDecl {
                        id: token.id,
                        label: token.label,
                        shape: token.shape.unwrap_or(NodeShape::Rectangle),
                    },
                ));
            }
        }
        None => diagnostics.warning(format!("Unsupported diagram statement: {}", statement), Some(line)),
    }
}

/// Validate a state identifier, recording a syntax error on violation
fn check_id(id: &str, line: usize, diagnostics: &mut Diagnostics) -> bool {
    if identifiers::is_valid_state_id(id) {
        true
    } else {
        diagnostics.push(
            crate::diagnostics::Diagnostic::error(format!("Invalid state identifier '{}'", id))
                .at_line(line)
                .with_suggestion(
                    "identifiers must start with a letter and contain only letters, digits, '_' or '-'",
                ),
        );
        false
    }
}

/// Parse one edge statement. Surface forms, tried in priority order:
/// dashed (`A -.->|label| B`), then labeled/plain arrows (`A -->|label| B`,
/// `A -- label --> B`, `A --> B`), then the single-dash arrow (`A -> B`).
fn parse_edge(statement: &str) -> Option<(NodeToken, NodeToken, Option<String>, bool)> {
    let (lhs, rhs, dashed) = if let Some(idx) = statement.find("-.->") {
        (&statement[..idx], &statement[idx + 4..], true)
    } else if let Some(idx) = statement.find("-->") {
        (&statement[..idx], &statement[idx + 3..], false)
    } else if let Some(idx) = statement.find("->") {
        (&statement[..idx], &statement[idx + 2..], false)
    } else {
        return None;
    };

    let mut label: Option<String> = None;

    let mut lhs = lhs.trim();
    if let Some(idx) = lhs.find(" -- ") {
        let inline = lhs[idx + 4..].trim().trim_matches('"').trim();
        if !inline.is_empty() {
            label = Some(inline.to_string());
        }
        lhs = lhs[..idx].trim();
    }

    let mut rhs = rhs.trim();
    if let Some(rest) = rhs.strip_prefix('|') {
        let end = rest.find('|')?;
        let piped = rest[..end].trim();
        if !piped.is_empty() {
            label = Some(piped.to_string());
        }
        rhs = rest[end + 1..].trim();
    }

    let from = parse_node_token(lhs)?;
    let to = parse_node_token(rhs)?;
    Some((from, to, label, dashed))
}

/// Parse a node token, with or without an inline bracket declaration
fn parse_node_token(token: &str) -> Option<NodeToken> {
    let token = token.trim();
    if token.is_empty() {
        return None;
    }

    match token.find(['[', '(', '{']) {
        None => {
            if token.contains(char::is_whitespace) {
                return None;
            }
            Some(NodeToken { id: token.to_string(), label: None, shape: None })
        }
        Some(pos) => {
            let id = token[..pos].trim();
            if id.is_empty() {
                return None;
            }
            let (shape, label) = parse_bracket(&token[pos..])?;
            Some(NodeToken { id: id.to_string(), label: Some(label), shape: Some(shape) })
        }
    }
}

/// Bracket pairs carry the node shape. Two-character openers are tried
/// before their single-character prefixes.
fn parse_bracket(rest: &str) -> Option<(NodeShape, String)> {
    const PAIRS: [(&str, &str, NodeShape); 6] = [
        ("((", "))", NodeShape::Circle),
        ("([", "])", NodeShape::Stadium),
        ("{{", "}}", NodeShape::Hexagon),
        ("[", "]", NodeShape::Rectangle),
        ("(", ")", NodeShape::Rounded),
        ("{", "}", NodeShape::Diamond),
    ];

    for (open, close, shape) in PAIRS {
        if rest.starts_with(open) && rest.ends_with(close) && rest.len() >= open.len() + close.len()
        {
            let inner = rest[open.len()..rest.len() - close.len()].trim().trim_matches('"');
            return Some((shape, inner.to_string()));
        }
    }
    None
}

fn parse_class_def(statement: &str) -> Option<Statement> {
    let rest = statement.strip_prefix("classDef")?.trim();
    let (name, styles) = match rest.split_once(char::is_whitespace) {
        Some((name, styles)) => (name, styles.trim()),
        None if !rest.is_empty() => (rest, ""),
        None => return None,
    };
    Some(Statement::ClassDef { name: name.to_string(), styles: styles.to_string() })
}

fn parse_class_assign(
    statement: &str,
    line: usize,
    diagnostics: &mut Diagnostics,
) -> Option<Statement> {
    let rest = statement.strip_prefix("class")?.trim();
    let (ids_part, class_name) = rest.rsplit_once(char::is_whitespace)?;

    let mut ids = Vec::new();
    for id in ids_part.split(',') {
        let id = id.trim();
        if id.is_empty() {
            continue;
        }
        if !check_id(id, line, diagnostics) {
            return None;
        }
        ids.push(id.to_string());
    }
    if ids.is_empty() {
        diagnostics.warning(format!("class statement names no nodes: {}", statement), Some(line));
        return None;
    }

    Some(Statement::ClassAssign { ids, class_name: class_name.trim().to_string() })
}

/// Node styling directive: `id@{ shape: stadium, class: user-machine }`
fn parse_style_directive(
    statement: &str,
    line: usize,
    diagnostics: &mut Diagnostics,
) -> Option<Statement> {
    let idx = statement.find("@{")?;
    let id = statement[..idx].trim();
    if !check_id(id, line, diagnostics) {
        return None;
    }

    let body = match statement[idx + 2..].trim().strip_suffix('}') {
        Some(body) => body.trim(),
        None => {
            diagnostics.warning(format!("Unterminated styling directive: {}", statement), Some(line));
            return None;
        }
    };

    let mut shape = None;
    let mut class_name = None;
    for part in body.split(',') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        let Some((key, value)) = part.split_once(':') else {
            diagnostics.warning(format!("Malformed styling entry '{}' in directive", part), Some(line));
            continue;
        };
        match key.trim() {
            "shape" => {
                shape = NodeShape::from_name(value.trim());
                if shape.is_none() {
                    diagnostics.warning(format!("Unknown shape '{}' in directive", value.trim()), Some(line));
                }
            }
            "class" => class_name = Some(value.trim().to_string()),
            other => {
                diagnostics.warning(format!("Unknown styling key '{}' in directive", other), Some(line))
            }
        }
    }

    Some(Statement::StyleDirective { id: id.to_string(), shape, class_name })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn single(source: &str) -> Statement {
        let (statements, diagnostics) = tokenize(source, 0);
        assert!(!diagnostics.has_errors(), "unexpected errors: {:?}", diagnostics);
        assert_eq!(statements.len(), 1, "expected one statement from {:?}", source);
        statements.into_iter().next().unwrap().1
    }

    #[test]
    fn test_header_directions() {
        assert!(matches!(single("flowchart TD"), Statement::Header { direction: Direction::TD }));
        assert!(matches!(single("graph LR"), Statement::Header { direction: Direction::LR }));

        let (statements, diagnostics) = tokenize("flowchart XX", 0);
        assert!(statements.is_empty());
        assert_eq!(diagnostics.error_count(), 1);
    }

    #[test]
    fn test_edge_forms() {
        match single("Start -->|Select option| Menu") {
            Statement::EdgeDecl { from, to, label, dashed } => {
                assert_eq!(from.id, "Start");
                assert_eq!(to.id, "Menu");
                assert_eq!(label.as_deref(), Some("Select option"));
                assert!(!dashed);
            }
            other => panic!("unexpected statement: {:?}", other),
        }

        match single("Check -.->|yes| Done") {
            Statement::EdgeDecl { label, dashed, .. } => {
                assert_eq!(label.as_deref(), Some("yes"));
                assert!(dashed);
            }
            other => panic!("unexpected statement: {:?}", other),
        }

        match single("A -- timeout --> B") {
            Statement::EdgeDecl { from, to, label, .. } => {
                assert_eq!(from.id, "A");
                assert_eq!(to.id, "B");
                assert_eq!(label.as_deref(), Some("timeout"));
            }
            other => panic!("unexpected statement: {:?}", other),
        }

        assert!(matches!(single("A --> B"), Statement::EdgeDecl { label: None, .. }));
        assert!(matches!(single("A -> B"), Statement::EdgeDecl { label: None, .. }));
    }

    #[test]
    fn test_edge_with_inline_declarations() {
        match single("Start[Session start] --> Choice{Registered?}") {
            Statement::EdgeDecl { from, to, .. } => {
                assert_eq!(from.label.as_deref(), Some("Session start"));
                assert_eq!(from.shape, Some(NodeShape::Rectangle));
                assert_eq!(to.shape, Some(NodeShape::Diamond));
            }
            other => panic!("unexpected statement: {:?}", other),
        }
    }

    #[test]
    fn test_node_shapes() {
        assert!(matches!(
            single("End((Goodbye))"),
            Statement::NodeDecl { shape: NodeShape::Circle, .. }
        ));
        assert!(matches!(
            single("Hold([Waiting])"),
            Statement::NodeDecl { shape: NodeShape::Stadium, .. }
        ));
        assert!(matches!(
            single("Prep{{Prepare}}"),
            Statement::NodeDecl { shape: NodeShape::Hexagon, .. }
        ));
        assert!(matches!(
            single("Menu(Main menu)"),
            Statement::NodeDecl { shape: NodeShape::Rounded, .. }
        ));
    }

    #[test]
    fn test_class_statements() {
        match single("classDef user-machine fill:#fff,stroke:#333") {
            Statement::ClassDef { name, styles } => {
                assert_eq!(name, "user-machine");
                assert_eq!(styles, "fill:#fff,stroke:#333");
            }
            other => panic!("unexpected statement: {:?}", other),
        }

        match single("class Start,Process user-machine") {
            Statement::ClassAssign { ids, class_name } => {
                assert_eq!(ids, vec!["Start".to_string(), "Process".to_string()]);
                assert_eq!(class_name, "user-machine");
            }
            other => panic!("unexpected statement: {:?}", other),
        }
    }

    #[test]
    fn test_style_directive() {
        match single("Wait@{ shape: stadium, class: agent-machine }") {
            Statement::StyleDirective { id, shape, class_name } => {
                assert_eq!(id, "Wait");
                assert_eq!(shape, Some(NodeShape::Stadium));
                assert_eq!(class_name.as_deref(), Some("agent-machine"));
            }
            other => panic!("unexpected statement: {:?}", other),
        }
    }

    #[test]
    fn test_invalid_identifier_is_error() {
        let (statements, diagnostics) = tokenize("1bad[Oops]", 0);
        assert!(statements.is_empty());
        assert_eq!(diagnostics.error_count(), 1);
        assert!(diagnostics.iter().next().unwrap().message.contains("1bad"));
    }

    #[test]
    fn test_unsupported_statement_is_warning() {
        let (statements, diagnostics) = tokenize("subgraph cluster", 0);
        assert!(statements.is_empty());
        assert_eq!(diagnostics.warning_count(), 1);
        assert_eq!(diagnostics.error_count(), 0);
    }

    #[test]
    fn test_multiple_statements_per_line() {
        let (statements, _) = tokenize("A --> B; B --> C", 0);
        assert_eq!(statements.len(), 2);
    }

    #[test]
    fn test_line_offset_applied() {
        let (statements, _) = tokenize("A --> B", 10);
        assert_eq!(statements[0].0, 11);
    }

    #[test]
    fn test_guard_annotations_kept_raw() {
        match single("Age -->|guard:isAdult do:logAccess| Granted") {
            Statement::EdgeDecl { label, .. } => {
                assert_eq!(label.as_deref(), Some("guard:isAdult do:logAccess"));
            }
            other => panic!("unexpected statement: {:?}", other),
        }
    }
}
