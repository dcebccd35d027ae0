//! Graph assembly: typed statements into complete [`ParsedMachine`] values
//!
//! Class assignments and styling directives are applied after the node and
//! edge pass so they tag nodes regardless of declaration order.

use super::lexer::Statement;
use super::model::{Edge, MachineCategory, Node, NodeShape, ParsedMachine, TransitionKind};
use crate::diagnostics::Diagnostics;
use regex_utils::labels;
use std::collections::{BTreeSet, HashMap, HashSet};

/// Node ids that win the initial-state election, in declaration order
const INITIAL_NAMES: [&str; 4] = ["start", "idle", "initial", "begin"];

/// Label keywords that mark a node as final
const FINAL_KEYWORDS: [&str; 6] = ["end", "final", "close", "exit", "goodbye", "session"];

/// Assemble one machine from the statements of a single diagram block.
///
/// `name_hint` supplies the display name (document heading or file stem);
/// the machine id is its slug. Diagnostics are appended to `diagnostics`.
pub fn assemble(
    name_hint: &str,
    block_line: usize,
    statements: Vec<(usize, Statement)>,
    diagnostics: &mut Diagnostics,
) -> ParsedMachine {
    let mut builder = GraphBuilder::default();

    for (line, statement) in statements {
        match statement {
            Statement::Header { .. } => {}
            Statement::NodeDecl { id, label, shape } => {
                builder.declare_node(id, label, shape, line, diagnostics)
            }
            Statement::EdgeDecl { from, to, label, dashed } => {
                builder.declare_edge(from, to, label, dashed, line)
            }
            Statement::ClassDef { name, .. } => {
                builder.class_defs.insert(name);
            }
            Statement::ClassAssign { ids, class_name } => {
                builder.pending_assigns.push((line, ids, class_name))
            }
            Statement::StyleDirective { id, shape, class_name } => {
                builder.pending_styles.push((line, id, shape, class_name))
            }
        }
    }

    builder.apply_class_assignments(diagnostics);
    builder.apply_style_directives(diagnostics);

    if builder.nodes.is_empty() {
        // Detected block with no parseable nodes still yields one machine,
        // so downstream tooling always has something to validate against.
        diagnostics.warning(
            format!("Diagram block for '{}' contained no nodes; generated a placeholder machine", name_hint),
            Some(block_line),
        );
        let mut placeholder = Node::new("Placeholder", block_line);
        placeholder.is_initial = true;
        builder.nodes.push(placeholder);
    }

    builder.finish(name_hint)
}

#[derive(Default)]
struct GraphBuilder {
    nodes: Vec<Node>,
    index: HashMap<String, usize>,
    explicit: HashSet<String>,
    edges: Vec<Edge>,
    class_defs: HashSet<String>,
    pending_assigns: Vec<(usize, Vec<String>, String)>,
    pending_styles: Vec<(usize, String, Option<NodeShape>, Option<String>)>,
}

impl GraphBuilder {
    fn ensure_node(&mut self, id: &str, line: usize) -> usize {
        if let Some(&idx) = self.index.get(id) {
            return idx;
        }
        let idx = self.nodes.len();
        self.nodes.push(Node::new(id, line));
        self.index.insert(id.to_string(), idx);
        idx
    }

    fn declare_node(
        &mut self,
        id: String,
        label: Option<String>,
        shape: NodeShape,
        line: usize,
        diagnostics: &mut Diagnostics,
    ) {
        if self.explicit.contains(&id) {
            diagnostics.warning(
                format!("Duplicate declaration of node '{}'; keeping the first definition", id),
                Some(line),
            );
            return;
        }
        let idx = self.ensure_node(&id, line);
        let node = &mut self.nodes[idx];
        if let Some(label) = label {
            if !label.is_empty() {
                node.label = label;
            }
        }
        node.shape = shape;
        self.explicit.insert(id);
    }

    fn declare_edge(
        &mut self,
        from: super::lexer::NodeToken,
        to: super::lexer::NodeToken,
        label: Option<String>,
        dashed: bool,
        line: usize,
    ) {
        for token in [&from, &to] {
            let idx = self.ensure_node(&token.id, line);
            // Inline bracket declarations fill in label/shape without the
            // duplicate-declaration warning.
            if !self.explicit.contains(&token.id) {
                if let Some(label) = &token.label {
                    if !label.is_empty() {
                        self.nodes[idx].label = label.clone();
                    }
                }
                if let Some(shape) = token.shape {
                    self.nodes[idx].shape = shape;
                    self.explicit.insert(token.id.clone());
                }
            }
        }

        let label = label.unwrap_or_default();
        self.edges.push(Edge {
            from: from.id,
            to: to.id,
            kind: classify_transition(&label, dashed),
            guard: labels::extract_guard(&label),
            action: labels::extract_action(&label),
            label,
            line,
        });
    }

    fn apply_class_assignments(&mut self, diagnostics: &mut Diagnostics) {
        let assigns = std::mem::take(&mut self.pending_assigns);
        for (line, ids, class_name) in assigns {
            if !self.class_defs.contains(&class_name) {
                diagnostics.warning(
                    format!("Class '{}' assigned but never defined with classDef", class_name),
                    Some(line),
                );
            }
            for id in ids {
                match self.index.get(&id) {
                    Some(&idx) => {
                        let classes = &mut self.nodes[idx].css_classes;
                        if !classes.contains(&class_name) {
                            classes.push(class_name.clone());
                        }
                    }
                    None => diagnostics.warning(
                        format!("Class assignment references unknown node '{}'", id),
                        Some(line),
                    ),
                }
            }
        }
    }

    fn apply_style_directives(&mut self, diagnostics: &mut Diagnostics) {
        let styles = std::mem::take(&mut self.pending_styles);
        for (line, id, shape, class_name) in styles {
            match self.index.get(&id) {
                Some(&idx) => {
                    let node = &mut self.nodes[idx];
                    if let Some(shape) = shape {
                        node.shape = shape;
                    }
                    if let Some(class_name) = class_name {
                        if !node.css_classes.contains(&class_name) {
                            node.css_classes.push(class_name);
                        }
                    }
                }
                None => diagnostics.warning(
                    format!("Styling directive references unknown node '{}'", id),
                    Some(line),
                ),
            }
        }
    }

    fn finish(mut self, name_hint: &str) -> ParsedMachine {
        // Final inference: keyword in label (case-sensitive, so a bare
        // "End" node is not auto-finalized), or circle shape.
        for node in &mut self.nodes {
            node.is_final = node.shape == NodeShape::Circle
                || FINAL_KEYWORDS.iter().any(|keyword| node.label.contains(keyword));
        }

        let initial_node = self
            .nodes
            .iter()
            .find(|n| INITIAL_NAMES.contains(&n.id.to_lowercase().as_str()))
            .or_else(|| self.nodes.first())
            .map(|n| n.id.clone())
            .unwrap_or_default();
        for node in &mut self.nodes {
            node.is_initial = node.id == initial_node;
        }

        let final_nodes: BTreeSet<String> =
            self.nodes.iter().filter(|n| n.is_final).map(|n| n.id.clone()).collect();

        ParsedMachine {
            id: slugify(name_hint),
            display_name: name_hint.to_string(),
            category: dominant_category(&self.nodes),
            nodes: self.nodes,
            edges: self.edges,
            initial_node,
            final_nodes,
        }
    }
}

/// Transition kind from keyword presence in the label, fixed priority.
/// A dashed edge whose label matches no keyword defaults to conditional.
fn classify_transition(label: &str, dashed: bool) -> TransitionKind {
    let lower = label.to_lowercase();
    if lower.contains("input") || lower.contains("select") {
        TransitionKind::UserInput
    } else if lower.contains("error") || lower.contains("fail") {
        TransitionKind::Error
    } else if lower.contains("timeout") {
        TransitionKind::Timeout
    } else if lower.contains("verify") || lower.contains("check") {
        TransitionKind::External
    } else if lower.contains("yes") || lower.contains("no") || lower.contains("if") {
        TransitionKind::Conditional
    } else if dashed {
        TransitionKind::Conditional
    } else {
        TransitionKind::SystemAction
    }
}

/// Dominant category across node class tags; ties go to the earliest tag,
/// no tags means the default category.
fn dominant_category(nodes: &[Node]) -> MachineCategory {
    let mut counts: HashMap<MachineCategory, usize> = HashMap::new();
    let mut order: Vec<MachineCategory> = Vec::new();

    for node in nodes {
        for tag in &node.css_classes {
            if let Some(category) = MachineCategory::from_tag(tag) {
                *counts.entry(category).or_insert(0) += 1;
                if !order.contains(&category) {
                    order.push(category);
                }
            }
        }
    }

    let mut best: Option<(MachineCategory, usize)> = None;
    for category in order {
        let count = counts[&category];
        // Strictly greater, so ties keep the earliest tag.
        if best.map(|(_, best_count)| count > best_count).unwrap_or(true) {
            best = Some((category, count));
        }
    }
    best.map(|(category, _)| category).unwrap_or_default()
}

/// Kebab-case slug for machine ids
pub fn slugify(name: &str) -> String {
    let mut slug = String::new();
    let mut last_dash = true;
    for ch in name.chars() {
        if ch.is_ascii_alphanumeric() {
            slug.push(ch.to_ascii_lowercase());
            last_dash = false;
        } else if !last_dash {
            slug.push('-');
            last_dash = true;
        }
    }
    let slug = slug.trim_end_matches('-').to_string();
    if slug.is_empty() { "machine".to_string() } else { slug }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagram::lexer::tokenize;

    fn assemble_source(source: &str) -> (ParsedMachine, Diagnostics) {
        let (statements, mut diagnostics) = tokenize(source, 0);
        let machine = assemble("Test Flow", 1, statements, &mut diagnostics);
        (machine, diagnostics)
    }

    #[test]
    fn test_basic_flow() {
        let (machine, diagnostics) =
            assemble_source("flowchart LR\nStart-->Process\nProcess-->|DONE|End");
        assert!(!diagnostics.has_errors());
        assert_eq!(machine.nodes.len(), 3);
        assert_eq!(machine.edges.len(), 2);
        assert_eq!(machine.initial_node, "Start");
        // "End" matches no keyword (matching is case-sensitive) and has no
        // circle shape: nothing is auto-finalized.
        assert!(machine.final_nodes.is_empty());
    }

    #[test]
    fn test_category_from_class_assignment() {
        let (machine, _) = assemble_source(
            "flowchart TD\nclassDef user-machine fill:#fff\nStart-->Process\nclass Start,Process user-machine",
        );
        assert_eq!(machine.category, MachineCategory::User);
    }

    #[test]
    fn test_default_category() {
        let (machine, _) = assemble_source("flowchart TD\nA-->B");
        assert_eq!(machine.category, MachineCategory::User);
    }

    #[test]
    fn test_dominant_category_wins() {
        let (machine, _) = assemble_source(
            "flowchart TD\nclassDef agent-style fill:#fff\nclassDef core-style fill:#000\nA-->B\nB-->C\nclass A,B agent-style\nclass C core-style",
        );
        assert_eq!(machine.category, MachineCategory::Agent);
    }

    #[test]
    fn test_guard_and_action_extraction() {
        let (machine, _) =
            assemble_source("flowchart TD\nAge -->|guard:isAdult do:logAccess| Granted");
        let edge = &machine.edges[0];
        assert_eq!(edge.guard.as_deref(), Some("isAdult"));
        assert_eq!(edge.action.as_deref(), Some("logAccess"));
        assert_eq!(edge.label, "guard:isAdult do:logAccess");
    }

    #[test]
    fn test_transition_classification() {
        let (machine, _) = assemble_source(
            "flowchart TD\nA -->|Enter input| B\nB -->|on error| C\nC -->|timeout| D\nD -->|verify balance| E\nE -->|yes| F\nF -->|proceed| G\nG -.-> H",
        );
        let kinds: Vec<TransitionKind> = machine.edges.iter().map(|e| e.kind).collect();
        assert_eq!(
            kinds,
            vec![
                TransitionKind::UserInput,
                TransitionKind::Error,
                TransitionKind::Timeout,
                TransitionKind::External,
                TransitionKind::Conditional,
                TransitionKind::SystemAction,
                TransitionKind::Conditional,
            ]
        );
    }

    #[test]
    fn test_final_inference() {
        let (machine, _) =
            assemble_source("flowchart TD\nBegin --> Done((Bye))\nBegin --> Farewell[say goodbye]");
        assert!(machine.final_nodes.contains("Done"));
        assert!(machine.final_nodes.contains("Farewell"));
        assert!(!machine.final_nodes.contains("Begin"));
        // Capitalized keyword text does not match.
        let (machine, _) = assemble_source("flowchart TD\nBegin --> Wrap[Goodbye]");
        assert!(!machine.final_nodes.contains("Wrap"));
    }

    #[test]
    fn test_initial_election_reserved_names() {
        let (machine, _) = assemble_source("flowchart TD\nMenu --> Idle\nIdle --> Menu");
        assert_eq!(machine.initial_node, "Idle");

        let (machine, _) = assemble_source("flowchart TD\nMenu --> Other");
        assert_eq!(machine.initial_node, "Menu");
    }

    #[test]
    fn test_duplicate_declaration_keeps_first() {
        let (machine, diagnostics) =
            assemble_source("flowchart TD\nMenu[Main menu]\nMenu[Other label]");
        assert_eq!(diagnostics.warning_count(), 1);
        assert_eq!(machine.node("Menu").unwrap().label, "Main menu");
    }

    #[test]
    fn test_style_directive_overrides_shape() {
        let (machine, _) =
            assemble_source("flowchart TD\nWrap[Finish] --> Menu\nWrap@{ shape: circle }");
        assert_eq!(machine.node("Wrap").unwrap().shape, NodeShape::Circle);
        assert!(machine.final_nodes.contains("Wrap"));
    }

    #[test]
    fn test_placeholder_machine_for_empty_block() {
        let (machine, diagnostics) = assemble_source("flowchart TD\n%% nothing here");
        assert_eq!(machine.nodes.len(), 1);
        assert_eq!(machine.nodes[0].id, "Placeholder");
        assert_eq!(machine.initial_node, "Placeholder");
        assert!(diagnostics.warning_count() >= 1);
    }

    #[test]
    fn test_edge_endpoints_auto_created() {
        let (machine, diagnostics) = assemble_source("flowchart TD\nA --> B");
        assert!(!diagnostics.has_errors());
        assert!(machine.node("A").is_some());
        assert!(machine.node("B").is_some());
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("User Registration"), "user-registration");
        assert_eq!(slugify("  Wallet / Top-Up  "), "wallet-top-up");
        assert_eq!(slugify("***"), "machine");
    }
}
