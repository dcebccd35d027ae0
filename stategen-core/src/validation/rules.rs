//! Business-rule validation of assembled machines
//!
//! Operates on a validator-facing view of the machine rather than the
//! parser's own types, so the checks stay decoupled from parsing details.

use super::ValidationReport;
use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::diagram::{MachineCategory, ParsedMachine};
use std::collections::{HashMap, HashSet, VecDeque};

/// Business-rule validator with configurable soft ceilings
#[derive(Debug, Clone)]
pub struct BusinessRuleValidator {
    max_states: usize,
    max_transitions_per_state: usize,
}

impl Default for BusinessRuleValidator {
    fn default() -> Self {
        Self { max_states: 50, max_transitions_per_state: 20 }
    }
}

impl BusinessRuleValidator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limits(max_states: usize, max_transitions_per_state: usize) -> Self {
        Self { max_states, max_transitions_per_state }
    }

    /// Validate one machine
    pub fn validate_machine(&self, machine: &ParsedMachine) -> ValidationReport {
        let view = MachineView::from(machine);
        let mut diagnostics = Diagnostics::new();

        self.check_metadata(&view, &mut diagnostics);
        self.check_sizes(&view, &mut diagnostics);
        self.check_states(&view, &mut diagnostics);
        self.check_edges(&view, &mut diagnostics);
        self.check_reachability(&view, &mut diagnostics);
        self.check_category_heuristics(&view, &mut diagnostics);

        ValidationReport::from_diagnostics(diagnostics)
    }

    /// Validate a batch: every machine individually plus cross-machine rules
    pub fn validate_batch(&self, machines: &[ParsedMachine]) -> ValidationReport {
        let mut report = ValidationReport::default();
        for machine in machines {
            report = report.merge(self.validate_machine(machine));
        }
        report.merge(self.validate_cross_machine(machines))
    }

    /// Cross-machine rules only: name collisions and batch composition
    pub fn validate_cross_machine(&self, machines: &[ParsedMachine]) -> ValidationReport {
        let mut diagnostics = Diagnostics::new();

        let mut seen = HashSet::new();
        for machine in machines {
            if !seen.insert(machine.id.clone()) {
                diagnostics.error(format!("Duplicate machine name '{}'", machine.id), None);
            }
        }

        let has_entry_machine = machines
            .iter()
            .any(|m| matches!(m.category, MachineCategory::User | MachineCategory::Core));
        if !machines.is_empty() && !has_entry_machine {
            diagnostics.warning("Batch contains no user or core category machine", None);
        }

        ValidationReport::from_diagnostics(diagnostics)
    }

    fn check_metadata(&self, view: &MachineView, diagnostics: &mut Diagnostics) {
        if view.id.is_empty() {
            diagnostics.error("Machine is missing an identifier", None);
        }
        if view.display_name.is_empty() {
            diagnostics.error(format!("Machine '{}' is missing a display name", view.id), None);
        }
        if !MachineCategory::ALL.iter().any(|c| c.as_str() == view.category) {
            diagnostics.error(
                format!("Machine '{}' has unknown category '{}'", view.id, view.category),
                None,
            );
        }
    }

    fn check_sizes(&self, view: &MachineView, diagnostics: &mut Diagnostics) {
        if view.states.len() > self.max_states {
            diagnostics.warning(
                format!(
                    "Machine '{}' declares {} states (recommended maximum {})",
                    view.id,
                    view.states.len(),
                    self.max_states
                ),
                None,
            );
        }
        for state in &view.states {
            let outgoing = view.outgoing_count(&state.name);
            if outgoing > self.max_transitions_per_state {
                diagnostics.warning(
                    format!(
                        "State '{}' has {} outgoing transitions (recommended maximum {})",
                        state.name, outgoing, self.max_transitions_per_state
                    ),
                    Some(state.line),
                );
            }
        }
    }

    fn check_states(&self, view: &MachineView, diagnostics: &mut Diagnostics) {
        let mut seen = HashSet::new();
        for state in &view.states {
            if !seen.insert(state.name) {
                diagnostics.error(format!("Duplicate state name '{}'", state.name), Some(state.line));
            }
        }

        if !view.states.iter().any(|s| s.name == view.initial) {
            diagnostics.error(
                format!("Initial state '{}' is not declared", view.initial),
                None,
            );
        }

        for state in &view.states {
            let outgoing = view.outgoing_count(&state.name);
            if state.is_final && outgoing > 0 {
                diagnostics.error(
                    format!("Final state '{}' has outgoing transitions", state.name),
                    Some(state.line),
                );
            }
            if !state.is_final && outgoing == 0 {
                diagnostics.push(
                    Diagnostic::warning(format!(
                        "Dead-end state '{}' has no outgoing transitions",
                        state.name
                    ))
                    .at_line(state.line)
                    .with_suggestion("add a transition or mark the state final"),
                );
            }
        }
    }

    fn check_edges(&self, view: &MachineView, diagnostics: &mut Diagnostics) {
        let declared: HashSet<&str> = view.states.iter().map(|s| s.name).collect();
        for edge in &view.edges {
            if !declared.contains(edge.to) {
                diagnostics.error(
                    format!("Transition target '{}' does not resolve to a state", edge.to),
                    Some(edge.line),
                );
            }
        }
    }

    /// Forward reachability from the initial state
    fn check_reachability(&self, view: &MachineView, diagnostics: &mut Diagnostics) {
        let mut adjacency: HashMap<&str, Vec<&str>> = HashMap::new();
        for edge in &view.edges {
            adjacency.entry(edge.from).or_default().push(edge.to);
        }

        let mut reachable = HashSet::new();
        let mut queue = VecDeque::new();
        reachable.insert(view.initial);
        queue.push_back(view.initial);
        while let Some(current) = queue.pop_front() {
            for &next in adjacency.get(current).into_iter().flatten() {
                if reachable.insert(next) {
                    queue.push_back(next);
                }
            }
        }

        for state in &view.states {
            if !reachable.contains(state.name) {
                diagnostics.warning(
                    format!("State '{}' is unreachable from the initial state", state.name),
                    Some(state.line),
                );
            }
        }
    }

    fn check_category_heuristics(&self, view: &MachineView, diagnostics: &mut Diagnostics) {
        let matches_any = |keywords: &[&str]| {
            view.states.iter().any(|state| {
                let id = state.name.to_lowercase();
                let label = state.label.to_lowercase();
                keywords.iter().any(|k| id.contains(k) || label.contains(k))
            })
        };

        match view.category {
            "user" => {
                if !matches_any(&["auth", "login", "pin", "register", "verify"]) {
                    diagnostics.warning(
                        format!("User machine '{}' has no authentication-like state", view.id),
                        None,
                    );
                }
                if !matches_any(&["menu", "option", "select"]) {
                    diagnostics.warning(
                        format!("User machine '{}' has no menu-like state", view.id),
                        None,
                    );
                }
            }
            "agent" => {
                if !matches_any(&["auth", "login", "pin", "verify"]) {
                    diagnostics.warning(
                        format!("Agent machine '{}' has no authentication-like state", view.id),
                        None,
                    );
                }
            }
            _ => {}
        }
    }
}

/// Validator-facing view of an assembled machine
struct MachineView<'a> {
    id: &'a str,
    display_name: &'a str,
    category: &'a str,
    initial: &'a str,
    states: Vec<StateView<'a>>,
    edges: Vec<EdgeView<'a>>,
}

struct StateView<'a> {
    name: &'a str,
    label: &'a str,
    is_final: bool,
    line: usize,
}

struct EdgeView<'a> {
    from: &'a str,
    to: &'a str,
    line: usize,
}

impl<'a> From<&'a ParsedMachine> for MachineView<'a> {
    fn from(machine: &'a ParsedMachine) -> Self {
        Self {
            id: &machine.id,
            display_name: &machine.display_name,
            category: machine.category.as_str(),
            initial: &machine.initial_node,
            states: machine
                .nodes
                .iter()
                .map(|n| StateView {
                    name: &n.id,
                    label: &n.label,
                    is_final: n.is_final,
                    line: n.line,
                })
                .collect(),
            edges: machine
                .edges
                .iter()
                .map(|e| EdgeView { from: &e.from, to: &e.to, line: e.line })
                .collect(),
        }
    }
}

impl<'a> MachineView<'a> {
    fn outgoing_count(&self, state: &str) -> usize {
        self.edges.iter().filter(|e| e.from == state).count()
    }
}
