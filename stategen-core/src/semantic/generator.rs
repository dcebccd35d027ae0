//! Semantic generation: [`ParsedMachine`] into [`GeneratedMachine`] IR

use super::naming;
use super::{ContextField, EventSpec, FieldKind, GeneratedMachine, PayloadField, StateKind, StateSpec, TransitionSpec};
use crate::diagram::{Edge, MachineCategory, ParsedMachine, TransitionKind};
use std::collections::{BTreeSet, HashSet};

/// Event name used for transitions whose edge label yields no event
const UNKNOWN_EVENT: &str = "UNKNOWN";

/// Builds the semantic IR from parsed machines.
///
/// Generation is a pure function of its input: no I/O, no shared state,
/// and the same machine always produces an identical IR.
#[derive(Debug, Default)]
pub struct SemanticGenerator;

impl SemanticGenerator {
    pub fn new() -> Self {
        Self
    }

    pub fn generate(&self, machine: &ParsedMachine) -> GeneratedMachine {
        let has_user_input = machine.edges.iter().any(|e| e.kind == TransitionKind::UserInput);
        let has_external = machine.edges.iter().any(|e| e.kind == TransitionKind::External);

        let mut guards = BTreeSet::new();
        let mut actions = BTreeSet::new();
        let mut actors = BTreeSet::new();

        let states = self.build_states(machine, &mut guards, &mut actions);
        let events = self.build_events(machine);

        actors.insert(category_actor(machine.category).to_string());
        if has_external {
            actors.insert("externalService".to_string());
        }

        let mut required_imports = vec!["setup".to_string(), "assign".to_string()];
        if !actors.is_empty() {
            required_imports.push("fromPromise".to_string());
        }

        GeneratedMachine {
            id: naming::sanitize_machine_ident(&machine.id.replace('-', "_")),
            display_name: machine.display_name.clone(),
            category: machine.category,
            context_fields: self.build_context_fields(machine, has_user_input),
            events,
            states,
            initial_state: machine.initial_node.clone(),
            guards,
            actions,
            actors,
            required_imports,
        }
    }

    fn build_context_fields(&self, machine: &ParsedMachine, has_user_input: bool) -> Vec<ContextField> {
        let mut fields = category_context_fields(machine.category);

        if machine.nodes.len() > 3 {
            fields.push(ContextField::new(
                "currentStep",
                FieldKind::Number,
                "0",
                "Position within the flow",
            ));
        }

        fields.push(
            ContextField::new("error", FieldKind::Text, "null", "Last error message, if any")
                .optional(),
        );

        if has_user_input {
            fields.push(ContextField::new(
                "lastInput",
                FieldKind::Text,
                "''",
                "Most recent user input",
            ));
        }

        fields
    }

    /// One event per distinct non-empty normalized edge label; the first
    /// edge with a given name wins, later duplicates are ignored.
    fn build_events(&self, machine: &ParsedMachine) -> Vec<EventSpec> {
        let mut seen = HashSet::new();
        let mut events = Vec::new();

        for edge in &machine.edges {
            let name = naming::normalize_event_name(&edge.label);
            if name.is_empty() || !seen.insert(name.clone()) {
                continue;
            }
            events.push(EventSpec {
                doc: format!("Raised for '{}'", edge.label),
                payload: event_payload(edge.kind),
                name,
            });
        }

        events
    }

    fn build_states(
        &self,
        machine: &ParsedMachine,
        guards: &mut BTreeSet<String>,
        actions: &mut BTreeSet<String>,
    ) -> Vec<StateSpec> {
        let category = machine.category;
        let mut states = Vec::new();

        for node in &machine.nodes {
            let is_final = machine.final_nodes.contains(&node.id);

            let mut entry_actions = vec!["trackStateEntry".to_string()];
            match category {
                MachineCategory::User => entry_actions.push("validateUserSession".to_string()),
                MachineCategory::Agent => entry_actions.push("validateAgentSession".to_string()),
                _ => {}
            }
            let exit_actions =
                if is_final { vec!["cleanupSession".to_string()] } else { Vec::new() };

            for name in entry_actions.iter().chain(exit_actions.iter()) {
                actions.insert(name.clone());
            }

            let transitions = machine
                .outgoing(&node.id)
                .into_iter()
                .map(|edge| self.build_transition(edge, category, guards, actions))
                .collect();

            states.push(StateSpec {
                name: node.id.clone(),
                kind: if is_final { StateKind::Final } else { StateKind::Normal },
                entry_actions,
                exit_actions,
                transitions,
            });
        }

        states
    }

    fn build_transition(
        &self,
        edge: &Edge,
        category: MachineCategory,
        guards: &mut BTreeSet<String>,
        actions: &mut BTreeSet<String>,
    ) -> TransitionSpec {
        let event = {
            let name = naming::normalize_event_name(&edge.label);
            if name.is_empty() { UNKNOWN_EVENT.to_string() } else { name }
        };

        // Conditional edges without an explicit guard fall back to the
        // category's default guard.
        let guard = edge.guard.clone().or_else(|| {
            (edge.kind == TransitionKind::Conditional)
                .then(|| category_guard(category).to_string())
        });
        if let Some(name) = &guard {
            guards.insert(name.clone());
        }

        let transition_actions: Vec<String> = edge.action.iter().cloned().collect();
        for name in &transition_actions {
            actions.insert(name.clone());
        }

        TransitionSpec { event, target: Some(edge.to.clone()), guard, actions: transition_actions }
    }
}

fn event_payload(kind: TransitionKind) -> Vec<PayloadField> {
    match kind {
        TransitionKind::UserInput => {
            vec![PayloadField { name: "input".to_string(), kind: FieldKind::Text, optional: false }]
        }
        TransitionKind::Error => {
            vec![PayloadField { name: "message".to_string(), kind: FieldKind::Text, optional: false }]
        }
        TransitionKind::External => {
            vec![PayloadField { name: "result".to_string(), kind: FieldKind::Opaque, optional: false }]
        }
        _ => Vec::new(),
    }
}

/// Fixed per-category context-field table
fn category_context_fields(category: MachineCategory) -> Vec<ContextField> {
    match category {
        MachineCategory::Info => vec![
            ContextField::new("phoneNumber", FieldKind::Text, "''", "Subscriber phone number"),
            ContextField::new("selectedTopic", FieldKind::Text, "''", "Topic being browsed").optional(),
        ],
        MachineCategory::User => vec![
            ContextField::new("phoneNumber", FieldKind::Text, "''", "Subscriber phone number"),
            ContextField::new("sessionId", FieldKind::Text, "''", "Session identifier"),
        ],
        MachineCategory::Agent => vec![
            ContextField::new("agentId", FieldKind::Text, "''", "Agent identifier"),
            ContextField::new("phoneNumber", FieldKind::Text, "''", "Agent phone number"),
            ContextField::new("floatBalance", FieldKind::Number, "0", "Available float"),
        ],
        MachineCategory::Account => vec![
            ContextField::new("phoneNumber", FieldKind::Text, "''", "Subscriber phone number"),
            ContextField::new("accountId", FieldKind::Text, "''", "Account identifier"),
            ContextField::new("balance", FieldKind::Number, "0", "Account balance"),
        ],
        MachineCategory::Core => vec![
            ContextField::new("sessionId", FieldKind::Text, "''", "Session identifier"),
            ContextField::new("serviceCode", FieldKind::Text, "''", "Dialed service code"),
        ],
    }
}

fn category_guard(category: MachineCategory) -> &'static str {
    match category {
        MachineCategory::Info => "hasContent",
        MachineCategory::User => "isValidSelection",
        MachineCategory::Agent => "isAuthorizedAgent",
        MachineCategory::Account => "hasSufficientBalance",
        MachineCategory::Core => "isSessionActive",
    }
}

fn category_actor(category: MachineCategory) -> &'static str {
    match category {
        MachineCategory::Info => "contentService",
        MachineCategory::User => "userService",
        MachineCategory::Agent => "agentService",
        MachineCategory::Account => "accountService",
        MachineCategory::Core => "coreService",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagram::DiagramParser;

    fn parse_one(source: &str) -> ParsedMachine {
        DiagramParser::new().parse_block(source, "Sample Flow", 0).machines.remove(0)
    }

    fn generate(source: &str) -> GeneratedMachine {
        SemanticGenerator::new().generate(&parse_one(source))
    }

    #[test]
    fn test_machine_identity() {
        let machine = generate("flowchart TD\nStart-->Menu");
        assert_eq!(machine.id, "sample_flow_machine");
        assert_eq!(machine.display_name, "Sample Flow");
        assert_eq!(machine.initial_state, "Start");
    }

    #[test]
    fn test_category_context_fields() {
        let machine = generate("flowchart TD\nStart-->Menu");
        let names: Vec<_> = machine.context_fields.iter().map(|f| f.name.as_str()).collect();
        // Default category is user: phone number + session id, plus the
        // always-present error field.
        assert_eq!(names, vec!["phoneNumber", "sessionId", "error"]);
    }

    #[test]
    fn test_current_step_threshold() {
        let small = generate("flowchart TD\nA-->B\nB-->C");
        assert!(small.context_fields.iter().all(|f| f.name != "currentStep"));

        let large = generate("flowchart TD\nA-->B\nB-->C\nC-->D");
        assert!(large.context_fields.iter().any(|f| f.name == "currentStep"));
    }

    #[test]
    fn test_last_input_field() {
        let machine = generate("flowchart TD\nMenu -->|Select option| Next");
        assert!(machine.context_fields.iter().any(|f| f.name == "lastInput"));

        let machine = generate("flowchart TD\nMenu -->|proceed| Next");
        assert!(machine.context_fields.iter().all(|f| f.name != "lastInput"));
    }

    #[test]
    fn test_event_catalog() {
        let machine =
            generate("flowchart TD\nA -->|Select option| B\nB -->|Select option| C\nC -->|fail| D");
        let names: Vec<_> = machine.events.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["SELECT_OPTION", "FAIL"]);

        let select = machine.event("SELECT_OPTION").unwrap();
        assert_eq!(select.payload.len(), 1);
        assert_eq!(select.payload[0].name, "input");
        assert_eq!(select.payload[0].kind, FieldKind::Text);

        let fail = machine.event("FAIL").unwrap();
        assert_eq!(fail.payload[0].name, "message");
    }

    #[test]
    fn test_unknown_event_for_unlabeled_edges() {
        let machine = generate("flowchart TD\nA --> B");
        let state = machine.state("A").unwrap();
        assert_eq!(state.transitions[0].event, "UNKNOWN");
        // Unlabeled edges contribute no catalog entry.
        assert!(machine.events.is_empty());
    }

    #[test]
    fn test_entry_and_exit_actions() {
        let machine = generate("flowchart TD\nStart --> Done((bye))");
        let start = machine.state("Start").unwrap();
        assert_eq!(start.entry_actions, vec!["trackStateEntry", "validateUserSession"]);
        assert!(start.exit_actions.is_empty());

        let done = machine.state("Done").unwrap();
        assert_eq!(done.kind, StateKind::Final);
        assert_eq!(done.exit_actions, vec!["cleanupSession"]);
        assert!(machine.actions.contains("cleanupSession"));
    }

    #[test]
    fn test_guard_sets() {
        let machine = generate("flowchart TD\nA -->|guard:isAdult proceed| B\nB -->|yes| C");
        assert!(machine.guards.contains("isAdult"));
        // Conditional edge without explicit guard gets the category default.
        assert!(machine.guards.contains("isValidSelection"));
        let b = machine.state("B").unwrap();
        assert_eq!(b.transitions[0].guard.as_deref(), Some("isValidSelection"));
    }

    #[test]
    fn test_actor_sets() {
        let machine = generate("flowchart TD\nA -->|verify account| B");
        assert!(machine.actors.contains("externalService"));
        assert!(machine.actors.contains("userService"));
        assert!(machine.required_imports.contains(&"fromPromise".to_string()));
    }

    #[test]
    fn test_generation_is_deterministic() {
        let parsed = parse_one("flowchart TD\nStart -->|Select one| Menu\nMenu -->|yes| Done((bye))");
        let first = SemanticGenerator::new().generate(&parsed);
        let second = SemanticGenerator::new().generate(&parsed);
        assert_eq!(first, second);
    }
}
