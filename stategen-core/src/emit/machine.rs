//! Machine module emitter
//!
//! Renders the IR into a runnable state-machine module. The target text is
//! XState-flavored TypeScript; guard and action bodies are scaffolds the
//! consuming service fills in.

use super::{Emitter, EmitterKind, codegen};
use crate::semantic::{GeneratedMachine, StateKind, StateSpec, naming};
use anyhow::Result;
use std::collections::BTreeMap;
use std::fmt::Write;

pub struct MachineEmitter;

impl MachineEmitter {
    pub fn new() -> Self {
        Self
    }

    fn render_context_interface(&self, machine: &GeneratedMachine, base: &str) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "export interface {}Context {{", base);
        for field in &machine.context_fields {
            let _ = writeln!(out, "  /** {} */", field.doc);
            let suffix = if field.optional { " | null" } else { "" };
            let _ = writeln!(out, "  {}: {}{};", field.name, field.kind.ts_type(), suffix);
        }
        out.push_str("}\n");
        out
    }

    fn render_event_type(&self, machine: &GeneratedMachine, base: &str) -> String {
        let mut variants = Vec::new();
        for event in &machine.events {
            let mut fields = vec![format!("type: {}", codegen::ts_string(&event.name))];
            for payload in &event.payload {
                let optional = if payload.optional { "?" } else { "" };
                fields.push(format!("{}{}: {}", payload.name, optional, payload.kind.ts_type()));
            }
            variants.push(format!("  | {{ {} }}", fields.join("; ")));
        }
        for name in extra_event_names(machine) {
            variants.push(format!("  | {{ type: {} }}", codegen::ts_string(&name)));
        }

        if variants.is_empty() {
            format!("export type {}Event = never;\n", base)
        } else {
            format!("export type {}Event =\n{};\n", base, variants.join("\n"))
        }
    }

    fn render_guards(&self, machine: &GeneratedMachine) -> String {
        let mut out = String::new();
        for guard in &machine.guards {
            let _ = writeln!(out, "    {}: () => {{", guard);
            let _ = writeln!(out, "      // TODO: replace with the real {} check", guard);
            let _ = writeln!(out, "      return true;");
            let _ = writeln!(out, "    }},");
        }
        out
    }

    fn render_actions(&self, machine: &GeneratedMachine) -> String {
        let mut out = String::new();
        for action in &machine.actions {
            match action.as_str() {
                "trackStateEntry" => {
                    let _ = writeln!(out, "    trackStateEntry: ({{ context }}) => {{");
                    let _ = writeln!(
                        out,
                        "      console.debug({}, context);",
                        codegen::ts_string(&format!("[{}] state entry", machine.id))
                    );
                    let _ = writeln!(out, "    }},");
                }
                "cleanupSession" => {
                    let _ = writeln!(out, "    cleanupSession: assign({{ error: () => null }}),");
                }
                name => {
                    let _ = writeln!(out, "    {}: () => {{", name);
                    let _ = writeln!(out, "      // TODO: implement the {} action", name);
                    let _ = writeln!(out, "    }},");
                }
            }
        }
        out
    }

    fn render_actors(&self, machine: &GeneratedMachine) -> String {
        let mut out = String::new();
        for actor in &machine.actors {
            let _ = writeln!(out, "    {}: fromPromise(async () => ({{}})),", actor);
        }
        out
    }

    fn render_context_init(&self, machine: &GeneratedMachine) -> String {
        let mut out = String::from("  context: {\n");
        for field in &machine.context_fields {
            let _ = writeln!(out, "    {}: {},", field.name, field.default);
        }
        out.push_str("  },\n");
        out
    }

    fn render_state(&self, state: &StateSpec) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "    {}: {{", state.name);
        match state.kind {
            StateKind::Final => out.push_str("      type: 'final',\n"),
            StateKind::Parallel => out.push_str("      type: 'parallel',\n"),
            StateKind::Normal | StateKind::Compound => {}
        }
        if !state.entry_actions.is_empty() {
            let _ = writeln!(out, "      entry: [{}],", quote_list(&state.entry_actions));
        }
        if !state.exit_actions.is_empty() {
            let _ = writeln!(out, "      exit: [{}],", quote_list(&state.exit_actions));
        }

        if !state.transitions.is_empty() {
            out.push_str("      on: {\n");
            // Transitions sharing an event render as a guarded candidate list.
            let mut by_event: BTreeMap<&str, Vec<String>> = BTreeMap::new();
            let mut event_order: Vec<&str> = Vec::new();
            for transition in &state.transitions {
                let mut parts = Vec::new();
                if let Some(target) = &transition.target {
                    parts.push(format!("target: {}", codegen::ts_string(target)));
                }
                if let Some(guard) = &transition.guard {
                    parts.push(format!("guard: {}", codegen::ts_string(guard)));
                }
                if !transition.actions.is_empty() {
                    parts.push(format!("actions: [{}]", quote_list(&transition.actions)));
                }
                if !event_order.contains(&transition.event.as_str()) {
                    event_order.push(&transition.event);
                }
                by_event
                    .entry(&transition.event)
                    .or_default()
                    .push(format!("{{ {} }}", parts.join(", ")));
            }
            for event in event_order {
                let candidates = &by_event[event];
                if candidates.len() == 1 {
                    let _ = writeln!(out, "        {}: {},", event, candidates[0]);
                } else {
                    let _ = writeln!(out, "        {}: [{}],", event, candidates.join(", "));
                }
            }
            out.push_str("      },\n");
        }

        out.push_str("    },\n");
        out
    }
}

impl Emitter for MachineEmitter {
    fn kind(&self) -> EmitterKind {
        EmitterKind::Machine
    }

    fn render(&self, machine: &GeneratedMachine) -> Result<String> {
        let base = naming::type_base_name(&machine.id);
        let const_ident = naming::machine_const_ident(&machine.id);

        let mut out = String::new();
        let _ = writeln!(out, "/**");
        let _ = writeln!(out, " * {}", machine.display_name);
        let _ = writeln!(out, " * {} service machine generated from its flow diagram.", machine.category);
        let _ = writeln!(out, " * Do not edit by hand; regenerate from the diagram source.");
        let _ = writeln!(out, " */");
        let _ = writeln!(out, "import {{ {} }} from 'xstate';", machine.required_imports.join(", "));
        out.push('\n');

        out.push_str(&self.render_context_interface(machine, &base));
        out.push('\n');
        out.push_str(&self.render_event_type(machine, &base));
        out.push('\n');

        let _ = writeln!(out, "export const {} = setup({{", const_ident);
        let _ = writeln!(out, "  types: {{");
        let _ = writeln!(out, "    context: {{}} as {}Context,", base);
        let _ = writeln!(out, "    events: {{}} as {}Event,", base);
        let _ = writeln!(out, "  }},");
        if !machine.guards.is_empty() {
            out.push_str("  guards: {\n");
            out.push_str(&self.render_guards(machine));
            out.push_str("  },\n");
        }
        out.push_str("  actions: {\n");
        out.push_str(&self.render_actions(machine));
        out.push_str("  },\n");
        if !machine.actors.is_empty() {
            out.push_str("  actors: {\n");
            out.push_str(&self.render_actors(machine));
            out.push_str("  },\n");
        }
        let _ = writeln!(out, "}}).createMachine({{");
        let _ = writeln!(out, "  id: {},", codegen::ts_string(&machine.id));
        let _ = writeln!(out, "  initial: {},", codegen::ts_string(&machine.initial_state));
        out.push_str(&self.render_context_init(machine));
        out.push_str("  states: {\n");
        for state in &machine.states {
            out.push_str(&self.render_state(state));
        }
        out.push_str("  },\n");
        out.push_str("});\n");
        out.push('\n');
        let _ = writeln!(out, "export default {};", const_ident);

        Ok(out)
    }
}

/// Transition events that appear in state tables but not in the catalog
/// (unlabeled edges), in first-use order
pub fn extra_event_names(machine: &GeneratedMachine) -> Vec<String> {
    let mut extras = Vec::new();
    for state in &machine.states {
        for transition in &state.transitions {
            if machine.event(&transition.event).is_none()
                && !extras.contains(&transition.event)
            {
                extras.push(transition.event.clone());
            }
        }
    }
    extras
}

fn quote_list(names: &[String]) -> String {
    names.iter().map(|n| codegen::ts_string(n)).collect::<Vec<_>>().join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagram::DiagramParser;
    use crate::semantic::SemanticGenerator;

    fn generate(source: &str, name: &str) -> GeneratedMachine {
        let parsed = DiagramParser::new().parse_block(source, name, 0).machines.remove(0);
        SemanticGenerator::new().generate(&parsed)
    }

    #[test]
    fn test_machine_module_shape() {
        let machine = generate(
            "flowchart TD\nStart -->|Select plan| Menu\nMenu -->|yes| Done((bye))",
            "Top Up",
        );
        let text = MachineEmitter::new().render(&machine).unwrap();

        assert!(text.contains("import { setup, assign, fromPromise } from 'xstate';"));
        assert!(text.contains("export interface TopUpContext {"));
        assert!(text.contains("export type TopUpEvent ="));
        assert!(text.contains("| { type: 'SELECT_PLAN'; input: string }"));
        assert!(text.contains("export const topUpMachine = setup({"));
        assert!(text.contains("id: 'top_up_machine',"));
        assert!(text.contains("initial: 'Start',"));
        assert!(text.contains("export default topUpMachine;"));
    }

    #[test]
    fn test_final_state_rendering() {
        let machine = generate("flowchart TD\nStart --> Done((bye))", "Quick");
        let text = MachineEmitter::new().render(&machine).unwrap();
        assert!(text.contains("Done: {"));
        assert!(text.contains("type: 'final',"));
        assert!(text.contains("exit: ['cleanupSession'],"));
        assert!(text.contains("cleanupSession: assign({ error: () => null }),"));
    }

    #[test]
    fn test_guarded_transition_rendering() {
        let machine = generate("flowchart TD\nAge -->|guard:isAdult do:logAccess ok| Granted", "Gate");
        let text = MachineEmitter::new().render(&machine).unwrap();
        assert!(text.contains("guard: 'isAdult'"));
        assert!(text.contains("actions: ['logAccess']"));
        assert!(text.contains("// TODO: replace with the real isAdult check"));
    }

    #[test]
    fn test_unlabeled_edges_become_unknown_event() {
        let machine = generate("flowchart TD\nA --> B", "Blank");
        let text = MachineEmitter::new().render(&machine).unwrap();
        assert!(text.contains("| { type: 'UNKNOWN' }"));
        assert!(text.contains("UNKNOWN: { target: 'B' },"));
    }

    #[test]
    fn test_parallel_transitions_render_as_candidate_list() {
        let machine = generate("flowchart TD\nA --> B\nA --> C", "Fork");
        let text = MachineEmitter::new().render(&machine).unwrap();
        assert!(text.contains("UNKNOWN: [{ target: 'B' }, { target: 'C' }],"));
    }

    #[test]
    fn test_context_defaults_rendered() {
        let machine = generate("flowchart TD\nStart -->|Enter input| Menu", "Entry");
        let text = MachineEmitter::new().render(&machine).unwrap();
        assert!(text.contains("phoneNumber: '',"));
        assert!(text.contains("error: null,"));
        assert!(text.contains("lastInput: '',"));
        assert!(text.contains("error: string | null;"));
    }
}
