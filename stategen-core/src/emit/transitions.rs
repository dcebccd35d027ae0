//! Transition-coverage test emitter
//!
//! Enumerates the IR's state transition tables and renders one assertion
//! per transition, so a regenerated machine cannot silently lose an edge.

use super::{Emitter, EmitterKind, codegen, module_base};
use crate::semantic::{GeneratedMachine, StateKind, naming};
use anyhow::Result;
use std::fmt::Write;

pub struct TransitionTestEmitter;

impl TransitionTestEmitter {
    pub fn new() -> Self {
        Self
    }

    fn event_literal(&self, machine: &GeneratedMachine, event_name: &str) -> String {
        match machine.event(event_name) {
            Some(event) => codegen::sample_event_literal(event),
            // Events outside the catalog carry no payload.
            None => format!("{{ type: {} }}", codegen::ts_string(event_name)),
        }
    }
}

impl Emitter for TransitionTestEmitter {
    fn kind(&self) -> EmitterKind {
        EmitterKind::TransitionTests
    }

    fn render(&self, machine: &GeneratedMachine) -> Result<String> {
        let const_ident = naming::machine_const_ident(&machine.id);
        let base = module_base(machine);

        let mut out = String::new();
        let _ = writeln!(out, "/**");
        let _ = writeln!(out, " * Transition coverage for {}.", machine.display_name);
        let _ = writeln!(out, " * One test per transition-table entry.");
        let _ = writeln!(out, " */");
        let _ = writeln!(out, "import {{ describe, expect, it }} from 'vitest';");
        let _ = writeln!(out, "import {{ getNextSnapshot }} from 'xstate';");
        let _ = writeln!(out, "import {{ {} }} from './{}.machine';", const_ident, base);
        out.push('\n');
        let _ = writeln!(out, "function snapshotAt(value: string) {{");
        let _ = writeln!(out, "  return {}.resolveState({{ value }});", const_ident);
        let _ = writeln!(out, "}}");
        out.push('\n');
        let _ = writeln!(
            out,
            "describe('{} transitions', () => {{",
            machine.id
        );

        let mut first = true;
        for state in &machine.states {
            for transition in &state.transitions {
                let Some(target) = &transition.target else { continue };
                if !first {
                    out.push('\n');
                }
                first = false;

                let title = format!("{} on {} reaches {}", state.name, transition.event, target);
                let _ = writeln!(out, "  it({}, () => {{", codegen::ts_string(&title));
                if transition.guard.is_some() {
                    let _ = writeln!(
                        out,
                        "    // Scaffolded guards return true, so the transition is taken."
                    );
                }
                let _ = writeln!(out, "    const next = getNextSnapshot(");
                let _ = writeln!(out, "      {},", const_ident);
                let _ = writeln!(out, "      snapshotAt({}),", codegen::ts_string(&state.name));
                let _ = writeln!(out, "      {},", self.event_literal(machine, &transition.event));
                let _ = writeln!(out, "    );");
                let _ = writeln!(
                    out,
                    "    expect(next.matches({})).toBe(true);",
                    codegen::ts_string(target)
                );
                let _ = writeln!(out, "  }});");
            }
        }

        for state in machine.states.iter().filter(|s| s.kind == StateKind::Final) {
            if !first {
                out.push('\n');
            }
            first = false;
            let title = format!("{} is terminal", state.name);
            let _ = writeln!(out, "  it({}, () => {{", codegen::ts_string(&title));
            let _ = writeln!(
                out,
                "    const next = getNextSnapshot({}, snapshotAt({}), {{ type: 'UNKNOWN' }} as never);",
                const_ident,
                codegen::ts_string(&state.name)
            );
            let _ = writeln!(
                out,
                "    expect(next.matches({})).toBe(true);",
                codegen::ts_string(&state.name)
            );
            let _ = writeln!(out, "  }});");
        }

        let _ = writeln!(out, "}});");
        Ok(out)
    }
}
