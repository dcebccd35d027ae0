//! Smoke-test suite emitter
//!
//! Renders a vitest suite covering machine identity, declared states,
//! context defaults, and one send per cataloged event.

use super::{Emitter, EmitterKind, codegen, module_base};
use crate::semantic::{GeneratedMachine, naming};
use anyhow::Result;
use std::fmt::Write;

pub struct SmokeTestEmitter;

impl SmokeTestEmitter {
    pub fn new() -> Self {
        Self
    }
}

impl Emitter for SmokeTestEmitter {
    fn kind(&self) -> EmitterKind {
        EmitterKind::SmokeTests
    }

    fn render(&self, machine: &GeneratedMachine) -> Result<String> {
        let const_ident = naming::machine_const_ident(&machine.id);
        let base = module_base(machine);

        let mut out = String::new();
        let _ = writeln!(out, "/**");
        let _ = writeln!(out, " * Smoke tests for {}.", machine.display_name);
        let _ = writeln!(out, " */");
        let _ = writeln!(out, "import {{ describe, expect, it }} from 'vitest';");
        let _ = writeln!(out, "import {{ createActor }} from 'xstate';");
        let _ = writeln!(out, "import {{ {} }} from './{}.machine';", const_ident, base);
        out.push('\n');
        let _ = writeln!(out, "describe({}, () => {{", codegen::ts_string(&machine.id));

        let _ = writeln!(
            out,
            "  it('starts in the {} state', () => {{",
            machine.initial_state
        );
        let _ = writeln!(out, "    const actor = createActor({}).start();", const_ident);
        let _ = writeln!(
            out,
            "    expect(actor.getSnapshot().value).toBe({});",
            codegen::ts_string(&machine.initial_state)
        );
        let _ = writeln!(out, "    actor.stop();");
        let _ = writeln!(out, "  }});");
        out.push('\n');

        let state_list = machine
            .states
            .iter()
            .map(|s| codegen::ts_string(&s.name))
            .collect::<Vec<_>>()
            .join(", ");
        let _ = writeln!(out, "  it('declares every diagram state', () => {{");
        let _ = writeln!(
            out,
            "    const states = Object.keys({}.config.states ?? {{}});",
            const_ident
        );
        let _ = writeln!(out, "    expect(states).toEqual([{}]);", state_list);
        let _ = writeln!(out, "  }});");
        out.push('\n');

        let _ = writeln!(out, "  it('initializes context defaults', () => {{");
        let _ = writeln!(out, "    const actor = createActor({}).start();", const_ident);
        let _ = writeln!(out, "    const {{ context }} = actor.getSnapshot();");
        for field in &machine.context_fields {
            if field.default == "null" {
                let _ = writeln!(out, "    expect(context.{}).toBeNull();", field.name);
            } else {
                let _ = writeln!(
                    out,
                    "    expect(context.{}).toBe({});",
                    field.name, field.default
                );
            }
        }
        let _ = writeln!(out, "    actor.stop();");
        let _ = writeln!(out, "  }});");

        for event in &machine.events {
            out.push('\n');
            let _ = writeln!(
                out,
                "  it('accepts {} from a running actor', () => {{",
                event.name
            );
            let _ = writeln!(out, "    const actor = createActor({}).start();", const_ident);
            let _ = writeln!(
                out,
                "    expect(() => actor.send({})).not.toThrow();",
                codegen::sample_event_literal(event)
            );
            let _ = writeln!(out, "    actor.stop();");
            let _ = writeln!(out, "  }});");
        }

        let _ = writeln!(out, "}});");
        Ok(out)
    }
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
    fn test_smoke_suite_shape() {
        let machine = generate(
            "flowchart TD\nStart -->|Select plan| Menu\nMenu --> Done((bye))",
            "Top Up",
        );
        let text = SmokeTestEmitter::new().render(&machine).unwrap();

        assert!(text.contains("import { topUpMachine } from './top-up.machine';"));
        assert!(text.contains("describe('top_up_machine', () => {"));
        assert!(text.contains("it('starts in the Start state'"));
        assert!(text.contains("expect(states).toEqual(['Start', 'Menu', 'Done']);"));
        assert!(text.contains("expect(context.error).toBeNull();"));
        assert!(text.contains("actor.send({ type: 'SELECT_PLAN', input: '1' })"));
    }

    #[test]
    fn test_event_free_machine_still_renders() {
        let machine = generate("flowchart TD\nA --> B", "Blank");
        let text = SmokeTestEmitter::new().render(&machine).unwrap();
        assert!(text.contains("declares every diagram state"));
        assert!(!text.contains("accepts"));
    }
}
