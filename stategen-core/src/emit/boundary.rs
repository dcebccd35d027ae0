//! Error and boundary test emitter
//!
//! Applies a fixed catalog of malformed-input cases to every machine:
//! null-ish payloads, oversized strings, numeric edge values, and special
//! characters. The catalog is machine-independent; only the events it is
//! applied to come from the IR.

use super::{Emitter, EmitterKind, codegen, module_base};
use crate::semantic::{GeneratedMachine, naming};
use anyhow::Result;
use std::fmt::Write;

/// Fixed boundary-case catalog: (label, literal)
const BOUNDARY_CASES: [(&str, &str); 11] = [
    ("null payload", "null"),
    ("undefined payload", "undefined"),
    ("empty string", "''"),
    ("whitespace only", "'   '"),
    ("oversized string", "'x'.repeat(10000)"),
    ("special characters", "\"'; DROP TABLE sessions;--\""),
    ("unicode text", "'\\u{1F389}\\u{2728}'"),
    ("zero", "0"),
    ("negative number", "-1"),
    ("max safe integer", "Number.MAX_SAFE_INTEGER"),
    ("not a number", "Number.NaN"),
];

pub struct BoundaryTestEmitter;

impl BoundaryTestEmitter {
    pub fn new() -> Self {
        Self
    }
}

impl Emitter for BoundaryTestEmitter {
    fn kind(&self) -> EmitterKind {
        EmitterKind::BoundaryTests
    }

    fn render(&self, machine: &GeneratedMachine) -> Result<String> {
        let const_ident = naming::machine_const_ident(&machine.id);
        let base = module_base(machine);

        let state_list = machine
            .states
            .iter()
            .map(|s| codegen::ts_string(&s.name))
            .collect::<Vec<_>>()
            .join(", ");

        let mut out = String::new();
        let _ = writeln!(out, "/**");
        let _ = writeln!(out, " * Boundary and malformed-input tests for {}.", machine.display_name);
        let _ = writeln!(out, " * The machine must absorb hostile payloads without leaving its");
        let _ = writeln!(out, " * declared state set.");
        let _ = writeln!(out, " */");
        let _ = writeln!(out, "import {{ describe, expect, it }} from 'vitest';");
        let _ = writeln!(out, "import {{ createActor }} from 'xstate';");
        let _ = writeln!(out, "import {{ {} }} from './{}.machine';", const_ident, base);
        out.push('\n');
        let _ = writeln!(out, "const declaredStates = [{}];", state_list);
        out.push('\n');
        let _ = writeln!(out, "const boundaryCases = [");
        for (label, literal) in BOUNDARY_CASES {
            let _ = writeln!(out, "  {{ label: {}, value: {} }},", codegen::ts_string(label), literal);
        }
        let _ = writeln!(out, "] as const;");
        out.push('\n');
        let _ = writeln!(out, "describe('{} boundaries', () => {{", machine.id);

        let payload_events: Vec<_> =
            machine.events.iter().filter(|e| !e.payload.is_empty()).collect();
        for event in &payload_events {
            let field = &event.payload[0];
            let _ = writeln!(
                out,
                "  describe('{} with hostile {} payloads', () => {{",
                event.name, field.name
            );
            let _ = writeln!(out, "    for (const boundary of boundaryCases) {{");
            let _ = writeln!(out, "      it(`stays within declared states for ${{boundary.label}}`, () => {{");
            let _ = writeln!(out, "        const actor = createActor({}).start();", const_ident);
            let _ = writeln!(
                out,
                "        expect(() => actor.send({{ type: {}, {}: boundary.value as never }})).not.toThrow();",
                codegen::ts_string(&event.name),
                field.name
            );
            let _ = writeln!(out, "        const snapshot = actor.getSnapshot();");
            let _ = writeln!(out, "        expect(declaredStates).toContain(String(snapshot.value));");
            let _ = writeln!(out, "        actor.stop();");
            let _ = writeln!(out, "      }});");
            let _ = writeln!(out, "    }}");
            let _ = writeln!(out, "  }});");
            out.push('\n');
        }

        let _ = writeln!(out, "  it('ignores events outside the catalog', () => {{");
        let _ = writeln!(out, "    const actor = createActor({}).start();", const_ident);
        let _ = writeln!(
            out,
            "    expect(() => actor.send({{ type: 'NO_SUCH_EVENT' }} as never)).not.toThrow();"
        );
        let _ = writeln!(out, "    expect(declaredStates).toContain(String(actor.getSnapshot().value));");
        let _ = writeln!(out, "    actor.stop();");
        let _ = writeln!(out, "  }});");
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
    fn test_boundary_suite_shape() {
        let machine = generate("flowchart TD\nStart -->|Enter input| Menu", "Entry");
        let text = BoundaryTestEmitter::new().render(&machine).unwrap();

        assert!(text.contains("const boundaryCases = ["));
        assert!(text.contains("{ label: 'oversized string', value: 'x'.repeat(10000) },"));
        assert!(text.contains("{ label: 'not a number', value: Number.NaN },"));
        assert!(text.contains("describe('ENTER_INPUT with hostile input payloads'"));
        assert!(text.contains("ignores events outside the catalog"));
    }

    #[test]
    fn test_catalog_is_machine_independent() {
        let first = BoundaryTestEmitter::new()
            .render(&generate("flowchart TD\nA -->|Enter input| B", "One"))
            .unwrap();
        let second = BoundaryTestEmitter::new()
            .render(&generate("flowchart TD\nX -->|fail| Y", "Two"))
            .unwrap();
        let extract = |text: &str| {
            text.lines()
                .skip_while(|l| !l.starts_with("const boundaryCases"))
                .take_while(|l| !l.starts_with("] as const"))
                .map(str::to_string)
                .collect::<Vec<_>>()
        };
        assert_eq!(extract(&first), extract(&second));
    }

    #[test]
    fn test_payload_free_machine_only_checks_unknown_event() {
        let machine = generate("flowchart TD\nA --> B", "Blank");
        let text = BoundaryTestEmitter::new().render(&machine).unwrap();
        assert!(!text.contains("for (const boundary of boundaryCases)"));
        assert!(text.contains("NO_SUCH_EVENT"));
    }
}
