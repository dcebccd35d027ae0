//! Interactive demo harness emitter
//!
//! Renders a readline-driven script that walks the machine from the
//! terminal: print the current state, prompt for an event, send it, stop
//! when a final state is reached.

use super::{Emitter, EmitterKind, codegen, module_base};
use crate::semantic::{GeneratedMachine, naming};
use anyhow::Result;
use std::fmt::Write;

pub struct DemoEmitter;

impl DemoEmitter {
    pub fn new() -> Self {
        Self
    }
}

impl Emitter for DemoEmitter {
    fn kind(&self) -> EmitterKind {
        EmitterKind::Demo
    }

    fn render(&self, machine: &GeneratedMachine) -> Result<String> {
        let const_ident = naming::machine_const_ident(&machine.id);
        let base = module_base(machine);

        let mut out = String::new();
        let _ = writeln!(out, "/**");
        let _ = writeln!(out, " * Interactive demo for {}.", machine.display_name);
        let _ = writeln!(out, " * Run with: npx tsx {}.demo.ts", base);
        let _ = writeln!(out, " */");
        let _ = writeln!(out, "import * as readline from 'node:readline/promises';");
        let _ = writeln!(out, "import {{ stdin as input, stdout as output }} from 'node:process';");
        let _ = writeln!(out, "import {{ createActor }} from 'xstate';");
        let _ = writeln!(out, "import {{ {} }} from './{}.machine';", const_ident, base);
        out.push('\n');

        let _ = writeln!(out, "const knownEvents: Record<string, Record<string, unknown>> = {{");
        for event in &machine.events {
            let mut payload = Vec::new();
            for field in &event.payload {
                payload.push(format!("{}: {}", field.name, codegen::sample_value(field.kind)));
            }
            let _ = writeln!(
                out,
                "  {}: {{ {} }},",
                codegen::ts_string(&event.name),
                payload.join(", ")
            );
        }
        let _ = writeln!(out, "}};");
        out.push('\n');

        let _ = writeln!(out, "async function main(): Promise<void> {{");
        let _ = writeln!(out, "  const rl = readline.createInterface({{ input, output }});");
        let _ = writeln!(out, "  const actor = createActor({}).start();", const_ident);
        out.push('\n');
        let _ = writeln!(out, "  console.log({});", codegen::ts_string(&format!("=== {} demo ===", machine.display_name)));
        let _ = writeln!(out, "  console.log('Events:', Object.keys(knownEvents).join(', ') || '(none)');");
        out.push('\n');
        let _ = writeln!(out, "  for (;;) {{");
        let _ = writeln!(out, "    const snapshot = actor.getSnapshot();");
        let _ = writeln!(out, "    console.log('State:', snapshot.value);");
        let _ = writeln!(out, "    console.log('Context:', JSON.stringify(snapshot.context));");
        let _ = writeln!(out, "    if (snapshot.status === 'done') {{");
        let _ = writeln!(out, "      console.log('Reached a final state, goodbye.');");
        let _ = writeln!(out, "      break;");
        let _ = writeln!(out, "    }}");
        out.push('\n');
        let _ = writeln!(out, "    const answer = await rl.question('event> ');");
        let _ = writeln!(out, "    const name = answer.trim();");
        let _ = writeln!(out, "    if (name === 'quit' || name === 'exit') {{");
        let _ = writeln!(out, "      break;");
        let _ = writeln!(out, "    }}");
        let _ = writeln!(out, "    if (!(name in knownEvents)) {{");
        let _ = writeln!(out, "      console.log('Unknown event:', name);");
        let _ = writeln!(out, "      continue;");
        let _ = writeln!(out, "    }}");
        let _ = writeln!(out, "    actor.send({{ type: name, ...knownEvents[name] }} as never);");
        let _ = writeln!(out, "  }}");
        out.push('\n');
        let _ = writeln!(out, "  actor.stop();");
        let _ = writeln!(out, "  rl.close();");
        let _ = writeln!(out, "}}");
        out.push('\n');
        let _ = writeln!(out, "main().catch((error) => {{");
        let _ = writeln!(out, "  console.error(error);");
        let _ = writeln!(out, "  process.exit(1);");
        let _ = writeln!(out, "}});");
        Ok(out)
    }
}
