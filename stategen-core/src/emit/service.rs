//! Service wrapper emitter
//!
//! Renders a thin session-keyed class around the machine so host services
//! (HTTP endpoints, session routers) can drive it without touching the
//! state-machine runtime directly.

use super::{Emitter, EmitterKind, module_base};
use crate::semantic::{GeneratedMachine, naming};
use anyhow::Result;
use std::fmt::Write;

pub struct ServiceEmitter;

impl ServiceEmitter {
    pub fn new() -> Self {
        Self
    }
}

impl Emitter for ServiceEmitter {
    fn kind(&self) -> EmitterKind {
        EmitterKind::Service
    }

    fn render(&self, machine: &GeneratedMachine) -> Result<String> {
        let const_ident = naming::machine_const_ident(&machine.id);
        let base_name = naming::type_base_name(&machine.id);
        let base = module_base(machine);

        let mut out = String::new();
        let _ = writeln!(out, "/**");
        let _ = writeln!(out, " * Session service for {}.", machine.display_name);
        let _ = writeln!(out, " * Keeps one live actor per session id.");
        let _ = writeln!(out, " */");
        let _ = writeln!(out, "import {{ createActor, type Actor }} from 'xstate';");
        let _ = writeln!(
            out,
            "import {{ {}, type {}Event }} from './{}.machine';",
            const_ident, base_name, base
        );
        out.push('\n');
        let _ = writeln!(out, "export interface {}Snapshot {{", base_name);
        let _ = writeln!(out, "  state: string;");
        let _ = writeln!(out, "  done: boolean;");
        let _ = writeln!(out, "  context: unknown;");
        let _ = writeln!(out, "}}");
        out.push('\n');
        let _ = writeln!(out, "export class {}Service {{", base_name);
        let _ = writeln!(
            out,
            "  private readonly sessions = new Map<string, Actor<typeof {}>>();",
            const_ident
        );
        out.push('\n');
        let _ = writeln!(out, "  /** Start (or resume) the session's machine. */");
        let _ = writeln!(out, "  start(sessionId: string): {}Snapshot {{", base_name);
        let _ = writeln!(out, "    let actor = this.sessions.get(sessionId);");
        let _ = writeln!(out, "    if (!actor) {{");
        let _ = writeln!(out, "      actor = createActor({});", const_ident);
        let _ = writeln!(out, "      actor.start();");
        let _ = writeln!(out, "      this.sessions.set(sessionId, actor);");
        let _ = writeln!(out, "    }}");
        let _ = writeln!(out, "    return this.snapshot(actor);");
        let _ = writeln!(out, "  }}");
        out.push('\n');
        let _ = writeln!(out, "  /** Send an event to a running session. */");
        let _ = writeln!(
            out,
            "  send(sessionId: string, event: {}Event): {}Snapshot {{",
            base_name, base_name
        );
        let _ = writeln!(out, "    const actor = this.sessions.get(sessionId);");
        let _ = writeln!(out, "    if (!actor) {{");
        let _ = writeln!(out, "      throw new Error(`No active session: ${{sessionId}}`);");
        let _ = writeln!(out, "    }}");
        let _ = writeln!(out, "    actor.send(event);");
        let _ = writeln!(out, "    const snapshot = this.snapshot(actor);");
        let _ = writeln!(out, "    if (snapshot.done) {{");
        let _ = writeln!(out, "      this.stop(sessionId);");
        let _ = writeln!(out, "    }}");
        let _ = writeln!(out, "    return snapshot;");
        let _ = writeln!(out, "  }}");
        out.push('\n');
        let _ = writeln!(out, "  /** Current state of a session, if it exists. */");
        let _ = writeln!(out, "  state(sessionId: string): {}Snapshot | undefined {{", base_name);
        let _ = writeln!(out, "    const actor = this.sessions.get(sessionId);");
        let _ = writeln!(out, "    return actor ? this.snapshot(actor) : undefined;");
        let _ = writeln!(out, "  }}");
        out.push('\n');
        let _ = writeln!(out, "  /** Stop and forget a session. */");
        let _ = writeln!(out, "  stop(sessionId: string): void {{");
        let _ = writeln!(out, "    const actor = this.sessions.get(sessionId);");
        let _ = writeln!(out, "    if (actor) {{");
        let _ = writeln!(out, "      actor.stop();");
        let _ = writeln!(out, "      this.sessions.delete(sessionId);");
        let _ = writeln!(out, "    }}");
        let _ = writeln!(out, "  }}");
        out.push('\n');
        let _ = writeln!(out, "  activeSessions(): number {{");
        let _ = writeln!(out, "    return this.sessions.size;");
        let _ = writeln!(out, "  }}");
        out.push('\n');
        let _ = writeln!(out, "  private snapshot(actor: Actor<typeof {}>): {}Snapshot {{", const_ident, base_name);
        let _ = writeln!(out, "    const snapshot = actor.getSnapshot();");
        let _ = writeln!(out, "    return {{");
        let _ = writeln!(out, "      state: String(snapshot.value),");
        let _ = writeln!(out, "      done: snapshot.status === 'done',");
        let _ = writeln!(out, "      context: snapshot.context,");
        let _ = writeln!(out, "    }};");
        let _ = writeln!(out, "  }}");
        let _ = writeln!(out, "}}");
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
    fn test_service_shape() {
        let machine = generate("flowchart TD\nStart -->|Select plan| Done((bye))", "Top Up");
        let text = ServiceEmitter::new().render(&machine).unwrap();

        assert!(text.contains("export class TopUpService {"));
        assert!(text.contains("import { topUpMachine, type TopUpEvent } from './top-up.machine';"));
        assert!(text.contains("send(sessionId: string, event: TopUpEvent): TopUpSnapshot {"));
        assert!(text.contains("activeSessions(): number {"));
    }
}
