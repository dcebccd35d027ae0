pub mod generate;
pub mod lint;
pub mod status;

use stategen_core::diagnostics::Diagnostic;

/// Print diagnostics in a stable `severity:line message` form
pub fn print_diagnostics(diagnostics: &[Diagnostic], severity_label: &str) {
    for diagnostic in diagnostics {
        match diagnostic.line {
            Some(line) => println!("  {}: line {}: {}", severity_label, line, diagnostic.message),
            None => println!("  {}: {}", severity_label, diagnostic.message),
        }
        if let Some(suggestion) = &diagnostic.suggestion {
            println!("      hint: {}", suggestion);
        }
    }
}
