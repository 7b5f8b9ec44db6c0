//! Program layout and text emission

use crate::asm::{AsmLine, Directive};

/// Lines that open every program: the exported entry point, the text
/// section and the entry label itself
pub fn program_header(entry: &str) -> Vec<AsmLine> {
    vec![
        AsmLine::Directive(Directive::Global(entry.to_string())),
        AsmLine::Directive(Directive::Section(".text".to_string())),
        AsmLine::Label(entry.to_string()),
    ]
}

/// Serialize lines, each terminated by a newline
pub fn emit_lines(lines: &[AsmLine]) -> String {
    let mut out = String::new();
    for line in lines {
        out.push_str(&line.to_string());
        out.push('\n');
    }
    out
}
