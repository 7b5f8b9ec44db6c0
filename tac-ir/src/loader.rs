//! IR stream loader
//! 
//! Decodes the textual IR stream, one record per line:
//! 
//! ```text
//! <address>\t(<OP>, <a1>, <a2>, <a3>)
//! ```
//! 
//! The address field is ignored; an instruction's position in the returned
//! vector is its address. Blank lines and malformed records are skipped
//! and reported as diagnostics rather than failing the load.

use crate::ir::{IrInstruction, Opcode, Operand, OPERAND_SLOTS};
use log::{debug, warn};
use std::fs;
use std::path::Path;
use tac_common::{BackendError, Diagnostic, IrLocation, Severity};

/// Result of decoding an IR stream
#[derive(Debug, Clone, Default)]
pub struct LoadReport {
    pub instructions: Vec<IrInstruction>,
    pub diagnostics: Vec<Diagnostic>,
}

impl LoadReport {
    /// Records dropped entirely; truncated records were still loaded
    pub fn skipped_lines(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Warning)
            .count()
    }
}

/// Decode an IR stream, discarding diagnostics
pub fn parse_ir(text: &str) -> Vec<IrInstruction> {
    parse_ir_with_report(text, "<input>").instructions
}

/// Decode an IR stream and keep a record of every tolerated problem
pub fn parse_ir_with_report(text: &str, filename: &str) -> LoadReport {
    let mut report = LoadReport::default();

    for (line_no, raw) in text.lines().enumerate() {
        let location = IrLocation::new(filename, line_no as u32 + 1);
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }

        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() != 2 {
            let message = format!(
                "skipping record: expected 2 tab-separated fields, found {}",
                fields.len()
            );
            warn!("{}: {}", location, message);
            report.diagnostics.push(Diagnostic::warning(message, location));
            continue;
        }

        let body = fields[1]
            .trim()
            .trim_matches(&['(', ')'][..]);
        let tokens: Vec<&str> = body.split(',').map(str::trim).collect();

        if tokens.len() > OPERAND_SLOTS + 1 {
            let message = format!(
                "ignoring {} operand(s) past a{}",
                tokens.len() - OPERAND_SLOTS - 1,
                OPERAND_SLOTS
            );
            warn!("{}: {}", location, message);
            report.diagnostics.push(Diagnostic::note(message, location.clone()));
        }

        let token = |i: usize| tokens.get(i).copied().unwrap_or("");
        let index = report.instructions.len();
        let instruction = IrInstruction {
            opcode: Opcode::from_tag(token(0)),
            operands: [
                Operand::classify(token(1)),
                Operand::classify(token(2)),
                Operand::classify(token(3)),
            ],
            location: location.with_index(index),
        };
        debug!("loaded #{}: {}", index, instruction);
        report.instructions.push(instruction);
    }

    report
}

/// Read and decode an IR file
pub fn load_ir(path: &Path) -> Result<LoadReport, BackendError> {
    let text = fs::read_to_string(path)?;
    Ok(parse_ir_with_report(&text, &path.display().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_basic_records() {
        let text = "0\t(ASSIGN, #5, x, )\n1\t(ADD, x, #1, y)\n2\t(PRINT, y, , )\n";
        let ir = parse_ir(text);

        assert_eq!(ir.len(), 3);
        assert_eq!(ir[0].opcode, Opcode::Assign);
        assert_eq!(ir[0].a1(), &Operand::Immediate("5".to_string()));
        assert_eq!(ir[0].a2(), &Operand::Symbol("x".to_string()));
        assert_eq!(ir[0].a3(), &Operand::Empty);
        assert_eq!(ir[1].opcode, Opcode::Add);
        assert_eq!(ir[2].a2(), &Operand::Empty);
    }

    #[test]
    fn test_skips_blank_and_malformed_lines() {
        let text = "\n0\t(PRINT, #1, , )\n   \nno tabs here\n1\t(PRINT, #2, , )\textra\n2\t(PRINT, #3, , )\n";
        let report = parse_ir_with_report(text, "output.txt");

        assert_eq!(report.instructions.len(), 2);
        assert_eq!(report.skipped_lines(), 2);
        assert_eq!(report.diagnostics[0].location.line, 4);
        assert_eq!(report.diagnostics[1].location.line, 5);

        // Positions are assigned from surviving records only
        assert_eq!(report.instructions[1].location.index, Some(1));
        assert_eq!(report.instructions[1].a1(), &Operand::Immediate("3".to_string()));
    }

    #[test]
    fn test_pads_missing_operands() {
        let ir = parse_ir("0\t(JP, 7)\n");
        assert_eq!(ir[0].opcode, Opcode::Jp);
        assert_eq!(ir[0].a1(), &Operand::Symbol("7".to_string()));
        assert_eq!(ir[0].a2(), &Operand::Empty);
        assert_eq!(ir[0].a3(), &Operand::Empty);
    }

    #[test]
    fn test_unknown_operator_passes_through() {
        let ir = parse_ir("0\t(FOO, a, @b, #3)\n");
        assert_eq!(ir[0].opcode, Opcode::Unknown("FOO".to_string()));
        assert_eq!(ir[0].to_string(), "(FOO, a, @b, #3)");
    }

    #[test]
    fn test_extra_operands_are_dropped_with_note() {
        let report = parse_ir_with_report("0\t(ADD, a, b, c, d)\n", "x.ir");
        assert_eq!(report.instructions.len(), 1);
        assert_eq!(report.instructions[0].a3(), &Operand::Symbol("c".to_string()));
        assert_eq!(report.diagnostics.len(), 1);
        assert_eq!(report.skipped_lines(), 0);
    }

    #[test]
    fn test_tokens_are_trimmed() {
        let ir = parse_ir("12\t(  LT ,  a ,#0,   flag  )\n");
        assert_eq!(ir[0].opcode, Opcode::Lt);
        assert_eq!(ir[0].a2(), &Operand::Immediate("0".to_string()));
        assert_eq!(ir[0].a3(), &Operand::Symbol("flag".to_string()));
    }

    #[test]
    fn test_load_ir_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("output.txt");
        std::fs::write(&path, "0\t(PRINT, #9, , )\n").unwrap();

        let report = load_ir(&path).unwrap();
        assert_eq!(report.instructions.len(), 1);

        let missing = load_ir(&dir.path().join("absent.txt"));
        assert!(matches!(missing, Err(BackendError::Io { .. })));
    }
}
