//! Program generation
//! 
//! Drives the two passes over an instruction stream:
//! 
//! 1. label discovery over the whole stream
//! 2. emission, one instruction at a time in index order, followed by the
//!    `print_int` trailer
//! 
//! The generator moves through `Unstarted -> LabelsDiscovered ->
//! Emitting(0..n) -> TrailerEmitted -> Done` and never skips a phase. A
//! lowering error aborts the pass; no partial program is returned.

mod branch;
mod instruction;
mod operand;

pub use instruction::lower_instruction;

use crate::labels::LabelTable;
use crate::naming::RegisterBindings;
use crate::GeneratorOptions;
use log::{debug, info};
use std::fmt;
use std::ops::Range;
use tac_codegen::{emit_lines, print_int_routine, program_header, AsmLine};
use tac_common::{BackendError, InstrIndex};
use tac_ir::IrInstruction;

/// Generator phases
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Unstarted,
    LabelsDiscovered,
    Emitting(InstrIndex),
    TrailerEmitted,
    Done,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Unstarted => write!(f, "Unstarted"),
            Phase::LabelsDiscovered => write!(f, "LabelsDiscovered"),
            Phase::Emitting(i) => write!(f, "Emitting({})", i),
            Phase::TrailerEmitted => write!(f, "TrailerEmitted"),
            Phase::Done => write!(f, "Done"),
        }
    }
}

/// A generated program together with the tables used to build it
#[derive(Debug, Clone)]
pub struct Program {
    pub lines: Vec<AsmLine>,
    pub bindings: RegisterBindings,
    pub labels: LabelTable,
    /// Output lines produced for each IR instruction, label included
    pub spans: Vec<Range<usize>>,
}

impl Program {
    pub fn to_text(&self) -> String {
        emit_lines(&self.lines)
    }

    /// Lines emitted for instruction `index`
    pub fn lines_for(&self, index: InstrIndex) -> &[AsmLine] {
        &self.lines[self.spans[index].clone()]
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_text())
    }
}

/// Single-use code generator over one instruction stream
pub struct Generator<'a> {
    instructions: &'a [IrInstruction],
    options: &'a GeneratorOptions,
    phase: Phase,
    bindings: RegisterBindings,
    labels: LabelTable,
    lines: Vec<AsmLine>,
    spans: Vec<Range<usize>>,
}

impl<'a> Generator<'a> {
    pub fn new(instructions: &'a [IrInstruction], options: &'a GeneratorOptions) -> Self {
        Self {
            instructions,
            options,
            phase: Phase::Unstarted,
            bindings: RegisterBindings::new(),
            labels: LabelTable::default(),
            lines: Vec::new(),
            spans: Vec::with_capacity(instructions.len()),
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Move to `next`, rejecting any transition that skips or repeats a phase
    fn advance(&mut self, next: Phase) -> Result<(), BackendError> {
        let n = self.instructions.len();
        let legal = match (self.phase, next) {
            (Phase::Unstarted, Phase::LabelsDiscovered) => true,
            (Phase::LabelsDiscovered, Phase::Emitting(0)) => n > 0,
            (Phase::LabelsDiscovered, Phase::TrailerEmitted) => n == 0,
            (Phase::Emitting(i), Phase::Emitting(j)) => j == i + 1 && j < n,
            (Phase::Emitting(i), Phase::TrailerEmitted) => i + 1 == n,
            (Phase::TrailerEmitted, Phase::Done) => true,
            _ => false,
        };
        if !legal {
            return Err(BackendError::PhaseViolation {
                expected: self.phase.to_string(),
                found: next.to_string(),
            });
        }
        self.phase = next;
        Ok(())
    }

    /// Pass 1
    pub fn discover_labels(&mut self) -> Result<(), BackendError> {
        self.advance(Phase::LabelsDiscovered)?;
        self.labels = LabelTable::discover(self.instructions);
        debug!("discovered {} jump target(s)", self.labels.len());
        self.lines.extend(program_header(&self.options.entry_label));
        Ok(())
    }

    /// Pass 2, one step: lower the next instruction
    pub fn emit_next(&mut self) -> Result<(), BackendError> {
        let index = match self.phase {
            Phase::Emitting(i) => i + 1,
            _ => 0,
        };
        self.advance(Phase::Emitting(index))?;

        let start = self.lines.len();
        if let Some(label) = self.labels.label_at(index) {
            self.lines.push(AsmLine::Label(label.to_string()));
        }
        let lowered = lower_instruction(
            &mut self.bindings,
            &self.labels,
            self.options,
            index,
            &self.instructions[index],
        )?;
        self.lines.extend(lowered);
        self.spans.push(start..self.lines.len());
        Ok(())
    }

    pub fn emit_trailer(&mut self) -> Result<(), BackendError> {
        self.advance(Phase::TrailerEmitted)?;
        self.lines.extend(print_int_routine());
        Ok(())
    }

    pub fn finish(mut self) -> Result<Program, BackendError> {
        self.advance(Phase::Done)?;
        Ok(Program {
            lines: self.lines,
            bindings: self.bindings,
            labels: self.labels,
            spans: self.spans,
        })
    }

    /// Run every phase in order
    pub fn run(mut self) -> Result<Program, BackendError> {
        self.discover_labels()?;
        for _ in 0..self.instructions.len() {
            self.emit_next()?;
        }
        self.emit_trailer()?;
        let program = self.finish()?;
        info!(
            "generated {} lines from {} instructions ({} registers, {} labels)",
            program.lines.len(),
            program.spans.len(),
            program.bindings.len(),
            program.labels.len()
        );
        Ok(program)
    }
}

/// Generate a program from an instruction stream
pub fn generate(
    instructions: &[IrInstruction],
    options: &GeneratorOptions,
) -> Result<Program, BackendError> {
    Generator::new(instructions, options).run()
}
