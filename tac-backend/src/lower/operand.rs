//! Operand materialization
//! 
//! Every use of an operand moves or loads it into a register right before
//! the instruction that consumes it. Nothing is cached between uses, even
//! when the same value is read twice by one instruction.

use crate::naming::{RegisterBindings, Scratch};
use tac_codegen::{AsmInst, AsmOperand, Reg};
use tac_common::{BackendError, InstrIndex};
use tac_ir::{IrInstruction, Operand};

/// Where a lowering rule writes its result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Destination {
    /// Directly into the value's register
    Reg(Reg),
    /// Into a staging register, then stored through `base`
    Mem { staging: Reg, base: Reg },
}

impl Destination {
    /// Register the result is computed into
    pub fn reg(&self) -> Reg {
        match self {
            Destination::Reg(reg) => *reg,
            Destination::Mem { staging, .. } => *staging,
        }
    }

    /// Store that completes a memory destination
    pub fn writeback(&self) -> Option<AsmInst> {
        match self {
            Destination::Reg(_) => None,
            Destination::Mem { staging, base } => {
                Some(AsmInst::Str(*staging, AsmOperand::Mem(*base)))
            }
        }
    }
}

/// Context needed to report operand errors
pub struct OperandCtx<'a> {
    pub index: InstrIndex,
    pub instr: &'a IrInstruction,
}

impl OperandCtx<'_> {
    fn missing(&self, slot: usize) -> BackendError {
        BackendError::MissingOperand {
            index: self.index,
            opcode: self.instr.opcode.to_string(),
            slot,
        }
    }

    fn operand(&self, slot: usize) -> &Operand {
        &self.instr.operands[slot - 1]
    }
}

/// Operand form usable as the source of a `MOV`/`LDR`
pub fn source_operand(
    regs: &mut RegisterBindings,
    ctx: &OperandCtx<'_>,
    slot: usize,
) -> Result<AsmOperand, BackendError> {
    match ctx.operand(slot) {
        Operand::Empty => Err(ctx.missing(slot)),
        Operand::Immediate(lit) => Ok(AsmOperand::Imm(lit.clone())),
        Operand::Memory(name) => Ok(AsmOperand::Mem(regs.value(name))),
        Operand::Symbol(name) => Ok(AsmOperand::Reg(regs.value(name))),
    }
}

/// Move or load operand `slot` into `target`
pub fn materialize(
    regs: &mut RegisterBindings,
    ctx: &OperandCtx<'_>,
    target: Reg,
    slot: usize,
) -> Result<AsmInst, BackendError> {
    let src = source_operand(regs, ctx, slot)?;
    Ok(match src {
        AsmOperand::Mem(_) => AsmInst::Ldr(target, src),
        _ => AsmInst::Mov(target, src),
    })
}

/// Resolve operand `slot` as a write destination
pub fn destination(
    regs: &mut RegisterBindings,
    ctx: &OperandCtx<'_>,
    slot: usize,
) -> Result<Destination, BackendError> {
    match ctx.operand(slot) {
        Operand::Empty => Err(ctx.missing(slot)),
        Operand::Immediate(_) => Err(BackendError::InvalidDestination {
            index: ctx.index,
            operand: ctx.operand(slot).to_string(),
        }),
        Operand::Symbol(name) => Ok(Destination::Reg(regs.value(name))),
        Operand::Memory(name) => {
            let staging = regs.scratch(Scratch::Store);
            let base = regs.value(name);
            Ok(Destination::Mem { staging, base })
        }
    }
}
