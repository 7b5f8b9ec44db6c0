//! Instruction Lowering - Handles lowering of individual instructions
//! 
//! Registers are bound in the order the rules below touch names: scratch
//! registers first, then the destination, then the sources. Keeping that
//! order keeps register numbering stable for a given input.

use crate::labels::LabelTable;
use crate::lower::branch::{lower_jump, lower_jump_false};
use crate::lower::operand::{destination, materialize, Destination, OperandCtx};
use crate::naming::{RegisterBindings, Scratch};
use crate::GeneratorOptions;
use log::debug;
use tac_codegen::{print_call, AsmInst, AsmLine, AsmOperand, Cond, Reg};
use tac_common::{BackendError, InstrIndex};
use tac_ir::{IrInstruction, Opcode, Operand};

/// Lower the instruction at `index` into assembly lines
pub fn lower_instruction(
    regs: &mut RegisterBindings,
    labels: &LabelTable,
    options: &GeneratorOptions,
    index: InstrIndex,
    instr: &IrInstruction,
) -> Result<Vec<AsmLine>, BackendError> {
    debug!("#{}: lowering {}", index, instr);
    let ctx = OperandCtx { index, instr };

    let insts = match &instr.opcode {
        Opcode::Assign => lower_assign(regs, &ctx)?,
        Opcode::Add | Opcode::Sub | Opcode::Mult => lower_arith(regs, &ctx)?,
        Opcode::Lt => lower_less_than(regs, &ctx)?,
        Opcode::Jpf => lower_jump_false(regs, labels, options, &ctx)?,
        Opcode::Jp => lower_jump(regs, labels, options, &ctx)?,
        Opcode::Print => lower_print(regs, &ctx)?,
        Opcode::Unknown(tag) => {
            debug!("#{}: unsupported operator '{}', emitting comment", index, tag);
            return Ok(vec![AsmLine::Comment(format!(
                "Unsupported: {} {} {} {}",
                tag, instr.operands[0], instr.operands[1], instr.operands[2]
            ))]);
        }
    };

    Ok(insts.into_iter().map(AsmLine::Inst).collect())
}

/// `ASSIGN(src, dst)`: dst := src
fn lower_assign(
    regs: &mut RegisterBindings,
    ctx: &OperandCtx<'_>,
) -> Result<Vec<AsmInst>, BackendError> {
    if let Operand::Memory(name) = ctx.instr.a2() {
        let staging = regs.scratch(Scratch::Store);
        let load = materialize(regs, ctx, staging, 1)?;
        let base = regs.value(name);
        return Ok(vec![load, AsmInst::Str(staging, AsmOperand::Mem(base))]);
    }

    // A memory source becomes an LDR straight into the destination
    let dest = destination(regs, ctx, 2)?;
    Ok(vec![materialize(regs, ctx, dest.reg(), 1)?])
}

/// `ADD`/`SUB`/`MULT(a, b, dst)`
fn lower_arith(
    regs: &mut RegisterBindings,
    ctx: &OperandCtx<'_>,
) -> Result<Vec<AsmInst>, BackendError> {
    let (lhs, rhs, dest, mut insts) = binary_operands(regs, ctx)?;
    let rd = dest.reg();

    insts.push(match ctx.instr.opcode {
        Opcode::Add => AsmInst::Add(rd, lhs, rhs.into()),
        Opcode::Sub => AsmInst::Sub(rd, lhs, rhs.into()),
        _ => AsmInst::Mul(rd, lhs, rhs),
    });
    insts.extend(dest.writeback());
    Ok(insts)
}

/// `LT(a, b, dst)`: dst := a < b
fn lower_less_than(
    regs: &mut RegisterBindings,
    ctx: &OperandCtx<'_>,
) -> Result<Vec<AsmInst>, BackendError> {
    let (lhs, rhs, dest, mut insts) = binary_operands(regs, ctx)?;

    insts.push(AsmInst::Cmp(lhs, rhs.into()));
    insts.push(AsmInst::Cset(dest.reg(), Cond::Lt));
    insts.extend(dest.writeback());
    Ok(insts)
}

/// Bind the two fixed scratch registers and the destination, then
/// materialize both sources
fn binary_operands(
    regs: &mut RegisterBindings,
    ctx: &OperandCtx<'_>,
) -> Result<(Reg, Reg, Destination, Vec<AsmInst>), BackendError> {
    let lhs = regs.scratch(Scratch::Lhs);
    let rhs = regs.scratch(Scratch::Rhs);
    let dest = destination(regs, ctx, 3)?;

    let insts = vec![
        materialize(regs, ctx, lhs, 1)?,
        materialize(regs, ctx, rhs, 2)?,
    ];
    Ok((lhs, rhs, dest, insts))
}

/// `PRINT(val)`
fn lower_print(
    regs: &mut RegisterBindings,
    ctx: &OperandCtx<'_>,
) -> Result<Vec<AsmInst>, BackendError> {
    let value = regs.scratch(Scratch::Print);
    let mut insts = vec![materialize(regs, ctx, value, 1)?];
    insts.extend(print_call(value));
    Ok(insts)
}
