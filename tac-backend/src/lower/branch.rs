//! Branch instruction lowering
//! 
//! `JP` and `JPF` address instructions by stream index. Numeric targets are
//! resolved through the label table built before emission; `JP` also
//! accepts a memory operand and branches indirectly through the loaded
//! address.

use crate::labels::LabelTable;
use crate::lower::operand::{materialize, OperandCtx};
use crate::naming::{RegisterBindings, Scratch};
use crate::GeneratorOptions;
use log::{trace, warn};
use tac_codegen::{AsmInst, AsmOperand, Cond};
use tac_common::BackendError;
use tac_ir::Operand;

/// `JPF(cond, target)`: branch when cond == 0
pub fn lower_jump_false(
    regs: &mut RegisterBindings,
    labels: &LabelTable,
    options: &GeneratorOptions,
    ctx: &OperandCtx<'_>,
) -> Result<Vec<AsmInst>, BackendError> {
    let cond = regs.scratch(Scratch::Cond);
    let mut insts = vec![
        materialize(regs, ctx, cond, 1)?,
        AsmInst::Cmp(cond, AsmOperand::imm(0)),
    ];

    if let Some(label) = branch_label(labels, options, ctx, 2)? {
        trace!("  #{}: branch if zero to {}", ctx.index, label);
        insts.push(AsmInst::BCond(Cond::Eq, label));
    }
    Ok(insts)
}

/// `JP(target)`: unconditional transfer
pub fn lower_jump(
    regs: &mut RegisterBindings,
    labels: &LabelTable,
    options: &GeneratorOptions,
    ctx: &OperandCtx<'_>,
) -> Result<Vec<AsmInst>, BackendError> {
    if let Operand::Memory(name) = ctx.instr.a1() {
        let ptr = regs.scratch(Scratch::JumpPtr);
        let base = regs.value(name);
        return Ok(vec![
            AsmInst::Ldr(ptr, AsmOperand::Mem(base)),
            AsmInst::Br(ptr),
        ]);
    }

    Ok(branch_label(labels, options, ctx, 1)?
        .map(AsmInst::B)
        .into_iter()
        .collect())
}

/// Label for the jump target in operand `slot`.
/// 
/// Strict mode fails on anything that will not end up as a declared label.
/// Lenient mode drops non-numeric targets and keeps branches to numeric
/// targets past the end of the stream.
fn branch_label(
    labels: &LabelTable,
    options: &GeneratorOptions,
    ctx: &OperandCtx<'_>,
    slot: usize,
) -> Result<Option<String>, BackendError> {
    let operand = &ctx.instr.operands[slot - 1];

    match operand.as_address() {
        Some(target) => {
            if let Some(label) = labels.resolve(target) {
                return Ok(Some(label.to_string()));
            }
            if options.strict_branches {
                return Err(BackendError::unresolved(ctx.index, operand.to_string()));
            }
            warn!(
                "#{}: {} to {} has no declared label",
                ctx.index, ctx.instr.opcode, target
            );
            Ok(labels.registered(target).map(str::to_string))
        }
        None => {
            if options.strict_branches {
                return Err(BackendError::unresolved(ctx.index, operand.to_string()));
            }
            warn!(
                "#{}: dropping {} to non-numeric target '{}'",
                ctx.index, ctx.instr.opcode, operand
            );
            Ok(None)
        }
    }
}
