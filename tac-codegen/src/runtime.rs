//! Integer printing runtime
//! 
//! Every program ends with `print_int`, a leaf routine that converts the
//! unsigned value in `x1` to decimal and writes it to stdout with a single
//! `write` system call. Digits are produced least significant first and
//! stored backwards into `int_buf`, so no reversal pass is needed.
//! 
//! The routine clobbers x0-x8.

use crate::asm::{AsmInst, AsmLine, AsmOperand, Directive, Reg};

pub const PRINT_INT_LABEL: &str = "print_int";
const PRINT_LOOP_LABEL: &str = "print_loop";

pub const INT_BUF: &str = "int_buf";
/// Enough for any 64-bit unsigned value
pub const INT_BUF_SIZE: usize = 20;

const STDOUT_FD: i64 = 1;
const SYS_WRITE: i64 = 64;

/// Register that carries the value into `print_int`
pub const PRINT_ARG_REG: Reg = Reg::X(1);

/// Call sequence for printing the value held in `value`.
/// The argument is moved before `x0` is written, since `value` may be `x0`.
pub fn print_call(value: Reg) -> Vec<AsmInst> {
    vec![
        AsmInst::Mov(PRINT_ARG_REG, AsmOperand::Reg(value)),
        AsmInst::Mov(Reg::X(0), AsmOperand::imm(STDOUT_FD)),
        AsmInst::Bl(PRINT_INT_LABEL.to_string()),
    ]
}

/// The routine and its buffer, ready to append after the program body
pub fn print_int_routine() -> Vec<AsmLine> {
    let value = Reg::X(2);
    let ten = Reg::X(3);
    let cursor = Reg::X(4);
    let len = Reg::X(5);
    let quot = Reg::X(6);
    let scaled = Reg::X(7);
    let digit = Reg::X(8);

    let mut lines = vec![AsmLine::Blank, AsmLine::Label(PRINT_INT_LABEL.to_string())];
    let body = |lines: &mut Vec<AsmLine>, insts: Vec<AsmInst>| {
        lines.extend(insts.into_iter().map(AsmLine::Indented));
    };

    body(&mut lines, vec![
        AsmInst::Mov(value, PRINT_ARG_REG.into()),
        AsmInst::Mov(ten, AsmOperand::imm(10)),
        AsmInst::Adr(cursor, format!("{}+{}", INT_BUF, INT_BUF_SIZE)),
        AsmInst::Mov(len, AsmOperand::imm(0)),
    ]);

    lines.push(AsmLine::Label(PRINT_LOOP_LABEL.to_string()));
    body(&mut lines, vec![
        AsmInst::Udiv(quot, value, ten),
        AsmInst::Mul(scaled, quot, ten),
        AsmInst::Sub(digit, value, scaled.into()),
        AsmInst::Add(digit, digit, AsmOperand::Imm("'0'".to_string())),
        AsmInst::Sub(cursor, cursor, AsmOperand::imm(1)),
        AsmInst::Strb(Reg::W(digit.number()), AsmOperand::Mem(cursor)),
        AsmInst::Mov(value, quot.into()),
        AsmInst::Add(len, len, AsmOperand::imm(1)),
        AsmInst::Cbnz(quot, PRINT_LOOP_LABEL.to_string()),
    ]);

    // write(stdout, cursor, len)
    body(&mut lines, vec![
        AsmInst::Mov(Reg::X(0), AsmOperand::imm(STDOUT_FD)),
        AsmInst::Mov(Reg::X(1), cursor.into()),
        AsmInst::Mov(Reg::X(2), len.into()),
        AsmInst::Mov(Reg::X(8), AsmOperand::imm(SYS_WRITE)),
        AsmInst::Svc(0),
        AsmInst::Ret,
    ]);

    lines.push(AsmLine::Blank);
    lines.push(AsmLine::Directive(Directive::Section(".bss".to_string())));
    lines.push(AsmLine::Directive(Directive::Skip {
        name: INT_BUF.to_string(),
        bytes: INT_BUF_SIZE,
    }));
    lines
}
