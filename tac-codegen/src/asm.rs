//! AArch64 Assembly Definitions
//! 
//! The subset of the ARMv8 instruction set the backend emits. Mnemonics are
//! printed upper-case and registers lower-case, e.g. `ADD x2, x0, x1`.

use std::fmt;

/// AArch64 register
/// 
/// The backend models an unbounded register file, so register numbers are
/// not range-checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Reg {
    /// 64-bit view
    X(u32),
    /// 32-bit view, used for byte stores
    W(u32),
}

impl Reg {
    pub fn number(&self) -> u32 {
        match self {
            Reg::X(n) | Reg::W(n) => *n,
        }
    }
}

impl fmt::Display for Reg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reg::X(n) => write!(f, "x{}", n),
            Reg::W(n) => write!(f, "w{}", n),
        }
    }
}

/// Condition codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cond {
    Eq,
    Lt,
}

impl fmt::Display for Cond {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cond::Eq => write!(f, "EQ"),
            Cond::Lt => write!(f, "LT"),
        }
    }
}

/// Flexible second operand
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AsmOperand {
    Reg(Reg),
    /// Immediate, printed as `#<text>`. Kept textual so literals such as
    /// `'0'` pass through unchanged.
    Imm(String),
    /// Register-indirect memory access `[reg]`
    Mem(Reg),
}

impl AsmOperand {
    pub fn imm(value: i64) -> Self {
        AsmOperand::Imm(value.to_string())
    }
}

impl fmt::Display for AsmOperand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AsmOperand::Reg(r) => write!(f, "{}", r),
            AsmOperand::Imm(text) => write!(f, "#{}", text),
            AsmOperand::Mem(base) => write!(f, "[{}]", base),
        }
    }
}

impl From<Reg> for AsmOperand {
    fn from(reg: Reg) -> Self {
        AsmOperand::Reg(reg)
    }
}

/// AArch64 instructions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AsmInst {
    // Data movement
    Mov(Reg, AsmOperand),            // rd = op
    Ldr(Reg, AsmOperand),            // rd = memory[op]
    Str(Reg, AsmOperand),            // memory[op] = rs
    Strb(Reg, AsmOperand),           // memory[op] = rs & 0xff
    Adr(Reg, String),                // rd = address of label expression

    // Arithmetic
    Add(Reg, Reg, AsmOperand),       // rd = rn + op
    Sub(Reg, Reg, AsmOperand),       // rd = rn - op
    Mul(Reg, Reg, Reg),              // rd = rn * rm
    Udiv(Reg, Reg, Reg),             // rd = rn / rm (unsigned)

    // Flags
    Cmp(Reg, AsmOperand),
    Cset(Reg, Cond),                 // rd = cond ? 1 : 0

    // Control flow
    B(String),
    BCond(Cond, String),
    Br(Reg),
    Bl(String),
    Cbnz(Reg, String),
    Ret,

    // System
    Svc(u16),
}

impl fmt::Display for AsmInst {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AsmInst::Mov(rd, op) => write!(f, "MOV {}, {}", rd, op),
            AsmInst::Ldr(rd, op) => write!(f, "LDR {}, {}", rd, op),
            AsmInst::Str(rs, op) => write!(f, "STR {}, {}", rs, op),
            AsmInst::Strb(rs, op) => write!(f, "STRB {}, {}", rs, op),
            AsmInst::Adr(rd, expr) => write!(f, "ADR {}, {}", rd, expr),

            AsmInst::Add(rd, rn, op) => write!(f, "ADD {}, {}, {}", rd, rn, op),
            AsmInst::Sub(rd, rn, op) => write!(f, "SUB {}, {}, {}", rd, rn, op),
            AsmInst::Mul(rd, rn, rm) => write!(f, "MUL {}, {}, {}", rd, rn, rm),
            AsmInst::Udiv(rd, rn, rm) => write!(f, "UDIV {}, {}, {}", rd, rn, rm),

            AsmInst::Cmp(rn, op) => write!(f, "CMP {}, {}", rn, op),
            AsmInst::Cset(rd, cond) => write!(f, "CSET {}, {}", rd, cond),

            AsmInst::B(label) => write!(f, "B {}", label),
            AsmInst::BCond(cond, label) => write!(f, "B{} {}", cond, label),
            AsmInst::Br(rn) => write!(f, "BR {}", rn),
            AsmInst::Bl(label) => write!(f, "BL {}", label),
            AsmInst::Cbnz(rn, label) => write!(f, "CBNZ {}, {}", rn, label),
            AsmInst::Ret => write!(f, "RET"),

            AsmInst::Svc(imm) => write!(f, "SVC #{}", imm),
        }
    }
}

/// Assembler directives
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive {
    Global(String),
    Section(String),
    /// `name: .skip bytes`, an uninitialized storage region
    Skip { name: String, bytes: usize },
}

impl fmt::Display for Directive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Directive::Global(symbol) => write!(f, ".global {}", symbol),
            Directive::Section(name) => write!(f, ".section {}", name),
            Directive::Skip { name, bytes } => write!(f, "{}: .skip {}", name, bytes),
        }
    }
}

/// One line of the output program
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AsmLine {
    Directive(Directive),
    Label(String),
    Inst(AsmInst),
    /// Instruction inside a runtime routine, printed with indentation
    Indented(AsmInst),
    Comment(String),
    Blank,
}

impl AsmLine {
    /// The instruction carried by this line, if any
    pub fn inst(&self) -> Option<&AsmInst> {
        match self {
            AsmLine::Inst(inst) | AsmLine::Indented(inst) => Some(inst),
            _ => None,
        }
    }
}

impl fmt::Display for AsmLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AsmLine::Directive(d) => write!(f, "{}", d),
            AsmLine::Label(name) => write!(f, "{}:", name),
            AsmLine::Inst(inst) => write!(f, "{}", inst),
            AsmLine::Indented(inst) => write!(f, "    {}", inst),
            AsmLine::Comment(text) => write!(f, "; {}", text),
            AsmLine::Blank => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_display() {
        assert_eq!(format!("{}", Reg::X(0)), "x0");
        assert_eq!(format!("{}", Reg::X(117)), "x117");
        assert_eq!(format!("{}", Reg::W(8)), "w8");
    }

    #[test]
    fn test_instruction_display() {
        assert_eq!(AsmInst::Mov(Reg::X(3), AsmOperand::imm(42)).to_string(), "MOV x3, #42");
        assert_eq!(
            AsmInst::Ldr(Reg::X(1), AsmOperand::Mem(Reg::X(2))).to_string(),
            "LDR x1, [x2]"
        );
        assert_eq!(
            AsmInst::Add(Reg::X(8), Reg::X(8), AsmOperand::Imm("'0'".to_string())).to_string(),
            "ADD x8, x8, #'0'"
        );
        assert_eq!(AsmInst::Cset(Reg::X(2), Cond::Lt).to_string(), "CSET x2, LT");
        assert_eq!(AsmInst::BCond(Cond::Eq, "LABEL_4".to_string()).to_string(), "BEQ LABEL_4");
        assert_eq!(AsmInst::Svc(0).to_string(), "SVC #0");
    }

    #[test]
    fn test_line_display() {
        assert_eq!(AsmLine::Label("LABEL_0".to_string()).to_string(), "LABEL_0:");
        assert_eq!(AsmLine::Indented(AsmInst::Ret).to_string(), "    RET");
        assert_eq!(AsmLine::Comment("Unsupported: FOO a b c".to_string()).to_string(), "; Unsupported: FOO a b c");
        assert_eq!(AsmLine::Blank.to_string(), "");
        assert_eq!(
            AsmLine::Directive(Directive::Skip { name: "int_buf".to_string(), bytes: 20 }).to_string(),
            "int_buf: .skip 20"
        );
    }
}
