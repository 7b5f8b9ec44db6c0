//! IR data model
//! 
//! Operators form a closed set with an explicit variant for tags the
//! backend does not know. Operands are classified once, when a record is
//! decoded, by their prefix: `#` immediate, `@` memory cell, anything else
//! a symbolic value.

use serde::{Deserialize, Serialize};
use std::fmt;
use tac_common::{InstrIndex, IrLocation};

/// Number of operand slots carried by every instruction
pub const OPERAND_SLOTS: usize = 3;

/// IR operators
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Opcode {
    Assign,
    Add,
    Sub,
    Mult,
    Lt,
    Jp,
    Jpf,
    Print,
    /// Any other tag, kept verbatim
    Unknown(String),
}

impl Opcode {
    /// Decode an operator tag. Tags are case-sensitive.
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "ASSIGN" => Opcode::Assign,
            "ADD" => Opcode::Add,
            "SUB" => Opcode::Sub,
            "MULT" => Opcode::Mult,
            "LT" => Opcode::Lt,
            "JP" => Opcode::Jp,
            "JPF" => Opcode::Jpf,
            "PRINT" => Opcode::Print,
            other => Opcode::Unknown(other.to_string()),
        }
    }

    pub fn tag(&self) -> &str {
        match self {
            Opcode::Assign => "ASSIGN",
            Opcode::Add => "ADD",
            Opcode::Sub => "SUB",
            Opcode::Mult => "MULT",
            Opcode::Lt => "LT",
            Opcode::Jp => "JP",
            Opcode::Jpf => "JPF",
            Opcode::Print => "PRINT",
            Opcode::Unknown(tag) => tag,
        }
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// A classified operand token
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operand {
    /// Unused slot
    Empty,
    /// `#<literal>`, stored without the prefix
    Immediate(String),
    /// `@<name>`, a cell addressed through `name`'s register
    Memory(String),
    /// A bare name resolved through the register binding table
    Symbol(String),
}

impl Operand {
    /// Classify a trimmed token
    pub fn classify(token: &str) -> Self {
        if token.is_empty() {
            Operand::Empty
        } else if let Some(lit) = token.strip_prefix('#') {
            Operand::Immediate(lit.to_string())
        } else if let Some(name) = token.strip_prefix('@') {
            Operand::Memory(name.to_string())
        } else {
            Operand::Symbol(token.to_string())
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Operand::Empty)
    }

    pub fn is_memory(&self) -> bool {
        matches!(self, Operand::Memory(_))
    }

    /// Read the operand as a jump address. Only bare all-digit tokens qualify.
    pub fn as_address(&self) -> Option<InstrIndex> {
        match self {
            Operand::Symbol(name) if name.bytes().all(|b| b.is_ascii_digit()) => {
                name.parse().ok()
            }
            _ => None,
        }
    }
}

impl fmt::Display for Operand {
    /// Reproduces the token as it appeared in the stream
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Empty => Ok(()),
            Operand::Immediate(lit) => write!(f, "#{}", lit),
            Operand::Memory(name) => write!(f, "@{}", name),
            Operand::Symbol(name) => f.write_str(name),
        }
    }
}

/// One decoded IR record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IrInstruction {
    pub opcode: Opcode,
    pub operands: [Operand; OPERAND_SLOTS],
    pub location: IrLocation,
}

impl IrInstruction {
    pub fn new(opcode: Opcode, operands: [Operand; OPERAND_SLOTS]) -> Self {
        Self {
            opcode,
            operands,
            location: IrLocation::dummy(),
        }
    }

    /// Build an instruction from raw tokens, as the loader does
    pub fn from_tokens(tag: &str, a1: &str, a2: &str, a3: &str) -> Self {
        Self::new(
            Opcode::from_tag(tag),
            [Operand::classify(a1), Operand::classify(a2), Operand::classify(a3)],
        )
    }

    pub fn a1(&self) -> &Operand {
        &self.operands[0]
    }

    pub fn a2(&self) -> &Operand {
        &self.operands[1]
    }

    pub fn a3(&self) -> &Operand {
        &self.operands[2]
    }

    /// The numeric jump address this instruction refers to, if any
    pub fn jump_address(&self) -> Option<InstrIndex> {
        match self.opcode {
            Opcode::Jp => self.a1().as_address(),
            Opcode::Jpf => self.a2().as_address(),
            _ => None,
        }
    }
}

impl fmt::Display for IrInstruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({}, {}, {}, {})",
            self.opcode,
            self.operands[0],
            self.operands[1],
            self.operands[2]
        )
    }
}
