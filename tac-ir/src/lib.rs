//! TAC to ARMv8 backend - Intermediate Representation
//! 
//! This crate defines the flat three-address instruction stream consumed by
//! the backend and the loader that decodes it from its textual form.

pub mod ir;
pub mod loader;

pub use ir::{IrInstruction, Opcode, Operand, OPERAND_SLOTS};
pub use loader::{load_ir, parse_ir, parse_ir_with_report, LoadReport};
pub use tac_common::InstrIndex;
