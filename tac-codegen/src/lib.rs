//! TAC to ARMv8 backend - Assembly Model
//! 
//! This crate handles the textual end of the backend:
//! 
//! - The AArch64 instruction and register model
//! - Program layout (entry directives, sections)
//! - The fixed `print_int` runtime routine appended to every program

pub mod asm;
pub mod emit;
pub mod runtime;

pub use asm::{AsmInst, AsmLine, AsmOperand, Cond, Directive, Reg};
pub use emit::{emit_lines, program_header};
pub use runtime::{print_call, print_int_routine};
