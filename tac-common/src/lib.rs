//! TAC to ARMv8 backend - Common Types and Utilities
//! 
//! This crate contains the shared error type, diagnostics and IR location
//! tracking used by every stage of the backend.

pub mod error;
pub mod location;

pub use error::{BackendError, Diagnostic, Severity};
pub use location::IrLocation;

/// Zero-based position of an instruction in the IR stream.
/// Jump targets are expressed in this unit, not in bytes.
pub type InstrIndex = usize;
