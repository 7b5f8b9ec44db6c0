//! Error handling for the TAC backend
//! 
//! This module defines the error type shared by the loader, the generator
//! and the driver, plus the diagnostic records the loader uses to report
//! lines it tolerated and skipped.

use crate::location::IrLocation;
use crate::InstrIndex;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Main backend error type
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BackendError {
    #[error("Unresolved branch target '{target}' at instruction {index}")]
    UnresolvedBranchTarget {
        index: InstrIndex,
        target: String,
    },

    #[error("Missing operand a{slot} for {opcode} at instruction {index}")]
    MissingOperand {
        index: InstrIndex,
        opcode: String,
        slot: usize,
    },

    #[error("Operand '{operand}' cannot be a destination at instruction {index}")]
    InvalidDestination {
        index: InstrIndex,
        operand: String,
    },

    #[error("Generator phase violation: expected {expected}, found {found}")]
    PhaseViolation {
        expected: String,
        found: String,
    },

    #[error("IO error: {message}")]
    Io { message: String },
}

impl BackendError {
    /// Create an unresolved branch error
    pub fn unresolved(index: InstrIndex, target: impl Into<String>) -> Self {
        BackendError::UnresolvedBranchTarget {
            index,
            target: target.into(),
        }
    }

    /// Instruction index the error refers to, if any
    pub fn index(&self) -> Option<InstrIndex> {
        match self {
            BackendError::UnresolvedBranchTarget { index, .. }
            | BackendError::MissingOperand { index, .. }
            | BackendError::InvalidDestination { index, .. } => Some(*index),
            BackendError::PhaseViolation { .. } | BackendError::Io { .. } => None,
        }
    }
}

/// Convert from std::io::Error
impl From<std::io::Error> for BackendError {
    fn from(err: std::io::Error) -> Self {
        BackendError::Io {
            message: err.to_string(),
        }
    }
}

/// Diagnostic severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    Warning,
    Note,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Warning => write!(f, "warning"),
            Severity::Note => write!(f, "note"),
        }
    }
}

/// A non-fatal message tied to a place in the IR stream
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
    pub location: IrLocation,
}

impl Diagnostic {
    pub fn warning(message: String, location: IrLocation) -> Self {
        Self {
            severity: Severity::Warning,
            message,
            location,
        }
    }

    pub fn note(message: String, location: IrLocation) -> Self {
        Self {
            severity: Severity::Note,
            message,
            location,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}: {}", self.location, self.severity, self.message)
    }
}
