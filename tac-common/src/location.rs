//! Location tracking for IR stream diagnostics
//! 
//! IR records are addressed two ways: by their 1-based line in the input
//! file (useful for humans) and by their zero-based instruction index
//! (the unit jump targets use). Skipped lines have no index.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::InstrIndex;

/// A location in an IR stream
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IrLocation {
    pub filename: String,
    pub line: u32,
    pub index: Option<InstrIndex>,
}

impl IrLocation {
    /// Create a location for a line that did not produce an instruction
    pub fn new(filename: &str, line: u32) -> Self {
        Self {
            filename: filename.to_string(),
            line,
            index: None,
        }
    }

    /// Attach the instruction index produced from this line
    pub fn with_index(mut self, index: InstrIndex) -> Self {
        self.index = Some(index);
        self
    }

    /// Create a dummy location for testing
    pub fn dummy() -> Self {
        Self::new("<unknown>", 0)
    }
}

impl fmt::Display for IrLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.index {
            Some(index) => write!(f, "{}:{} (#{})", self.filename, self.line, index),
            None => write!(f, "{}:{}", self.filename, self.line),
        }
    }
}
