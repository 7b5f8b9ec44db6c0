//! TAC to ARMv8 backend - Code Generator
//! 
//! This crate lowers a decoded three-address instruction stream to AArch64
//! assembly. All translation state (register bindings, labels) lives in the
//! [`Generator`] created for one invocation and is handed back with the
//! resulting [`Program`]; nothing is kept between invocations.

pub mod labels;
pub mod lower;
pub mod naming;

pub use labels::{label_name, LabelTable};
pub use lower::{generate, Generator, Phase, Program};
pub use naming::{BindingKey, RegisterBindings, Scratch};

use tac_common::BackendError;

/// Options for generation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorOptions {
    /// Fail on branch targets that cannot become a declared label instead of
    /// dropping or dangling the branch
    pub strict_branches: bool,
    pub entry_label: String,
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        Self {
            strict_branches: true,
            entry_label: "_start".to_string(),
        }
    }
}

/// Decode an IR stream and return the assembly text
pub fn compile_ir(text: &str, options: &GeneratorOptions) -> Result<String, BackendError> {
    let instructions = tac_ir::parse_ir(text);
    Ok(generate(&instructions, options)?.to_text())
}
