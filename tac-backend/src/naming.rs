//! Register binding table
//! 
//! Binds every name the generator touches to an architectural register.
//! The register file is treated as unbounded: registers are handed out in
//! first-reference order (`x0`, `x1`, ...), a name keeps its register for
//! the whole pass, and registers are never reused or spilled.
//! 
//! Scratch registers are keyed separately from IR names so that an IR value
//! called `tmp` can never alias the generator's own scratch register.

use log::trace;
use std::collections::HashMap;
use std::fmt;
use tac_codegen::Reg;

/// Scratch roles used by the lowering rules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scratch {
    /// Staging register for stores to memory-backed destinations
    Store,
    /// Left operand of arithmetic and comparisons
    Lhs,
    /// Right operand of arithmetic and comparisons
    Rhs,
    /// Condition of a conditional jump
    Cond,
    /// Target address of an indirect jump
    JumpPtr,
    /// Value handed to the print routine
    Print,
}

impl Scratch {
    pub fn name(&self) -> &'static str {
        match self {
            Scratch::Store => "tmp",
            Scratch::Lhs => "tmp1",
            Scratch::Rhs => "tmp2",
            Scratch::Cond => "tmp_cond",
            Scratch::JumpPtr => "jmp_ptr",
            Scratch::Print => "tmp_print",
        }
    }
}

/// Key of a binding
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum BindingKey {
    /// A symbolic IR value (also the base of `@name` cells)
    Value(String),
    Scratch(Scratch),
}

impl fmt::Display for BindingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BindingKey::Value(name) => f.write_str(name),
            BindingKey::Scratch(s) => write!(f, "<{}>", s.name()),
        }
    }
}

/// Per-invocation name to register table
#[derive(Debug, Clone, Default)]
pub struct RegisterBindings {
    map: HashMap<BindingKey, Reg>,
    order: Vec<BindingKey>,
}

impl RegisterBindings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register bound to `key`, binding the next free register on first use
    pub fn bind(&mut self, key: BindingKey) -> Reg {
        if let Some(reg) = self.map.get(&key) {
            return *reg;
        }
        let reg = Reg::X(self.order.len() as u32);
        trace!("bind {} -> {}", key, reg);
        self.map.insert(key.clone(), reg);
        self.order.push(key);
        reg
    }

    /// Register of an IR value
    pub fn value(&mut self, name: &str) -> Reg {
        self.bind(BindingKey::Value(name.to_string()))
    }

    /// Register of a scratch role
    pub fn scratch(&mut self, role: Scratch) -> Reg {
        self.bind(BindingKey::Scratch(role))
    }

    /// Look up a binding without creating one
    pub fn get(&self, key: &BindingKey) -> Option<Reg> {
        self.map.get(key).copied()
    }

    pub fn get_value(&self, name: &str) -> Option<Reg> {
        self.get(&BindingKey::Value(name.to_string()))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Bindings in allocation order
    pub fn iter(&self) -> impl Iterator<Item = (&BindingKey, Reg)> + '_ {
        self.order.iter().map(move |key| (key, self.map[key]))
    }
}
