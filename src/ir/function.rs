// CLASSIFICATION: COMMUNITY
// Filename: function.rs v0.3
// Author: Lukas Bower
// Date Modified: 2026-08-02

//! Function IR node: owns instructions and metadata.

use crate::ir::instruction::{AllocaSize, Instruction, Opcode};
use std::fmt;

#[derive(Clone, Debug, Default)]
pub struct Function {
    pub name: String,
    pub body: Vec<Instruction>,
}

impl Function {
    /// Create a new function with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Function {
            name: name.into(),
            body: Vec::new(),
        }
    }

    /// Append an instruction to the body.
    pub fn push(&mut self, instr: Instruction) {
        self.body.push(instr);
    }

    /// Whether the body contains a dynamically sized stack allocation.
    pub fn has_dynamic_alloca(&self) -> bool {
        self.body.iter().any(|i| {
            matches!(
                i.opcode,
                Opcode::Alloca {
                    size: AllocaSize::Dynamic
                }
            )
        })
    }

    /// Index of the first instruction past the leading alloca group, i.e.
    /// the spot where an entry guard belongs.
    pub fn first_non_alloca(&self) -> usize {
        self.body
            .iter()
            .position(|i| !i.is_alloca())
            .unwrap_or(self.body.len())
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "fn {}() {{", self.name)?;
        for instr in &self.body {
            writeln!(f, "  {}", instr)?;
        }
        write!(f, "}}")
    }
}
