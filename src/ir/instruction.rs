// CLASSIFICATION: COMMUNITY
// Filename: instruction.rs v0.6
// Author: Lukas Bower
// Date Modified: 2026-08-14

//! Core IR instruction representation for the instrumentation stage: a
//! linear, string-operand form with explicit memory opcodes.
//!
//! Operand conventions by opcode:
//!
//! - `Load { width }`: `[dest, addr]`
//! - `Store { width }`: `[addr, value]`
//! - `AtomicRmw { width }`: `[addr, value]`
//! - `AtomicCmpXchg { width }`: `[addr, expected, new]`
//! - `MemCopy` / `MemMove`: `[dest, src, len]`
//! - `MemSet`: `[dest, value, len]`
//! - `Alloca { size }`: `[name]`
//! - `Call { function }`: the argument list
//!
//! Address operands are expressions of the form `%local`, `%local+8`,
//! `@global`, `@global+12` or an opaque SSA name; see [`AddrExpr`].

use std::fmt;

/// Size of a stack allocation: a compile-time constant or dynamic.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AllocaSize {
    Const(usize),
    Dynamic,
}

/// Represents an opcode in the intermediate representation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Opcode {
    Nop,
    Add,
    Sub,
    Mul,
    Div,
    Load { width: usize },
    Store { width: usize },
    AtomicRmw { width: usize },
    AtomicCmpXchg { width: usize },
    MemCopy,
    MemMove,
    MemSet,
    Alloca { size: AllocaSize },
    Jump,
    Branch { condition: String },
    Call { function: String },
    Ret,
    /// Inserted guard: read the stack pointer, compare against the thread
    /// lower bound, branch to the stack-overflow trap at or below it.
    StackGuard,
    /// Inserted guard for IRQ-only routines: probe the privilege state at
    /// entry and branch to the fault path if the probe fails.
    IrqGuard,
}

/// A single IR instruction with its operands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Instruction {
    /// The operation code of this instruction.
    pub opcode: Opcode,
    /// String-encoded operand list. Interpretation depends on the opcode.
    pub operands: Vec<String>,
}

impl Default for Instruction {
    fn default() -> Self {
        Instruction {
            opcode: Opcode::Nop,
            operands: Vec::new(),
        }
    }
}

impl Instruction {
    /// Constructs a new instruction with the given opcode and operands.
    pub fn new(opcode: Opcode, operands: Vec<String>) -> Self {
        Instruction { opcode, operands }
    }

    /// Shorthand for a call instruction.
    pub fn call(function: impl Into<String>, args: Vec<String>) -> Self {
        Instruction {
            opcode: Opcode::Call {
                function: function.into(),
            },
            operands: args,
        }
    }

    /// Whether this instruction is a stack allocation.
    pub fn is_alloca(&self) -> bool {
        matches!(self.opcode, Opcode::Alloca { .. })
    }

    /// The address operand of a memory access, if this opcode has one.
    pub fn access_addr(&self) -> Option<&str> {
        match self.opcode {
            Opcode::Load { .. } => self.operands.get(1).map(String::as_str),
            Opcode::Store { .. }
            | Opcode::AtomicRmw { .. }
            | Opcode::AtomicCmpXchg { .. } => self.operands.first().map(String::as_str),
            _ => None,
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ops = self.operands.join(", ");
        match &self.opcode {
            Opcode::Branch { condition } => write!(f, "Branch {} if {}", ops, condition),
            Opcode::Call { function } => write!(f, "Call {}({})", function, ops),
            Opcode::Load { width } => write!(f, "Load.{} {}", width, ops),
            Opcode::Store { width } => write!(f, "Store.{} {}", width, ops),
            Opcode::Alloca { size: AllocaSize::Const(n) } => write!(f, "Alloca.{} {}", n, ops),
            Opcode::Alloca { size: AllocaSize::Dynamic } => write!(f, "Alloca.dyn {}", ops),
            other => write!(f, "{:?} {}", other, ops),
        }
    }
}

/// A parsed address expression: a base name plus a byte offset. The offset
/// is `None` when the textual offset is not a constant (e.g. `%buf+%i`).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AddrExpr<'a> {
    pub base: &'a str,
    pub offset: Option<i64>,
}

impl<'a> AddrExpr<'a> {
    /// Parse `base`, `base+off` or `base-off`.
    pub fn parse(expr: &'a str) -> Self {
        if let Some(pos) = expr.rfind(['+', '-']) {
            if pos > 0 {
                let (base, rest) = expr.split_at(pos);
                let offset = rest.parse::<i64>().ok();
                return AddrExpr { base, offset };
            }
        }
        AddrExpr {
            base: expr,
            offset: Some(0),
        }
    }

    /// Whether the base names a local stack slot.
    pub fn is_local(&self) -> bool {
        self.base.starts_with('%')
    }

    /// Whether the base names a global variable.
    pub fn is_global(&self) -> bool {
        self.base.starts_with('@')
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_base() {
        let e = AddrExpr::parse("%buf");
        assert_eq!(e.base, "%buf");
        assert_eq!(e.offset, Some(0));
        assert!(e.is_local());
    }

    #[test]
    fn parses_positive_and_negative_offsets() {
        let e = AddrExpr::parse("@table+12");
        assert_eq!(e.base, "@table");
        assert_eq!(e.offset, Some(12));
        assert!(e.is_global());
        let e = AddrExpr::parse("%buf-4");
        assert_eq!(e.offset, Some(-4));
    }

    #[test]
    fn dynamic_offset_is_unknown() {
        let e = AddrExpr::parse("%buf+%i");
        assert_eq!(e.base, "%buf");
        assert_eq!(e.offset, None);
    }
}
