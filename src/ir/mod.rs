// CLASSIFICATION: COMMUNITY
// Filename: mod.rs v0.2
// Author: Lukas Bower
// Date Modified: 2026-08-02

//! Intermediate Representation (IR) root module for the Rampart
//! instrumentation stage. Re-exports instructions, functions, modules and
//! context management.

pub mod context;
pub mod function;
pub mod instruction;
pub mod module;

pub use context::IRContext;
pub use function::Function;
pub use instruction::{AddrExpr, AllocaSize, Instruction, Opcode};
pub use module::{GlobalVar, Module};
