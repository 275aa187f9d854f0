// CLASSIFICATION: COMMUNITY
// Filename: traits.rs v0.2
// Author: Lukas Bower
// Date Modified: 2026-08-02

//! Defines the core traits for IR passes.

use crate::ir::IRContext;

/// Trait for any IR pass that transforms or analyzes the IR.
pub trait IRPass {
    /// Returns the unique name of the pass, used for logging and identification.
    fn name(&self) -> &'static str;

    /// Executes the pass against the provided IR context, mutating it in place.
    fn run(&self, context: &mut IRContext);
}
