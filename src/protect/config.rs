// CLASSIFICATION: COMMUNITY
// Filename: config.rs v0.2
// Author: Lukas Bower
// Date Modified: 2026-08-05

//! Tunable constants of the protection core. The defaults reproduce the
//! historical Cortex-M deployment values; boards with different register
//! files or arena budgets override them at context construction.

/// Protection core configuration, injected into [`ProtectionContext::new`].
///
/// [`ProtectionContext::new`]: crate::protect::context::ProtectionContext::new
#[derive(Clone, Copy, Debug)]
pub struct ProtectionConfig {
    /// Bytes a thread may reach below its registered lower stack bound.
    /// Tolerates push-before-check sequences in function prologues.
    pub guard_margin: usize,
    /// Capacity of the shared allocator arena in bytes.
    pub shared_arena_size: usize,
    /// Number of thread slots in the per-thread table.
    pub max_threads: usize,
    /// Platform allocation alignment in bytes.
    pub align: usize,
    /// Arguments passed in hardware registers before spilling to the
    /// stack; calls passing more receive a stack-depth guard when the
    /// containing function has a dynamic stack allocation.
    pub arg_regs: usize,
}

impl Default for ProtectionConfig {
    fn default() -> Self {
        ProtectionConfig {
            guard_margin: 32,
            shared_arena_size: 1024,
            max_threads: 8,
            align: 4,
            arg_regs: 4,
        }
    }
}
