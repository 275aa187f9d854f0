// CLASSIFICATION: COMMUNITY
// Filename: lib.rs v0.4
// Author: Lukas Bower
// Date Modified: 2026-08-21

//! Root library for Rampart, a software-enforced memory protection layer
//! ("soft MPU") for microcontroller RTOS targets without a usable hardware
//! MPU. Three pieces cooperate: a region-bounded block allocator for thread
//! stacks and shared buffers, a runtime access classifier consulted before
//! every instrumented load/store, and a build-time IR pass that inserts the
//! classifier calls and stack-depth guards while eliding provably safe
//! accesses.

/// Memory layout, address regions and the block allocator
pub mod mem;

/// Runtime protection: classifier, fault dispatch, context and entry hooks
pub mod protect;

/// Intermediate Representation (IR) core types
pub mod ir;

/// IR pass framework
pub mod pass_framework;

/// Instrumentation passes
pub mod passes;

/// Prelude re-exporting the types most call sites need.
pub mod prelude {
    pub use crate::mem::arena::{Allocation, BlockArena, BlockToken};
    pub use crate::mem::layout::{AddrRange, MemoryMap};
    pub use crate::mem::region::{RegionKind, RegionTable};
    pub use crate::protect::classifier::{AccessEvent, AccessKind, Verdict};
    pub use crate::protect::config::ProtectionConfig;
    pub use crate::protect::context::ProtectionContext;
    pub use crate::protect::fault::{FaultHandler, FaultKind};
}
