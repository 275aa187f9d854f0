// CLASSIFICATION: COMMUNITY
// Filename: mod.rs v0.2
// Author: Lukas Bower
// Date Modified: 2026-07-30

//! Memory subsystem root module. Re-exports the linker-derived layout, the
//! region classification table and the block allocator.

pub mod arena;
pub mod layout;
pub mod region;

pub use arena::{Allocation, ArenaError, BlockArena, BlockToken, BLOCK_MAGIC};
pub use layout::{AddrRange, LayoutError, MemoryMap};
pub use region::{Region, RegionKind, RegionTable};
