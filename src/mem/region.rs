// CLASSIFICATION: COMMUNITY
// Filename: region.rs v0.3
// Author: Lukas Bower
// Date Modified: 2026-08-02

//! Static region classification used by the access classifier. The table is
//! built once from the linker map plus the shared arena range and answers a
//! single question: which trust class does an address belong to.

use crate::mem::layout::{AddrRange, MemoryMap};

/// Trust classification of an address range.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RegionKind {
    /// Flash, code and constants below the code split. Read access trusted.
    Code,
    /// The active thread's own stack window. Never stored in the table;
    /// resolved dynamically against the thread table.
    CurrentStack,
    /// The thread-stack arena as a whole (any thread's stack).
    OtherStacks,
    /// Kernel global data section.
    KernelData,
    /// Kernel stack/heap region.
    KernelHeap,
    /// The shared allocator arena.
    SharedHeap,
    /// Peripheral space and any unmapped-but-not-forbidden range.
    Peripheral,
}

/// A classified address range.
#[derive(Clone, Copy, Debug)]
pub struct Region {
    pub kind: RegionKind,
    pub range: AddrRange,
}

/// Lookup table from address to region kind.
///
/// Immutable after construction. `kind_of` never returns `CurrentStack`:
/// the per-thread window is a dynamic sub-range of `OtherStacks` owned by
/// the scheduler, and the classifier checks it before consulting the table.
#[derive(Clone, Debug)]
pub struct RegionTable {
    code_end: usize,
    stacks: AddrRange,
    kernel_data: AddrRange,
    kernel_heap: AddrRange,
    shared: AddrRange,
}

impl RegionTable {
    pub fn new(map: &MemoryMap, shared: AddrRange) -> Self {
        RegionTable {
            code_end: map.code_end,
            stacks: map.stacks,
            kernel_data: map.kernel_data,
            kernel_heap: map.kernel_heap,
            shared,
        }
    }

    /// Classify an address. The shared arena takes precedence over the
    /// kernel sections so a shared buffer carved out of kernel RAM still
    /// classifies as `SharedHeap`.
    pub fn kind_of(&self, addr: usize) -> RegionKind {
        if addr < self.code_end {
            RegionKind::Code
        } else if self.stacks.contains(addr) {
            RegionKind::OtherStacks
        } else if self.shared.contains(addr) {
            RegionKind::SharedHeap
        } else if self.kernel_data.contains(addr) {
            RegionKind::KernelData
        } else if self.kernel_heap.contains(addr) {
            RegionKind::KernelHeap
        } else {
            RegionKind::Peripheral
        }
    }

    /// The fixed regions in table order, for diagnostics.
    pub fn regions(&self) -> [Region; 5] {
        [
            Region {
                kind: RegionKind::Code,
                range: AddrRange::new(0, self.code_end),
            },
            Region {
                kind: RegionKind::OtherStacks,
                range: self.stacks,
            },
            Region {
                kind: RegionKind::SharedHeap,
                range: self.shared,
            },
            Region {
                kind: RegionKind::KernelData,
                range: self.kernel_data,
            },
            Region {
                kind: RegionKind::KernelHeap,
                range: self.kernel_heap,
            },
        ]
    }

    pub fn stacks(&self) -> AddrRange {
        self.stacks
    }

    pub fn shared(&self) -> AddrRange {
        self.shared
    }
}
