// CLASSIFICATION: COMMUNITY
// Filename: layout.rs v0.3
// Author: Lukas Bower
// Date Modified: 2026-07-30

//! Link-time memory boundaries. The linker script reserves one section for
//! thread stacks, one for kernel globals and one for the kernel stack/heap;
//! their addresses arrive here as opaque constants and are validated once at
//! system init. Everything below `code_end` is flash, code and constants.

use thiserror::Error;

/// A half-open address range `[lower, upper)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AddrRange {
    pub lower: usize,
    pub upper: usize,
}

impl AddrRange {
    pub fn new(lower: usize, upper: usize) -> Self {
        AddrRange { lower, upper }
    }

    /// Whether `addr` lies within the range.
    pub fn contains(&self, addr: usize) -> bool {
        addr >= self.lower && addr < self.upper
    }

    /// Length of the range in bytes.
    pub fn len(&self) -> usize {
        self.upper.saturating_sub(self.lower)
    }

    /// Whether this range shares any address with `other`.
    pub fn overlaps(&self, other: &AddrRange) -> bool {
        self.lower < other.upper && other.lower < self.upper
    }
}

/// Errors produced while validating the linker-provided boundaries.
#[derive(Debug, Error)]
pub enum LayoutError {
    #[error("empty or inverted {0} range {1:#x}..{2:#x}")]
    EmptyRange(&'static str, usize, usize),
    #[error("{0} section overlaps {1} section")]
    Overlap(&'static str, &'static str),
}

/// The boundary addresses supplied by the build/link step.
///
/// Constructed once at init and immutable afterwards. The dynamic
/// current-thread stack window is not part of the map; it lives in the
/// thread table and is recomputed on every context switch.
#[derive(Clone, Copy, Debug)]
pub struct MemoryMap {
    /// Upper bound of the code/flash region; every lower address is
    /// read-only code or constant data.
    pub code_end: usize,
    /// The reserved thread-stack arena section.
    pub stacks: AddrRange,
    /// The kernel-global data section.
    pub kernel_data: AddrRange,
    /// The kernel stack/heap region.
    pub kernel_heap: AddrRange,
}

impl MemoryMap {
    /// Validate the boundary addresses and build the map.
    ///
    /// Each RAM range must be non-empty and the three ranges must be
    /// pairwise disjoint; the stack section must lie above the code split.
    pub fn new(
        code_end: usize,
        stacks: AddrRange,
        kernel_data: AddrRange,
        kernel_heap: AddrRange,
    ) -> Result<Self, LayoutError> {
        let named = [
            ("stacks", stacks),
            ("kernel_data", kernel_data),
            ("kernel_heap", kernel_heap),
        ];
        for (name, range) in named {
            if range.lower >= range.upper {
                return Err(LayoutError::EmptyRange(name, range.lower, range.upper));
            }
        }
        for i in 0..named.len() {
            for j in (i + 1)..named.len() {
                if named[i].1.overlaps(&named[j].1) {
                    return Err(LayoutError::Overlap(named[i].0, named[j].0));
                }
            }
        }
        if stacks.lower < code_end {
            return Err(LayoutError::Overlap("stacks", "code"));
        }
        Ok(MemoryMap {
            code_end,
            stacks,
            kernel_data,
            kernel_heap,
        })
    }
}
