// CLASSIFICATION: COMMUNITY
// Filename: arena.rs v0.5
// Author: Lukas Bower
// Date Modified: 2026-08-14

//! Region-bounded block allocator: a singly-linked free list with first-fit
//! search, split-on-allocate and no coalescing. Block metadata is kept in
//! index-addressed descriptor records instead of headers embedded in raw
//! memory, with the historical metadata overhead still charged inside the
//! arena so the capacity arithmetic is unchanged.
//!
//! Freed blocks only flip their availability bit; long allocate/free cycles
//! fragment the arena and that is a documented limitation, not a bug.

use log::{debug, trace};
use thiserror::Error;

/// Tag marking a descriptor as genuine block metadata. Matching this tag is
/// the only validity check `free` performs.
pub const BLOCK_MAGIC: u32 = 0o123;

/// Unaligned size of the historical on-arena block header.
const RAW_METADATA_SIZE: usize = 24;

/// Errors produced while establishing an arena.
#[derive(Debug, Error)]
pub enum ArenaError {
    #[error("arena capacity {0} too small after alignment")]
    CapacityTooSmall(usize),
    #[error("alignment {0} is not a power of two")]
    BadAlignment(usize),
}

/// Capability handle identifying one allocated block. Returned beside the
/// payload address so the test harness can tell a genuinely valid block
/// from a tag that happened to match garbage; the production `free` path
/// keeps the weak address-plus-tag check.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BlockToken {
    index: usize,
    tag: u32,
}

/// One successful allocation: payload address, rounded-up size and the
/// capability token for the block record backing it.
#[derive(Clone, Copy, Debug)]
pub struct Allocation {
    pub addr: usize,
    pub size: usize,
    pub token: BlockToken,
}

/// Descriptor for one block in the arena chain. `offset` addresses the
/// start of the (virtual) header; the payload begins `metadata_size` bytes
/// after it. `next` is the chain successor by descriptor index.
#[derive(Clone, Copy, Debug)]
struct BlockRecord {
    offset: usize,
    size: usize,
    available: bool,
    tag: u32,
    next: Option<usize>,
}

/// Snapshot of one chain entry, for diagnostics and tests.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BlockInfo {
    pub addr: usize,
    pub size: usize,
    pub available: bool,
}

/// A fixed-capacity contiguous arena managed by one free-list instance.
///
/// Two independent instances exist at runtime (the thread-stack arena and
/// the shared arena); they hold disjoint descriptor vectors and cannot
/// corrupt each other's bookkeeping.
#[derive(Debug)]
pub struct BlockArena {
    base: usize,
    capacity: usize,
    align: usize,
    metadata_size: usize,
    head: usize,
    blocks: Vec<BlockRecord>,
}

impl BlockArena {
    /// Establish an arena over `[base, base + capacity)`.
    ///
    /// The base is aligned up and the capacity shrunk accordingly; one
    /// available block then spans the whole arena. Fails if the aligned
    /// capacity cannot hold even the metadata of a single block.
    pub fn init(base: usize, capacity: usize, align: usize) -> Result<Self, ArenaError> {
        if align == 0 || !align.is_power_of_two() {
            return Err(ArenaError::BadAlignment(align));
        }
        let mut base = base;
        let mut capacity = capacity;
        let misalignment = base % align;
        if misalignment != 0 {
            let adjust = align - misalignment;
            base += adjust;
            capacity = capacity.saturating_sub(adjust);
        }
        let metadata_size = align_up(RAW_METADATA_SIZE, align);
        if capacity <= metadata_size {
            return Err(ArenaError::CapacityTooSmall(capacity));
        }
        let initial = BlockRecord {
            offset: 0,
            size: capacity - metadata_size,
            available: true,
            tag: BLOCK_MAGIC,
            next: None,
        };
        debug!(
            "arena init: base={:#x} capacity={} metadata={}",
            base, capacity, metadata_size
        );
        Ok(BlockArena {
            base,
            capacity,
            align,
            metadata_size,
            head: 0,
            blocks: vec![initial],
        })
    }

    /// Allocate `size` bytes, rounded up to the alignment boundary.
    ///
    /// First-fit scan over the chain; the first available block large
    /// enough is taken, and split when the leftover can hold at least one
    /// more header. Returns `None` when no block fits — exhaustion is a
    /// recoverable condition for the caller, never a trap.
    pub fn allocate(&mut self, size: usize) -> Option<Allocation> {
        let size = align_up(size, self.align);
        let index = self.find_block(size)?;
        if self.blocks[index].size > size + self.metadata_size {
            self.split_block(index, size);
        }
        let record = &self.blocks[index];
        Some(Allocation {
            addr: self.base + record.offset + self.metadata_size,
            size: record.size,
            token: BlockToken {
                index,
                tag: record.tag,
            },
        })
    }

    /// Release the block whose payload starts at `addr`.
    ///
    /// Deliberately weak: an address outside the arena, not matching any
    /// payload start, or with a mismatched tag is silently ignored. A
    /// double free flips an already-available bit and is harmless. Nothing
    /// here can corrupt the chain and nothing panics.
    pub fn free(&mut self, addr: usize) {
        if addr < self.base || addr >= self.base + self.capacity {
            trace!("free ignored: {:#x} outside arena", addr);
            return;
        }
        let offset = addr - self.base;
        if offset < self.metadata_size {
            trace!("free ignored: {:#x} inside leading metadata", addr);
            return;
        }
        let header_offset = offset - self.metadata_size;
        match self
            .blocks
            .iter_mut()
            .find(|b| b.offset == header_offset)
        {
            Some(block) if block.tag == BLOCK_MAGIC => {
                block.available = true;
            }
            _ => trace!("free ignored: {:#x} has no tagged header", addr),
        }
    }

    /// Whether the block behind `token` is currently available. `None` if
    /// the token does not name a genuine block record.
    pub fn block_available(&self, token: &BlockToken) -> Option<bool> {
        let record = self.blocks.get(token.index)?;
        if record.tag != token.tag {
            return None;
        }
        Some(record.available)
    }

    /// Chain snapshot in address order, for diagnostics and tests.
    pub fn chain(&self) -> Vec<BlockInfo> {
        let mut out = Vec::with_capacity(self.blocks.len());
        let mut cursor = Some(self.head);
        while let Some(index) = cursor {
            let record = &self.blocks[index];
            out.push(BlockInfo {
                addr: self.base + record.offset + self.metadata_size,
                size: record.size,
                available: record.available,
            });
            cursor = record.next;
        }
        out
    }

    /// Aligned arena capacity in bytes, metadata included.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Per-block metadata overhead in bytes.
    pub fn metadata_size(&self) -> usize {
        self.metadata_size
    }

    pub fn base(&self) -> usize {
        self.base
    }

    /// First-fit scan; marks the found block unavailable.
    fn find_block(&mut self, size: usize) -> Option<usize> {
        let mut cursor = Some(self.head);
        while let Some(index) = cursor {
            let record = &mut self.blocks[index];
            if record.available && record.size >= size {
                record.available = false;
                return Some(index);
            }
            cursor = record.next;
        }
        None
    }

    /// Shrink block `index` to `size` and splice a new available block
    /// covering the tail directly after it.
    fn split_block(&mut self, index: usize, size: usize) {
        let parent = self.blocks[index];
        let sibling = BlockRecord {
            offset: parent.offset + self.metadata_size + size,
            size: parent.size - size - self.metadata_size,
            available: true,
            tag: BLOCK_MAGIC,
            next: parent.next,
        };
        let sibling_index = self.blocks.len();
        let sibling_size = sibling.size;
        self.blocks.push(sibling);
        let parent = &mut self.blocks[index];
        parent.size = size;
        parent.next = Some(sibling_index);
        debug!(
            "arena split: parent={} sibling={} sibling_size={}",
            size, sibling_index, sibling_size
        );
    }
}

/// Round `value` up to the next multiple of `align`.
fn align_up(value: usize, align: usize) -> usize {
    match value % align {
        0 => value,
        rem => value + align - rem,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn align_up_rounds_to_boundary() {
        assert_eq!(align_up(0, 4), 0);
        assert_eq!(align_up(1, 4), 4);
        assert_eq!(align_up(50, 4), 52);
        assert_eq!(align_up(100, 4), 100);
    }

    #[test]
    fn init_rejects_degenerate_capacity() {
        assert!(matches!(
            BlockArena::init(0x2000_0000, 16, 4),
            Err(ArenaError::CapacityTooSmall(_))
        ));
        assert!(matches!(
            BlockArena::init(0x2000_0000, 1024, 3),
            Err(ArenaError::BadAlignment(3))
        ));
    }

    #[test]
    fn init_aligns_base_and_shrinks_capacity() {
        let arena = BlockArena::init(0x2000_0001, 1024, 4).unwrap();
        assert_eq!(arena.base() % 4, 0);
        assert_eq!(arena.capacity(), 1021);
    }

    #[test]
    fn chain_accounts_for_full_capacity() {
        let mut arena = BlockArena::init(0x2000_0000, 1024, 4).unwrap();
        arena.allocate(100).unwrap();
        arena.allocate(200).unwrap();
        let chain = arena.chain();
        let total: usize = chain.iter().map(|b| b.size + arena.metadata_size()).sum();
        assert_eq!(total, arena.capacity());
    }
}
