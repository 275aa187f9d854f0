// CLASSIFICATION: COMMUNITY
// Filename: context.rs v0.4
// Author: Lukas Bower
// Date Modified: 2026-08-14

//! The owning protection context: region table, both allocator arenas, the
//! per-thread table and the fault handler, behind one explicitly passed
//! object instead of free-floating globals. Callers must serialize access;
//! the global hook layer does so with a single mutex.

use crate::mem::arena::{Allocation, ArenaError, BlockArena};
use crate::mem::layout::{AddrRange, MemoryMap};
use crate::mem::region::RegionTable;
use crate::protect::classifier::{classify, AccessEvent, AccessKind, Verdict};
use crate::protect::config::ProtectionConfig;
use crate::protect::fault::{FaultHandler, FaultKind};
use crate::protect::threads::{ThreadId, ThreadTable};
use log::debug;

/// Everything the soft MPU needs at run time, owned in one place.
pub struct ProtectionContext {
    config: ProtectionConfig,
    regions: RegionTable,
    /// Arena over the reserved thread-stack section.
    pub thread_arena: BlockArena,
    /// Arena over the fixed shared-buffer range.
    pub shared_arena: BlockArena,
    /// Scheduler-owned thread state; the classifier reads bounds and bumps
    /// counters through it.
    pub threads: ThreadTable,
    handler: Box<dyn FaultHandler>,
}

impl ProtectionContext {
    /// Build the context: one arena over the linker stack section, one over
    /// the shared range starting at `shared_base`, and an empty thread
    /// table.
    pub fn new(
        map: MemoryMap,
        shared_base: usize,
        config: ProtectionConfig,
        handler: Box<dyn FaultHandler>,
    ) -> Result<Self, ArenaError> {
        let thread_arena = BlockArena::init(map.stacks.lower, map.stacks.len(), config.align)?;
        let shared_arena = BlockArena::init(shared_base, config.shared_arena_size, config.align)?;
        let shared_range = AddrRange::new(
            shared_arena.base(),
            shared_arena.base() + shared_arena.capacity(),
        );
        let regions = RegionTable::new(&map, shared_range);
        let threads = ThreadTable::new(config.max_threads);
        Ok(ProtectionContext {
            config,
            regions,
            thread_arena,
            shared_arena,
            threads,
            handler,
        })
    }

    /// Carve a stack block for `pid` out of the thread arena and register
    /// its window. `None` when the arena is exhausted.
    pub fn alloc_thread_stack(&mut self, pid: ThreadId, size: usize) -> Option<usize> {
        let allocation = self.thread_arena.allocate(size)?;
        self.threads
            .register_stack(pid, allocation.addr, allocation.addr + allocation.size);
        debug!(
            "thread {} stack window {:#x}..{:#x}",
            pid,
            allocation.addr,
            allocation.addr + allocation.size
        );
        Some(allocation.addr)
    }

    /// Release a thread's stack block and drop its registered window.
    pub fn free_thread_stack(&mut self, pid: ThreadId, addr: usize) {
        self.thread_arena.free(addr);
        self.threads.release_stack(pid);
    }

    /// Allocate a shared buffer usable across threads.
    pub fn alloc_shared(&mut self, size: usize) -> Option<Allocation> {
        self.shared_arena.allocate(size)
    }

    pub fn free_shared(&mut self, addr: usize) {
        self.shared_arena.free(addr);
    }

    /// Classify one access by the active thread; on a denial, dispatch the
    /// fault. This is the body behind the instrumented load/store hooks.
    pub fn check_access(&mut self, addr: usize, size: usize, kind: AccessKind) {
        let event = AccessEvent {
            addr,
            size,
            kind,
            pid: self.threads.active(),
            in_irq: self.threads.in_irq(),
        };
        if let Verdict::Deny(fault) = classify(
            &mut self.threads,
            &self.regions,
            self.config.guard_margin,
            &event,
        ) {
            self.handler.raise(fault, addr, event.pid);
        }
    }

    /// Stack-depth guard body: a stack pointer at or below the active
    /// thread's lower bound means the stack is exhausted.
    pub fn check_stack_depth(&mut self, sp: usize) {
        let pid = self.threads.active();
        if let Some((lower, _)) = self.threads.window(pid) {
            if sp <= lower {
                self.handler
                    .raise(FaultKind::StackOverflow, sp, pid);
            }
        }
    }

    pub fn regions(&self) -> &RegionTable {
        &self.regions
    }

    pub fn config(&self) -> &ProtectionConfig {
        &self.config
    }
}
