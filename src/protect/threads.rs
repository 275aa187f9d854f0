// CLASSIFICATION: COMMUNITY
// Filename: threads.rs v0.4
// Author: Lukas Bower
// Date Modified: 2026-08-14

//! Per-thread protection state: registered stack windows, violation
//! counters and a bounded ring of recent offending addresses. The table is
//! owned by the scheduler side of the system; the classifier only reads the
//! pid-indexed bounds and bumps the counters.

/// Small integer thread identifier in `[0, max_threads)`.
pub type ThreadId = usize;

/// Capacity of the per-thread ring of recent offending addresses.
pub const RECENT_ADDRS: usize = 8;

#[derive(Clone, Copy, Debug, Default)]
struct ThreadSlot {
    registered: bool,
    stack_lower: usize,
    stack_upper: usize,
    violations: u32,
    recent: [usize; RECENT_ADDRS],
    recent_len: usize,
    recent_cursor: usize,
}

/// Fixed-slot table of per-thread protection state.
///
/// Also carries the active pid (recomputed by the scheduler on every
/// context switch) and the IRQ nesting depth that feeds the privileged
/// fast path of the classifier.
#[derive(Debug)]
pub struct ThreadTable {
    slots: Vec<ThreadSlot>,
    active: ThreadId,
    irq_nesting: u32,
}

impl ThreadTable {
    pub fn new(max_threads: usize) -> Self {
        ThreadTable {
            slots: vec![ThreadSlot::default(); max_threads],
            active: 0,
            irq_nesting: 0,
        }
    }

    /// Register a freshly carved stack window for `pid`, resetting the
    /// slot's violation accounting. Out-of-range pids are ignored.
    pub fn register_stack(&mut self, pid: ThreadId, lower: usize, upper: usize) {
        if let Some(slot) = self.slots.get_mut(pid) {
            *slot = ThreadSlot {
                registered: true,
                stack_lower: lower,
                stack_upper: upper,
                ..ThreadSlot::default()
            };
        }
    }

    /// Drop the window for `pid` once its backing block is freed.
    pub fn release_stack(&mut self, pid: ThreadId) {
        if let Some(slot) = self.slots.get_mut(pid) {
            slot.registered = false;
        }
    }

    /// The registered `[lower, upper)` window of `pid`, if any.
    pub fn window(&self, pid: ThreadId) -> Option<(usize, usize)> {
        let slot = self.slots.get(pid)?;
        if slot.registered {
            Some((slot.stack_lower, slot.stack_upper))
        } else {
            None
        }
    }

    /// Record one violation by `pid` at `addr`.
    pub fn note_violation(&mut self, pid: ThreadId, addr: usize) {
        if let Some(slot) = self.slots.get_mut(pid) {
            slot.violations = slot.violations.wrapping_add(1);
            slot.recent[slot.recent_cursor] = addr;
            slot.recent_cursor = (slot.recent_cursor + 1) % RECENT_ADDRS;
            if slot.recent_len < RECENT_ADDRS {
                slot.recent_len += 1;
            }
        }
    }

    /// Violation count for `pid`; zero for unknown pids.
    pub fn violations(&self, pid: ThreadId) -> u32 {
        self.slots.get(pid).map_or(0, |s| s.violations)
    }

    /// Recent offending addresses of `pid`, oldest entries overwritten
    /// first once the ring wraps.
    pub fn recent_violations(&self, pid: ThreadId) -> Vec<usize> {
        match self.slots.get(pid) {
            Some(slot) => slot.recent[..slot.recent_len].to_vec(),
            None => Vec::new(),
        }
    }

    pub fn set_active(&mut self, pid: ThreadId) {
        self.active = pid;
    }

    pub fn active(&self) -> ThreadId {
        self.active
    }

    pub fn enter_irq(&mut self) {
        self.irq_nesting += 1;
    }

    pub fn exit_irq(&mut self) {
        self.irq_nesting = self.irq_nesting.saturating_sub(1);
    }

    pub fn in_irq(&self) -> bool {
        self.irq_nesting > 0
    }
}
