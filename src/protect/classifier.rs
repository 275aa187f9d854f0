// CLASSIFICATION: COMMUNITY
// Filename: classifier.rs v0.5
// Author: Lukas Bower
// Date Modified: 2026-08-14

//! The runtime access classifier: the allow/deny decision taken before
//! every instrumented load or store. Checked in a fixed priority order —
//! privileged context first, then the trusted code region, then the
//! requesting thread's own stack window, then the exclusion rules.

use crate::mem::region::{RegionKind, RegionTable};
use crate::protect::fault::FaultKind;
use crate::protect::threads::{ThreadId, ThreadTable};
use log::warn;

/// Kind of memory operation being checked.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AccessKind {
    Load,
    Store,
}

/// One instrumented access, constructed per invocation and never stored
/// beyond the classify call.
#[derive(Clone, Copy, Debug)]
pub struct AccessEvent {
    pub addr: usize,
    pub size: usize,
    pub kind: AccessKind,
    pub pid: ThreadId,
    pub in_irq: bool,
}

/// Classifier outcome. `Deny` names the fault the dispatcher must raise.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verdict {
    Allow,
    Deny(FaultKind),
}

impl AccessKind {
    fn fault(self) -> FaultKind {
        match self {
            AccessKind::Load => FaultKind::LoadFault,
            AccessKind::Store => FaultKind::StoreFault,
        }
    }
}

/// Classify one access. First match wins:
///
/// 1. IRQ context: always allowed — interrupts run privileged.
/// 2. Code region: allowed.
/// 3. The thread's own stack window, extended `guard_margin` bytes below
///    its lower bound: allowed.
/// 4. Anywhere else in the stack arena: cross-thread violation, denied.
/// 5. Kernel data/heap: stores denied; loads counted but tolerated (the
///    documented historical baseline).
/// 6. Everything else (peripherals, unmapped): allowed.
///
/// Denials and tolerated kernel loads increment the thread's violation
/// counter and record the address in its recent-offender ring.
pub fn classify(
    threads: &mut ThreadTable,
    regions: &RegionTable,
    guard_margin: usize,
    event: &AccessEvent,
) -> Verdict {
    if event.in_irq {
        return Verdict::Allow;
    }

    let kind = regions.kind_of(event.addr);
    if kind == RegionKind::Code {
        return Verdict::Allow;
    }

    if let Some((lower, upper)) = threads.window(event.pid) {
        if event.addr >= lower.saturating_sub(guard_margin) && event.addr < upper {
            return Verdict::Allow;
        }
    }

    match kind {
        RegionKind::OtherStacks => {
            threads.note_violation(event.pid, event.addr);
            warn!(
                "thread {} {:?} of {} bytes at {:#x}: cross-thread stack violation",
                event.pid, event.kind, event.size, event.addr
            );
            Verdict::Deny(event.kind.fault())
        }
        RegionKind::KernelData | RegionKind::KernelHeap => {
            threads.note_violation(event.pid, event.addr);
            match event.kind {
                AccessKind::Store => {
                    warn!(
                        "thread {} store of {} bytes at {:#x}: kernel region violation",
                        event.pid, event.size, event.addr
                    );
                    Verdict::Deny(FaultKind::StoreFault)
                }
                // Historically tolerated: counted, logged, allowed.
                AccessKind::Load => {
                    warn!(
                        "thread {} load at {:#x}: kernel region access tolerated",
                        event.pid, event.addr
                    );
                    Verdict::Allow
                }
            }
        }
        _ => Verdict::Allow,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mem::layout::{AddrRange, MemoryMap};

    fn fixture() -> (ThreadTable, RegionTable) {
        let map = MemoryMap::new(
            0x2000_0000,
            AddrRange::new(0x2000_0000, 0x2000_4000),
            AddrRange::new(0x2000_4000, 0x2000_5000),
            AddrRange::new(0x2000_5000, 0x2000_7000),
        )
        .unwrap();
        let regions = RegionTable::new(&map, AddrRange::new(0x2000_8000, 0x2000_8400));
        let mut threads = ThreadTable::new(8);
        threads.register_stack(1, 0x2000_1000, 0x2000_1400);
        threads.register_stack(2, 0x2000_2000, 0x2000_2400);
        (threads, regions)
    }

    fn event(addr: usize, kind: AccessKind, pid: usize) -> AccessEvent {
        AccessEvent {
            addr,
            size: 4,
            kind,
            pid,
            in_irq: false,
        }
    }

    #[test]
    fn own_window_is_allowed_for_both_kinds() {
        let (mut threads, regions) = fixture();
        for kind in [AccessKind::Load, AccessKind::Store] {
            let verdict = classify(&mut threads, &regions, 32, &event(0x2000_1200, kind, 1));
            assert_eq!(verdict, Verdict::Allow);
        }
        assert_eq!(threads.violations(1), 0);
    }

    #[test]
    fn guard_margin_below_lower_bound_is_tolerated() {
        let (mut threads, regions) = fixture();
        let verdict = classify(
            &mut threads,
            &regions,
            32,
            &event(0x2000_1000 - 32, AccessKind::Store, 1),
        );
        assert_eq!(verdict, Verdict::Allow);
        let verdict = classify(
            &mut threads,
            &regions,
            32,
            &event(0x2000_1000 - 33, AccessKind::Store, 1),
        );
        assert_eq!(verdict, Verdict::Deny(FaultKind::StoreFault));
    }

    #[test]
    fn cross_thread_access_denied_and_counted() {
        let (mut threads, regions) = fixture();
        let verdict = classify(
            &mut threads,
            &regions,
            32,
            &event(0x2000_2100, AccessKind::Load, 1),
        );
        assert_eq!(verdict, Verdict::Deny(FaultKind::LoadFault));
        assert_eq!(threads.violations(1), 1);
        assert_eq!(threads.recent_violations(1), vec![0x2000_2100]);
    }

    #[test]
    fn irq_context_overrides_everything() {
        let (mut threads, regions) = fixture();
        for addr in [0x2000_2100usize, 0x2000_4100, 0x2000_5100] {
            let mut ev = event(addr, AccessKind::Store, 1);
            ev.in_irq = true;
            assert_eq!(classify(&mut threads, &regions, 32, &ev), Verdict::Allow);
        }
        assert_eq!(threads.violations(1), 0);
    }

    #[test]
    fn kernel_store_denied_kernel_load_tolerated() {
        let (mut threads, regions) = fixture();
        let verdict = classify(
            &mut threads,
            &regions,
            32,
            &event(0x2000_4100, AccessKind::Store, 1),
        );
        assert_eq!(verdict, Verdict::Deny(FaultKind::StoreFault));
        let verdict = classify(
            &mut threads,
            &regions,
            32,
            &event(0x2000_5100, AccessKind::Load, 1),
        );
        assert_eq!(verdict, Verdict::Allow);
        // both touched the counter
        assert_eq!(threads.violations(1), 2);
    }

    #[test]
    fn code_and_peripheral_space_allowed() {
        let (mut threads, regions) = fixture();
        for addr in [0x0800_0000usize, 0x4000_0000] {
            let verdict = classify(&mut threads, &regions, 32, &event(addr, AccessKind::Load, 1));
            assert_eq!(verdict, Verdict::Allow);
        }
    }
}
