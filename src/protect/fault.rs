// CLASSIFICATION: COMMUNITY
// Filename: fault.rs v0.3
// Author: Lukas Bower
// Date Modified: 2026-08-14

//! Fault dispatch: the synchronous trap boundary between a classifier
//! denial (or stack-depth violation) and the scheduler's fault path. The
//! dispatcher raises the signal and nothing else; thread termination is the
//! scheduler's business.

use crate::protect::threads::ThreadId;
use log::error;
use std::sync::Mutex;

/// The three violation classes surfaced as traps.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FaultKind {
    StackOverflow,
    LoadFault,
    StoreFault,
}

impl FaultKind {
    /// Service-call number the trap is raised with; the scheduler's trap
    /// handler keys its recovery on these.
    pub fn svc_number(self) -> u8 {
        match self {
            FaultKind::StackOverflow => 0x0B,
            FaultKind::LoadFault => 0x0C,
            FaultKind::StoreFault => 0x0D,
        }
    }
}

/// Sink for dispatched faults. On the triggering path the instrumented
/// program never observes a return; recovery happens outside this crate.
pub trait FaultHandler: Send + Sync {
    fn raise(&self, kind: FaultKind, addr: usize, pid: ThreadId);
}

impl<T: FaultHandler + ?Sized> FaultHandler for std::sync::Arc<T> {
    fn raise(&self, kind: FaultKind, addr: usize, pid: ThreadId) {
        (**self).raise(kind, addr, pid)
    }
}

/// Production dispatcher: issues the service call on bare-metal ARM
/// targets. Host builds only exist for testing, so elsewhere the trap
/// degrades to an error log.
#[derive(Debug, Default)]
pub struct TrapDispatcher;

impl FaultHandler for TrapDispatcher {
    #[allow(unused_variables)]
    fn raise(&self, kind: FaultKind, addr: usize, pid: ThreadId) {
        #[cfg(all(target_arch = "arm", target_os = "none"))]
        unsafe {
            match kind {
                FaultKind::StackOverflow => core::arch::asm!("svc 0x0B", options(nomem, nostack)),
                FaultKind::LoadFault => core::arch::asm!("svc 0x0C", options(nomem, nostack)),
                FaultKind::StoreFault => core::arch::asm!("svc 0x0D", options(nomem, nostack)),
            }
        }
        #[cfg(not(all(target_arch = "arm", target_os = "none")))]
        error!(
            "trap svc {:#04x}: {:?} at {:#x} by thread {}",
            kind.svc_number(),
            kind,
            addr,
            pid
        );
    }
}

/// Test-support handler recording every dispatched fault.
#[derive(Debug, Default)]
pub struct RecordingHandler {
    faults: Mutex<Vec<(FaultKind, usize, ThreadId)>>,
}

impl RecordingHandler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn faults(&self) -> Vec<(FaultKind, usize, ThreadId)> {
        self.faults.lock().map(|v| v.clone()).unwrap_or_default()
    }

    pub fn fault_count(&self) -> usize {
        self.faults.lock().map(|v| v.len()).unwrap_or(0)
    }
}

impl FaultHandler for RecordingHandler {
    fn raise(&self, kind: FaultKind, addr: usize, pid: ThreadId) {
        if let Ok(mut faults) = self.faults.lock() {
            faults.push((kind, addr, pid));
        }
    }
}
