// CLASSIFICATION: COMMUNITY
// Filename: classifier.rs v0.4
// Author: Lukas Bower
// Date Modified: 2026-08-21

//! End-to-end classifier behavior through the protection context: stack
//! windows carved by the allocator, denials dispatched as faults, and the
//! global hook entry points.

use std::sync::Arc;

use rampart::mem::layout::{AddrRange, MemoryMap};
use rampart::protect::classifier::AccessKind;
use rampart::protect::config::ProtectionConfig;
use rampart::protect::context::ProtectionContext;
use rampart::protect::fault::{FaultKind, RecordingHandler};
use rampart::protect::hooks;
use serial_test::serial;

const STACKS: AddrRange = AddrRange {
    lower: 0x2000_0000,
    upper: 0x2000_4000,
};
const SHARED_BASE: usize = 0x2000_8000;

fn context() -> (ProtectionContext, Arc<RecordingHandler>) {
    let _ = env_logger::builder().is_test(true).try_init();
    let map = MemoryMap::new(
        0x2000_0000,
        STACKS,
        AddrRange::new(0x2000_4000, 0x2000_5000),
        AddrRange::new(0x2000_5000, 0x2000_7000),
    )
    .unwrap();
    let handler = Arc::new(RecordingHandler::new());
    let ctx = ProtectionContext::new(
        map,
        SHARED_BASE,
        ProtectionConfig::default(),
        Box::new(Arc::clone(&handler)),
    )
    .unwrap();
    (ctx, handler)
}

#[test]
fn carved_stack_window_is_registered() {
    let (mut ctx, _) = context();
    let addr = ctx.alloc_thread_stack(1, 0x100).unwrap();
    assert_eq!(ctx.threads.window(1), Some((addr, addr + 0x100)));
}

#[test]
fn own_stack_access_raises_nothing() {
    let (mut ctx, handler) = context();
    let addr = ctx.alloc_thread_stack(1, 0x100).unwrap();
    ctx.threads.set_active(1);
    ctx.check_access(addr + 0x40, 4, AccessKind::Load);
    ctx.check_access(addr + 0x40, 4, AccessKind::Store);
    assert_eq!(handler.fault_count(), 0);
    assert_eq!(ctx.threads.violations(1), 0);
}

#[test]
fn cross_thread_store_faults_and_counts_once_per_call() {
    let (mut ctx, handler) = context();
    let a_addr = ctx.alloc_thread_stack(1, 0x100).unwrap();
    let _b_addr = ctx.alloc_thread_stack(2, 0x100).unwrap();

    // thread 2 stores into thread 1's window
    ctx.threads.set_active(2);
    ctx.check_access(a_addr + 0x50, 4, AccessKind::Store);
    assert_eq!(
        handler.faults(),
        vec![(FaultKind::StoreFault, a_addr + 0x50, 2)]
    );
    assert_eq!(ctx.threads.violations(2), 1);

    ctx.check_access(a_addr + 0x54, 4, AccessKind::Load);
    assert_eq!(ctx.threads.violations(2), 2);
    assert_eq!(handler.fault_count(), 2);
    assert_eq!(handler.faults()[1].0, FaultKind::LoadFault);
}

#[test]
fn irq_context_suppresses_all_faults() {
    let (mut ctx, handler) = context();
    let a_addr = ctx.alloc_thread_stack(1, 0x100).unwrap();
    ctx.alloc_thread_stack(2, 0x100).unwrap();
    ctx.threads.set_active(2);
    ctx.threads.enter_irq();
    ctx.check_access(a_addr + 0x50, 4, AccessKind::Store);
    ctx.check_access(0x2000_4100, 4, AccessKind::Store);
    ctx.threads.exit_irq();
    assert_eq!(handler.fault_count(), 0);
    assert_eq!(ctx.threads.violations(2), 0);
}

#[test]
fn kernel_store_faults_even_from_adjacent_stack_owner() {
    let (mut ctx, handler) = context();
    // carve until the arena is exhausted so the last window borders the
    // kernel data section at 0x2000_4000
    let mut pid = 0;
    let mut last = None;
    while let Some(addr) = ctx.alloc_thread_stack(pid, 0x400) {
        last = Some((pid, addr));
        pid += 1;
        if pid >= 8 {
            break;
        }
    }
    let (owner, _) = last.unwrap();
    ctx.threads.set_active(owner);
    ctx.check_access(0x2000_4010, 4, AccessKind::Store);
    assert_eq!(handler.fault_count(), 1);
    assert_eq!(handler.faults()[0].0, FaultKind::StoreFault);
}

#[test]
fn kernel_load_is_counted_but_tolerated() {
    let (mut ctx, handler) = context();
    ctx.alloc_thread_stack(1, 0x100).unwrap();
    ctx.threads.set_active(1);
    ctx.check_access(0x2000_5100, 4, AccessKind::Load);
    assert_eq!(handler.fault_count(), 0);
    assert_eq!(ctx.threads.violations(1), 1);
}

#[test]
fn shared_heap_is_accessible_to_all_threads() {
    let (mut ctx, handler) = context();
    ctx.alloc_thread_stack(1, 0x100).unwrap();
    ctx.alloc_thread_stack(2, 0x100).unwrap();
    let buf = ctx.alloc_shared(64).unwrap();
    for pid in [1usize, 2] {
        ctx.threads.set_active(pid);
        ctx.check_access(buf.addr, 4, AccessKind::Store);
        ctx.check_access(buf.addr + 8, 4, AccessKind::Load);
    }
    assert_eq!(handler.fault_count(), 0);
}

#[test]
fn stack_depth_at_or_below_lower_bound_overflows() {
    let (mut ctx, handler) = context();
    let addr = ctx.alloc_thread_stack(1, 0x100).unwrap();
    ctx.threads.set_active(1);
    ctx.check_stack_depth(addr + 0x80);
    assert_eq!(handler.fault_count(), 0);
    ctx.check_stack_depth(addr);
    assert_eq!(handler.faults(), vec![(FaultKind::StackOverflow, addr, 1)]);
    ctx.check_stack_depth(addr - 4);
    assert_eq!(handler.fault_count(), 2);
}

#[test]
fn released_window_no_longer_shields_the_thread() {
    let (mut ctx, handler) = context();
    let addr = ctx.alloc_thread_stack(1, 0x100).unwrap();
    ctx.threads.set_active(1);
    ctx.free_thread_stack(1, addr);
    ctx.check_access(addr + 0x40, 4, AccessKind::Store);
    assert_eq!(handler.fault_count(), 1);
}

#[test]
#[serial]
fn hooks_delegate_to_installed_context() {
    let (mut ctx, handler) = context();
    let a_addr = ctx.alloc_thread_stack(1, 0x100).unwrap();
    ctx.alloc_thread_stack(2, 0x100).unwrap();
    ctx.threads.set_active(2);
    hooks::install(ctx).unwrap();

    hooks::store_check(a_addr + 0x10, 4);
    hooks::load_check(0x0800_0000, 4);
    assert_eq!(handler.fault_count(), 1);

    let restored = hooks::uninstall().unwrap();
    assert_eq!(restored.threads.violations(2), 1);
}

#[test]
#[serial]
fn hooks_allow_everything_before_install() {
    hooks::load_check(0x2000_4100, 4);
    hooks::store_check(0x2000_4100, 4);
    hooks::stack_check(0);
    assert!(hooks::uninstall().is_none());
}

#[test]
#[serial]
fn double_install_is_rejected() {
    let (ctx, _) = context();
    hooks::install(ctx).unwrap();
    let (ctx2, _) = context();
    assert!(hooks::install(ctx2).is_err());
    hooks::uninstall().unwrap();
}
