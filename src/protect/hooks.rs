// CLASSIFICATION: COMMUNITY
// Filename: hooks.rs v0.3
// Author: Lukas Bower
// Date Modified: 2026-08-14

//! Global entry points for instrumented code. The build-time pass emits
//! calls to `load_check`/`store_check`/`stack_check`; nothing else should
//! call them by hand. One mutex guards the installed context, which makes
//! the single-writer contract around free-list and thread-table mutation
//! explicit rather than assumed.

use crate::protect::classifier::AccessKind;
use crate::protect::context::ProtectionContext;
use once_cell::sync::Lazy;
use std::sync::Mutex;
use thiserror::Error;

static CONTEXT: Lazy<Mutex<Option<ProtectionContext>>> = Lazy::new(|| Mutex::new(None));

/// Errors produced by hook installation.
#[derive(Debug, Error)]
pub enum HookError {
    #[error("protection context already installed")]
    AlreadyInstalled,
    #[error("protection context lock poisoned")]
    LockPoisoned,
}

/// Install the context behind the instrumented-code entry points.
pub fn install(ctx: ProtectionContext) -> Result<(), HookError> {
    let mut guard = CONTEXT.lock().map_err(|_| HookError::LockPoisoned)?;
    if guard.is_some() {
        return Err(HookError::AlreadyInstalled);
    }
    *guard = Some(ctx);
    Ok(())
}

/// Remove and return the installed context, if any.
pub fn uninstall() -> Option<ProtectionContext> {
    CONTEXT.lock().ok().and_then(|mut guard| guard.take())
}

/// Run `f` against the installed context. `None` when nothing is
/// installed; used by scheduler glue (stack carving, context switches).
pub fn with_context<R>(f: impl FnOnce(&mut ProtectionContext) -> R) -> Option<R> {
    let mut guard = CONTEXT.lock().ok()?;
    guard.as_mut().map(f)
}

/// Instrumented load check. Accesses before `install` fall in the
/// boot-time window and are allowed.
pub fn load_check(addr: usize, size: usize) {
    if let Ok(mut guard) = CONTEXT.lock() {
        if let Some(ctx) = guard.as_mut() {
            ctx.check_access(addr, size, AccessKind::Load);
        }
    }
}

/// Instrumented store check.
pub fn store_check(addr: usize, size: usize) {
    if let Ok(mut guard) = CONTEXT.lock() {
        if let Some(ctx) = guard.as_mut() {
            ctx.check_access(addr, size, AccessKind::Store);
        }
    }
}

/// Instrumented stack-depth guard.
pub fn stack_check(sp: usize) {
    if let Ok(mut guard) = CONTEXT.lock() {
        if let Some(ctx) = guard.as_mut() {
            ctx.check_stack_depth(sp);
        }
    }
}
