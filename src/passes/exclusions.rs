// CLASSIFICATION: COMMUNITY
// Filename: exclusions.rs v0.3
// Author: Lukas Bower
// Date Modified: 2026-08-14

//! Trusted-routine tables for the protection pass: exact-name allow-lists
//! kept as data, not as scattered conditionals. Instrumenting the
//! classifier's own implementation would recurse forever, and instrumenting
//! startup glue would check memory before the arenas define any boundary.

/// The instrumented load check the pass emits calls to.
pub const LOAD_CHECK_FN: &str = "__loadcheck";
/// The instrumented store check the pass emits calls to.
pub const STORE_CHECK_FN: &str = "__storecheck";
/// The stack-overflow trap the guards branch to.
pub const STACK_OVERFLOW_FN: &str = "__stackoverflow";
/// The privilege probe used by the IRQ-only treatment.
pub const IRQ_PROBE_FN: &str = "irq_arch_in";

/// Linker section holding kernel-only storage; stores targeting globals in
/// this section are never elided.
pub const KERNEL_SECTION: &str = ".kernel_space";

/// Routines that must never be instrumented: the check implementations
/// themselves, the privilege probe, startup glue and arena initialization.
pub const EXEMPT_ROUTINES: &[&str] = &[
    LOAD_CHECK_FN,
    STORE_CHECK_FN,
    STACK_OVERFLOW_FN,
    IRQ_PROBE_FN,
    "reset_handler_default",
    "pre_startup",
    "init_thread_blocks",
    "init_shared_blocks",
];

/// Interrupt-only plumbing that gets the cheap treatment: one privilege
/// check at entry instead of per-access classifier calls.
pub const IRQ_ONLY_ROUTINES: &[&str] = &[
    "irq_handler",
    "isr_usart1",
    "tsrb_full",
    "tsrb_add_one",
    "_push",
    "NVIC_SetPendingIRQ",
    "uart_stdio_rx_cb",
];

/// Whether `name` must be left entirely untouched.
pub fn is_exempt(name: &str) -> bool {
    EXEMPT_ROUTINES.contains(&name)
}

/// Whether `name` receives the IRQ-only single-check treatment.
pub fn is_irq_only(name: &str) -> bool {
    IRQ_ONLY_ROUTINES.contains(&name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn check_functions_are_exempt() {
        assert!(is_exempt(LOAD_CHECK_FN));
        assert!(is_exempt(STORE_CHECK_FN));
        assert!(is_exempt(STACK_OVERFLOW_FN));
        assert!(!is_exempt("thread_create"));
    }

    #[test]
    fn irq_list_is_exact_match() {
        assert!(is_irq_only("irq_handler"));
        assert!(!is_irq_only("irq_handler_2"));
    }
}
