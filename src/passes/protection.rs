// CLASSIFICATION: COMMUNITY
// Filename: protection.rs v0.7
// Author: Lukas Bower
// Date Modified: 2026-08-21

//! The protection instrumentation pass. Per function it:
//!
//! 1. inserts a call to the load/store check before every load, store,
//!    atomic and block-memory operation, passing the accessed address and
//!    width;
//! 2. elides checks for accesses provably in-bounds of a known-size local
//!    alloca or global, memoizing the proof per (address, width) pair;
//!    stores into kernel-section globals are force-checked regardless;
//! 3. inserts a stack-depth guard at entry, and before every call passing
//!    more arguments than fit in registers when the function contains a
//!    dynamically sized alloca;
//! 4. gives IRQ-only plumbing a single privilege check instead, and leaves
//!    the exempt routines alone.
//!
//! Running the pass twice changes nothing: existing guards and check calls
//! are recognized and not duplicated.

use crate::ir::{AddrExpr, AllocaSize, Function, GlobalVar, IRContext, Instruction, Opcode};
use crate::pass_framework::traits::IRPass;
use crate::protect::config::ProtectionConfig;
use crate::passes::exclusions::{
    is_exempt, is_irq_only, KERNEL_SECTION, LOAD_CHECK_FN, STORE_CHECK_FN,
};
use log::debug;
use std::collections::{HashMap, HashSet};

/// Kind of check the pass inserted at a site.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CheckKind {
    LoadCheck,
    StoreCheck,
    StackGuard,
    IrqGuard,
}

/// One inserted check: index into the transformed body plus its kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CheckSite {
    pub index: usize,
    pub kind: CheckKind,
}

/// Per-function instrumentation outcome, mirroring the historical pass
/// statistics plus the exact inserted locations for tests.
#[derive(Clone, Debug, Default)]
pub struct FunctionReport {
    pub function: String,
    pub loads_instrumented: usize,
    pub stores_instrumented: usize,
    pub atomics_instrumented: usize,
    pub intrinsics_instrumented: usize,
    pub elided: usize,
    pub checks: Vec<CheckSite>,
    /// True when the function was on the exempt list and left untouched.
    pub skipped: bool,
}

/// The instrumentation pass. Stateless across functions; all per-function
/// working state lives inside `run_on_function`.
pub struct ProtectionPass {
    arg_regs: usize,
}

impl ProtectionPass {
    /// Pass with the default four hardware argument registers.
    pub fn new() -> Self {
        ProtectionPass { arg_regs: 4 }
    }

    /// Override the register-argument budget.
    pub fn with_arg_regs(arg_regs: usize) -> Self {
        ProtectionPass { arg_regs }
    }

    /// Pass whose register budget follows the runtime configuration.
    pub fn from_config(config: &ProtectionConfig) -> Self {
        ProtectionPass {
            arg_regs: config.arg_regs,
        }
    }

    /// Instrument every function of a module, returning one report each.
    pub fn run_on_module(&self, module: &mut crate::ir::Module) -> Vec<FunctionReport> {
        let globals = module.globals.clone();
        module
            .functions
            .iter_mut()
            .map(|f| self.run_on_function(&globals, f))
            .collect()
    }

    /// Instrument one function in place.
    pub fn run_on_function(&self, globals: &[GlobalVar], func: &mut Function) -> FunctionReport {
        let mut report = FunctionReport {
            function: func.name.clone(),
            ..FunctionReport::default()
        };

        if is_exempt(&func.name) {
            report.skipped = true;
            return report;
        }

        if is_irq_only(&func.name) {
            self.insert_irq_guard(func, &mut report);
            return report;
        }

        let allocas = collect_allocas(func);
        let dynamic_alloca = func.has_dynamic_alloca();
        let mut prover = BoundsProver::new(globals, &allocas);

        let old_body = std::mem::take(&mut func.body);
        let mut body: Vec<Instruction> = Vec::with_capacity(old_body.len());

        for instr in old_body {
            match &instr.opcode {
                Opcode::Load { width } => {
                    let addr = instr.access_addr().unwrap_or_default().to_owned();
                    let size = width.to_string();
                    if prover.is_provably_safe(&addr, *width) {
                        report.elided += 1;
                    } else if !is_pending_check(&body, LOAD_CHECK_FN, &addr, &size) {
                        push_check(&mut body, &mut report, CheckKind::LoadCheck, &addr, size);
                        report.loads_instrumented += 1;
                    }
                    body.push(instr);
                }
                Opcode::Store { width } => {
                    let addr = instr.access_addr().unwrap_or_default().to_owned();
                    let size = width.to_string();
                    let forced = is_kernel_section_store(globals, &addr);
                    if !forced && prover.is_provably_safe(&addr, *width) {
                        report.elided += 1;
                    } else if !is_pending_check(&body, STORE_CHECK_FN, &addr, &size) {
                        push_check(&mut body, &mut report, CheckKind::StoreCheck, &addr, size);
                        report.stores_instrumented += 1;
                    }
                    body.push(instr);
                }
                // Atomics are read-modify-write; they always take the
                // store-check path, no elision.
                Opcode::AtomicRmw { width } | Opcode::AtomicCmpXchg { width } => {
                    let addr = instr.access_addr().unwrap_or_default().to_owned();
                    let size = width.to_string();
                    if !is_pending_check(&body, STORE_CHECK_FN, &addr, &size) {
                        push_check(&mut body, &mut report, CheckKind::StoreCheck, &addr, size);
                        report.atomics_instrumented += 1;
                    }
                    body.push(instr);
                }
                Opcode::MemCopy | Opcode::MemMove => {
                    let dest = instr.operands.first().cloned().unwrap_or_default();
                    let src = instr.operands.get(1).cloned().unwrap_or_default();
                    let len = instr.operands.get(2).cloned().unwrap_or_default();
                    let have_load = is_pending_check(&body, LOAD_CHECK_FN, &src, &len);
                    let have_store = is_pending_check(&body, STORE_CHECK_FN, &dest, &len);
                    if !have_load {
                        push_check(&mut body, &mut report, CheckKind::LoadCheck, &src, len.clone());
                    }
                    if !have_store {
                        push_check(&mut body, &mut report, CheckKind::StoreCheck, &dest, len.clone());
                    }
                    if !(have_load && have_store) {
                        report.intrinsics_instrumented += 1;
                    }
                    body.push(instr);
                }
                Opcode::MemSet => {
                    let dest = instr.operands.first().cloned().unwrap_or_default();
                    let len = instr.operands.get(2).cloned().unwrap_or_default();
                    if !is_pending_check(&body, STORE_CHECK_FN, &dest, &len) {
                        push_check(&mut body, &mut report, CheckKind::StoreCheck, &dest, len.clone());
                        report.intrinsics_instrumented += 1;
                    }
                    body.push(instr);
                }
                Opcode::Call { function } => {
                    let needs_guard = dynamic_alloca
                        && !is_check_fn(function)
                        && instr.operands.len() > self.arg_regs;
                    if needs_guard && !matches!(body.last().map(|i| &i.opcode), Some(Opcode::StackGuard)) {
                        report.checks.push(CheckSite {
                            index: body.len(),
                            kind: CheckKind::StackGuard,
                        });
                        body.push(Instruction::new(Opcode::StackGuard, vec![]));
                    }
                    body.push(instr);
                }
                _ => body.push(instr),
            }
        }

        func.body = body;
        self.insert_entry_guard(func, &mut report);

        debug!(
            "protection pass on {}: {} loads, {} stores, {} atomics, {} intrinsics, {} elided",
            report.function,
            report.loads_instrumented,
            report.stores_instrumented,
            report.atomics_instrumented,
            report.intrinsics_instrumented,
            report.elided
        );
        report
    }

    /// Stack-depth guard at the first non-alloca instruction, unless one is
    /// already there from a previous run.
    fn insert_entry_guard(&self, func: &mut Function, report: &mut FunctionReport) {
        let at = func.first_non_alloca();
        if matches!(func.body.get(at).map(|i| &i.opcode), Some(Opcode::StackGuard)) {
            return;
        }
        func.body.insert(at, Instruction::new(Opcode::StackGuard, vec![]));
        // sites recorded earlier shift by one
        for site in report.checks.iter_mut() {
            if site.index >= at {
                site.index += 1;
            }
        }
        report.checks.push(CheckSite {
            index: at,
            kind: CheckKind::StackGuard,
        });
    }

    /// The cheap IRQ-only treatment: one privilege check at the first
    /// non-alloca instruction, branching to the fault path on failure.
    fn insert_irq_guard(&self, func: &mut Function, report: &mut FunctionReport) {
        let at = func.first_non_alloca();
        if matches!(func.body.get(at).map(|i| &i.opcode), Some(Opcode::IrqGuard)) {
            return;
        }
        func.body.insert(at, Instruction::new(Opcode::IrqGuard, vec![]));
        report.checks.push(CheckSite {
            index: at,
            kind: CheckKind::IrqGuard,
        });
    }
}

impl Default for ProtectionPass {
    fn default() -> Self {
        Self::new()
    }
}

impl IRPass for ProtectionPass {
    fn name(&self) -> &'static str {
        "ProtectionPass"
    }

    fn run(&self, context: &mut IRContext) {
        for module in &mut context.modules {
            let reports = self.run_on_module(module);
            let inserted: usize = reports.iter().map(|r| r.checks.len()).sum();
            debug!(
                "module {}: {} functions instrumented, {} checks inserted",
                module.name,
                reports.iter().filter(|r| !r.skipped).count(),
                inserted
            );
        }
    }
}

/// Conservative object-size reasoning over alloca and global bases, with
/// per-function memoization of proven (address, width) pairs.
struct BoundsProver<'a> {
    globals: &'a [GlobalVar],
    allocas: &'a HashMap<String, AllocaSize>,
    proven: HashSet<(String, usize)>,
}

impl<'a> BoundsProver<'a> {
    fn new(globals: &'a [GlobalVar], allocas: &'a HashMap<String, AllocaSize>) -> Self {
        BoundsProver {
            globals,
            allocas,
            proven: HashSet::new(),
        }
    }

    /// Whether the access at `addr` of `width` bytes is provably inside
    /// its underlying object. Any failure to prove — unknown base, dynamic
    /// size, non-constant offset — answers false and the caller inserts
    /// the runtime check.
    fn is_provably_safe(&mut self, addr: &str, width: usize) -> bool {
        let key = (addr.to_owned(), width);
        if self.proven.contains(&key) {
            return true;
        }
        let expr = AddrExpr::parse(addr);
        let object_size = if expr.is_local() {
            match self.allocas.get(expr.base) {
                Some(AllocaSize::Const(size)) => *size,
                _ => return false,
            }
        } else if expr.is_global() {
            match lookup_global(self.globals, expr.base) {
                Some(global) => global.size,
                None => return false,
            }
        } else {
            return false;
        };
        let offset = match expr.offset {
            Some(off) if off >= 0 => off as usize,
            _ => return false,
        };
        let safe = offset <= object_size && object_size - offset >= width;
        if safe {
            self.proven.insert(key);
        }
        safe
    }
}

fn collect_allocas(func: &Function) -> HashMap<String, AllocaSize> {
    let mut out = HashMap::new();
    for instr in &func.body {
        if let Opcode::Alloca { size } = &instr.opcode {
            if let Some(name) = instr.operands.first() {
                out.insert(name.clone(), *size);
            }
        }
    }
    out
}

fn lookup_global<'a>(globals: &'a [GlobalVar], name: &str) -> Option<&'a GlobalVar> {
    let bare = name.strip_prefix('@').unwrap_or(name);
    globals.iter().find(|g| g.name == bare)
}

/// Stores into kernel-section globals are never elided.
fn is_kernel_section_store(globals: &[GlobalVar], addr: &str) -> bool {
    let expr = AddrExpr::parse(addr);
    if !expr.is_global() {
        return false;
    }
    lookup_global(globals, expr.base)
        .and_then(|g| g.section.as_deref())
        .map_or(false, |s| s == KERNEL_SECTION)
}

fn is_check_fn(name: &str) -> bool {
    name == LOAD_CHECK_FN || name == STORE_CHECK_FN
}

/// The run of check calls at the tail of the rebuilt body. Scanning stops
/// at the first non-check instruction so a check belonging to a previous
/// operation is never mistaken for one covering the current access.
fn trailing_checks(body: &[Instruction]) -> impl Iterator<Item = &Instruction> {
    body.iter()
        .rev()
        .take_while(|i| matches!(&i.opcode, Opcode::Call { function } if is_check_fn(function)))
}

/// Whether a check call we would insert for `(addr, size)` is already
/// pending directly before the current operation — the idempotence test.
fn is_pending_check(body: &[Instruction], check_fn: &str, addr: &str, size: &str) -> bool {
    trailing_checks(body).any(|instr| {
        matches!(
            instr,
            Instruction {
                opcode: Opcode::Call { function },
                operands,
            } if function == check_fn
                && operands.first().map(String::as_str) == Some(addr)
                && operands.get(1).map(String::as_str) == Some(size)
        )
    })
}

fn push_check(
    body: &mut Vec<Instruction>,
    report: &mut FunctionReport,
    kind: CheckKind,
    addr: &str,
    size: String,
) {
    let check_fn = match kind {
        CheckKind::LoadCheck => LOAD_CHECK_FN,
        CheckKind::StoreCheck => STORE_CHECK_FN,
        _ => unreachable!("push_check only emits classifier calls"),
    };
    report.checks.push(CheckSite {
        index: body.len(),
        kind,
    });
    body.push(Instruction::call(check_fn, vec![addr.to_owned(), size]));
}
