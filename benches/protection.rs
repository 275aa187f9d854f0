// CLASSIFICATION: COMMUNITY
// Filename: protection.rs v0.2
// Author: Lukas Bower
// Date Modified: 2026-08-21

use criterion::{criterion_group, criterion_main, Criterion};
use rampart::ir::{AllocaSize, Function, IRContext, Instruction, Module, Opcode};
use rampart::mem::layout::{AddrRange, MemoryMap};
use rampart::pass_framework::PassManager;
use rampart::passes::ProtectionPass;
use rampart::protect::classifier::AccessKind;
use rampart::protect::config::ProtectionConfig;
use rampart::protect::context::ProtectionContext;
use rampart::protect::fault::TrapDispatcher;

fn make_context() -> ProtectionContext {
    let map = MemoryMap::new(
        0x2000_0000,
        AddrRange::new(0x2000_0000, 0x2000_4000),
        AddrRange::new(0x2000_4000, 0x2000_5000),
        AddrRange::new(0x2000_5000, 0x2000_7000),
    )
    .unwrap();
    ProtectionContext::new(
        map,
        0x2000_8000,
        ProtectionConfig::default(),
        Box::new(TrapDispatcher),
    )
    .unwrap()
}

fn make_ir() -> IRContext {
    let mut module = Module::new("bench");
    module.add_global("table", 64, None);
    let mut func = Function::new("hot_loop");
    func.push(Instruction::new(
        Opcode::Alloca {
            size: AllocaSize::Const(32),
        },
        vec!["%buf".into()],
    ));
    for i in 0..100 {
        func.push(Instruction::new(
            Opcode::Load { width: 4 },
            vec!["%v".into(), format!("%buf+{}", (i % 8) * 4)],
        ));
        func.push(Instruction::new(
            Opcode::Store { width: 4 },
            vec!["%p".into(), "%v".into()],
        ));
    }
    func.push(Instruction::new(Opcode::Ret, vec![]));
    module.add_function(func);
    let mut ctx = IRContext::new();
    ctx.add_module(module);
    ctx
}

fn bench_allocate_free(c: &mut Criterion) {
    c.bench_function("arena_allocate_free", |b| {
        let mut ctx = make_context();
        b.iter(|| {
            if let Some(buf) = ctx.alloc_shared(64) {
                ctx.free_shared(buf.addr);
            }
        });
    });
}

fn bench_classify(c: &mut Criterion) {
    c.bench_function("classify_own_stack", |b| {
        let mut ctx = make_context();
        let addr = ctx.alloc_thread_stack(1, 0x400).unwrap();
        ctx.threads.set_active(1);
        b.iter(|| ctx.check_access(addr + 0x40, 4, AccessKind::Load));
    });
}

fn bench_protection_pass(c: &mut Criterion) {
    c.bench_function("protection_pass", |b| {
        b.iter(|| {
            let mut ctx = make_ir();
            let mut pm = PassManager::new();
            pm.add_pass(ProtectionPass::new());
            pm.run_all(&mut ctx);
        });
    });
}

criterion_group!(
    benches,
    bench_allocate_free,
    bench_classify,
    bench_protection_pass
);
criterion_main!(benches);
