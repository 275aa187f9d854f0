// CLASSIFICATION: COMMUNITY
// Filename: mod.rs v0.2
// Author: Lukas Bower
// Date Modified: 2026-08-05

//! Runtime protection root module: access classification, fault dispatch,
//! the owning protection context and the global entry hooks called by
//! instrumented code.

pub mod classifier;
pub mod config;
pub mod context;
pub mod fault;
pub mod hooks;
pub mod threads;

pub use classifier::{AccessEvent, AccessKind, Verdict};
pub use config::ProtectionConfig;
pub use context::ProtectionContext;
pub use fault::{FaultHandler, FaultKind, RecordingHandler, TrapDispatcher};
pub use threads::{ThreadId, ThreadTable};
