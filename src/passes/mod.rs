// CLASSIFICATION: COMMUNITY
// Filename: mod.rs v0.2
// Author: Lukas Bower
// Date Modified: 2026-08-14

//! Instrumentation passes and their trusted-routine tables.

pub mod exclusions;
pub mod protection;

pub use protection::{CheckKind, CheckSite, FunctionReport, ProtectionPass};
