// CLASSIFICATION: COMMUNITY
// Filename: mod.rs v0.2
// Author: Lukas Bower
// Date Modified: 2026-08-02

//! IR pass framework: the pass trait and the ordered pass manager.

pub mod manager;
pub mod traits;

pub use manager::PassManager;
pub use traits::IRPass;
