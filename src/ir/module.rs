// CLASSIFICATION: COMMUNITY
// Filename: module.rs v0.4
// Author: Lukas Bower
// Date Modified: 2026-08-14

//! Defines the IR Module and its global-variable records. Global sizes and
//! section tags are what the instrumentation pass reasons with when it
//! proves accesses in-bounds or force-checks kernel-tagged storage.

use crate::ir::Function;
use std::fmt;

/// A global variable record: statically known size plus the linker section
/// it was placed in, when one was named.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GlobalVar {
    pub name: String,
    pub size: usize,
    pub section: Option<String>,
}

/// A compilation unit containing functions and global records.
#[derive(Clone, Debug, Default)]
pub struct Module {
    /// The name of this module (e.g., filename or identifier).
    pub name: String,
    /// Ordered list of functions within this module.
    pub functions: Vec<Function>,
    /// Global variables visible to the unit.
    pub globals: Vec<GlobalVar>,
}

impl Module {
    /// Creates a new empty Module with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Module {
            name: name.into(),
            functions: Vec::new(),
            globals: Vec::new(),
        }
    }

    /// Adds a function to the module.
    pub fn add_function(&mut self, func: Function) {
        self.functions.push(func);
    }

    /// Record a global variable with a statically known size.
    pub fn add_global(&mut self, name: impl Into<String>, size: usize, section: Option<&str>) {
        self.globals.push(GlobalVar {
            name: name.into(),
            size,
            section: section.map(str::to_owned),
        });
    }

    /// Look up a global record by name (with or without the `@` sigil).
    pub fn global(&self, name: &str) -> Option<&GlobalVar> {
        let bare = name.strip_prefix('@').unwrap_or(name);
        self.globals.iter().find(|g| g.name == bare)
    }

    /// Finds a function by name, returning a mutable reference if found.
    pub fn get_function_mut(&mut self, name: &str) -> Option<&mut Function> {
        self.functions.iter_mut().find(|f| f.name == name)
    }
}

impl fmt::Display for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Module: {}", self.name)?;
        for func in &self.functions {
            writeln!(f, "{}", func)?;
        }
        Ok(())
    }
}
