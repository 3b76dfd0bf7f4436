//! Compilation lifecycle (SPEC_FULL.md §D).
//!
//! Bundles the handle to the process-wide type table, the core-module
//! registry, and the diagnostics sink for one compilation run, so that a
//! caller embedding this crate (e.g. running it twice in the same process
//! for two independent compilations) does not have to reach for bare global
//! functions to reset state between runs.

use crate::diagnostics::DiagnosticSink;
use crate::namespace::Namespace;
use crate::types::table::GLOBAL_TYPES;

/// Built-in namespaces always implicitly visible, independent of `use`
/// statements (§5, `find_core_function`).
fn core_modules() -> Vec<Namespace> {
    vec![Namespace::core("core")]
}

pub struct CompilationContext {
    pub core_modules: Vec<Namespace>,
    pub diagnostics: DiagnosticSink,
    /// When set, the first `ImplementationError` aborts the run immediately
    /// instead of being recorded and continuing (§5's debug toggle — useful
    /// in tests that want a crash rather than a silently swallowed bug).
    pub hard_crash: bool,
}

impl CompilationContext {
    pub fn new() -> Self {
        Self {
            core_modules: core_modules(),
            diagnostics: DiagnosticSink::new(),
            hard_crash: cfg!(debug_assertions),
        }
    }

    /// Reset the process-wide type table back to just its primitives. Only
    /// meaningful for test isolation or re-running a fresh compilation in
    /// the same process — within one compilation the table is append-only.
    pub fn clear_types(&mut self) {
        let mut table = GLOBAL_TYPES.write().expect("type table poisoned");
        *table = crate::types::table::TypeTable::default();
        drop(table);
        self.reinit_primitives();
    }

    fn reinit_primitives(&mut self) {
        let mut table = GLOBAL_TYPES.write().expect("type table poisoned");
        for &kind in crate::types::primitive::ALL {
            table.intern_global(crate::types::Type::Primitive(kind));
        }
    }

    pub fn report_implementation_error(&mut self, err: crate::error::ImplementationError) {
        if self.hard_crash {
            panic!("{err}");
        }
        self.diagnostics.push(crate::diagnostics::Diagnostic::error(
            crate::error::ErrorKind::ErrNotImplementedYet,
            err.to_string(),
            crate::hash::FileHash::NONE,
            0,
            0,
        ));
    }
}

impl Default for CompilationContext {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn core_modules_are_registered_on_construction() {
        let ctx = CompilationContext::new();
        assert!(!ctx.core_modules.is_empty());
    }
}
