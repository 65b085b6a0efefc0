//! The contract between this crate's analysis drivers and a caller-supplied
//! syntax walker. This crate never parses source itself; every mutation to
//! the stores during a pass happens through a `FrontEnd` implementation
//! handed in by the embedder.

use std::collections::HashSet;

use crate::classes::ClassRegistry;
use crate::definitions::DefinitionStore;
use crate::modules::ModuleRegistry;
use crate::scopes::ScopeTree;

/// Which pass a `FrontEnd` is being asked to perform. Both modes mutate the
/// same stores, so this is a mode flag on one trait rather than two traits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrontEndMode {
    /// Discover definitions, scopes, classes and modules.
    Preprocess,
    /// Propagate points-to pointers over already-discovered structure.
    Postprocess,
}

/// A mutable view of the four stores, handed to a `FrontEnd` for the
/// duration of one module's walk.
pub struct AnalysisContext<'a> {
    pub definitions: &'a mut DefinitionStore,
    pub scopes: &'a mut ScopeTree,
    pub classes: &'a mut ClassRegistry,
    pub modules: &'a mut ModuleRegistry,
}

/// Walks one module's source, mutating the stores in `AnalysisContext`
/// according to `mode`. Implemented by the embedder's syntax walker; this
/// crate ships only an in-memory test double (`#[cfg(test)]`) to exercise
/// its own integration tests.
pub trait FrontEnd {
    /// Analyzes `module_namespace`, returning the set of module namespaces
    /// it transitively walked (itself plus anything it imported and
    /// recursively followed), so the driver can union it into
    /// `modules_analyzed` across all entry points.
    fn analyze(
        &mut self,
        mode: FrontEndMode,
        module_namespace: &str,
        modules_analyzed: &HashSet<String>,
        context: &mut AnalysisContext<'_>,
    ) -> HashSet<String>;
}
