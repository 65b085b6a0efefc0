//! The postprocessor driver: iterates points-to propagation to a fixed
//! point, resetting anonymous-site counters between iterations so the
//! snapshot comparison that detects convergence is deterministic, and
//! performing the one-shot external-definition prune between iterations 0
//! and 1.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use indexmap::IndexSet;

use crate::classes::ClassRegistry;
use crate::definitions::{DefinitionKind, DefinitionStore};
use crate::frontend::{AnalysisContext, FrontEnd, FrontEndMode};
use crate::imports::ImportResolver;
use crate::modules::ModuleRegistry;
use crate::namespace::{attribute_equal, path_to_module_namespace};
use crate::scopes::ScopeTree;

/// The minimal observable state compared across iterations to detect
/// convergence (see the component design for the postprocessor).
#[derive(Debug, Clone, PartialEq, Eq)]
struct StateSnapshot {
    defs: HashMap<String, DefSnapshot>,
    scopes: HashMap<String, IndexSet<String>>,
    classes: HashMap<String, Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct DefSnapshot {
    names: HashMap<String, IndexSet<String>>,
}

fn snapshot(
    definitions: &DefinitionStore,
    scopes: &ScopeTree,
    classes: &ClassRegistry,
) -> StateSnapshot {
    let defs = definitions
        .iter()
        .map(|(ns, def)| {
            (
                ns.to_string(),
                DefSnapshot {
                    names: def
                        .name_pointer
                        .iter()
                        .map(|(attr, set)| (attr.clone(), set.clone()))
                        .collect(),
                },
            )
        })
        .collect();
    let scope_state = scopes
        .iter()
        .map(|(ns, scope)| (ns.to_string(), scope.local_namespaces().map(str::to_string).collect()))
        .collect();
    let class_state = classes
        .iter()
        .map(|(ns, class)| (ns.to_string(), class.mro.clone()))
        .collect();
    StateSnapshot {
        defs,
        scopes: scope_state,
        classes: class_state,
    }
}

/// Asymmetric by design: a key appearing in `current` but absent (or
/// differing) from `previous` breaks convergence; a key vanishing from
/// `current` relative to `previous` does not. This is what lets the
/// one-shot prune remove EXT definitions between iterations 0 and 1 without
/// itself ever being mistaken for non-convergence.
fn has_converged(previous: &StateSnapshot, current: &StateSnapshot) -> bool {
    for (ns, curr_def) in &current.defs {
        match previous.defs.get(ns) {
            Some(prev_def) if prev_def == curr_def => {}
            _ => return false,
        }
    }
    for (ns, curr_set) in &current.scopes {
        match previous.scopes.get(ns) {
            Some(prev_set) if prev_set == curr_set => {}
            _ => return false,
        }
    }
    for (ns, curr_mro) in &current.classes {
        match previous.classes.get(ns) {
            Some(prev_mro) if prev_mro == curr_mro => {}
            _ => return false,
        }
    }
    true
}

pub struct Postprocessor<'a> {
    pub definitions: &'a mut DefinitionStore,
    pub scopes: &'a mut ScopeTree,
    pub classes: &'a mut ClassRegistry,
    pub modules: &'a mut ModuleRegistry,
}

/// Result of running the postprocessor to completion (or to the iteration
/// cap).
pub struct PostprocessResult {
    pub iterations: u32,
    pub iteration_cap_reached: bool,
}

impl<'a> Postprocessor<'a> {
    pub fn new(
        definitions: &'a mut DefinitionStore,
        scopes: &'a mut ScopeTree,
        classes: &'a mut ClassRegistry,
        modules: &'a mut ModuleRegistry,
    ) -> Self {
        Self {
            definitions,
            scopes,
            classes,
            modules,
        }
    }

    /// Runs postprocessing iterations until convergence or `max_iter` is
    /// reached. A negative `max_iter` means "run until converged" with no
    /// cap.
    pub fn run<R: ImportResolver>(
        &mut self,
        entry_points: &[PathBuf],
        package_root: &Path,
        import_resolver: &mut R,
        max_iter: i64,
        mut front_end_factory: impl FnMut() -> Box<dyn FrontEnd>,
    ) -> PostprocessResult {
        let mut iter_cnt: u32 = 0;
        let mut previous: Option<StateSnapshot> = None;

        loop {
            let converged = previous
                .as_ref()
                .is_some_and(|prev| has_converged(prev, &snapshot(self.definitions, self.scopes, self.classes)));
            let cap_reached = max_iter >= 0 && i64::from(iter_cnt) >= max_iter;
            if converged || cap_reached {
                break;
            }

            previous = Some(snapshot(self.definitions, self.scopes, self.classes));
            self.scopes.reset_all_counters();

            let mut modules_analyzed: HashSet<String> = HashSet::new();
            for entry_point in entry_points {
                let Some(module_namespace) = path_to_module_namespace(entry_point, package_root) else {
                    continue;
                };
                if modules_analyzed.contains(&module_namespace) {
                    continue;
                }
                let mut front_end = front_end_factory();
                let mut context = AnalysisContext {
                    definitions: self.definitions,
                    scopes: self.scopes,
                    classes: self.classes,
                    modules: self.modules,
                };
                let analyzed = front_end.analyze(
                    FrontEndMode::Postprocess,
                    &module_namespace,
                    &modules_analyzed,
                    &mut context,
                );
                modules_analyzed.extend(analyzed);
            }

            if iter_cnt == 0 {
                self.prune_shadowed_externals();
            }

            self.definitions.complete();
            log::info!("postprocessor iteration {iter_cnt} complete, {} definitions", self.definitions.len());
            iter_cnt += 1;
        }

        self.scopes.reset_all_counters();

        PostprocessResult {
            iterations: iter_cnt,
            iteration_cap_reached: max_iter >= 0 && i64::from(iter_cnt) >= max_iter,
        }
    }

    /// One-shot pass run only between iterations 0 and 1: removes any EXT
    /// definition `C.m` for which some class attribute-equal to `C` already
    /// declares `m` itself, since that EXT was a speculative placeholder
    /// that has since resolved to a real class method.
    fn prune_shadowed_externals(&mut self) {
        let mut to_remove: Vec<String> = Vec::new();
        for (ns, def) in self.definitions.iter() {
            if def.kind() != DefinitionKind::Ext || !ns.contains('.') {
                continue;
            }
            let (ext_class, ext_method) = crate::namespace::split_simple_name(ns);
            for (class_ns, _) in self.classes.iter() {
                if !attribute_equal(ext_class, class_ns) {
                    continue;
                }
                let shadowed_method = crate::namespace::join(class_ns, ext_method);
                if !self.definitions.has(&shadowed_method) {
                    continue;
                }
                to_remove.push(ns.to_string());
                break;
            }
        }
        if !to_remove.is_empty() {
            log::debug!("pruning {} shadowed external definitions", to_remove.len());
        }
        for ns in to_remove {
            self.definitions.remove(&ns);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definitions::SELF_ATTRIBUTE;

    #[test]
    fn convergence_requires_exact_equality_on_shared_keys() {
        let mut definitions = DefinitionStore::new();
        definitions.create("pkg.f", DefinitionKind::Function);
        let prev = snapshot(&definitions, &ScopeTree::new(), &ClassRegistry::new());

        definitions
            .get_mut("pkg.f")
            .unwrap()
            .add_name_pointer(SELF_ATTRIBUTE, "pkg.g");
        let curr = snapshot(&definitions, &ScopeTree::new(), &ClassRegistry::new());

        assert!(!has_converged(&prev, &curr));
    }

    #[test]
    fn convergence_tolerates_shrinkage() {
        let mut definitions = DefinitionStore::new();
        definitions.create("pkg.f", DefinitionKind::Function);
        definitions.create("pkg.ext_thing", DefinitionKind::Ext);
        let prev = snapshot(&definitions, &ScopeTree::new(), &ClassRegistry::new());

        definitions.remove("pkg.ext_thing");
        let curr = snapshot(&definitions, &ScopeTree::new(), &ClassRegistry::new());

        // a key vanishing between snapshots does not itself break convergence.
        assert!(has_converged(&prev, &curr));
    }

    #[test]
    fn prune_removes_ext_shadowed_by_class_method() {
        let mut definitions = DefinitionStore::new();
        let mut scopes = ScopeTree::new();
        let mut classes = ClassRegistry::new();
        let mut modules = ModuleRegistry::new();

        definitions.create("ext.X.run", DefinitionKind::Ext);
        definitions.create("pkg.X.run", DefinitionKind::Function);
        classes.add_class("pkg.X", "pkg");

        let mut postprocessor = Postprocessor::new(&mut definitions, &mut scopes, &mut classes, &mut modules);
        postprocessor.prune_shadowed_externals();

        assert!(!definitions.has("ext.X.run"));
    }

    #[test]
    fn prune_keeps_ext_when_class_does_not_yet_define_method() {
        let mut definitions = DefinitionStore::new();
        let mut scopes = ScopeTree::new();
        let mut classes = ClassRegistry::new();
        let mut modules = ModuleRegistry::new();

        definitions.create("ext.X.run", DefinitionKind::Ext);
        classes.add_class("pkg.X", "pkg");

        let mut postprocessor = Postprocessor::new(&mut definitions, &mut scopes, &mut classes, &mut modules);
        postprocessor.prune_shadowed_externals();

        assert!(definitions.has("ext.X.run"));
    }
}
