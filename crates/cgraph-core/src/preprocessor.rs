//! The preprocessor driver: walks every entry point once, installing import
//! hooks for the duration of each module's walk, and unions the transitively
//! analyzed module set across *all* entry points so a module reachable from
//! two different entry points is only walked once per invocation.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::classes::ClassRegistry;
use crate::definitions::DefinitionStore;
use crate::frontend::{AnalysisContext, FrontEnd, FrontEndMode};
use crate::imports::ImportResolver;
use crate::modules::ModuleRegistry;
use crate::namespace::path_to_module_namespace;
use crate::scopes::ScopeTree;

pub struct Preprocessor<'a> {
    pub definitions: &'a mut DefinitionStore,
    pub scopes: &'a mut ScopeTree,
    pub classes: &'a mut ClassRegistry,
    pub modules: &'a mut ModuleRegistry,
}

impl<'a> Preprocessor<'a> {
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

    /// Runs one preprocessing pass over `entry_points`, relative to
    /// `package_root`, driving `front_end_factory` (constructed fresh per
    /// module) and `import_resolver` (scoped per module via an RAII guard).
    pub fn run<R: ImportResolver>(
        &mut self,
        entry_points: &[PathBuf],
        package_root: &Path,
        import_resolver: &mut R,
        mut front_end_factory: impl FnMut() -> Box<dyn FrontEnd>,
    ) {
        let mut modules_analyzed: HashSet<String> = HashSet::new();

        for entry_point in entry_points {
            let Some(module_namespace) = path_to_module_namespace(entry_point, package_root) else {
                log::warn!("entry point `{}` has no module namespace, skipping", entry_point.display());
                continue;
            };

            if modules_analyzed.contains(&module_namespace) {
                continue;
            }

            let guard = import_resolver.install_hooks(package_root);
            let mut front_end = front_end_factory();
            let mut context = AnalysisContext {
                definitions: self.definitions,
                scopes: self.scopes,
                classes: self.classes,
                modules: self.modules,
            };
            let analyzed = front_end.analyze(
                FrontEndMode::Preprocess,
                &module_namespace,
                &modules_analyzed,
                &mut context,
            );
            drop(guard);

            log::debug!("preprocessed `{module_namespace}`, {} modules reached", analyzed.len());
            modules_analyzed.extend(analyzed);
        }

        self.definitions.complete();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definitions::DefinitionKind;
    use std::cell::RefCell;
    use std::rc::Rc;

    struct RecordingResolver;
    impl ImportResolver for RecordingResolver {
        fn resolve(&mut self, _current_module: &str, _import_spec: &str) -> Option<String> {
            None
        }
    }

    struct SingleModuleFrontEnd {
        calls: Rc<RefCell<u32>>,
    }
    impl FrontEnd for SingleModuleFrontEnd {
        fn analyze(
            &mut self,
            _mode: FrontEndMode,
            module_namespace: &str,
            _modules_analyzed: &HashSet<String>,
            context: &mut AnalysisContext<'_>,
        ) -> HashSet<String> {
            *self.calls.borrow_mut() += 1;
            context
                .definitions
                .create(&format!("{module_namespace}.f"), DefinitionKind::Function);
            let mut out = HashSet::new();
            out.insert(module_namespace.to_string());
            out
        }
    }

    #[test]
    fn duplicate_entry_points_are_only_walked_once() {
        let mut definitions = DefinitionStore::new();
        let mut scopes = ScopeTree::new();
        let mut classes = ClassRegistry::new();
        let mut modules = ModuleRegistry::new();
        let mut resolver = RecordingResolver;
        let calls = Rc::new(RefCell::new(0));

        let root = PathBuf::from("/pkg");
        let entry_points = vec![
            PathBuf::from("/pkg/mod.py"),
            PathBuf::from("/pkg/mod.py"),
        ];

        let mut preprocessor = Preprocessor::new(&mut definitions, &mut scopes, &mut classes, &mut modules);
        preprocessor.run(&entry_points, &root, &mut resolver, || {
            Box::new(SingleModuleFrontEnd { calls: calls.clone() })
        });

        assert_eq!(*calls.borrow(), 1);
        assert!(definitions.has("mod.f"));
    }
}
