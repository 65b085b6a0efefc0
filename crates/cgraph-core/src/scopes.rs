//! The scope tree: one node per module/class/function body, with per-scope
//! name bindings and the anonymous-site counters that must reset between
//! postprocessing iterations for convergence to be observable at all.

use indexmap::IndexMap;

use crate::ids::ScopeId;
use crate::namespace::join;

#[derive(Debug, Clone, Default)]
pub struct Scope {
    pub namespace: String,
    pub parent: Option<ScopeId>,
    /// simple name -> namespace of the definition it currently resolves to.
    pub defs: IndexMap<String, String>,
    /// anonymous-site label -> next counter value, e.g. `<listcomp>` -> 3.
    counters: IndexMap<String, u32>,
}

impl Scope {
    /// Allocates the next counter value for `label` (e.g. `<listcomp>`),
    /// returning a namespace-qualified anonymous name such as
    /// `pkg.mod.f.<listcomp>#3`.
    pub fn next_anonymous(&mut self, label: &str) -> String {
        let counter = self.counters.entry(label.to_string()).or_insert(0);
        let name = format!("{label}#{counter}");
        *counter += 1;
        join(&self.namespace, &name)
    }

    pub fn reset_counters(&mut self) {
        self.counters.clear();
    }

    pub fn local_namespaces(&self) -> impl Iterator<Item = &str> {
        self.defs.values().map(String::as_str)
    }
}

#[derive(Debug, Default)]
pub struct ScopeTree {
    scopes: IndexMap<String, Scope>,
}

impl ScopeTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a child scope named `name` under `parent_ns` (`""` for a
    /// module-root scope) and returns its id. Idempotent on the resulting
    /// namespace.
    pub fn add_scope(&mut self, parent_ns: &str, name: &str) -> ScopeId {
        let namespace = join(parent_ns, name);
        if let Some(index) = self.scopes.get_index_of(&namespace) {
            return ScopeId::new(index);
        }
        let parent = self.scopes.get_index_of(parent_ns).map(ScopeId::new);
        let scope = Scope {
            namespace: namespace.clone(),
            parent,
            defs: IndexMap::new(),
            counters: IndexMap::new(),
        };
        let (index, _) = self.scopes.insert_full(namespace, scope);
        ScopeId::new(index)
    }

    pub fn get_scope(&self, namespace: &str) -> Option<&Scope> {
        self.scopes.get(namespace)
    }

    pub fn get_scope_mut(&mut self, namespace: &str) -> Option<&mut Scope> {
        self.scopes.get_mut(namespace)
    }

    pub fn get_by_id(&self, id: ScopeId) -> Option<&Scope> {
        self.scopes.get_index(id.index()).map(|(_, scope)| scope)
    }

    pub fn bind(&mut self, namespace: &str, simple_name: &str, definition_ns: &str) {
        if let Some(scope) = self.scopes.get_mut(namespace) {
            scope.defs.insert(simple_name.to_string(), definition_ns.to_string());
        }
    }

    /// Walks `namespace` then its ancestors looking for `simple_name`,
    /// returning the first matching definition namespace found. Callers that
    /// exhaust this without a result fall back to the module's import table
    /// or fabricate an EXT, per the lookup rule in the component design.
    pub fn resolve(&self, namespace: &str, simple_name: &str) -> Option<&str> {
        let mut current = self.scopes.get(namespace);
        while let Some(scope) = current {
            if let Some(found) = scope.defs.get(simple_name) {
                return Some(found.as_str());
            }
            current = scope.parent.and_then(|id| self.get_by_id(id));
        }
        None
    }

    pub fn reset_all_counters(&mut self) {
        for scope in self.scopes.values_mut() {
            scope.reset_counters();
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Scope)> {
        self.scopes.iter().map(|(ns, scope)| (ns.as_str(), scope))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_through_parent_chain() {
        let mut tree = ScopeTree::new();
        tree.add_scope("", "pkg.mod");
        tree.add_scope("pkg.mod", "Class");
        tree.bind("pkg.mod", "helper", "pkg.mod.helper");
        assert_eq!(tree.resolve("pkg.mod.Class", "helper"), Some("pkg.mod.helper"));
    }

    #[test]
    fn local_binding_shadows_parent() {
        let mut tree = ScopeTree::new();
        tree.add_scope("", "pkg.mod");
        tree.add_scope("pkg.mod", "Class");
        tree.bind("pkg.mod", "x", "pkg.mod.x_outer");
        tree.bind("pkg.mod.Class", "x", "pkg.mod.Class.x_inner");
        assert_eq!(tree.resolve("pkg.mod.Class", "x"), Some("pkg.mod.Class.x_inner"));
    }

    #[test]
    fn anonymous_counters_are_deterministic_after_reset() {
        let mut tree = ScopeTree::new();
        tree.add_scope("", "pkg.mod");
        let scope = tree.get_scope_mut("pkg.mod").unwrap();
        let first = scope.next_anonymous("<listcomp>");
        let second = scope.next_anonymous("<listcomp>");
        assert_eq!(first, "pkg.mod.<listcomp>#0");
        assert_eq!(second, "pkg.mod.<listcomp>#1");
        scope.reset_counters();
        assert_eq!(scope.next_anonymous("<listcomp>"), "pkg.mod.<listcomp>#0");
    }
}
