//! The module registry: internal (source was parsed) vs. external modules,
//! each with the list of top-level callables it exports.

use std::path::PathBuf;

use indexmap::IndexMap;

#[derive(Debug, Clone)]
pub struct Module {
    pub namespace: String,
    pub filename: Option<PathBuf>,
    pub methods: Vec<String>,
}

impl Module {
    pub fn is_internal(&self) -> bool {
        self.filename.is_some()
    }
}

#[derive(Debug, Default)]
pub struct ModuleRegistry {
    modules: IndexMap<String, Module>,
}

impl ModuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_internal(&mut self, namespace: &str, filename: PathBuf) {
        self.modules.entry(namespace.to_string()).or_insert_with(|| Module {
            namespace: namespace.to_string(),
            filename: Some(filename),
            methods: Vec::new(),
        });
    }

    pub fn add_external(&mut self, namespace: &str) {
        self.modules.entry(namespace.to_string()).or_insert_with(|| Module {
            namespace: namespace.to_string(),
            filename: None,
            methods: Vec::new(),
        });
    }

    pub fn add_method(&mut self, namespace: &str, method_ns: &str) {
        if let Some(module) = self.modules.get_mut(namespace) {
            if !module.methods.iter().any(|m| m == method_ns) {
                module.methods.push(method_ns.to_string());
            }
        }
    }

    pub fn get(&self, namespace: &str) -> Option<&Module> {
        self.modules.get(namespace)
    }

    pub fn contains(&self, namespace: &str) -> bool {
        self.modules.contains_key(namespace)
    }

    pub fn internal_modules(&self) -> impl Iterator<Item = &Module> {
        self.modules.values().filter(|m| m.is_internal())
    }

    pub fn external_modules(&self) -> impl Iterator<Item = &Module> {
        self.modules.values().filter(|m| !m.is_internal())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Module)> {
        self.modules.iter().map(|(ns, m)| (ns.as_str(), m))
    }
}
