//! Links attribute accesses whose receiver has no resolved points-to target
//! back to candidate defining classes, run once over the converged state.

use indexmap::{IndexMap, IndexSet};

use crate::classes::ClassRegistry;
use crate::definitions::{DefinitionStore, SELF_ATTRIBUTE};
use crate::namespace::simple_name;

#[derive(Debug, Default)]
pub struct TypeInferenceResult {
    /// receiver namespace -> candidate class namespaces.
    pub attribute_matching_to_class: IndexMap<String, IndexSet<String>>,
    /// attribute names that resolve as callables nowhere.
    pub methods_with_no_path: IndexSet<String>,
    /// attribute names that resolve nowhere at all.
    pub attributes_with_no_path: IndexSet<String>,
}

pub struct TypeInference<'a> {
    classes: &'a ClassRegistry,
    definitions: &'a DefinitionStore,
}

impl<'a> TypeInference<'a> {
    pub fn new(classes: &'a ClassRegistry, definitions: &'a DefinitionStore) -> Self {
        Self { classes, definitions }
    }

    pub fn generate(&self) -> TypeInferenceResult {
        let mut result = TypeInferenceResult::default();

        for (ns, def) in self.definitions.iter() {
            for (attr, targets) in &def.name_pointer {
                if attr == SELF_ATTRIBUTE || !targets.is_empty() {
                    continue;
                }
                let attr_name = simple_name(attr);
                let candidates = self.classes_declaring_attribute(attr_name);
                if candidates.is_empty() {
                    let owner_def = self.definitions.get(&format!("{ns}.{attr}"));
                    if owner_def.map(|d| d.is_function()).unwrap_or(false) {
                        result.methods_with_no_path.insert(attr_name.to_string());
                    } else {
                        result.attributes_with_no_path.insert(attr_name.to_string());
                    }
                    continue;
                }
                let entry = result
                    .attribute_matching_to_class
                    .entry(format!("{ns}.{attr}"))
                    .or_default();
                for candidate in candidates {
                    entry.insert(candidate.to_string());
                }
            }
        }

        result
    }

    /// Classes that declare `attribute_name` as one of their own
    /// definitions, directly or via any class in their MRO.
    fn classes_declaring_attribute(&self, attribute_name: &str) -> Vec<&str> {
        let mut found = Vec::new();
        for (class_ns, class) in self.classes.iter() {
            let declares = class
                .mro
                .iter()
                .any(|ancestor| self.definitions.has(&format!("{ancestor}.{attribute_name}")));
            if declares {
                found.push(class_ns);
            }
        }
        found
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definitions::DefinitionKind;

    #[test]
    fn unresolved_attribute_matches_declaring_class() {
        let mut definitions = DefinitionStore::new();
        definitions.create("pkg.Client", DefinitionKind::Class);
        definitions.create("pkg.Client.send", DefinitionKind::Function);
        definitions.create("pkg.main.self.client", DefinitionKind::Name);
        definitions
            .get_mut("pkg.main.self.client")
            .unwrap()
            .name_pointer
            .entry("send".to_string())
            .or_default();

        let mut classes = ClassRegistry::new();
        classes.add_class("pkg.Client", "pkg");

        let inference = TypeInference::new(&classes, &definitions);
        let result = inference.generate();

        let candidates = result
            .attribute_matching_to_class
            .get("pkg.main.self.client.send")
            .expect("expected a candidate entry");
        assert!(candidates.contains("pkg.Client"));
    }

    #[test]
    fn attribute_with_no_declaring_class_has_no_path() {
        let definitions_store = {
            let mut definitions = DefinitionStore::new();
            definitions.create("pkg.main.self.client", DefinitionKind::Name);
            definitions
                .get_mut("pkg.main.self.client")
                .unwrap()
                .name_pointer
                .entry("unknown_attr".to_string())
                .or_default();
            definitions
        };
        let classes = ClassRegistry::new();

        let inference = TypeInference::new(&classes, &definitions_store);
        let result = inference.generate();

        assert!(result.attributes_with_no_path.contains("unknown_attr"));
    }
}
