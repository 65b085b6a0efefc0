//! Assign/return edges between callables, collected over the converged
//! state and consumed by the call-graph builder's dataflow-annotated graph.

use indexmap::{IndexMap, IndexSet};

use crate::definitions::{DefinitionKind, DefinitionStore, SELF_ATTRIBUTE};

#[derive(Debug, Default)]
pub struct DataflowResult {
    pub methods: IndexSet<String>,
    /// callable namespace -> namespaces assigned to it somewhere in its body.
    pub assign_information: IndexMap<String, IndexSet<String>>,
    /// callable namespace -> namespaces its `return` statements may reach.
    pub return_information: IndexMap<String, IndexSet<String>>,
}

pub struct Dataflow<'a> {
    definitions: &'a DefinitionStore,
}

impl<'a> Dataflow<'a> {
    pub fn new(definitions: &'a DefinitionStore) -> Self {
        Self { definitions }
    }

    pub fn collect(&self) -> DataflowResult {
        let mut result = DataflowResult::default();

        for (ns, def) in self.definitions.iter() {
            if def.is_function() {
                result.methods.insert(ns.to_string());
            }
        }

        for (ns, def) in self.definitions.iter() {
            if !def.is_function() {
                continue;
            }
            if let Some(assigned) = def.name_pointer.get(SELF_ATTRIBUTE) {
                let callables: IndexSet<String> = assigned
                    .iter()
                    .filter(|target| {
                        self.definitions
                            .get(target.as_str())
                            .map(|d| d.is_function())
                            .unwrap_or(false)
                    })
                    .cloned()
                    .collect();
                if !callables.is_empty() {
                    result.assign_information.insert(ns.to_string(), callables);
                }
            }
            if let Some(returned) = def.name_pointer.get("return") {
                if !returned.is_empty() {
                    result
                        .return_information
                        .insert(ns.to_string(), returned.clone());
                }
            }
        }

        result
    }
}
