//! Materializes the call graph from the converged definition store, the
//! type-inference candidates and the dataflow edges.

use indexmap::{IndexMap, IndexSet};
use serde::Serialize;

use crate::dataflow::DataflowResult;
use crate::definitions::{DefinitionKind, DefinitionStore, SELF_ATTRIBUTE};
use crate::inference::TypeInferenceResult;

#[derive(Debug, Default, Serialize)]
pub struct CallGraph {
    /// caller namespace -> set of callee namespaces.
    pub edges: IndexMap<String, IndexSet<String>>,
}

impl CallGraph {
    pub fn get(&self) -> &IndexMap<String, IndexSet<String>> {
        &self.edges
    }

    pub fn edge_list(&self) -> Vec<(String, String)> {
        self.edges
            .iter()
            .flat_map(|(caller, callees)| callees.iter().map(move |callee| (caller.clone(), callee.clone())))
            .collect()
    }
}

pub struct CallGraphBuilder<'a> {
    definitions: &'a DefinitionStore,
}

impl<'a> CallGraphBuilder<'a> {
    pub fn new(definitions: &'a DefinitionStore) -> Self {
        Self { definitions }
    }

    /// For each call site (a Definition whose root points-to set names
    /// candidate callees), the callee set is the points-to set widened by
    /// any class candidates type-inference associated with the same
    /// namespace, restricted to namespaces that are actually callable.
    pub fn build(&self, inference: &TypeInferenceResult, _dataflow: &DataflowResult) -> CallGraph {
        let mut graph = CallGraph::default();

        for (ns, def) in self.definitions.iter() {
            let mut callees: IndexSet<String> = def
                .name_pointer_values(SELF_ATTRIBUTE)
                .filter(|target| self.is_callable(target))
                .map(str::to_string)
                .collect();

            if let Some(candidates) = inference.attribute_matching_to_class.get(ns) {
                for candidate in candidates {
                    if self.is_callable(candidate) {
                        callees.insert(candidate.clone());
                    }
                }
            }

            if !callees.is_empty() {
                graph.edges.insert(ns.to_string(), callees);
            }
        }

        graph
    }

    fn is_callable(&self, namespace: &str) -> bool {
        self.definitions
            .get(namespace)
            .map(|def| def.is_function())
            .unwrap_or(false)
    }

    /// A separate call graph generated on demand by transitively walking
    /// `dataflow`'s assign/return relations: if `f` is assigned a reference
    /// to `g` and `g` returns `h`, `f` is recorded as reaching `h` as well
    /// as `g`. Unlike `build`, this does not consult type inference or the
    /// raw points-to pointers at all — it is purely a dataflow-derived view.
    pub fn build_dataflow_graph(&self, dataflow: &DataflowResult) -> CallGraph {
        let mut graph = CallGraph::default();

        for caller in &dataflow.methods {
            let mut reached: IndexSet<String> = IndexSet::new();
            let mut frontier: Vec<String> = Vec::new();
            if let Some(assigned) = dataflow.assign_information.get(caller) {
                frontier.extend(assigned.iter().cloned());
            }

            while let Some(callee) = frontier.pop() {
                if !reached.insert(callee.clone()) {
                    continue;
                }
                if let Some(returns) = dataflow.return_information.get(&callee) {
                    for next in returns {
                        if !reached.contains(next) {
                            frontier.push(next.clone());
                        }
                    }
                }
            }

            if !reached.is_empty() {
                graph.edges.insert(caller.clone(), reached);
            }
        }

        graph
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classes::ClassRegistry;
    use crate::inference::TypeInference;

    #[test]
    fn builds_edge_from_simple_call() {
        let mut definitions = DefinitionStore::new();
        definitions.create("pkg.f", DefinitionKind::Function);
        definitions.create("pkg.g", DefinitionKind::Function);
        definitions
            .get_mut("pkg.f")
            .unwrap()
            .add_name_pointer(SELF_ATTRIBUTE, "pkg.g");

        let classes = ClassRegistry::new();
        let inference = TypeInference::new(&classes, &definitions).generate();
        let dataflow = DataflowResult::default();

        let builder = CallGraphBuilder::new(&definitions);
        let graph = builder.build(&inference, &dataflow);

        assert!(graph.get()["pkg.f"].contains("pkg.g"));
    }

    #[test]
    fn dataflow_graph_reaches_transitively_through_returns() {
        let definitions = DefinitionStore::new();
        let mut dataflow = DataflowResult::default();
        dataflow.methods.insert("pkg.f".to_string());
        dataflow.methods.insert("pkg.g".to_string());
        dataflow.methods.insert("pkg.h".to_string());

        dataflow
            .assign_information
            .entry("pkg.f".to_string())
            .or_default()
            .insert("pkg.g".to_string());
        dataflow
            .return_information
            .entry("pkg.g".to_string())
            .or_default()
            .insert("pkg.h".to_string());

        let builder = CallGraphBuilder::new(&definitions);
        let graph = builder.build_dataflow_graph(&dataflow);

        let reached = &graph.get()["pkg.f"];
        assert!(reached.contains("pkg.g"));
        assert!(reached.contains("pkg.h"));
    }
}
