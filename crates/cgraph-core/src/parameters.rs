//! Snapshots formal parameter lists for every callable right after
//! preprocessing completes, before any points-to propagation can occur.
//! This snapshot is immune to later pointer growth and is consumed
//! unchanged by the call-graph builder.

use indexmap::IndexMap;

use crate::definitions::{DefinitionKind, DefinitionStore};

#[derive(Debug, Default)]
pub struct ParameterExtractor {
    parameters: IndexMap<String, Vec<String>>,
}

impl ParameterExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    /// `formal_params` supplies the parameter list for each callable
    /// namespace it knows about (typically backed by the front-end's parsed
    /// signature data); only FUNCTION definitions are recorded.
    pub fn extract(
        &mut self,
        definitions: &DefinitionStore,
        formal_params: impl Fn(&str) -> Vec<String>,
    ) {
        for (ns, def) in definitions.iter() {
            if def.kind() == DefinitionKind::Function {
                self.parameters.insert(ns.to_string(), formal_params(ns));
            }
        }
    }

    pub fn parameters_of(&self, callable_ns: &str) -> Option<&[String]> {
        self.parameters.get(callable_ns).map(Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.parameters.iter().map(|(ns, params)| (ns.as_str(), params.as_slice()))
    }
}
