//! The definition store: one record per namespace, with the points-to
//! pointers that the postprocessor grows to a fixed point.

use indexmap::{IndexMap, IndexSet};

use crate::ids::{DefinitionId, ScopeId};

/// The root attribute key: "the value of this name itself", as opposed to
/// one of its named attributes.
pub const SELF_ATTRIBUTE: &str = "";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DefinitionKind {
    Function,
    Class,
    Module,
    Name,
    /// Believed to live outside the analyzed package. Created lazily by
    /// `DefinitionStore::complete` whenever a pointer set names a namespace
    /// with no record of its own.
    Ext,
}

#[derive(Debug, Clone, Default)]
pub struct Definition {
    pub namespace: String,
    pub kind: Option<DefinitionKind>,
    pub scope: Option<ScopeId>,
    /// attribute name -> set of namespaces it may point to.
    pub name_pointer: IndexMap<String, IndexSet<String>>,
    /// attribute name -> set of literal tags it may carry.
    pub lit_pointer: IndexMap<String, IndexSet<LiteralTag>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LiteralTag {
    Str,
    Int,
    Float,
    Bool,
    None,
}

impl Definition {
    fn new(namespace: String, kind: DefinitionKind) -> Self {
        Self {
            namespace,
            kind: Some(kind),
            scope: None,
            name_pointer: IndexMap::new(),
            lit_pointer: IndexMap::new(),
        }
    }

    pub fn kind(&self) -> DefinitionKind {
        self.kind.unwrap_or(DefinitionKind::Ext)
    }

    pub fn is_function(&self) -> bool {
        self.kind() == DefinitionKind::Function
    }

    /// Adds `target` to the points-to set for `attribute`, returning whether
    /// the set grew (used by the postprocessor to decide whether this
    /// iteration's pass made progress).
    pub fn add_name_pointer(&mut self, attribute: &str, target: impl Into<String>) -> bool {
        self.name_pointer
            .entry(attribute.to_string())
            .or_default()
            .insert(target.into())
    }

    pub fn add_lit_pointer(&mut self, attribute: &str, tag: LiteralTag) -> bool {
        self.lit_pointer
            .entry(attribute.to_string())
            .or_default()
            .insert(tag)
    }

    pub fn name_pointer_values(&self, attribute: &str) -> impl Iterator<Item = &str> {
        self.name_pointer
            .get(attribute)
            .into_iter()
            .flatten()
            .map(String::as_str)
    }
}

impl PartialEq for DefinitionKind {
    fn eq(&self, other: &Self) -> bool {
        std::mem::discriminant(self) == std::mem::discriminant(other)
    }
}
impl Eq for DefinitionKind {}

#[derive(Debug, Default)]
pub struct DefinitionStore {
    defs: IndexMap<String, Definition>,
}

impl DefinitionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Idempotent on `(namespace, kind)`: if `namespace` already exists, the
    /// existing record is returned unchanged regardless of `kind` — callers
    /// must not rely on this to "upgrade" a definition's kind.
    pub fn create(&mut self, namespace: &str, kind: DefinitionKind) -> DefinitionId {
        if let Some(index) = self.defs.get_index_of(namespace) {
            return DefinitionId::new(index);
        }
        let (index, _) = self
            .defs
            .insert_full(namespace.to_string(), Definition::new(namespace.to_string(), kind));
        DefinitionId::new(index)
    }

    pub fn get(&self, namespace: &str) -> Option<&Definition> {
        self.defs.get(namespace)
    }

    pub fn get_mut(&mut self, namespace: &str) -> Option<&mut Definition> {
        self.defs.get_mut(namespace)
    }

    pub fn has(&self, namespace: &str) -> bool {
        self.defs.contains_key(namespace)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Definition)> {
        self.defs.iter().map(|(ns, def)| (ns.as_str(), def))
    }

    pub fn len(&self) -> usize {
        self.defs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }

    /// Removes `namespace` and scrubs every pointer set in the store that
    /// referenced it (invariant D3).
    pub fn remove(&mut self, namespace: &str) -> Option<Definition> {
        let removed = self.defs.shift_remove(namespace);
        if removed.is_some() {
            for def in self.defs.values_mut() {
                for set in def.name_pointer.values_mut() {
                    set.shift_remove(namespace);
                }
            }
        }
        removed
    }

    /// Creates an EXT placeholder for every namespace named in a pointer set
    /// that has no record of its own. Must be called after every pass;
    /// idempotent.
    pub fn complete(&mut self) {
        let mut missing: IndexSet<String> = IndexSet::new();
        for def in self.defs.values() {
            for set in def.name_pointer.values() {
                for target in set {
                    if !self.defs.contains_key(target) {
                        missing.insert(target.clone());
                    }
                }
            }
        }
        for namespace in missing {
            self.defs
                .entry(namespace.clone())
                .or_insert_with(|| Definition::new(namespace, DefinitionKind::Ext));
        }
    }

    /// Asserts invariant D2 for all of `self`'s pointer sets against a
    /// previous snapshot's pointer sets: every current value must be a
    /// superset of the corresponding previous value, for keys present in
    /// both. Used by tests, not by the engine itself.
    pub fn name_pointer_grew_from(&self, previous: &DefinitionStore) -> bool {
        for (ns, prev_def) in previous.iter() {
            let Some(curr_def) = self.get(ns) else { continue };
            for (attr, prev_set) in &prev_def.name_pointer {
                let Some(curr_set) = curr_def.name_pointer.get(attr) else {
                    return false;
                };
                if !prev_set.iter().all(|v| curr_set.contains(v)) {
                    return false;
                }
            }
        }
        true
    }
}
