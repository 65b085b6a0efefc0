//! The class registry: class descriptors and their linearized method
//! resolution order, computed with the C3 algorithm.

use indexmap::IndexMap;

#[derive(Debug, Clone)]
pub struct Class {
    pub namespace: String,
    pub module: String,
    pub bases: Vec<String>,
    pub mro: Vec<String>,
}

#[derive(Debug, Default)]
pub struct ClassRegistry {
    classes: IndexMap<String, Class>,
}

impl ClassRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_class(&mut self, namespace: &str, module: &str) {
        self.classes.entry(namespace.to_string()).or_insert_with(|| Class {
            namespace: namespace.to_string(),
            module: module.to_string(),
            bases: Vec::new(),
            mro: vec![namespace.to_string()],
        });
    }

    /// Records `bases` and recomputes the MRO. Bases not yet known to the
    /// registry are recorded but omitted from linearization; callers are
    /// expected to call this again once those bases resolve.
    pub fn set_bases(&mut self, namespace: &str, bases: Vec<String>) {
        let known_base_mros: Vec<Vec<String>> = bases
            .iter()
            .filter_map(|base| self.classes.get(base).map(|c| c.mro.clone()))
            .collect();
        let known_bases: Vec<String> = bases
            .iter()
            .filter(|base| self.classes.contains_key(base.as_str()))
            .cloned()
            .collect();
        let Some(class) = self.classes.get_mut(namespace) else {
            return;
        };
        class.bases = bases;
        class.mro = linearize(namespace, &known_bases, &known_base_mros);
    }

    pub fn get(&self, namespace: &str) -> Option<&Class> {
        self.classes.get(namespace)
    }

    pub fn mro(&self, namespace: &str) -> Option<&[String]> {
        self.classes.get(namespace).map(|c| c.mro.as_slice())
    }

    pub fn contains(&self, namespace: &str) -> bool {
        self.classes.contains_key(namespace)
    }

    /// All classes whose namespace is attribute-equal to `name` and which
    /// declare `attribute` directly or through their MRO.
    pub fn classes_declaring(&self, attribute_owner: impl Fn(&str) -> bool) -> Vec<&str> {
        self.classes
            .keys()
            .map(String::as_str)
            .filter(|ns| attribute_owner(ns))
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Class)> {
        self.classes.iter().map(|(ns, c)| (ns.as_str(), c))
    }
}

/// C3 linearization of `self_ns` over `known_bases`/`known_base_mros`.
///
/// The source this is adapted from treats an MRO conflict as a hard error.
/// Here it degrades: on conflict (or on a base directly naming `self_ns`,
/// i.e. a declared inheritance cycle), the MRO falls back to `[self_ns]` and
/// the caller is expected to log a warning (see `ClassRegistry::set_bases`
/// callers in the postprocessor). Analysis continues rather than aborting.
fn linearize(self_ns: &str, known_bases: &[String], known_base_mros: &[Vec<String>]) -> Vec<String> {
    if known_bases.is_empty() {
        return vec![self_ns.to_string()];
    }
    if known_bases.iter().any(|b| b == self_ns) {
        log::warn!("class `{self_ns}` declares itself as a base; degrading MRO to [self]");
        return vec![self_ns.to_string()];
    }

    let mut linearizations: Vec<Vec<String>> = known_base_mros.to_vec();
    linearizations.push(known_bases.to_vec());

    let mut result = vec![self_ns.to_string()];
    loop {
        linearizations.retain(|l| !l.is_empty());
        if linearizations.is_empty() {
            break;
        }
        let mut found = None;
        for lin in &linearizations {
            let candidate = &lin[0];
            let in_tail = linearizations.iter().any(|other| other[1..].contains(candidate));
            if !in_tail {
                found = Some(candidate.clone());
                break;
            }
        }
        match found {
            Some(next) => {
                for lin in &mut linearizations {
                    if lin.first() == Some(&next) {
                        lin.remove(0);
                    }
                }
                result.push(next);
            }
            None => {
                log::warn!(
                    "class `{self_ns}` has no consistent C3 linearization for bases {known_bases:?}; degrading MRO to [self]"
                );
                return vec![self_ns.to_string()];
            }
        }
    }
    result
}
