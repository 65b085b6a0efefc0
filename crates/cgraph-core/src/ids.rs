//! Arena index newtypes. `DefinitionStore` and `ScopeTree` own their records
//! in an index map and hand out one of these instead of a reference, which is
//! what lets a `Definition` point at its containing `Scope` without forming
//! an ownership cycle. `ClassRegistry` and `ModuleRegistry` need no such
//! index: `Class` and `Module` hold no back-references, so they are plain
//! namespace-keyed maps instead.

use std::fmt;

macro_rules! arena_id {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name(u32);

        impl $name {
            pub fn new(index: usize) -> Self {
                Self(u32::try_from(index).expect("arena index overflowed u32"))
            }

            #[inline]
            pub fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

arena_id!(DefinitionId);
arena_id!(ScopeId);
