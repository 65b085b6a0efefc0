#![doc = include_str!("../../../README.md")]
#![expect(
    clippy::module_name_repetitions,
    reason = "DefinitionStore, ScopeTree, ClassRegistry and similar names intentionally echo their module"
)]

mod callgraph;
mod classes;
mod dataflow;
mod definitions;
mod engine;
mod error;
mod frontend;
mod ids;
mod imports;
mod inference;
mod modules;
mod namespace;
mod parameters;
mod postprocessor;
mod preprocessor;
mod scopes;

pub use crate::{
    callgraph::{CallGraph, CallGraphBuilder},
    classes::{Class, ClassRegistry},
    dataflow::{Dataflow, DataflowResult},
    definitions::{Definition, DefinitionKind, DefinitionStore, LiteralTag, SELF_ATTRIBUTE},
    engine::{AnalysisOutput, ClassOutput, Engine, EngineConfig, ModuleOutput, Operation},
    error::{ConfigurationError, EngineError},
    frontend::{AnalysisContext, FrontEnd, FrontEndMode},
    ids::{DefinitionId, ScopeId},
    imports::{ImportHookGuard, ImportResolver},
    inference::{TypeInference, TypeInferenceResult},
    modules::{Module, ModuleRegistry},
    namespace::{attribute_equal, join, parent_namespace, path_to_module_namespace, simple_name},
    parameters::ParameterExtractor,
    scopes::{Scope, ScopeTree},
};
