//! The orchestrator: owns the four stores plus configuration, and drives
//! the full CALL_GRAPH pipeline from entry points to output, or exposes the
//! converged `DefinitionStore` read-only for an external KEY_ERR pass.

use std::path::PathBuf;

use indexmap::IndexMap;
use serde::Serialize;

use crate::callgraph::{CallGraph, CallGraphBuilder};
use crate::classes::ClassRegistry;
use crate::dataflow::{Dataflow, DataflowResult};
use crate::definitions::DefinitionStore;
use crate::error::{ConfigurationError, EngineError};
use crate::frontend::FrontEnd;
use crate::imports::ImportResolver;
use crate::inference::{TypeInference, TypeInferenceResult};
use crate::modules::{Module, ModuleRegistry};
use crate::parameters::ParameterExtractor;
use crate::postprocessor::Postprocessor;
use crate::preprocessor::Preprocessor;
use crate::scopes::ScopeTree;

#[derive(Debug, Clone, Serialize)]
pub struct ModuleOutput {
    pub filename: Option<PathBuf>,
    pub methods: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ClassOutput {
    pub mro: Vec<String>,
    pub module: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    CallGraph,
    KeyErr,
}

#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub entry_points: Vec<PathBuf>,
    pub package_root: PathBuf,
    /// negative means "run until converged", with no iteration cap.
    pub max_iter: i64,
    pub operation: Operation,
}

impl EngineConfig {
    fn validate(&self) -> Result<(), ConfigurationError> {
        if self.entry_points.is_empty() {
            return Err(ConfigurationError::NoEntryPoints);
        }
        if !self.package_root.exists() {
            return Err(ConfigurationError::PackageRootNotFound(self.package_root.clone()));
        }
        Ok(())
    }
}

#[derive(Debug, Serialize)]
pub struct AnalysisOutput {
    pub call_graph: CallGraph,
    pub iteration_cap_reached: bool,
}

impl AnalysisOutput {
    /// Renders the output the way a CLI embedder would write it to a file;
    /// serialization itself stays the engine's concern so every embedder
    /// produces byte-identical output for the same analysis.
    pub fn to_json_string(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

pub struct Engine {
    config: EngineConfig,
    definitions: DefinitionStore,
    scopes: ScopeTree,
    classes: ClassRegistry,
    modules: ModuleRegistry,
}

impl Engine {
    pub fn new(config: EngineConfig) -> Result<Self, EngineError> {
        config.validate()?;
        Ok(Self {
            config,
            definitions: DefinitionStore::new(),
            scopes: ScopeTree::new(),
            classes: ClassRegistry::new(),
            modules: ModuleRegistry::new(),
        })
    }

    pub fn definitions(&self) -> &DefinitionStore {
        &self.definitions
    }

    pub fn scopes(&self) -> &ScopeTree {
        &self.scopes
    }

    pub fn classes(&self) -> &ClassRegistry {
        &self.classes
    }

    pub fn modules(&self) -> &ModuleRegistry {
        &self.modules
    }

    /// `{module_ns -> {filename: relpath-or-null, methods}}` for modules
    /// whose source was parsed.
    pub fn output_internal_modules(&self) -> IndexMap<String, ModuleOutput> {
        self.generate_module_output(self.modules.internal_modules())
    }

    /// Same shape as `output_internal_modules`, for modules whose source was
    /// never parsed (imports this invocation never walked into).
    pub fn output_external_modules(&self) -> IndexMap<String, ModuleOutput> {
        self.generate_module_output(self.modules.external_modules())
    }

    fn generate_module_output<'m>(&self, modules: impl Iterator<Item = &'m Module>) -> IndexMap<String, ModuleOutput> {
        modules
            .map(|module| {
                let filename = module
                    .filename
                    .as_ref()
                    .map(|path| path.strip_prefix(&self.config.package_root).unwrap_or(path).to_path_buf());
                (
                    module.namespace.clone(),
                    ModuleOutput {
                        filename,
                        methods: module.methods.clone(),
                    },
                )
            })
            .collect()
    }

    pub fn output_functions(&self) -> Vec<String> {
        self.definitions
            .iter()
            .filter(|(_, def)| def.is_function())
            .map(|(ns, _)| ns.to_string())
            .collect()
    }

    pub fn output_classes(&self) -> IndexMap<String, ClassOutput> {
        self.classes
            .iter()
            .map(|(ns, class)| {
                (
                    ns.to_string(),
                    ClassOutput {
                        mro: class.mro.clone(),
                        module: class.module.clone(),
                    },
                )
            })
            .collect()
    }

    pub fn run_preprocess<R: ImportResolver>(
        &mut self,
        import_resolver: &mut R,
        front_end_factory: impl FnMut() -> Box<dyn FrontEnd>,
    ) {
        let mut preprocessor = Preprocessor::new(
            &mut self.definitions,
            &mut self.scopes,
            &mut self.classes,
            &mut self.modules,
        );
        preprocessor.run(
            &self.config.entry_points,
            &self.config.package_root,
            import_resolver,
            front_end_factory,
        );
    }

    pub fn run_postprocess<R: ImportResolver>(
        &mut self,
        import_resolver: &mut R,
        front_end_factory: impl FnMut() -> Box<dyn FrontEnd>,
    ) -> bool {
        let mut postprocessor = Postprocessor::new(
            &mut self.definitions,
            &mut self.scopes,
            &mut self.classes,
            &mut self.modules,
        );
        let result = postprocessor.run(
            &self.config.entry_points,
            &self.config.package_root,
            import_resolver,
            self.config.max_iter,
            front_end_factory,
        );
        log::info!(
            "postprocessing finished after {} iterations (cap reached: {})",
            result.iterations,
            result.iteration_cap_reached
        );
        result.iteration_cap_reached
    }

    pub fn extract_parameters(&self, formal_params: impl Fn(&str) -> Vec<String>) -> ParameterExtractor {
        let mut extractor = ParameterExtractor::new();
        extractor.extract(&self.definitions, formal_params);
        extractor
    }

    pub fn infer_types(&self) -> TypeInferenceResult {
        TypeInference::new(&self.classes, &self.definitions).generate()
    }

    pub fn collect_dataflow(&self) -> DataflowResult {
        Dataflow::new(&self.definitions).collect()
    }

    pub fn build_call_graph(&self, inference: &TypeInferenceResult, dataflow: &DataflowResult) -> CallGraph {
        CallGraphBuilder::new(&self.definitions).build(inference, dataflow)
    }

    /// The separate dataflow-only call graph (§4.10), generated on demand
    /// rather than as part of `analyze`'s default pipeline.
    pub fn build_dataflow_call_graph(&self, dataflow: &DataflowResult) -> CallGraph {
        CallGraphBuilder::new(&self.definitions).build_dataflow_graph(dataflow)
    }

    /// Runs the full CALL_GRAPH pipeline end to end: preprocess, extract
    /// parameters, postprocess to a fixed point (with the one-shot prune),
    /// infer types, collect dataflow, and materialize the call graph.
    ///
    /// Fails only on `Operation::KeyErr`, for which this crate exposes the
    /// converged `DefinitionStore` read-only instead (see `definitions()`)
    /// rather than implementing the key-error pass itself.
    pub fn analyze<R: ImportResolver>(
        &mut self,
        import_resolver: &mut R,
        mut front_end_factory: impl FnMut() -> Box<dyn FrontEnd>,
        formal_params: impl Fn(&str) -> Vec<String>,
    ) -> Result<AnalysisOutput, EngineError> {
        if self.config.operation != Operation::CallGraph {
            return Err(ConfigurationError::UnknownOperation(
                "analyze() only drives the CallGraph pipeline; KeyErr callers should read definitions() directly"
                    .to_string(),
            )
            .into());
        }

        self.run_preprocess(import_resolver, &mut front_end_factory);
        let _parameters = self.extract_parameters(formal_params);
        let iteration_cap_reached = self.run_postprocess(import_resolver, &mut front_end_factory);
        let inference = self.infer_types();
        let dataflow = self.collect_dataflow();
        let call_graph = self.build_call_graph(&inference, &dataflow);

        Ok(AnalysisOutput {
            call_graph,
            iteration_cap_reached,
        })
    }
}
