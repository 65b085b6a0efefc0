use std::fmt;
use std::path::PathBuf;

/// Errors surfaced at the engine's fallible public boundaries.
///
/// `LookupFailure` and `ConfigurationError` are the only variants that
/// represent a genuine defect; `CycleInMro` degrades gracefully (the MRO
/// falls back to `[self]`) and is carried as a warning payload rather than a
/// hard failure, and `IterationCapReached` is not an error at all but a flag
/// on the analysis result (see `AnalysisOutput::iteration_cap_reached`).
#[derive(Debug, Clone)]
pub enum EngineError {
    /// A namespace expected to exist in the definition store was absent.
    LookupFailure(String),
    /// The engine configuration was invalid (empty entry points, missing
    /// package root, unknown operation selector).
    Configuration(ConfigurationError),
}

#[derive(Debug, Clone)]
pub enum ConfigurationError {
    NoEntryPoints,
    PackageRootNotFound(PathBuf),
    UnknownOperation(String),
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LookupFailure(ns) => write!(f, "lookup failure: namespace `{ns}` does not exist"),
            Self::Configuration(err) => write!(f, "configuration error: {err}"),
        }
    }
}

impl fmt::Display for ConfigurationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoEntryPoints => write!(f, "no entry points were provided"),
            Self::PackageRootNotFound(path) => {
                write!(f, "package root `{}` does not exist", path.display())
            }
            Self::UnknownOperation(op) => write!(f, "unknown operation: {op}"),
        }
    }
}

impl std::error::Error for EngineError {}
impl std::error::Error for ConfigurationError {}

impl From<ConfigurationError> for EngineError {
    fn from(error: ConfigurationError) -> Self {
        Self::Configuration(error)
    }
}
