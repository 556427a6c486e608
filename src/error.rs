//! Error types for the shield generation pipeline.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Configuration problems. Always raised before any filesystem mutation.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("contextPath is required but was not provided")]
    MissingContextPath,

    #[error("{field} must be an absolute path, got {path:?}")]
    RelativePath { field: &'static str, path: PathBuf },

    #[error("context path {path:?} cannot be resolved: {reason}")]
    UnresolvableContextPath { path: PathBuf, reason: String },

    #[error("refusing to use output directory {path:?}: {reason}")]
    UnsafeOutputDirectory { path: PathBuf, reason: String },

    #[error("no companion client generator found (expected one of: {})", crate::model::COMPANION_PROVIDERS.join(", "))]
    MissingCompanionGenerator,

    #[error("unsupported model provider: {0}")]
    UnsupportedProvider(String),

    #[error("unsupported version {version:?} of model provider {provider}")]
    UnsupportedProviderVersion { provider: String, version: String },

    #[error("cannot determine the model description format of {provider}: {reason}")]
    UndetectedProviderVersion { provider: String, reason: String },

    #[error("invalid generator configuration:\n{}", format_all(.0))]
    Invalid(Vec<ConfigurationError>),

    #[error("failed to load settings: {0}")]
    Settings(String),
}

fn format_all(errors: &[ConfigurationError]) -> String {
    errors
        .iter()
        .map(|e| format!("  - {}", e))
        .collect::<Vec<_>>()
        .join("\n")
}

impl From<config::ConfigError> for ConfigurationError {
    fn from(err: config::ConfigError) -> Self {
        ConfigurationError::Settings(err.to_string())
    }
}

/// Failures of the external model description provider.
#[derive(Debug, Error)]
pub enum IngestionError {
    #[error("failed to read model description {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed model description: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("model provider failed: {0}")]
    Provider(String),
}

/// Output stage that failed during writing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputStage {
    CreateDirectory,
    Cleanup,
    Write,
}

impl fmt::Display for OutputStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputStage::CreateDirectory => write!(f, "create output directory"),
            OutputStage::Cleanup => write!(f, "clean output directory"),
            OutputStage::Write => write!(f, "write output file"),
        }
    }
}

/// Top-level error returned by a generation run.
#[derive(Debug, Error)]
pub enum GeneratorError {
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error("ingestion error: {0}")]
    Ingestion(#[from] IngestionError),

    #[error("I/O error: failed to {stage} at {path:?}: {source}")]
    Io {
        stage: OutputStage,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to render output: {0}")]
    Render(#[source] serde_json::Error),

    #[error("host protocol I/O error: {0}")]
    Protocol(#[source] std::io::Error),
}

impl GeneratorError {
    pub(crate) fn io(stage: OutputStage, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        GeneratorError::Io {
            stage,
            path: path.into(),
            source,
        }
    }

    /// Pipeline stage name, used in host protocol error payloads.
    pub fn stage(&self) -> &'static str {
        match self {
            GeneratorError::Configuration(_) => "configuration",
            GeneratorError::Ingestion(_) => "ingestion",
            GeneratorError::Io { .. } | GeneratorError::Render(_) => "output",
            GeneratorError::Protocol(_) => "protocol",
        }
    }
}
