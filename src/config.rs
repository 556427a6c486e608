//! Configuration System
//!
//! Layered settings for the generator and its logging. Sources, lowest to highest
//! precedence: built-in defaults, the global config file, the workspace
//! `shieldgen.toml`, then `SHIELDGEN__*` environment variables.
//! CLI flags and host-protocol options are applied on top by the caller.

use crate::error::ConfigurationError;
use crate::generation::GenerationConfig;
use crate::logging::LoggingConfig;
use crate::model::ProviderIdentity;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

mod merge;
mod sources;

pub use sources::global_file::global_config_path;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShieldgenConfig {
    /// Generator settings
    #[serde(default)]
    pub generator: GeneratorSettings,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Generator settings. Relative paths are resolved against a base directory
/// with [`GeneratorSettings::to_generation_config`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorSettings {
    /// Context type module, relative to the schema directory or absolute
    #[serde(default)]
    pub context_path: Option<PathBuf>,

    /// Output directory for `shield.ts`
    #[serde(default = "default_output")]
    pub output: PathBuf,

    /// Schema file or schema directory; relative context paths are anchored here
    #[serde(default)]
    pub schema: Option<PathBuf>,

    /// Companion client generator
    #[serde(default = "default_provider")]
    pub provider: String,

    /// Companion client version, selects the operation kind vocabulary
    #[serde(default)]
    pub client_version: Option<String>,
}

/// Matches the manifest's default output location.
fn default_output() -> PathBuf {
    PathBuf::from(crate::host::DEFAULT_OUTPUT)
}

fn default_provider() -> String {
    "prisma-client-js".to_string()
}

impl Default for GeneratorSettings {
    fn default() -> Self {
        Self {
            context_path: None,
            output: default_output(),
            schema: None,
            provider: default_provider(),
            client_version: None,
        }
    }
}

impl GeneratorSettings {
    /// Provider identity from `provider` and `client_version`.
    ///
    /// A version embedded in `provider` (`name@version`) wins over `client_version`.
    pub fn provider_identity(&self) -> Result<ProviderIdentity, ConfigurationError> {
        let mut identity = ProviderIdentity::parse(&self.provider)?;
        if identity.version.is_none() {
            identity.version = self.client_version.clone();
        }
        Ok(identity)
    }

    /// Build the per-run config. Relative paths are joined onto `base_dir`.
    ///
    /// A `schema` pointing at a file anchors at its parent directory; without a
    /// `schema`, `base_dir` is the anchor.
    pub fn to_generation_config(&self, base_dir: &Path) -> GenerationConfig {
        let absolute = |path: &Path| {
            if path.is_absolute() {
                path.to_path_buf()
            } else {
                base_dir.join(path)
            }
        };
        let schema_root = match &self.schema {
            Some(schema) => schema_directory(&absolute(schema)),
            None => base_dir.to_path_buf(),
        };
        GenerationConfig::new(
            self.context_path.clone().unwrap_or_default(),
            absolute(&self.output),
            schema_root,
        )
    }
}

/// Directory containing a schema file, or the path itself if it is a directory.
pub fn schema_directory(schema: &Path) -> PathBuf {
    let looks_like_file = schema.is_file()
        || (!schema.is_dir() && schema.extension().is_some_and(|ext| ext == "prisma"));
    match schema.parent() {
        Some(parent) if looks_like_file => parent.to_path_buf(),
        _ => schema.to_path_buf(),
    }
}

/// Loads [`ShieldgenConfig`] from layered sources.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load defaults, global file, workspace files and environment overrides.
    pub fn load(workspace_root: &Path) -> Result<ShieldgenConfig, ConfigurationError> {
        let builder = merge::merge_policy::builder_with_defaults()?;
        let builder = sources::global_file::add_to_builder(builder)?;
        let builder = sources::workspace_file::add_to_builder(builder, workspace_root)?;
        let config = builder.add_source(environment()).build()?;
        Ok(config.try_deserialize()?)
    }

    /// Load a single explicit file (plus defaults and environment overrides).
    pub fn load_from_file(path: &Path) -> Result<ShieldgenConfig, ConfigurationError> {
        if !path.exists() {
            return Err(ConfigurationError::Settings(format!(
                "Config file not found: {}",
                path.display()
            )));
        }
        let config: Config = merge::merge_policy::builder_with_defaults()?
            .add_source(File::from(path))
            .add_source(environment())
            .build()?;
        Ok(config.try_deserialize()?)
    }
}

fn environment() -> Environment {
    Environment::with_prefix("SHIELDGEN")
        .prefix_separator("__")
        .separator("__")
}
