//! Generator options passed by the host with the `generate` request.

use crate::config::{schema_directory, GeneratorSettings};
use crate::generation::GenerationConfig;
use crate::model::{DmmfValueSource, ProviderIdentity, COMPANION_PROVIDERS};
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;

/// A value that is either given literally or named by an environment variable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvValue {
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub from_env_var: Option<String>,
}

impl EnvValue {
    pub fn literal(value: impl Into<String>) -> Self {
        Self {
            value: Some(value.into()),
            from_env_var: None,
        }
    }

    /// The environment variable wins when it is named and set.
    pub fn resolve(&self) -> Option<String> {
        self.from_env_var
            .as_deref()
            .and_then(|var| std::env::var(var).ok())
            .or_else(|| self.value.clone())
    }
}

/// One `generator` block of the schema.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratorBlock {
    #[serde(default)]
    pub name: String,
    pub provider: EnvValue,
    #[serde(default)]
    pub output: Option<EnvValue>,
    /// Free-form options; values are strings or string arrays.
    #[serde(default)]
    pub config: BTreeMap<String, Value>,
}

impl GeneratorBlock {
    pub fn config_str(&self, key: &str) -> Option<&str> {
        self.config.get(key).and_then(Value::as_str)
    }

    fn is_companion(&self) -> bool {
        self.provider
            .resolve()
            .is_some_and(|provider| COMPANION_PROVIDERS.contains(&provider.as_str()))
    }
}

/// The subset of the host's generator options the generator reads.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratorOptions {
    pub generator: GeneratorBlock,
    #[serde(default)]
    pub other_generators: Vec<GeneratorBlock>,
    pub schema_path: PathBuf,
    #[serde(default)]
    pub dmmf: Value,
}

impl GeneratorOptions {
    /// The first companion client generator declared alongside this one.
    pub fn companion(&self) -> Option<&GeneratorBlock> {
        self.other_generators.iter().find(|g| g.is_companion())
    }

    /// Companion identity. The version comes from `clientVersion` in this
    /// generator's block, then settings, then the installed client package.
    pub fn provider_identity(&self, settings: &GeneratorSettings) -> Option<ProviderIdentity> {
        let companion = self.companion()?;
        let name = companion.provider.resolve()?;
        let version = self
            .generator
            .config_str("clientVersion")
            .map(str::to_string)
            .or_else(|| settings.client_version.clone())
            .or_else(|| self.installed_client_version(companion));
        Some(ProviderIdentity::new(name, version))
    }

    /// Version from the `package.json` of the companion's output, or of the
    /// nearest `node_modules/@prisma/client` above the schema directory.
    fn installed_client_version(&self, companion: &GeneratorBlock) -> Option<String> {
        let schema_root = self.schema_root();
        let output_manifest = companion
            .output
            .as_ref()
            .and_then(EnvValue::resolve)
            .map(|output| anchor(&schema_root, Path::new(&output)).join("package.json"));
        let installed = schema_root
            .ancestors()
            .map(|dir| dir.join("node_modules/@prisma/client/package.json"));

        output_manifest
            .into_iter()
            .chain(installed)
            .find_map(|manifest| package_version(&manifest))
    }

    pub fn schema_root(&self) -> PathBuf {
        schema_directory(&self.schema_path)
    }

    /// Per-run config: block options first, then settings.
    pub fn to_generation_config(&self, settings: &GeneratorSettings) -> GenerationConfig {
        let schema_root = self.schema_root();
        let output = self
            .generator
            .output
            .as_ref()
            .and_then(EnvValue::resolve)
            .map(PathBuf::from)
            .unwrap_or_else(|| settings.output.clone());
        let output = anchor(&schema_root, &output);
        let context_path = self
            .generator
            .config_str("contextPath")
            .map(PathBuf::from)
            .or_else(|| settings.context_path.clone())
            .unwrap_or_default();
        GenerationConfig::new(context_path, output, schema_root)
    }

    pub fn model_source(&self, settings: &GeneratorSettings) -> DmmfValueSource {
        DmmfValueSource::new(self.dmmf.clone(), self.provider_identity(settings))
    }
}

fn package_version(manifest: &Path) -> Option<String> {
    let text = std::fs::read_to_string(manifest).ok()?;
    let package: Value = match serde_json::from_str(&text) {
        Ok(package) => package,
        Err(e) => {
            debug!(manifest = %manifest.display(), error = %e, "Unreadable package manifest");
            return None;
        }
    };
    let version = package.get("version")?.as_str()?.to_string();
    debug!(manifest = %manifest.display(), %version, "Detected installed client version");
    Some(version)
}

fn anchor(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}
