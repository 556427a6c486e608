//! Model Description
//!
//! The normalized list of exposed operations per data model, as supplied by the
//! external schema-ingestion collaborator (a DMMF document), plus the identity
//! of the client generator that produced it.

use crate::error::{ConfigurationError, IngestionError};
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

/// Client generators whose model description format is understood.
pub const COMPANION_PROVIDERS: &[&str] = &["prisma-client-js", "prisma-client"];

/// One exposed operation of one model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelOperationEntry {
    pub model: String,
    /// Operation kind as named by the provider, e.g. `findUnique` or `createOne`.
    pub kind: String,
    /// Generated operation name, typically `<kind><Model>`.
    pub name: String,
}

impl ModelOperationEntry {
    pub fn new(
        model: impl Into<String>,
        kind: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            model: model.into(),
            kind: kind.into(),
            name: name.into(),
        }
    }
}

/// Flattened model description.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModelDescription {
    pub entries: Vec<ModelOperationEntry>,
}

impl ModelDescription {
    pub fn new(entries: Vec<ModelOperationEntry>) -> Self {
        Self { entries }
    }

    /// Parse a DMMF JSON value. Only `mappings.modelOperations` is read.
    pub fn from_dmmf(value: Value) -> Result<Self, IngestionError> {
        let dmmf: Dmmf = serde_json::from_value(value)?;
        Ok(dmmf.into())
    }

    /// Parse DMMF JSON text.
    pub fn from_dmmf_str(text: &str) -> Result<Self, IngestionError> {
        let dmmf: Dmmf = serde_json::from_str(text)?;
        Ok(dmmf.into())
    }

    /// Distinct model names, sorted.
    pub fn models(&self) -> Vec<&str> {
        let mut models: Vec<&str> = self.entries.iter().map(|e| e.model.as_str()).collect();
        models.sort_unstable();
        models.dedup();
        models
    }
}

#[derive(Debug, Deserialize)]
struct Dmmf {
    mappings: Mappings,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Mappings {
    #[serde(default)]
    model_operations: Vec<ModelMapping>,
}

#[derive(Debug, Deserialize)]
struct ModelMapping {
    model: String,
    // Named so the flattened operation map does not pick it up as a kind.
    #[serde(default)]
    #[allow(dead_code)]
    plural: Option<String>,
    #[serde(flatten)]
    operations: BTreeMap<String, Value>,
}

impl From<Dmmf> for ModelDescription {
    fn from(dmmf: Dmmf) -> Self {
        let entries = dmmf
            .mappings
            .model_operations
            .into_iter()
            .flat_map(|mapping| {
                let model = mapping.model;
                mapping
                    .operations
                    .into_iter()
                    .filter_map(move |(kind, name)| match name {
                        Value::String(name) => {
                            Some(ModelOperationEntry::new(model.clone(), kind, name))
                        }
                        _ => None,
                    })
            })
            .collect();
        ModelDescription { entries }
    }
}

/// Identity of the upstream client generator that produced the model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderIdentity {
    pub name: String,
    pub version: Option<String>,
}

impl ProviderIdentity {
    pub fn new(name: impl Into<String>, version: Option<String>) -> Self {
        Self {
            name: name.into(),
            version,
        }
    }

    /// Parse `name` or `name@version`.
    pub fn parse(identity: &str) -> Result<Self, ConfigurationError> {
        let identity = identity.trim();
        // Scoped package names start with '@', so split on the last one.
        let (name, version) = match identity.rfind('@') {
            Some(idx) if idx > 0 => (&identity[..idx], Some(&identity[idx + 1..])),
            _ => (identity, None),
        };
        if name.is_empty() {
            return Err(ConfigurationError::UnsupportedProvider(identity.to_string()));
        }
        let version = version.filter(|v| !v.is_empty()).map(str::to_string);
        Ok(Self::new(name, version))
    }

    /// Major component of the version, `None` when no version was given.
    ///
    /// Accepts exact versions with an optional `v`, `^`, `~`, `=` or `>=`
    /// prefix. Other ranges (`<5`, `>4`, `4 || 5`) are rejected.
    pub fn major_version(&self) -> Result<Option<u64>, ConfigurationError> {
        let Some(version) = &self.version else {
            return Ok(None);
        };
        let trimmed = version.trim();
        trimmed
            .strip_prefix(">=")
            .unwrap_or(trimmed)
            .trim_start_matches(['v', '^', '~', '='])
            .split('.')
            .next()
            .and_then(|major| major.parse::<u64>().ok())
            .map(Some)
            .ok_or_else(|| ConfigurationError::UnsupportedProviderVersion {
                provider: self.name.clone(),
                version: version.clone(),
            })
    }

    pub fn is_companion(&self) -> bool {
        COMPANION_PROVIDERS.contains(&self.name.as_str())
    }
}

impl fmt::Display for ProviderIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.version {
            Some(version) => write!(f, "{}@{}", self.name, version),
            None => write!(f, "{}", self.name),
        }
    }
}

/// External model-description provider.
pub trait ModelSource {
    /// Identity of the companion client generator, `None` when none is configured.
    fn provider_identity(&self) -> Option<ProviderIdentity>;

    /// Produce the model description.
    fn load(&self) -> Result<ModelDescription, IngestionError>;
}

/// Model description read from a DMMF JSON file on disk.
#[derive(Debug, Clone)]
pub struct DmmfFileSource {
    path: PathBuf,
    provider: Option<ProviderIdentity>,
}

impl DmmfFileSource {
    pub fn new(path: impl Into<PathBuf>, provider: Option<ProviderIdentity>) -> Self {
        Self {
            path: path.into(),
            provider,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ModelSource for DmmfFileSource {
    fn provider_identity(&self) -> Option<ProviderIdentity> {
        self.provider.clone()
    }

    fn load(&self) -> Result<ModelDescription, IngestionError> {
        let text = std::fs::read_to_string(&self.path).map_err(|source| IngestionError::Read {
            path: self.path.clone(),
            source,
        })?;
        ModelDescription::from_dmmf_str(&text)
    }
}

/// Model description handed over in-process, e.g. by the host protocol.
#[derive(Debug, Clone)]
pub struct DmmfValueSource {
    dmmf: Value,
    provider: Option<ProviderIdentity>,
}

impl DmmfValueSource {
    pub fn new(dmmf: Value, provider: Option<ProviderIdentity>) -> Self {
        Self { dmmf, provider }
    }
}

impl ModelSource for DmmfValueSource {
    fn provider_identity(&self) -> Option<ProviderIdentity> {
        self.provider.clone()
    }

    fn load(&self) -> Result<ModelDescription, IngestionError> {
        ModelDescription::from_dmmf(self.dmmf.clone())
    }
}

/// Already-flattened model description.
#[derive(Debug, Clone)]
pub struct StaticSource {
    pub description: ModelDescription,
    pub provider: Option<ProviderIdentity>,
}

impl ModelSource for StaticSource {
    fn provider_identity(&self) -> Option<ProviderIdentity> {
        self.provider.clone()
    }

    fn load(&self) -> Result<ModelDescription, IngestionError> {
        Ok(self.description.clone())
    }
}
