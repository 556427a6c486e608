//! Generation run: validate configuration, ingest, classify, sort, render, write.
//!
//! Runs are single-threaded and one-shot. Nothing guards the output directory
//! against a second concurrent run; the invoking build owns it for the run.

use crate::error::{ConfigurationError, GeneratorError};
use crate::generation::classify::{classify, ClassificationTable};
use crate::generation::render::build_policy;
use crate::generation::resolve::{anchor_context_path, normalize, resolve_import_specifier};
use crate::generation::write::write_output;
use crate::model::ModelSource;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Name of the generated policy file.
pub const SHIELD_FILE_NAME: &str = "shield.ts";

/// Per-run generator configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationConfig {
    /// Context type module, absolute or relative to `schema_root`.
    pub context_path: PathBuf,
    /// Absolute directory receiving `shield.ts`. Its contents are replaced.
    pub output_directory: PathBuf,
    /// Absolute directory that relative context paths are anchored at.
    pub schema_root: PathBuf,
}

/// Configuration that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedConfig {
    pub output_file: PathBuf,
    pub context_specifier: String,
    context_file: PathBuf,
}

impl GenerationConfig {
    pub fn new(
        context_path: impl Into<PathBuf>,
        output_directory: impl Into<PathBuf>,
        schema_root: impl Into<PathBuf>,
    ) -> Self {
        Self {
            context_path: context_path.into(),
            output_directory: output_directory.into(),
            schema_root: schema_root.into(),
        }
    }

    pub fn output_file(&self) -> PathBuf {
        self.output_directory.join(SHIELD_FILE_NAME)
    }

    /// Check every constraint and report all violations at once.
    pub fn validate(&self) -> Result<ValidatedConfig, ConfigurationError> {
        let mut errors = Vec::new();

        if self.context_path.as_os_str().is_empty() {
            errors.push(ConfigurationError::MissingContextPath);
        }
        if !self.output_directory.is_absolute() {
            errors.push(ConfigurationError::RelativePath {
                field: "outputDirectory",
                path: self.output_directory.clone(),
            });
        }
        if !self.schema_root.is_absolute() {
            errors.push(ConfigurationError::RelativePath {
                field: "schemaRootPath",
                path: self.schema_root.clone(),
            });
        }
        if !errors.is_empty() {
            return Err(collect(errors));
        }

        let output = normalize(dunce::simplified(&self.output_directory));
        let schema_root = normalize(dunce::simplified(&self.schema_root));
        let context_file = anchor_context_path(&self.context_path, &self.schema_root);

        match &output {
            Some(output) if output.parent().is_none() => {
                errors.push(self.unsafe_output("it is a filesystem root"));
            }
            Some(output) => {
                if schema_root.as_ref().is_some_and(|root| root.starts_with(output)) {
                    errors.push(self.unsafe_output("it contains the schema root"));
                }
                if context_file.as_ref().is_some_and(|file| file.starts_with(output)) {
                    errors.push(self.unsafe_output("it contains the context type file"));
                }
            }
            None => errors.push(self.unsafe_output("it escapes the filesystem root")),
        }

        let specifier = resolve_import_specifier(
            &self.output_directory,
            &self.context_path,
            &self.schema_root,
        );
        match specifier {
            Ok(context_specifier) if errors.is_empty() => Ok(ValidatedConfig {
                output_file: self.output_file(),
                context_specifier,
                context_file: context_file.unwrap_or_default(),
            }),
            Ok(_) => Err(collect(errors)),
            Err(e) => {
                errors.push(e);
                Err(collect(errors))
            }
        }
    }

    fn unsafe_output(&self, reason: &str) -> ConfigurationError {
        ConfigurationError::UnsafeOutputDirectory {
            path: self.output_directory.clone(),
            reason: reason.to_string(),
        }
    }
}

/// A module path may omit its extension.
fn module_exists(path: &Path) -> bool {
    path.exists()
        || ["ts", "tsx", "d.ts"].iter().any(|ext| {
            let mut with_ext = path.as_os_str().to_os_string();
            with_ext.push(".");
            with_ext.push(ext);
            Path::new(&with_ext).exists()
        })
}

fn collect(mut errors: Vec<ConfigurationError>) -> ConfigurationError {
    if errors.len() == 1 {
        errors.remove(0)
    } else {
        ConfigurationError::Invalid(errors)
    }
}

/// Outcome of a successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationReport {
    /// Written file, `None` when there was nothing to write.
    pub output_path: Option<PathBuf>,
    pub table: ClassificationTable,
    pub models: usize,
    pub queries: usize,
    pub mutations: usize,
    pub subscriptions: usize,
    /// Operations whose kind was not recognized.
    pub ignored: usize,
}

/// Drives one generation run.
#[derive(Debug, Clone)]
pub struct Generator {
    config: GenerationConfig,
}

impl Generator {
    pub fn new(config: GenerationConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &GenerationConfig {
        &self.config
    }

    pub fn output_directory(&self) -> &Path {
        &self.config.output_directory
    }

    /// Run the pipeline. Any failure aborts the remaining stages.
    pub fn run(&self, source: &dyn ModelSource) -> Result<GenerationReport, GeneratorError> {
        let validated = self.config.validate()?;
        if !module_exists(&validated.context_file) {
            warn!(
                context_file = %validated.context_file.display(),
                "Context type file does not exist yet"
            );
        }

        let provider = source
            .provider_identity()
            .ok_or(ConfigurationError::MissingCompanionGenerator)?;
        let versioned = ClassificationTable::select(&provider)?;

        let description = source.load()?;
        let table = match versioned {
            Some(table) => table,
            None => ClassificationTable::detect(&provider, &description.entries)?,
        };
        debug!(
            provider = %provider,
            ?table,
            detected = versioned.is_none(),
            "Selected classification table"
        );
        let buckets = classify(&description.entries, table);
        let ignored = buckets.ignored;
        let operations = buckets.into_sorted();
        info!(
            models = description.models().len(),
            queries = operations.queries().len(),
            mutations = operations.mutations().len(),
            ignored,
            "Classified model operations"
        );

        let document = build_policy(&operations, &validated.context_specifier)
            .map(|doc| doc.into_generated(validated.output_file.clone()));
        write_output(&self.config.output_directory, document.as_ref())?;

        match &document {
            Some(doc) => info!(path = %doc.path.display(), "Wrote shield policy"),
            None => info!(
                output_dir = %self.config.output_directory.display(),
                "No operations to protect, output directory left empty"
            ),
        }

        Ok(GenerationReport {
            output_path: document.map(|doc| doc.path),
            table,
            models: description.models().len(),
            queries: operations.queries().len(),
            mutations: operations.mutations().len(),
            subscriptions: operations.subscriptions().len(),
            ignored,
        })
    }
}
