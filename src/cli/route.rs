//! CLI route: single route table and run context. Dispatches to the generator and host session.

use crate::cli::output::format_report;
use crate::cli::parse::Commands;
use crate::config::{ConfigLoader, GeneratorSettings, ShieldgenConfig};
use crate::error::GeneratorError;
use crate::generation::Generator;
use crate::host::{serve, GeneratorManifest, HostSession};
use crate::model::DmmfFileSource;
use std::io;
use std::path::{Path, PathBuf};
use tracing::info;

/// Runtime context for CLI execution: workspace root and loaded settings.
/// Built from workspace path and optional config path using ConfigLoader only.
pub struct RunContext {
    workspace_root: PathBuf,
    config: ShieldgenConfig,
}

impl RunContext {
    /// Create run context from workspace root and optional config path.
    pub fn new(workspace_root: PathBuf, config_path: Option<PathBuf>) -> Result<Self, GeneratorError> {
        let config = match config_path {
            Some(ref cfg_path) => ConfigLoader::load_from_file(cfg_path)?,
            None => ConfigLoader::load(&workspace_root)?,
        };
        let workspace_root = absolute_workspace(&workspace_root)?;
        Ok(Self {
            workspace_root,
            config,
        })
    }

    pub fn workspace_root(&self) -> &Path {
        &self.workspace_root
    }

    pub fn config(&self) -> &ShieldgenConfig {
        &self.config
    }

    /// Execute a one-shot command and return its text output.
    pub fn execute(&self, command: &Commands) -> Result<String, GeneratorError> {
        match command {
            Commands::Host => {
                self.serve_host()?;
                Ok(String::new())
            }
            Commands::Manifest => {
                let manifest = GeneratorManifest::default();
                serde_json::to_string_pretty(&manifest).map_err(GeneratorError::Render)
            }
            Commands::Generate {
                dmmf,
                output,
                schema,
                context_path,
                provider,
            } => {
                let mut settings = self.config.generator.clone();
                if let Some(output) = output {
                    settings.output = output.clone();
                }
                if let Some(schema) = schema {
                    settings.schema = Some(schema.clone());
                }
                if let Some(context_path) = context_path {
                    settings.context_path = Some(context_path.clone());
                }
                if let Some(provider) = provider {
                    settings.provider = provider.clone();
                }
                self.generate(&settings, dmmf)
            }
        }
    }

    fn generate(&self, settings: &GeneratorSettings, dmmf: &Path) -> Result<String, GeneratorError> {
        let identity = settings.provider_identity()?;
        let dmmf = if dmmf.is_absolute() {
            dmmf.to_path_buf()
        } else {
            self.workspace_root.join(dmmf)
        };
        let generator = Generator::new(settings.to_generation_config(&self.workspace_root));
        let source = DmmfFileSource::new(dmmf, Some(identity));
        let report = generator.run(&source)?;
        Ok(format_report(&report))
    }

    /// Serve the host protocol: requests on stdin, responses on stderr.
    pub fn serve_host(&self) -> Result<(), GeneratorError> {
        info!("Serving host protocol");
        let session = HostSession::new(self.config.generator.clone());
        let stdin = io::stdin();
        serve(&session, stdin.lock(), io::stderr()).map_err(GeneratorError::Protocol)
    }
}

fn absolute_workspace(workspace_root: &Path) -> Result<PathBuf, GeneratorError> {
    if let Ok(canonical) = dunce::canonicalize(workspace_root) {
        return Ok(canonical);
    }
    if workspace_root.is_absolute() {
        return Ok(workspace_root.to_path_buf());
    }
    let cwd = std::env::current_dir().map_err(GeneratorError::Protocol)?;
    Ok(cwd.join(workspace_root))
}
