//! CLI parse: clap types for shieldgen. No behavior; definitions only.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// shieldgen - default-allow tRPC shield generator
#[derive(Parser)]
#[command(name = "shieldgen")]
#[command(about = "Generate a default-allow tRPC shield permission policy from a data model")]
pub struct Cli {
    /// Command to run; without one, serve the host protocol on stdin/stderr
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Workspace root directory (settings file location and base for relative paths)
    #[arg(long, default_value = ".")]
    pub workspace: PathBuf,

    /// Configuration file path (overrides default config loading)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long)]
    pub verbose: bool,

    /// Disable logging entirely
    #[arg(long)]
    pub quiet: bool,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file)
    #[arg(long)]
    pub log_output: Option<String>,

    /// Log file path (if output is "file")
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Serve the host protocol (JSON-RPC requests on stdin, responses on stderr)
    Host,
    /// Print the generator manifest as JSON
    Manifest,
    /// Generate shield.ts from a DMMF JSON file
    Generate {
        /// DMMF JSON file describing the model operations
        #[arg(long)]
        dmmf: PathBuf,
        /// Output directory (its contents are replaced)
        #[arg(long)]
        output: Option<PathBuf>,
        /// Schema file or directory; relative context paths are anchored here
        #[arg(long)]
        schema: Option<PathBuf>,
        /// Context type module, relative to the schema directory or absolute
        #[arg(long)]
        context_path: Option<PathBuf>,
        /// Companion client generator, optionally with version (prisma-client-js@5.22.0)
        #[arg(long)]
        provider: Option<String>,
    },
}

impl Cli {
    /// Whether this invocation talks the host protocol over stdin/stderr.
    pub fn is_host_mode(&self) -> bool {
        matches!(self.command, None | Some(Commands::Host))
    }
}
