//! Merge rules: defaults, override order, conflict handling.

use config::Config;
use config::ConfigBuilder;
use config::ConfigError;

/// Create a Config builder with merge policy defaults applied.
pub fn builder_with_defaults() -> Result<ConfigBuilder<config::builder::DefaultState>, ConfigError>
{
    Config::builder()
        .set_default("generator.output", crate::host::DEFAULT_OUTPUT)?
        .set_default("generator.provider", "prisma-client-js")?
        .set_default("logging.level", "info")
}
