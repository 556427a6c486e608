//! Generator manifest returned to the host on `getManifest`.

use crate::model::COMPANION_PROVIDERS;
use serde::{Deserialize, Serialize};

/// Default output location, relative to the schema file.
pub const DEFAULT_OUTPUT: &str = "./generated";
/// Display name shown by the host.
pub const PRETTY_NAME: &str = "Prisma tRPC Shield Generator";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratorManifest {
    pub default_output: String,
    pub pretty_name: String,
    /// Generators that must run alongside this one.
    pub requires_generators: Vec<String>,
}

impl Default for GeneratorManifest {
    fn default() -> Self {
        Self {
            default_output: DEFAULT_OUTPUT.to_string(),
            pretty_name: PRETTY_NAME.to_string(),
            requires_generators: vec![COMPANION_PROVIDERS[0].to_string()],
        }
    }
}
