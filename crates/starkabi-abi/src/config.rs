//! Parser configuration

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AbiError, AbiResult};

/// Options controlling how ABI documents are parsed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParserConfig {
    /// Retry type resolution in dependency order when definitions are
    /// declared out of order
    #[serde(default = "default_sort_unordered_types")]
    pub sort_unordered_types: bool,
    /// Skip enum-kind events instead of failing on them
    #[serde(default = "default_skip_enum_events")]
    pub skip_enum_events: bool,
}

fn default_sort_unordered_types() -> bool {
    true
}

fn default_skip_enum_events() -> bool {
    true
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            sort_unordered_types: default_sort_unordered_types(),
            skip_enum_events: default_skip_enum_events(),
        }
    }
}

impl ParserConfig {
    /// Parse from TOML; missing keys take their defaults
    pub fn from_toml_str(content: &str) -> AbiResult<Self> {
        toml::from_str(content).map_err(|e| AbiError::Config(e.to_string()))
    }

    /// Load from a TOML file
    pub fn load(path: impl AsRef<Path>) -> AbiResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| AbiError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_toml_str(&content)
    }

    /// Save to a TOML file
    pub fn save(&self, path: impl AsRef<Path>) -> AbiResult<()> {
        let content = toml::to_string_pretty(self).map_err(|e| AbiError::Config(e.to_string()))?;
        std::fs::write(path.as_ref(), content)
            .map_err(|e| AbiError::Config(format!("{}: {}", path.as_ref().display(), e)))
    }
}
