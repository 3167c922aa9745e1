//! Job configuration: rule toggles and name-generation policy.

use std::{fs, path::Path};

use anyhow::{Context, Result};
use log::debug;
use serde::Deserialize;

/// Configuration file looked up in the project root.
pub const CONFIG_FILE_NAME: &str = "rescramble.toml";

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ObfuscateConfig {
    /// Rename attribute-declared resources (ids, strings, colors, ...).
    pub attribute_rule: bool,
    /// Rename file-declared resources (layouts, drawables, ...).
    pub file_rule: bool,
    /// Length of generated names.
    pub name_length: usize,
    /// Seed for reproducible name generation; fresh entropy when unset.
    pub seed: Option<u64>,
}

impl Default for ObfuscateConfig {
    fn default() -> Self {
        Self {
            attribute_rule: true,
            file_rule: true,
            name_length: 8,
            seed: None,
        }
    }
}

impl ObfuscateConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let config =
            toml::from_str(&text).with_context(|| format!("failed to parse {}", path.display()))?;
        Ok(config)
    }

    /// Load `rescramble.toml` from the project root, or fall back to the
    /// defaults when the file does not exist.
    pub fn load_or_default(project_dir: &Path) -> Result<Self> {
        let path = project_dir.join(CONFIG_FILE_NAME);
        if path.is_file() {
            debug!("loading configuration from {}", path.display());
            Self::load(&path)
        } else {
            debug!("no {CONFIG_FILE_NAME} in project root, using defaults");
            Ok(Self::default())
        }
    }
}
