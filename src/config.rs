use std::{fs, path::{Path, PathBuf}};
use serde::{Serialize, Deserialize};
use anyhow::{self, Context};

use crate::console::Messages;

/// Where the ledger lives and what the session says.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub ledger: PathBuf,
    pub messages: Messages
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig { ledger: PathBuf::from("./log.html"), messages: Messages::default() }
    }
}

impl AppConfig {
    pub fn read(filepath: impl AsRef<Path>) -> anyhow::Result<Self> {
        let filepath = filepath.as_ref();
        let file_content = fs::read_to_string(filepath)
            .with_context(|| format!("failed to read config file {}", filepath.display()))?;
        let config = toml::from_str(&file_content)
            .with_context(|| format!("failed to parse config file {}", filepath.display()))?;
        return Ok(config);
    }
}
