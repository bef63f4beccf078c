//! Configuration management for the CLI

use crate::output::OutputFormat;
use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_API_URL: &str = "http://localhost:8000";

/// CLI configuration, read from `~/.config/cadv/config.json`
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// API endpoint URL
    pub api_url: Option<String>,
    /// Default output format ("table" or "json")
    pub default_format: Option<String>,
}

impl Config {
    /// Load configuration from the default location; missing file means defaults
    pub fn load() -> Result<Self> {
        match Self::config_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).context("Failed to read config file")?;

        serde_json::from_str(&content).context("Failed to parse config file")
    }

    /// Flag or environment value first, then the config file, then the default
    pub fn resolve_api_url(&self, flag: Option<String>) -> String {
        flag.or_else(|| self.api_url.clone())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string())
    }

    pub fn resolve_format(&self, flag: Option<OutputFormat>) -> OutputFormat {
        flag.or_else(|| {
            self.default_format
                .as_deref()
                .and_then(|f| OutputFormat::from_str(f, true).ok())
        })
        .unwrap_or_default()
    }

    /// Get the configuration file path
    fn config_path() -> Option<PathBuf> {
        dirs_next::home_dir().map(|home| home.join(".config").join("cadv").join("config.json"))
    }
}
