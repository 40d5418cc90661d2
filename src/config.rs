use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::aggregate::{BAR_CAP, TOP_ARTISTS};
use crate::RenderOptions;

/// Application configuration loaded from a TOML file.
/// Every field has a default, so the file is optional.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// CSV dataset to load (overridden by `--data`).
    pub data_path: PathBuf,
    /// How many artists the popularity hierarchy keeps.
    pub top_artists: usize,
    /// Display cap of the ranked bar chart.
    pub bar_cap: usize,
    pub render: RenderOptions,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from("data/songs_normalize.csv"),
            top_artists: TOP_ARTISTS,
            bar_cap: BAR_CAP,
            render: RenderOptions::default(),
        }
    }
}

impl AppConfig {
    /// Parse a config document.
    pub fn from_toml(contents: &str) -> Result<Self> {
        toml::from_str(contents).context("Invalid config file")
    }

    /// Load config from an explicit path, or from `songdash.toml` in the
    /// working directory when no path is given.
    ///
    /// An explicit path must exist and parse. A missing default file means
    /// defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let (path, explicit) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => (default_config_path(), false),
        };

        if !explicit && !path.exists() {
            log::debug!("No config file found, using defaults");
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config '{}'", path.display()))?;
        let config = Self::from_toml(&contents)
            .with_context(|| format!("Failed to parse config '{}'", path.display()))?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }
}

pub fn default_config_path() -> PathBuf {
    PathBuf::from(format!("{}.toml", crate::APP_NAME))
}
