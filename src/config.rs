// SPDX-License-Identifier: GPL-3.0-only

//! Engine configuration
//!
//! Read from an optional JSON file. Every field has a default, so a partial
//! file (or no file at all) is valid.

use crate::constants::{DEFAULT_LOG_FILTER, DEFAULT_PREVIEW_SIZE};
use crate::errors::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::warn;

/// Which implementation renders the compute and legacy paths
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum RenderDevice {
    /// wgpu compute pipelines
    #[default]
    Gpu,
    /// Deterministic CPU reference kernels
    Cpu,
}

/// Adapter selection hint
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum PowerPreference {
    #[default]
    HighPerformance,
    LowPower,
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Config {
    /// Catalog file; the embedded catalog is used when unset
    pub catalog_path: Option<PathBuf>,
    pub render_device: RenderDevice,
    pub power_preference: PowerPreference,
    /// Longest side of preview thumbnails in pixels
    pub preview_size: u32,
    /// tracing filter directive used when RUST_LOG is unset
    pub log_filter: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            catalog_path: None,
            render_device: RenderDevice::default(),
            power_preference: PowerPreference::default(),
            preview_size: DEFAULT_PREVIEW_SIZE,
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

impl Config {
    /// Read a config file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Read a config file if given, defaulting on absence or error
    pub fn load_or_default(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            return Self::default();
        };

        Self::load(path).unwrap_or_else(|e| {
            warn!(error = %e, "Failed to load config, using defaults");
            Self::default()
        })
    }
}
