use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::metrics::PerformancePolicy;
use crate::visualization::rgb_buffer_len;

/// Load a JSON configuration from disk, creating it with the provided initializer if missing.
pub fn load_or_init<T, F>(path: &Path, initializer: F) -> Result<T>
where
    T: Serialize + DeserializeOwned,
    F: FnOnce() -> T,
{
    if path.exists() {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read config from {}", path.display()))?;
        let value = serde_json::from_str(&contents)
            .with_context(|| format!("failed to parse config from {}", path.display()))?;
        Ok(value)
    } else {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create directory {}", parent.display()))?;
        }
        let value = initializer();
        let serialized = serde_json::to_string_pretty(&value)?;
        fs::write(path, serialized)
            .with_context(|| format!("failed to write config to {}", path.display()))?;
        Ok(value)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlotterConfig {
    pub results_dir: PathBuf,
    pub plots_dir: PathBuf,
    pub width: u32,
    pub height: u32,
    pub performance: PerformancePolicy,
    pub write_report: bool,
}

impl Default for PlotterConfig {
    fn default() -> Self {
        Self {
            results_dir: PathBuf::from("results"),
            plots_dir: PathBuf::from("plots"),
            width: 640,
            height: 480,
            performance: PerformancePolicy::Averaged,
            write_report: true,
        }
    }
}

impl PlotterConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let config: Self = load_or_init(path, Self::default)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        rgb_buffer_len(self.width, self.height).context("invalid chart size in config")?;
        Ok(())
    }
}
