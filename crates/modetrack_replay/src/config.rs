use anyhow::{Context, Result};
use modetrack::{FilterMethod, TrackerConfig};
use serde::Deserialize;
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
	pub replay: ReplayConfig,
	#[serde(default)]
	pub tracker: TrackerConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReplayConfig {
	pub archive: PathBuf,
	#[serde(default = "default_method")]
	pub method: FilterMethod,
	/// JSON report destination; reports are only logged when unset.
	pub report: Option<PathBuf>,
}

const fn default_method() -> FilterMethod {
	FilterMethod::Bilateral
}

impl Config {
	pub fn load(path: &str) -> Result<Self> {
		let content = fs::read_to_string(path).with_context(|| format!("Failed to read config file: {path}"))?;

		let config: Self = toml::from_str(&content).with_context(|| "Failed to parse config file")?;

		config.validate()?;

		Ok(config)
	}

	fn validate(&self) -> Result<()> {
		if self.replay.archive.as_os_str().is_empty() {
			anyhow::bail!("replay.archive must point to a scan file");
		}

		self.tracker.validate().context("Invalid [tracker] section")
	}
}
