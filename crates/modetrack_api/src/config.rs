use anyhow::{Context, Result};
use modetrack::TrackerConfig;
use serde::Deserialize;
use std::fs;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
	pub server: ServerConfig,
	#[serde(default)]
	pub tracker: TrackerConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
	pub host: String,
	pub port: u16,
	/// Largest accepted scan body, in bytes.
	#[serde(default = "default_payload_limit")]
	pub payload_limit: usize,
	#[serde(default)]
	pub cors_origins: Vec<String>,
}

const fn default_payload_limit() -> usize {
	1024 * 1024
}

impl Config {
	pub fn load(path: &str) -> Result<Self> {
		let content = fs::read_to_string(path).with_context(|| format!("Failed to read config file: {path}"))?;

		let config = Self::parse(&content)?;
		config.validate()?;

		Ok(config)
	}

	fn parse(content: &str) -> Result<Self> {
		toml::from_str(content).with_context(|| "Failed to parse config file")
	}

	fn validate(&self) -> Result<()> {
		if self.server.host.trim().is_empty() {
			anyhow::bail!("server.host must not be empty");
		}

		if self.server.payload_limit == 0 {
			anyhow::bail!("server.payload_limit must be greater than 0");
		}

		self.tracker.validate().context("Invalid [tracker] section")
	}
}
