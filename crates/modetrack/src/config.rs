use anyhow::Result;
use serde::Deserialize;

use crate::filters::BilateralEdge;
use crate::trajectory::{GapFill, TrajectoryModel};

/// Farthest a candidate may sit from its nearest trajectory, in MHz.
pub const DEFAULT_MAX_SEARCH_RADIUS: f64 = 436.344;
/// Samples per scan in archived files.
pub const DEFAULT_SCAN_LENGTH: usize = 1604;

/// Calibrated trajectories of the four tracked modes.
#[must_use]
pub fn default_trajectories() -> Vec<TrajectoryModel> {
	vec![
		TrajectoryModel::new(0, 47.9998, -1041.54, 8950.56),
		TrajectoryModel::new(1, 44.2758, -1055.35, 9610.61),
		TrajectoryModel::new(2, 45.8298, -1139.8, 10626.7),
		TrajectoryModel::new(3, 37.697, -1038.49, 10780.2),
	]
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
	pub max_search_radius: f64,
	pub gap_fill: GapFill,
	pub bilateral_edge: BilateralEdge,
	/// `0.0` leaves the bound unset.
	pub lower_bound: f64,
	pub upper_bound: f64,
	pub scan_length: usize,
	pub trajectories: Vec<TrajectoryModel>,
}

impl Default for TrackerConfig {
	fn default() -> Self {
		Self {
			max_search_radius: DEFAULT_MAX_SEARCH_RADIUS,
			gap_fill: GapFill::default(),
			bilateral_edge: BilateralEdge::default(),
			lower_bound: 0.0,
			upper_bound: 0.0,
			scan_length: DEFAULT_SCAN_LENGTH,
			trajectories: default_trajectories(),
		}
	}
}

impl TrackerConfig {
	pub fn validate(&self) -> Result<()> {
		if self.max_search_radius.is_nan() || self.max_search_radius <= 0.0 {
			anyhow::bail!("tracker max_search_radius must be positive");
		}

		if self.scan_length == 0 {
			anyhow::bail!("tracker scan_length must be greater than 0");
		}

		if self.trajectories.is_empty() {
			anyhow::bail!("tracker.trajectories must contain at least one mode");
		}

		for (expected, model) in self.trajectories.iter().enumerate() {
			if model.mode != expected {
				anyhow::bail!(
					"tracker.trajectories must list modes 0..{} in order, found mode {} at position {expected}",
					self.trajectories.len(),
					model.mode
				);
			}
		}

		if self.lower_bound < 0.0 || self.upper_bound < 0.0 {
			anyhow::bail!("tracker bounds must be non-negative");
		}

		if self.lower_bound > 0.0 && self.upper_bound > 0.0 && self.lower_bound >= self.upper_bound {
			anyhow::bail!("tracker lower_bound must be below upper_bound");
		}

		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn empty_table_uses_calibrated_defaults() {
		let config: TrackerConfig = toml::from_str("").unwrap();

		assert!((config.max_search_radius - DEFAULT_MAX_SEARCH_RADIUS).abs() < f64::EPSILON);
		assert_eq!(config.scan_length, 1604);
		assert_eq!(config.gap_fill, GapFill::Interior);
		assert_eq!(config.bilateral_edge, BilateralEdge::ZeroPadded);
		assert_eq!(config.trajectories, default_trajectories());
		assert!(config.validate().is_ok());
	}

	#[test]
	fn parses_overrides() {
		let text = r#"
			max_search_radius = 100.0
			gap_fill = "all_modes"
			bilateral_edge = "truncated"
			lower_bound = 4000.0
			upper_bound = 5000.0

			[[trajectories]]
			mode = 0
			a = 1.0
			b = 2.0
			c = 3.0
		"#;

		let config: TrackerConfig = toml::from_str(text).unwrap();

		assert_eq!(config.gap_fill, GapFill::AllModes);
		assert_eq!(config.bilateral_edge, BilateralEdge::Truncated);
		assert_eq!(config.scan_length, DEFAULT_SCAN_LENGTH);
		assert_eq!(config.trajectories, vec![TrajectoryModel::new(0, 1.0, 2.0, 3.0)]);
		assert!(config.validate().is_ok());
	}

	#[test]
	fn rejects_gapped_mode_table() {
		let mut config = TrackerConfig::default();
		config.trajectories.remove(1);

		let err = config.validate().unwrap_err().to_string();
		assert!(err.contains("found mode 2"), "{err}");
	}

	#[test]
	fn rejects_invalid_values() {
		let config = TrackerConfig { max_search_radius: 0.0, ..TrackerConfig::default() };
		assert!(config.validate().is_err());

		let config = TrackerConfig { scan_length: 0, ..TrackerConfig::default() };
		assert!(config.validate().is_err());

		let config = TrackerConfig { lower_bound: 5000.0, upper_bound: 4000.0, ..TrackerConfig::default() };
		assert!(config.validate().is_err());

		let config = TrackerConfig { trajectories: Vec::new(), ..TrackerConfig::default() };
		assert!(config.validate().is_err());
	}

	#[test]
	fn single_bound_is_allowed() {
		let config = TrackerConfig { lower_bound: 4000.0, ..TrackerConfig::default() };
		assert!(config.validate().is_ok());
	}
}
