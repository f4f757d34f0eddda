use tracing::{debug, info};

use crate::config::TrackerConfig;
use crate::detector::{MaximumSearch, PeakDetector};
use crate::filters::FilterMethod;
use crate::sample::{Sample, parse_samples, power_channel};
use crate::trajectory::{IdentifiedPeaks, TrajectoryMatcher};

/// Per-session tracking state: background, frequency bounds and mode trajectories.
///
/// Scan operations take `&self` and allocate their own buffers, so one tracker can
/// serve concurrent scans.
#[derive(Debug, Clone)]
pub struct ModeTracker {
	background: Option<Vec<f64>>,
	lower_bound: f64,
	upper_bound: f64,
	detector: PeakDetector,
	matcher: TrajectoryMatcher,
}

impl Default for ModeTracker {
	fn default() -> Self {
		Self::new(&TrackerConfig::default())
	}
}

impl ModeTracker {
	#[must_use]
	pub fn new(config: &TrackerConfig) -> Self {
		Self {
			background: None,
			lower_bound: config.lower_bound,
			upper_bound: config.upper_bound,
			detector: PeakDetector::new(config.bilateral_edge),
			matcher: TrajectoryMatcher::new(config.trajectories.clone(), config.max_search_radius, config.gap_fill),
		}
	}

	#[must_use]
	pub fn background(&self) -> Option<&[f64]> {
		self.background.as_deref()
	}

	#[must_use]
	pub const fn bounds(&self) -> (f64, f64) {
		(self.lower_bound, self.upper_bound)
	}

	#[must_use]
	pub fn matcher(&self) -> &TrajectoryMatcher {
		&self.matcher
	}

	/// Replaces the background with the power channel of `samples`.
	pub fn set_background(&mut self, samples: &[Sample]) {
		info!(samples = samples.len(), "Background updated");
		self.background = Some(power_channel(samples));
	}

	pub const fn set_lower_bound(&mut self, lower: f64) {
		self.lower_bound = lower;
	}

	pub const fn set_upper_bound(&mut self, upper: f64) {
		self.upper_bound = upper;
	}

	pub const fn set_bounds(&mut self, lower: f64, upper: f64) {
		self.lower_bound = lower;
		self.upper_bound = upper;
	}

	/// True when either bound is unset (`0.0`) or `lower < frequency < upper`.
	#[must_use]
	pub fn within_bounds(&self, frequency: f64) -> bool {
		if self.lower_bound == 0.0 || self.upper_bound == 0.0 {
			return true;
		}

		self.lower_bound < frequency && frequency < self.upper_bound
	}

	/// Resizes `power` to the background length and subtracts the background.
	///
	/// Without a background the power channel is returned unchanged.
	#[must_use]
	pub fn subtract_background(&self, power: &[f64]) -> Vec<f64> {
		let Some(background) = &self.background else {
			return power.to_vec();
		};

		if power.len() != background.len() {
			debug!(scan = power.len(), background = background.len(), "Resizing scan to background length");
		}

		let mut corrected = power.to_vec();
		corrected.resize(background.len(), 0.0);
		for (value, base) in corrected.iter_mut().zip(background) {
			*value -= base;
		}

		corrected
	}

	/// Full mode-to-frequency mapping for one scan.
	pub fn identify_modes(&self, power: &[f64], samples: &[Sample], method: FilterMethod) -> IdentifiedPeaks {
		let corrected = self.subtract_background(power);
		let candidates = self.detector.find_peaks(&corrected, method);
		let peaks = self.matcher.assign(&candidates, samples);

		info!(
			method = ?method,
			samples = samples.len(),
			candidates = candidates.len(),
			modes = peaks.len(),
			found = !peaks.is_nothing_found(),
			"Scan processed"
		);

		peaks
	}

	/// Frequency of `mode` in this scan, or `0.0` when it was not identified.
	pub fn track_one_mode(&self, power: &[f64], samples: &[Sample], mode: usize, method: FilterMethod) -> f64 {
		self.identify_modes(power, samples, method).frequency(mode).unwrap_or(0.0)
	}

	/// Frequency of the strongest local maximum of the raw power, or `0.0`.
	pub fn track_maximum(&self, power: &[f64], samples: &[Sample]) -> f64 {
		match self.detector.find_global_maximum(power) {
			MaximumSearch::Found(index) if index > 0 => {
				samples.get(index).map_or(0.0, |sample| sample.frequency)
			},
			_ => 0.0,
		}
	}

	/// Parses `text` and replaces the background; returns the number of samples kept.
	pub fn set_background_text(&mut self, text: &str) -> usize {
		let samples = parse_samples(text);
		self.set_background(&samples);
		samples.len()
	}

	pub fn peak_gauss(&self, text: &str, mode: usize) -> f64 {
		self.track_text(text, mode, FilterMethod::Gauss)
	}

	pub fn peak_bilateral(&self, text: &str, mode: usize) -> f64 {
		self.track_text(text, mode, FilterMethod::Bilateral)
	}

	pub fn max_peak(&self, text: &str) -> f64 {
		let samples = parse_samples(text);
		self.track_maximum(&power_channel(&samples), &samples)
	}

	fn track_text(&self, text: &str, mode: usize, method: FilterMethod) -> f64 {
		let samples = parse_samples(text);
		self.track_one_mode(&power_channel(&samples), &samples, mode, method)
	}
}
