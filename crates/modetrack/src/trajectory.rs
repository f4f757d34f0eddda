use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::sample::Sample;

/// Quadratic estimate of one mode's frequency (MHz) as a function of cavity length.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct TrajectoryModel {
	pub mode: usize,
	pub a: f64,
	pub b: f64,
	pub c: f64,
}

impl TrajectoryModel {
	#[must_use]
	pub const fn new(mode: usize, a: f64, b: f64, c: f64) -> Self {
		Self { mode, a, b, c }
	}

	#[must_use]
	pub fn estimate(&self, cavity_length: f64) -> f64 {
		self.a.mul_add(cavity_length.powi(2), self.b.mul_add(cavity_length, self.c))
	}
}

/// Which unmatched modes get a trajectory estimate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GapFill {
	/// Only modes between the lowest and highest matched mode.
	#[default]
	Interior,
	/// Every known mode.
	AllModes,
}

/// Mode index to frequency (MHz) for one scan.
///
/// `{0: 0.0}` is the "nothing found" sentinel.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct IdentifiedPeaks {
	peaks: BTreeMap<usize, f64>,
}

impl IdentifiedPeaks {
	#[must_use]
	pub fn nothing_found() -> Self {
		Self { peaks: BTreeMap::from([(0, 0.0)]) }
	}

	#[must_use]
	pub fn is_nothing_found(&self) -> bool {
		self.peaks.len() == 1 && self.peaks.get(&0) == Some(&0.0)
	}

	#[must_use]
	pub fn frequency(&self, mode: usize) -> Option<f64> {
		self.peaks.get(&mode).copied()
	}

	pub fn iter(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
		self.peaks.iter().map(|(&mode, &frequency)| (mode, frequency))
	}

	#[must_use]
	pub fn len(&self) -> usize {
		self.peaks.len()
	}

	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.peaks.is_empty()
	}
}

#[derive(Debug, Clone, Copy)]
struct FoundPeak {
	distance: f64,
	frequency: f64,
}

/// Assigns candidate peaks to the nearest mode trajectory.
#[derive(Debug, Clone)]
pub struct TrajectoryMatcher {
	models: Vec<TrajectoryModel>,
	max_search_radius: f64,
	gap_fill: GapFill,
}

impl TrajectoryMatcher {
	/// Models are looked up by their `mode` field, whatever order they come in.
	#[must_use]
	pub fn new(mut models: Vec<TrajectoryModel>, max_search_radius: f64, gap_fill: GapFill) -> Self {
		models.sort_by_key(|model| model.mode);
		Self { models, max_search_radius, gap_fill }
	}

	#[must_use]
	pub fn mode_count(&self) -> usize {
		self.models.len()
	}

	#[must_use]
	pub fn estimate(&self, mode: usize, cavity_length: f64) -> Option<f64> {
		self.models.iter().find(|model| model.mode == mode).map(|model| model.estimate(cavity_length))
	}

	/// Nearest mode and its distance; the lowest mode wins a tie.
	fn nearest_mode(&self, frequency: f64, cavity_length: f64) -> Option<(usize, f64)> {
		self.models.iter().fold(None, |best, model| {
			let distance = (frequency - model.estimate(cavity_length)).abs();
			match best {
				Some((_, best_distance)) if best_distance <= distance => best,
				_ => Some((model.mode, distance)),
			}
		})
	}

	pub fn assign(&self, candidates: &[usize], samples: &[Sample]) -> IdentifiedPeaks {
		let mut found: BTreeMap<usize, FoundPeak> = BTreeMap::new();

		for &index in candidates {
			let Some(sample) = samples.get(index) else {
				warn!(index, samples = samples.len(), "Candidate peak outside the sample range");
				continue;
			};

			let Some((mode, distance)) = self.nearest_mode(sample.frequency, sample.cavity_length) else {
				continue;
			};

			debug!(index, mode, distance, frequency = sample.frequency, "Nearest trajectory");

			if distance >= self.max_search_radius {
				debug!(index, distance, radius = self.max_search_radius, "Candidate too far from any trajectory");
				continue;
			}

			let candidate = FoundPeak { distance, frequency: sample.frequency };
			match found.get(&mode) {
				Some(existing) if existing.distance <= distance => {},
				_ => {
					found.insert(mode, candidate);
				},
			}
		}

		let (Some(&lowest), Some(&highest)) = (found.keys().next(), found.keys().next_back()) else {
			return IdentifiedPeaks::nothing_found();
		};

		let cavity_length = samples.first().map_or(0.0, |sample| sample.cavity_length);

		let modes: Vec<usize> = match self.gap_fill {
			GapFill::Interior => (lowest..=highest).collect(),
			GapFill::AllModes => self.models.iter().map(|model| model.mode).collect(),
		};

		let mut peaks = BTreeMap::new();
		for mode in modes {
			if let Some(peak) = found.get(&mode) {
				peaks.insert(mode, peak.frequency);
			} else if let Some(estimate) = self.estimate(mode, cavity_length) {
				debug!(mode, estimate, "Filling missed mode from trajectory");
				peaks.insert(mode, estimate);
			}
		}

		IdentifiedPeaks { peaks }
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::config::{DEFAULT_MAX_SEARCH_RADIUS, default_trajectories};

	const LENGTH: f64 = 7.0;

	fn matcher(gap_fill: GapFill) -> TrajectoryMatcher {
		TrajectoryMatcher::new(default_trajectories(), DEFAULT_MAX_SEARCH_RADIUS, gap_fill)
	}

	fn scan_with(frequencies: &[f64]) -> Vec<Sample> {
		frequencies.iter().map(|&frequency| Sample { frequency, cavity_length: LENGTH, power: 0.0 }).collect()
	}

	#[test]
	fn estimate_evaluates_quadratic() {
		let model = TrajectoryModel::new(0, 2.0, -3.0, 5.0);
		assert!((model.estimate(4.0) - 25.0).abs() < 1e-12);

		let matcher = matcher(GapFill::Interior);
		assert!(matcher.estimate(4, LENGTH).is_none());
		assert!((matcher.estimate(1, LENGTH).unwrap() - 4392.6742).abs() < 1e-3);
	}

	#[test]
	fn candidate_on_mode_two_fills_all_gaps() {
		let matcher = matcher(GapFill::AllModes);
		let on_curve = matcher.estimate(2, LENGTH).unwrap();
		let samples = scan_with(&[0.0, on_curve, 0.0]);

		let peaks = matcher.assign(&[1], &samples);

		assert_eq!(peaks.len(), 4);
		assert_eq!(peaks.frequency(2), Some(on_curve));
		for mode in [0, 1, 3] {
			assert_eq!(peaks.frequency(mode), matcher.estimate(mode, LENGTH));
		}
	}

	#[test]
	fn interior_fill_only_spans_matched_range() {
		let matcher = matcher(GapFill::Interior);
		let on_two = matcher.estimate(2, LENGTH).unwrap();
		let samples = scan_with(&[on_two]);

		let peaks = matcher.assign(&[0], &samples);
		assert_eq!(peaks.iter().collect::<Vec<_>>(), vec![(2, on_two)]);

		let on_zero = matcher.estimate(0, LENGTH).unwrap() + 1.0;
		let on_three = matcher.estimate(3, LENGTH).unwrap() - 2.0;
		let samples = scan_with(&[on_zero, on_three]);

		let peaks = matcher.assign(&[0, 1], &samples);
		assert_eq!(peaks.len(), 4);
		assert_eq!(peaks.frequency(0), Some(on_zero));
		assert_eq!(peaks.frequency(1), matcher.estimate(1, LENGTH));
		assert_eq!(peaks.frequency(2), matcher.estimate(2, LENGTH));
		assert_eq!(peaks.frequency(3), Some(on_three));
	}

	#[test]
	fn rejects_candidate_outside_search_radius() {
		let matcher = matcher(GapFill::AllModes);
		let far = matcher.estimate(0, LENGTH).unwrap() - (DEFAULT_MAX_SEARCH_RADIUS + 1.0);
		let samples = scan_with(&[far]);

		let peaks = matcher.assign(&[0], &samples);

		assert!(peaks.is_nothing_found());
		assert_eq!(peaks.frequency(0), Some(0.0));
	}

	#[test]
	fn duplicate_mode_keeps_closest_candidate() {
		let matcher = matcher(GapFill::Interior);
		let estimate = matcher.estimate(1, LENGTH).unwrap();
		let samples = scan_with(&[estimate + 5.0, estimate - 1.0, estimate + 3.0]);

		let peaks = matcher.assign(&[0, 1, 2], &samples);

		assert_eq!(peaks.iter().collect::<Vec<_>>(), vec![(1, estimate - 1.0)]);
	}

	#[test]
	fn duplicate_mode_tie_keeps_first_found() {
		let matcher = TrajectoryMatcher::new(vec![TrajectoryModel::new(0, 0.0, 0.0, 100.0)], 10.0, GapFill::Interior);
		let samples = scan_with(&[102.0, 98.0]);

		let peaks = matcher.assign(&[0, 1], &samples);

		assert_eq!(peaks.frequency(0), Some(102.0));
	}

	#[test]
	fn models_are_keyed_by_mode_not_position() {
		let mut models = default_trajectories();
		models.reverse();
		let reversed = TrajectoryMatcher::new(models, DEFAULT_MAX_SEARCH_RADIUS, GapFill::AllModes);
		let reference = matcher(GapFill::AllModes);

		for mode in 0..4 {
			assert_eq!(reversed.estimate(mode, LENGTH), reference.estimate(mode, LENGTH));
		}

		let on_zero = reference.estimate(0, LENGTH).unwrap() + 1.0;
		let peaks = reversed.assign(&[0], &scan_with(&[on_zero]));

		assert_eq!(peaks.frequency(0), Some(on_zero));
		assert_eq!(peaks.frequency(3), reference.estimate(3, LENGTH));
		assert_eq!(peaks, reference.assign(&[0], &scan_with(&[on_zero])));
	}

	#[test]
	fn out_of_range_candidates_are_skipped() {
		let matcher = matcher(GapFill::Interior);
		let samples = scan_with(&[matcher.estimate(3, LENGTH).unwrap()]);

		assert!(matcher.assign(&[5], &samples).is_nothing_found());
		assert!(matcher.assign(&[], &[]).is_nothing_found());
	}
}
