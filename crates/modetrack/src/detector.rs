use rayon::prelude::*;
use tracing::debug;

use crate::filters::{BilateralEdge, FilterMethod, bilateral_filter, gaussian_blur};
use crate::kernel::{derivative, std_dev};

/// Spatial sigma of the bilateral pre-filter, in samples.
pub const BILATERAL_SIGMA_S: f64 = 10.0;
/// Intensity sigma of the bilateral pre-filter, in power units.
pub const BILATERAL_SIGMA_R: f64 = 2.0;
/// Derivative threshold of [`PeakDetector::find_peaks`], in standard deviations.
pub const PEAK_THRESHOLD_SIGMAS: f64 = 3.0;
/// Candidates closer than this to either end of the scan are edge artifacts.
pub const EDGE_MARGIN: usize = 4;
/// Margin used by [`PeakDetector::find_global_maximum`].
pub const MAXIMUM_EDGE_MARGIN: usize = 5;

/// Outcome of a global maximum search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaximumSearch {
	Found(usize),
	NotFound,
}

impl MaximumSearch {
	#[must_use]
	pub const fn index(self) -> Option<usize> {
		match self {
			Self::Found(index) => Some(index),
			Self::NotFound => None,
		}
	}
}

/// Turns one scan's power channel into candidate peak positions.
#[derive(Debug, Clone, Default)]
pub struct PeakDetector {
	bilateral_edge: BilateralEdge,
}

impl PeakDetector {
	#[must_use]
	pub const fn new(bilateral_edge: BilateralEdge) -> Self {
		Self { bilateral_edge }
	}

	pub fn filter(&self, power: &[f64], method: FilterMethod) -> Vec<f64> {
		match method {
			FilterMethod::Gauss => gaussian_blur(power),
			FilterMethod::Bilateral => {
				bilateral_filter(power, BILATERAL_SIGMA_S, BILATERAL_SIGMA_R, self.bilateral_edge)
			},
		}
	}

	/// Finds upward crossings of `3 sigma` in the derivative of the filtered power.
	///
	/// A resonance shows up as a dip, so the rising flank after its minimum is what
	/// crosses the threshold. Candidates are returned in ascending index order.
	///
	/// The Gaussian kernel is cut off at two sigma, so its edges act as small steps:
	/// a lone impulse yields a second candidate half a kernel later, and the two flanks
	/// of a wide plateau are smoothed below the threshold.
	pub fn find_peaks(&self, power: &[f64], method: FilterMethod) -> Vec<usize> {
		let filtered = self.filter(power, method);
		let f_prime = derivative(&filtered);

		if f_prime.len() < 2 {
			return Vec::new();
		}

		let threshold = PEAK_THRESHOLD_SIGMAS * std_dev(&f_prime);
		let len = filtered.len();

		let crossings: Vec<bool> = (0..f_prime.len() - 1)
			.into_par_iter()
			.map(|i| f_prime[i] < threshold && threshold <= f_prime[i + 1] && within_margin(i + 1, len, EDGE_MARGIN))
			.collect();

		let peaks: Vec<usize> =
			crossings.iter().enumerate().filter_map(|(i, &crossed)| crossed.then_some(i + 1)).collect();

		debug!(method = ?method, threshold, candidates = peaks.len(), "Derivative threshold scan complete");

		peaks
	}

	/// Finds the strongest local maximum of a transmission-style scan.
	///
	/// Local maxima are downward zero crossings of the derivative of the blurred power.
	/// When several qualify, the one with the highest raw power wins; ties keep the first.
	pub fn find_global_maximum(&self, power: &[f64]) -> MaximumSearch {
		let blurred = gaussian_blur(power);
		let f_prime = derivative(&blurred);

		if f_prime.len() < 2 {
			return MaximumSearch::NotFound;
		}

		let mut best: Option<(usize, f64)> = None;

		for i in 0..f_prime.len() - 1 {
			if !(f_prime[i] > 0.0 && 0.0 >= f_prime[i + 1]) {
				continue;
			}

			if !within_margin(i + 1, power.len(), MAXIMUM_EDGE_MARGIN) {
				continue;
			}

			let found_power = power[i];
			debug!(index = i, power = found_power, "Local maximum found");

			match best {
				Some((_, best_power)) if found_power <= best_power => {},
				_ => best = Some((i, found_power)),
			}
		}

		best.map_or(MaximumSearch::NotFound, |(index, _)| MaximumSearch::Found(index))
	}
}

const fn within_margin(index: usize, len: usize, margin: usize) -> bool {
	index > margin && index + margin < len
}

#[cfg(test)]
mod tests {
	use super::*;

	fn plateau(len: usize, start: usize, end: usize, height: f64) -> Vec<f64> {
		(0..len).map(|i| if (start..end).contains(&i) { height } else { 0.0 }).collect()
	}

	#[test]
	fn finds_single_sharp_edge() {
		let detector = PeakDetector::default();
		let power = plateau(200, 50, 150, 20.0);

		let peaks = detector.find_peaks(&power, FilterMethod::Bilateral);

		assert_eq!(peaks.len(), 1);
		assert!(peaks[0].abs_diff(50) <= 2, "peak at {}", peaks[0]);
	}

	#[test]
	fn discards_edges_near_boundaries() {
		let detector = PeakDetector::default();

		let near_start = plateau(200, 2, 100, 20.0);
		assert!(detector.find_peaks(&near_start, FilterMethod::Bilateral).is_empty());

		let near_end = plateau(200, 197, 200, 20.0);
		let peaks = detector.find_peaks(&near_end, FilterMethod::Bilateral);
		assert!(peaks.iter().all(|&p| p > EDGE_MARGIN && p + EDGE_MARGIN < 200), "{peaks:?}");
	}

	#[test]
	fn finds_rising_flank_of_gaussian_dip() {
		let detector = PeakDetector::default();
		let power: Vec<f64> = (0..1604).map(|i| -(-((i as f64 - 800.0) / 5.0).powi(2) / 2.0).exp()).collect();

		let peaks = detector.find_peaks(&power, FilterMethod::Gauss);

		assert_eq!(peaks.len(), 1);
		// Blur lag of 15 samples plus a couple of samples up the flank.
		assert!((812..=825).contains(&peaks[0]), "peak at {}", peaks[0]);
	}

	#[test]
	fn impulse_and_plateau_depend_on_filter() {
		let detector = PeakDetector::default();
		let mut impulse = vec![0.0; 200];
		impulse[50] = 1.0;
		let step = plateau(200, 50, 150, 20.0);

		assert_eq!(detector.find_peaks(&impulse, FilterMethod::Bilateral), vec![49]);
		assert_eq!(detector.find_peaks(&impulse, FilterMethod::Gauss), vec![50, 57]);
		assert!(detector.find_peaks(&step, FilterMethod::Gauss).is_empty());
	}

	#[test]
	fn flat_or_empty_scans_have_no_peaks() {
		let detector = PeakDetector::default();

		assert!(detector.find_peaks(&[], FilterMethod::Gauss).is_empty());
		assert!(detector.find_peaks(&[1.0], FilterMethod::Bilateral).is_empty());
		assert!(detector.find_peaks(&vec![0.0; 300], FilterMethod::Gauss).is_empty());
	}

	#[test]
	fn candidates_are_ascending() {
		let detector = PeakDetector::default();
		let mut power = plateau(400, 60, 120, 20.0);
		for value in &mut power[250..320] {
			*value = 20.0;
		}

		let peaks = detector.find_peaks(&power, FilterMethod::Bilateral);

		assert_eq!(peaks.len(), 2);
		assert!(peaks[0] < peaks[1]);
	}

	#[test]
	fn global_maximum_follows_blurred_peak() {
		let detector = PeakDetector::default();
		let power: Vec<f64> = (0..400).map(|i| 3.0 * (-((i as f64 - 150.0) / 20.0).powi(2) / 2.0).exp()).collect();

		let found = detector.find_global_maximum(&power);

		let index = found.index().unwrap();
		assert!((160..=170).contains(&index), "maximum at {index}");
	}

	#[test]
	fn global_maximum_prefers_highest_raw_power() {
		let detector = PeakDetector::default();
		let bump = |center: f64, height: f64, i: usize| height * (-((i as f64 - center) / 15.0).powi(2) / 2.0).exp();
		let power: Vec<f64> = (0..600).map(|i| bump(150.0, 1.0, i) + bump(400.0, 4.0, i)).collect();

		let index = detector.find_global_maximum(&power).index().unwrap();

		assert!(index > 380, "maximum at {index}");
	}

	#[test]
	fn global_maximum_not_found_on_flat_scan() {
		let detector = PeakDetector::default();

		assert_eq!(detector.find_global_maximum(&vec![0.0; 200]), MaximumSearch::NotFound);
		assert_eq!(detector.find_global_maximum(&[]), MaximumSearch::NotFound);
	}
}
