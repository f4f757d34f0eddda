use rayon::prelude::*;
use serde::Deserialize;

use crate::kernel::{convolve, gaussian, gaussian_kernel};

/// Radius of the Gaussian smoothing kernel (sigma = radius / 2).
pub const GAUSS_BLUR_RADIUS: usize = 15;

/// Denoising stage applied before edge detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterMethod {
	Gauss,
	Bilateral,
}

/// How the bilateral filter treats neighbors that fall outside the signal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BilateralEdge {
	/// Out-of-range neighbors read as `0.0`: they add weight
	/// `gaussian(|p - q|) * gaussian(signal[p])` but no value, pulling edge samples toward zero.
	#[default]
	ZeroPadded,
	/// Out-of-range neighbors are skipped.
	Truncated,
}

/// Low-pass smoothing with a fixed-radius Gaussian kernel.
pub fn gaussian_blur(signal: &[f64]) -> Vec<f64> {
	convolve(signal, &gaussian_kernel(GAUSS_BLUR_RADIUS))
}

/// Edge-preserving smoothing (Tomasi & Manduchi, 1998).
///
/// Each neighbor `q` within `ceil(2.5 * sigma_s)` of `p` is weighted by spatial distance
/// and by intensity difference `signal[p] - signal[q]`.
pub fn bilateral_filter(signal: &[f64], sigma_s: f64, sigma_r: f64, edge: BilateralEdge) -> Vec<f64> {
	let n = signal.len() as i64;
	let radius = (2.5 * sigma_s).ceil() as i64;

	(0..n)
		.into_par_iter()
		.map(|p| {
			let center = signal[p as usize];
			let mut weighted_sum = 0.0;
			let mut norm_weight = 0.0;

			for q in (p - radius)..=(p + radius) {
				let neighbor = if (0..n).contains(&q) {
					signal[q as usize]
				} else {
					match edge {
						BilateralEdge::ZeroPadded => 0.0,
						BilateralEdge::Truncated => continue,
					}
				};

				let weight = gaussian((p - q).abs() as f64, sigma_s) * gaussian(center - neighbor, sigma_r);
				norm_weight += weight;
				weighted_sum += weight * neighbor;
			}

			if norm_weight > 0.0 { weighted_sum / norm_weight } else { center }
		})
		.collect()
}
