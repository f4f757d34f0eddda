use rayon::prelude::*;

/// Zero-mean Gaussian scaled by `1 / (sqrt(pi/2) * sigma)`.
///
/// Every caller either normalizes afterwards or divides by an accumulated weight,
/// so the scale factor never reaches a result.
pub fn gaussian(x: f64, sigma: f64) -> f64 {
	(-0.5 * (x / sigma).powi(2)).exp() / (std::f64::consts::FRAC_PI_2.sqrt() * sigma)
}

/// Discrete convolution `out[m] = sum_j signal[m - j] * kernel[j]` evaluated at every
/// original position of `signal`.
///
/// The signal is zero-padded by `kernel.len()` on both sides, so the output keeps the
/// input length and lags a symmetric kernel by half its width. Detector positions are
/// calibrated against that lag.
pub fn convolve(signal: &[f64], kernel: &[f64]) -> Vec<f64> {
	let k = kernel.len();
	let n = signal.len();

	let mut padded = vec![0.0; n + 2 * k];
	padded[k..k + n].copy_from_slice(signal);

	(0..n)
		.into_par_iter()
		.map(|m| kernel.iter().enumerate().map(|(j, weight)| padded[m + k - j] * weight).sum())
		.collect()
}

/// Gaussian kernel of radius `r` (length `2r + 1`, sigma `r / 2`), L2-normalized.
pub fn gaussian_kernel(r: usize) -> Vec<f64> {
	let sigma = r as f64 / 2.0;
	let radius = r as i64;

	let values: Vec<f64> = (-radius..=radius).map(|x| gaussian(x as f64, sigma)).collect();

	normalize(&values)
}

/// Scales `values` to unit L2 norm. A zero vector is returned unchanged.
pub fn normalize(values: &[f64]) -> Vec<f64> {
	let norm = values.iter().map(|v| v * v).sum::<f64>().sqrt();
	if norm == 0.0 {
		return values.to_vec();
	}

	values.iter().map(|v| v / norm).collect()
}

/// Sample standard deviation with Bessel's correction.
///
/// Returns `0.0` for fewer than two values.
pub fn std_dev(values: &[f64]) -> f64 {
	if values.len() < 2 {
		return 0.0;
	}

	let n = values.len() as f64;
	let mean = values.iter().sum::<f64>() / n;
	let sum_sq: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();

	(sum_sq / (n - 1.0)).max(0.0).sqrt()
}

/// Fourth-order central difference `(-f[n+2] + 8f[n+1] - 8f[n-1] + f[n-2]) / 12`.
///
/// The signal is zero-padded by two samples on each side; output index `i` is the
/// derivative at input index `i`.
pub fn derivative(signal: &[f64]) -> Vec<f64> {
	let n = signal.len();

	let mut padded = vec![0.0; n + 4];
	padded[2..2 + n].copy_from_slice(signal);

	(0..n)
		.into_par_iter()
		.map(|i| (-padded[i + 4] + 8.0 * padded[i + 3] - 8.0 * padded[i + 1] + padded[i]) / 12.0)
		.collect()
}
