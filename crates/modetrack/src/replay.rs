use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use rayon::prelude::*;
use serde::Serialize;
use tracing::{info, warn};

use crate::config::TrackerConfig;
use crate::filters::FilterMethod;
use crate::sample::{Sample, parse_samples, power_channel};
use crate::tracker::ModeTracker;
use crate::trajectory::IdentifiedPeaks;

/// Result of one archived scan.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScanReport {
	/// 1-based; scan 0 is the background.
	pub scan: usize,
	pub cavity_length: f64,
	pub peaks: IdentifiedPeaks,
	/// Strongest local maximum of the raw power, `0.0` when none.
	pub maximum: f64,
}

pub fn load_archive(path: &Path) -> Result<Vec<Sample>> {
	let text = fs::read_to_string(path).with_context(|| format!("Failed to read scan archive: {}", path.display()))?;

	let samples = parse_samples(&text);
	info!(path = %path.display(), samples = samples.len(), "Scan archive loaded");

	Ok(samples)
}

/// Runs every scan of an archive through a fresh tracker.
///
/// The archive is cut into blocks of `config.scan_length` samples. The first block
/// becomes the background and the rest are processed in parallel; reports come back
/// in archive order.
pub fn replay(config: &TrackerConfig, samples: &[Sample], method: FilterMethod) -> Result<Vec<ScanReport>> {
	let scan_length = config.scan_length;
	if scan_length == 0 {
		anyhow::bail!("scan_length must be greater than 0");
	}

	let mut blocks = samples.chunks_exact(scan_length);
	let leftover = blocks.remainder().len();
	if leftover > 0 {
		warn!(leftover, scan_length, "Ignoring trailing partial scan");
	}

	let Some(background) = blocks.next() else {
		anyhow::bail!("Archive holds no full scan of {scan_length} samples");
	};

	let scans: Vec<&[Sample]> = blocks.collect();
	if scans.is_empty() {
		anyhow::bail!("Archive holds only a background scan; at least two scans of {scan_length} samples are needed");
	}

	let mut tracker = ModeTracker::new(config);
	tracker.set_background(background);

	info!(scans = scans.len(), method = ?method, "Replaying archived scans");

	let reports = scans
		.into_par_iter()
		.enumerate()
		.map(|(i, scan)| {
			let power = power_channel(scan);
			ScanReport {
				scan: i + 1,
				cavity_length: scan.first().map_or(0.0, |sample| sample.cavity_length),
				peaks: tracker.identify_modes(&power, scan, method),
				maximum: tracker.track_maximum(&power, scan),
			}
		})
		.collect();

	Ok(reports)
}
