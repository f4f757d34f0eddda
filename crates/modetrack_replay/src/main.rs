use std::fs;

use anyhow::Context;
use modetrack::{ScanReport, load_archive, replay};
use tracing::{info, warn};

use crate::config::Config;

mod config;

#[derive(Debug, Default, PartialEq, Eq)]
struct Summary {
	scans: usize,
	with_peaks: usize,
	without_peaks: usize,
	with_maximum: usize,
}

fn summarize(reports: &[ScanReport]) -> Summary {
	reports.iter().fold(Summary::default(), |mut summary, report| {
		summary.scans += 1;
		if report.peaks.is_nothing_found() {
			summary.without_peaks += 1;
		} else {
			summary.with_peaks += 1;
		}
		if report.maximum > 0.0 {
			summary.with_maximum += 1;
		}
		summary
	})
}

fn main() -> anyhow::Result<()> {
	tracing_subscriber::fmt()
		.with_env_filter(
			tracing_subscriber::EnvFilter::try_from_default_env()
				.unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
		)
		.init();

	let config_path = std::env::args().nth(1).unwrap_or_else(|| String::from("config.toml"));
	let config = Config::load(&config_path).context("Failed to load configuration")?;
	info!(path = %config_path, "✅ Configuration loaded");

	let samples = load_archive(&config.replay.archive)?;

	let reports = replay(&config.tracker, &samples, config.replay.method)
		.with_context(|| format!("Failed to replay {}", config.replay.archive.display()))?;

	for report in &reports {
		if report.peaks.is_nothing_found() {
			warn!(scan = report.scan, length = report.cavity_length, "No mode identified");
			continue;
		}

		let modes: Vec<String> = report.peaks.iter().map(|(mode, frequency)| format!("{mode}={frequency:.3}")).collect();
		info!(
			scan = report.scan,
			length = report.cavity_length,
			modes = %modes.join(" "),
			maximum = report.maximum,
			"Scan identified"
		);
	}

	let summary = summarize(&reports);
	info!(
		scans = summary.scans,
		with_peaks = summary.with_peaks,
		without_peaks = summary.without_peaks,
		with_maximum = summary.with_maximum,
		"✅ Replay complete"
	);

	if let Some(path) = &config.replay.report {
		let json = serde_json::to_string_pretty(&reports).context("Failed to serialize replay report")?;
		fs::write(path, json).with_context(|| format!("Failed to write replay report: {}", path.display()))?;
		info!(path = %path.display(), "✅ Report written");
	}

	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;
	use modetrack::IdentifiedPeaks;

	#[test]
	fn summary_counts_found_and_missed_scans() {
		let missed = ScanReport { scan: 1, cavity_length: 7.0, peaks: IdentifiedPeaks::nothing_found(), maximum: 0.0 };
		let reports = vec![missed.clone(), ScanReport { scan: 2, maximum: 4100.0, ..missed }];

		let summary = summarize(&reports);

		assert_eq!(summary, Summary { scans: 2, with_peaks: 0, without_peaks: 2, with_maximum: 1 });
	}

	#[test]
	fn report_serializes_peaks_as_mode_map() {
		let report = ScanReport { scan: 3, cavity_length: 7.0, peaks: IdentifiedPeaks::nothing_found(), maximum: 0.0 };

		let json = serde_json::to_value(&report).unwrap();

		assert_eq!(json["scan"], 3);
		assert_eq!(json["peaks"]["0"], 0.0);
	}
}
