use serde::{Deserialize, Serialize};
use tracing::warn;

/// One acquisition point of a scan.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct Sample {
	/// MHz
	pub frequency: f64,
	pub cavity_length: f64,
	pub power: f64,
}

/// Parses `frequency,length,power[,...]` records, one per line.
///
/// `#` starts a comment. Blank lines and lines with fewer than three fields are
/// skipped; rows with a non-numeric field are dropped with a warning.
pub fn parse_samples(text: &str) -> Vec<Sample> {
	let mut samples = Vec::new();

	for (line_no, raw) in text.lines().enumerate() {
		let line = raw.split_once('#').map_or(raw, |(data, _)| data).trim();
		if line.is_empty() {
			continue;
		}

		let fields: Vec<&str> = line.split(',').map(str::trim).collect();
		if fields.len() < 3 {
			continue;
		}

		match (fields[0].parse::<f64>(), fields[1].parse::<f64>(), fields[2].parse::<f64>()) {
			(Ok(frequency), Ok(cavity_length), Ok(power)) => {
				samples.push(Sample { frequency, cavity_length, power });
			},
			_ => {
				warn!(line = line_no + 1, record = line, "Dropping malformed sample row");
			},
		}
	}

	samples
}

/// Power values of `samples` in acquisition order.
pub fn power_channel(samples: &[Sample]) -> Vec<f64> {
	samples.iter().map(|sample| sample.power).collect()
}
