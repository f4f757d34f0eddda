use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// `0.0` means nothing was found.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct FrequencyResponse {
	pub frequency: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackgroundResponse {
	pub samples: usize,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
	pub lower: f64,
	pub upper: f64,
}

#[derive(Clone, Copy, Debug, Deserialize)]
pub struct BoundsCheckQuery {
	pub frequency: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoundsCheckResponse {
	pub frequency: f64,
	pub within: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StatusResponse {
	pub background_samples: Option<usize>,
	pub background_updated_at: Option<DateTime<Utc>>,
	pub bounds: Bounds,
	pub modes: usize,
}
