use std::sync::Arc;

use chrono::{DateTime, Utc};
use modetrack::{ModeTracker, Sample};
use tokio::sync::RwLock;
use tracing::info;

use crate::models::{Bounds, StatusResponse};

#[derive(Debug)]
struct Session {
	tracker: Arc<ModeTracker>,
	background_updated_at: Option<DateTime<Utc>>,
}

/// Shared tracker. Scans work on a snapshot; updates swap in a modified copy.
#[derive(Clone, Debug)]
pub struct AppState {
	session: Arc<RwLock<Session>>,
}

impl AppState {
	#[must_use]
	pub fn new(tracker: ModeTracker) -> Self {
		Self { session: Arc::new(RwLock::new(Session { tracker: Arc::new(tracker), background_updated_at: None })) }
	}

	pub async fn snapshot(&self) -> Arc<ModeTracker> {
		Arc::clone(&self.session.read().await.tracker)
	}

	pub async fn replace_background(&self, samples: &[Sample]) {
		let mut session = self.session.write().await;

		let mut next = ModeTracker::clone(&session.tracker);
		next.set_background(samples);

		session.tracker = Arc::new(next);
		session.background_updated_at = Some(Utc::now());
	}

	pub async fn set_bounds(&self, bounds: Bounds) -> Bounds {
		let mut session = self.session.write().await;

		let mut next = ModeTracker::clone(&session.tracker);
		next.set_bounds(bounds.lower, bounds.upper);
		session.tracker = Arc::new(next);

		info!(lower = bounds.lower, upper = bounds.upper, "Frequency bounds updated");

		bounds
	}

	pub async fn status(&self) -> StatusResponse {
		let session = self.session.read().await;
		let (lower, upper) = session.tracker.bounds();

		StatusResponse {
			background_samples: session.tracker.background().map(<[f64]>::len),
			background_updated_at: session.background_updated_at,
			bounds: Bounds { lower, upper },
			modes: session.tracker.matcher().mode_count(),
		}
	}
}
