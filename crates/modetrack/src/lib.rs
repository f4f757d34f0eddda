mod config;
mod detector;
mod filters;
mod kernel;
mod replay;
mod sample;
mod tracker;
mod trajectory;

pub use config::{DEFAULT_MAX_SEARCH_RADIUS, DEFAULT_SCAN_LENGTH, TrackerConfig, default_trajectories};
pub use detector::{MaximumSearch, PeakDetector};
pub use filters::{BilateralEdge, FilterMethod, bilateral_filter, gaussian_blur};
pub use kernel::{convolve, derivative, gaussian_kernel, normalize, std_dev};
pub use replay::{ScanReport, load_archive, replay};
pub use sample::{Sample, parse_samples, power_channel};
pub use tracker::ModeTracker;
pub use trajectory::{GapFill, IdentifiedPeaks, TrajectoryMatcher, TrajectoryModel};
