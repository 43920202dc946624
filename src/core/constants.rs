//! Core constants for the chart scheduling core.
//! Keeping them in a single place makes it easier to tweak engine-wide magic numbers.

/// Camera "changing" events are republished at most once per this interval.
pub const DEFAULT_THROTTLE_INTERVAL_MS: u64 = 100;

/// Half-size of the square queried around a tap, approximating a fingertip.
pub const TAP_TOLERANCE_PX: f64 = 22.0;

/// Levels of over/underzoom granted around each scale band's design range.
pub const ZOOM_VISIBILITY_BUFFER: f64 = 2.0;

/// Inclusive bounds for a loader tier's batch size.
pub const MIN_BATCH_SIZE: usize = 8;
pub const MAX_BATCH_SIZE: usize = 15;

/// Zoom range accepted from the map engine.
pub const MIN_ZOOM: f64 = 0.0;
pub const MAX_ZOOM: f64 = 24.0;

/// Priority given to classification codes missing from the priority table.
pub const UNKNOWN_CLASS_PRIORITY: u32 = 0;
