//! # Chartlet
//!
//! Scheduling core for an interactive nautical chart viewer.
//!
//! The crate coordinates the asynchronous, rate-limited work a chart screen
//! performs against a live map engine: progressive admission of chart packs
//! into the render set, throttling of camera updates, and disambiguation of
//! the nautical objects under a tap. Rendering and tile parsing stay with the
//! map engine; this crate only talks to it through the traits in
//! [`traits`].

pub mod charts;
pub mod core;
pub mod input;
pub mod logging;
pub mod prelude;
pub mod runtime;
pub mod spatial;
pub mod traits;
pub use crate::core::constants;

// Re-export public API
pub use crate::core::{
    camera::CameraState,
    config::{ChartViewOptions, ChartViewProfile},
    geo::{LatLng, Point, ScreenRect},
};

pub use charts::{
    loader::{ChartLoader, LoadProgress, LoaderUpdate},
    pack::{ChartPackRef, ScaleBand},
    phase::LoadingPhase,
    render_set::RenderSet,
    visibility::{is_visible_at_zoom, query_scope},
};

pub use input::{
    events::{CameraEvent, CameraEventKind, EngineCameraPayload, TapEvent},
    throttle::CameraThrottler,
};

pub use spatial::{
    classification::{LayerKey, LayerVisibilityFlags, ObjectClass},
    feature::{GeometryKind, QueryTarget, RenderedFeature, ResolvedFeature},
    index::RenderedFeatureIndex,
    resolver::{FeatureResolver, Resolution, TapOutcome},
};

/// Result type used throughout the library
pub type Result<T> = std::result::Result<T, ChartError>;

/// Common error types
#[derive(Debug, thiserror::Error)]
pub enum ChartError {
    #[error("map engine is not ready")]
    EngineNotReady,

    #[error("feature query failed: {0}")]
    Query(String),

    #[error("feature query timed out after {0} ms")]
    QueryTimeout(u64),

    #[error("scheduling error: {0}")]
    Scheduling(String),

    #[error("invalid camera payload: {0}")]
    InvalidCamera(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Error type alias for convenience
pub type Error = ChartError;
