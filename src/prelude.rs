//! Prelude module for common chartlet types and traits
//!
//! This module re-exports the most commonly used types, traits, and functions
//! for easy importing with `use chartlet::prelude::*;`

pub use crate::core::{
    camera::CameraState,
    config::{
        CameraThrottleConfig, ChartViewOptions, ChartViewProfile, LoaderConfig, PickConfig,
        SourceMode, TierSpec,
    },
    geo::{LatLng, Point, ScreenRect},
};

pub use crate::charts::{
    loader::{ChartLoader, LoadPlan, LoadProgress, LoaderUpdate},
    pack::{ChartPackRef, ScaleBand},
    phase::LoadingPhase,
    render_set::RenderSet,
    visibility::{is_visible_at_zoom, query_scope},
};

pub use crate::input::{
    events::{CameraEvent, CameraEventKind, EngineCameraPayload, TapEvent},
    throttle::{CameraThrottler, GateDecision, ThrottleGate},
};

pub use crate::spatial::{
    classification::{LayerKey, LayerVisibilityFlags, ObjectClass},
    feature::{GeometryKind, QueryTarget, RenderedFeature, ResolvedFeature},
    index::RenderedFeatureIndex,
    resolver::{resolve_features, FeatureResolver, Resolution, TapOutcome},
};

pub use crate::runtime::{runtime, spawn, AsyncHandle, AsyncSpawner};

pub use crate::traits::{
    Clock, DelayTicker, FeatureQuery, RuntimeClock, TickScheduler, YieldTicker,
};

pub use crate::{Error as ChartError, Result};

pub use std::{
    pin::Pin,
    sync::{Arc, Mutex},
    time::Duration,
};

pub use instant::Instant;

pub use fxhash::{FxHashMap as HashMap, FxHashSet as HashSet};

pub use futures::future::BoxFuture;
pub use futures::Future;
