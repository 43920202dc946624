//! Tap-to-feature resolution
//!
//! A tap queries the map engine for rendered features in a small square
//! around the tap, drops features on hidden layers, keeps one representative
//! per classification code and ranks the survivors by class priority.

use super::{
    classification::LayerVisibilityFlags,
    feature::{GeometryKind, QueryTarget, RenderedFeature, ResolvedFeature},
};
use crate::charts::loader::ChartLoader;
use crate::core::{camera::CameraState, config::PickConfig, geo::ScreenRect};
use crate::input::events::TapEvent;
use crate::prelude::{Arc, Mutex};
use crate::traits::FeatureQuery;
use crate::Result;
use indexmap::{map::Entry, IndexMap};

/// Filter, deduplicate and rank a raw query response.
///
/// Per classification code the first feature seen is kept, unless a later
/// one has point geometry and the kept one does not. Ranking is a stable sort
/// on priority, so equal-priority classes stay in first-seen order.
pub fn resolve_features(
    features: &[RenderedFeature],
    flags: &LayerVisibilityFlags,
) -> Vec<ResolvedFeature> {
    let mut representatives: IndexMap<u32, &RenderedFeature> = IndexMap::new();

    for feature in features {
        if !flags.allows(feature.class()) {
            continue;
        }
        match representatives.entry(feature.classification_code) {
            Entry::Vacant(slot) => {
                slot.insert(feature);
            }
            Entry::Occupied(mut slot) => {
                if slot.get().geometry_kind() != GeometryKind::Point
                    && feature.geometry_kind() == GeometryKind::Point
                {
                    slot.insert(feature);
                }
            }
        }
    }

    let mut resolved: Vec<ResolvedFeature> = representatives
        .into_values()
        .map(ResolvedFeature::from)
        .collect();
    resolved.sort_by(|a, b| b.priority().cmp(&a.priority()));
    resolved
}

/// A non-empty tap result
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    Single(ResolvedFeature),
    /// More than one class under the tap, in rank order
    Disambiguate(Vec<ResolvedFeature>),
}

impl Resolution {
    /// `None` when nothing survived filtering
    pub fn from_ranked(mut ranked: Vec<ResolvedFeature>) -> Option<Self> {
        match ranked.len() {
            0 => None,
            1 => ranked.pop().map(Resolution::Single),
            _ => Some(Resolution::Disambiguate(ranked)),
        }
    }

    pub fn features(&self) -> &[ResolvedFeature] {
        match self {
            Resolution::Single(feature) => std::slice::from_ref(feature),
            Resolution::Disambiguate(features) => features,
        }
    }

    /// Highest-ranked feature
    pub fn primary(&self) -> Option<&ResolvedFeature> {
        self.features().first()
    }
}

/// What a single tap produced
#[derive(Debug, Clone, PartialEq)]
pub enum TapOutcome {
    Resolved(Resolution),
    /// Empty water, everything hidden, or the query failed
    Nothing,
    /// A newer tap was issued before this one's query returned
    Superseded,
}

impl TapOutcome {
    pub fn resolution(&self) -> Option<&Resolution> {
        match self {
            TapOutcome::Resolved(resolution) => Some(resolution),
            _ => None,
        }
    }
}

#[derive(Debug, Default)]
struct TapState {
    generation: u64,
    current: Option<Resolution>,
}

/// Resolves taps against the map engine's rendered-feature query.
///
/// Each tap clears the previous result before querying. A response that
/// arrives after a newer tap was issued is reported as
/// [`TapOutcome::Superseded`] and does not touch the current result; the
/// stale query itself is left to finish.
pub struct FeatureResolver {
    engine: Arc<dyn FeatureQuery>,
    config: PickConfig,
    state: Mutex<TapState>,
}

impl FeatureResolver {
    pub fn new(engine: Arc<dyn FeatureQuery>, config: PickConfig) -> Self {
        Self {
            engine,
            config,
            state: Mutex::new(TapState::default()),
        }
    }

    pub fn config(&self) -> &PickConfig {
        &self.config
    }

    /// Screen rectangle queried for `tap`
    pub fn tap_rect(&self, tap: &TapEvent) -> ScreenRect {
        ScreenRect::around(tap.screen, self.config.tolerance_px)
    }

    /// Query target for the given visible-pack scope.
    ///
    /// Unless scoped queries are enabled this is always an all-layers query.
    pub fn target_for_scope(&self, scope: Vec<String>) -> QueryTarget {
        if self.config.scoped_queries {
            QueryTarget::Packs(scope)
        } else {
            QueryTarget::AllLayers
        }
    }

    /// Query target for the loader's render set at the camera's zoom
    pub fn target_for_view(&self, loader: &ChartLoader, camera: &CameraState) -> QueryTarget {
        if self.config.scoped_queries {
            QueryTarget::Packs(loader.query_scope(camera.zoom))
        } else {
            QueryTarget::AllLayers
        }
    }

    /// Resolve what is under `tap`.
    ///
    /// Query failures are logged and reported as [`TapOutcome::Nothing`];
    /// nothing is retried.
    pub async fn on_tap(
        &self,
        tap: &TapEvent,
        flags: &LayerVisibilityFlags,
        target: &QueryTarget,
    ) -> TapOutcome {
        let generation = match self.state.lock() {
            Ok(mut state) => {
                state.generation += 1;
                state.current = None;
                state.generation
            }
            Err(_) => return TapOutcome::Nothing,
        };

        let rect = self.tap_rect(tap);
        let response = self.query(&rect, target).await;

        let Ok(mut state) = self.state.lock() else {
            return TapOutcome::Nothing;
        };
        if state.generation != generation {
            log::debug!("ignoring response for superseded tap {}", generation);
            return TapOutcome::Superseded;
        }

        let features = match response {
            Ok(features) => features,
            Err(e) => {
                log::warn!(
                    "feature query at ({:.5}, {:.5}) failed: {}",
                    tap.lat_lng.lat,
                    tap.lat_lng.lng,
                    e
                );
                return TapOutcome::Nothing;
            }
        };

        let ranked = resolve_features(&features, flags);
        log::debug!(
            "tap {} matched {} features, {} after filtering",
            generation,
            features.len(),
            ranked.len()
        );

        match Resolution::from_ranked(ranked) {
            Some(resolution) => {
                state.current = Some(resolution.clone());
                TapOutcome::Resolved(resolution)
            }
            None => TapOutcome::Nothing,
        }
    }

    /// Result of the latest completed tap, if it found anything
    pub fn current(&self) -> Option<Resolution> {
        self.state
            .lock()
            .ok()
            .and_then(|state| state.current.clone())
    }

    /// Dismiss the current result
    pub fn clear(&self) {
        if let Ok(mut state) = self.state.lock() {
            state.current = None;
        }
    }

    async fn query(&self, rect: &ScreenRect, target: &QueryTarget) -> Result<Vec<RenderedFeature>> {
        let query = self.engine.query_features_in_screen_rect(rect, target);
        match self.config.query_timeout_ms {
            #[cfg(feature = "tokio-runtime")]
            Some(ms) => tokio::time::timeout(std::time::Duration::from_millis(ms), query)
                .await
                .map_err(|_| crate::ChartError::QueryTimeout(ms))?,
            _ => query.await,
        }
    }
}
