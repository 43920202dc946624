use crate::core::geo::LatLng;
use crate::{ChartError, Result};
use serde::{Deserialize, Serialize};

/// The most recently emitted viewport.
///
/// Only the camera throttler produces these; everything else reads them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraState {
    pub center: LatLng,
    pub zoom: f64,
}

impl CameraState {
    pub fn new(center: LatLng, zoom: f64) -> Self {
        Self { center, zoom }
    }

    /// Builds a camera state from engine-native values.
    ///
    /// Longitude is wrapped, latitude clamped to the Web Mercator range and
    /// zoom clamped to `[min_zoom, max_zoom]`. Non-finite input is rejected.
    pub fn normalize(lon_lat: [f64; 2], zoom: f64, min_zoom: f64, max_zoom: f64) -> Result<Self> {
        let center = LatLng::from_lon_lat(lon_lat);
        if !center.is_finite() {
            return Err(ChartError::InvalidCamera(format!(
                "non-finite center {:?}",
                lon_lat
            )));
        }
        if !zoom.is_finite() {
            return Err(ChartError::InvalidCamera(format!("non-finite zoom {}", zoom)));
        }
        Ok(Self {
            center: center.normalized(),
            zoom: zoom.clamp(min_zoom, max_zoom),
        })
    }

    /// Center in `[lon, lat]` order
    pub fn center_lon_lat(&self) -> [f64; 2] {
        self.center.to_lon_lat()
    }
}

impl Default for CameraState {
    fn default() -> Self {
        Self::new(LatLng::default(), 0.0)
    }
}
