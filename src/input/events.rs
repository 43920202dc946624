use crate::core::{
    camera::CameraState,
    config::CameraThrottleConfig,
    geo::{LatLng, Point},
};
use crate::{ChartError, Result};
use serde::{Deserialize, Serialize};

/// The two camera notification channels a map engine exposes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CameraEventKind {
    /// Coalesced by the engine once a gesture settles; passed straight through
    Idle,
    /// Fired continuously while the camera moves; throttled
    Changing,
}

/// Camera payload in the engine's native shape: `[lon, lat]` plus zoom
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EngineCameraPayload {
    pub center: [f64; 2],
    pub zoom: f64,
}

impl EngineCameraPayload {
    pub fn new(lon: f64, lat: f64, zoom: f64) -> Self {
        Self {
            center: [lon, lat],
            zoom,
        }
    }

    /// Reads a payload from engine JSON.
    ///
    /// Accepts either `{"center": [lon, lat], "zoom": z}` or the same object
    /// nested under `"properties"`.
    pub fn from_json_value(value: &serde_json::Value) -> Result<Self> {
        let body = value.get("properties").unwrap_or(value);
        serde_json::from_value(body.clone())
            .map_err(|e| ChartError::InvalidCamera(format!("unreadable camera payload: {}", e)))
    }

    /// Convert to a [`CameraState`] within the configured zoom range
    pub fn normalize(&self, config: &CameraThrottleConfig) -> Result<CameraState> {
        CameraState::normalize(self.center, self.zoom, config.min_zoom, config.max_zoom)
    }
}

/// One notification from the engine's camera surface
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraEvent {
    pub kind: CameraEventKind,
    pub payload: EngineCameraPayload,
}

impl CameraEvent {
    pub fn idle(payload: EngineCameraPayload) -> Self {
        Self {
            kind: CameraEventKind::Idle,
            payload,
        }
    }

    pub fn changing(payload: EngineCameraPayload) -> Self {
        Self {
            kind: CameraEventKind::Changing,
            payload,
        }
    }
}

/// A tap on the map, in both geographic and screen coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TapEvent {
    pub lat_lng: LatLng,
    pub screen: Point,
}

impl TapEvent {
    pub fn new(lat_lng: LatLng, screen: Point) -> Self {
        Self { lat_lng, screen }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_payload_from_flat_json() {
        let payload =
            EngineCameraPayload::from_json_value(&json!({ "center": [-70.5, 41.2], "zoom": 11.5 }))
                .unwrap();
        assert_eq!(payload, EngineCameraPayload::new(-70.5, 41.2, 11.5));
    }

    #[test]
    fn test_payload_from_properties_wrapper() {
        let payload = EngineCameraPayload::from_json_value(&json!({
            "type": "Feature",
            "properties": { "center": [10.0, 54.0], "zoom": 8, "heading": 0 }
        }))
        .unwrap();
        assert_eq!(payload.center, [10.0, 54.0]);
        assert_eq!(payload.zoom, 8.0);
    }

    #[test]
    fn test_payload_missing_zoom_is_invalid() {
        let result = EngineCameraPayload::from_json_value(&json!({ "center": [0.0, 0.0] }));
        assert!(matches!(result, Err(ChartError::InvalidCamera(_))));
    }

    #[test]
    fn test_normalize_uses_config_zoom_range() {
        let config = CameraThrottleConfig {
            interval_ms: 100,
            min_zoom: 2.0,
            max_zoom: 20.0,
        };
        let state = EngineCameraPayload::new(0.0, 0.0, 1.0).normalize(&config).unwrap();
        assert_eq!(state.zoom, 2.0);
    }
}
