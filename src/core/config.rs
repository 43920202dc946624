//! Configuration system for the chart scheduling core
//!
//! This module provides a hierarchical configuration system that allows
//! hosts to configure the loader, the camera throttler and tap picking
//! through presets or custom configurations, optionally loaded from JSON.

use crate::charts::pack::ScaleBand;
use crate::core::constants::{
    DEFAULT_THROTTLE_INTERVAL_MS, MAX_BATCH_SIZE, MAX_ZOOM, MIN_BATCH_SIZE, MIN_ZOOM,
    TAP_TOLERANCE_PX,
};
use crate::{ChartError, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Default)]
pub enum ChartViewProfile {
    #[default]
    Balanced,
    LowPower,
    Responsive,
    Custom(ChartViewOptions),
}

impl ChartViewProfile {
    pub fn resolve(&self) -> ChartViewOptions {
        match self {
            Self::Balanced => ChartViewOptions {
                loader: LoaderConfig {
                    source_mode: SourceMode::PerPack,
                    primary: TierSpec::overview(15, 150),
                    detail: TierSpec::detail(8, 500),
                    tick_delay_ms: 0,
                    zoom_filter: None,
                },
                camera: CameraThrottleConfig {
                    interval_ms: DEFAULT_THROTTLE_INTERVAL_MS,
                    min_zoom: MIN_ZOOM,
                    max_zoom: MAX_ZOOM,
                },
                picking: PickConfig {
                    tolerance_px: TAP_TOLERANCE_PX,
                    scoped_queries: false,
                    query_timeout_ms: None,
                },
            },
            Self::LowPower => ChartViewOptions {
                loader: LoaderConfig {
                    source_mode: SourceMode::PerPack,
                    primary: TierSpec::overview(10, 80),
                    detail: TierSpec::detail(8, 250),
                    tick_delay_ms: 16,
                    zoom_filter: None,
                },
                camera: CameraThrottleConfig {
                    interval_ms: 200,
                    min_zoom: MIN_ZOOM,
                    max_zoom: MAX_ZOOM,
                },
                picking: PickConfig {
                    tolerance_px: TAP_TOLERANCE_PX,
                    scoped_queries: false,
                    query_timeout_ms: Some(2_000),
                },
            },
            Self::Responsive => ChartViewOptions {
                loader: LoaderConfig {
                    source_mode: SourceMode::PerPack,
                    primary: TierSpec::overview(15, 200),
                    detail: TierSpec::detail(12, 800),
                    tick_delay_ms: 0,
                    zoom_filter: None,
                },
                camera: CameraThrottleConfig {
                    interval_ms: 50,
                    min_zoom: MIN_ZOOM,
                    max_zoom: MAX_ZOOM,
                },
                picking: PickConfig {
                    tolerance_px: TAP_TOLERANCE_PX,
                    scoped_queries: false,
                    query_timeout_ms: None,
                },
            },
            Self::Custom(options) => options.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartViewOptions {
    pub loader: LoaderConfig,
    pub camera: CameraThrottleConfig,
    pub picking: PickConfig,
}

impl Default for ChartViewOptions {
    fn default() -> Self {
        ChartViewProfile::default().resolve()
    }
}

impl ChartViewOptions {
    /// Parses options from JSON. Missing sections fall back to defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let options: Self = serde_json::from_str(json)?;
        options.validate()?;
        Ok(options)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<()> {
        self.loader.validate()?;
        self.camera.validate()?;
        self.picking.validate()
    }
}

/// How the map engine consumes chart packs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceMode {
    /// Every pack is registered with the engine individually
    #[default]
    PerPack,
    /// One composited source covers the whole inventory; nothing to batch
    Composited,
}

/// One priority tier of the progressive loader.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TierSpec {
    /// Shown in progress updates while this tier loads
    pub label: String,
    /// Inclusive scale-band range admitted by this tier (1..=6)
    pub min_band: u8,
    pub max_band: u8,
    /// Whether packs without a recognizable scale band land in this tier
    pub include_unbanded: bool,
    pub batch_size: usize,
    /// Upper bound on packs admitted by this tier
    pub max_packs: usize,
}

impl TierSpec {
    pub fn overview(batch_size: usize, max_packs: usize) -> Self {
        Self {
            label: "Loading overview charts".to_string(),
            min_band: ScaleBand::Overview.number(),
            max_band: ScaleBand::Coastal.number(),
            include_unbanded: false,
            batch_size,
            max_packs,
        }
    }

    pub fn detail(batch_size: usize, max_packs: usize) -> Self {
        Self {
            label: "Loading detail charts".to_string(),
            min_band: ScaleBand::Approach.number(),
            max_band: ScaleBand::Berthing.number(),
            include_unbanded: true,
            batch_size,
            max_packs,
        }
    }

    pub fn admits(&self, band: Option<ScaleBand>) -> bool {
        match band {
            Some(band) => (self.min_band..=self.max_band).contains(&band.number()),
            None => self.include_unbanded,
        }
    }

    fn validate(&self) -> Result<()> {
        if !(MIN_BATCH_SIZE..=MAX_BATCH_SIZE).contains(&self.batch_size) {
            return Err(ChartError::Config(format!(
                "tier '{}' batch size {} outside {}..={}",
                self.label, self.batch_size, MIN_BATCH_SIZE, MAX_BATCH_SIZE
            )));
        }
        if self.max_packs == 0 {
            return Err(ChartError::Config(format!(
                "tier '{}' must admit at least one pack",
                self.label
            )));
        }
        if self.min_band > self.max_band
            || ScaleBand::from_number(self.min_band).is_none()
            || ScaleBand::from_number(self.max_band).is_none()
        {
            return Err(ChartError::Config(format!(
                "tier '{}' has invalid band range {}..={}",
                self.label, self.min_band, self.max_band
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    pub source_mode: SourceMode,
    /// Admitted first
    pub primary: TierSpec,
    /// Admitted once the primary tier is complete
    pub detail: TierSpec,
    /// 0 yields a single scheduler tick between batches; otherwise waits this long
    pub tick_delay_ms: u64,
    /// When set, only packs visible at this zoom are admitted
    pub zoom_filter: Option<f64>,
}

impl LoaderConfig {
    pub fn for_testing() -> Self {
        Self {
            source_mode: SourceMode::PerPack,
            primary: TierSpec::overview(MIN_BATCH_SIZE, 1_000),
            detail: TierSpec::detail(MIN_BATCH_SIZE, 1_000),
            tick_delay_ms: 0,
            zoom_filter: None,
        }
    }

    pub fn composited() -> Self {
        Self {
            source_mode: SourceMode::Composited,
            ..Self::default()
        }
    }

    /// Worst-case number of packs the plan can admit
    pub fn max_admitted(&self) -> usize {
        self.primary.max_packs + self.detail.max_packs
    }

    fn validate(&self) -> Result<()> {
        self.primary.validate()?;
        self.detail.validate()?;
        if let Some(zoom) = self.zoom_filter {
            if !zoom.is_finite() {
                return Err(ChartError::Config("zoom filter must be finite".to_string()));
            }
        }
        Ok(())
    }
}

impl Default for LoaderConfig {
    fn default() -> Self {
        ChartViewProfile::Balanced.resolve().loader
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraThrottleConfig {
    pub interval_ms: u64,
    pub min_zoom: f64,
    pub max_zoom: f64,
}

impl CameraThrottleConfig {
    pub fn interval(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.interval_ms)
    }

    fn validate(&self) -> Result<()> {
        if self.interval_ms == 0 {
            return Err(ChartError::Config(
                "camera throttle interval must be non-zero".to_string(),
            ));
        }
        if !(self.min_zoom.is_finite() && self.max_zoom.is_finite())
            || self.min_zoom > self.max_zoom
        {
            return Err(ChartError::Config(format!(
                "invalid camera zoom range {}..={}",
                self.min_zoom, self.max_zoom
            )));
        }
        Ok(())
    }
}

impl Default for CameraThrottleConfig {
    fn default() -> Self {
        Self {
            interval_ms: DEFAULT_THROTTLE_INTERVAL_MS,
            min_zoom: MIN_ZOOM,
            max_zoom: MAX_ZOOM,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PickConfig {
    /// Half-size of the square queried around a tap
    pub tolerance_px: f64,
    /// Query only the packs visible at the current zoom instead of all layers
    pub scoped_queries: bool,
    pub query_timeout_ms: Option<u64>,
}

impl PickConfig {
    fn validate(&self) -> Result<()> {
        if !self.tolerance_px.is_finite() || self.tolerance_px <= 0.0 {
            return Err(ChartError::Config(format!(
                "tap tolerance must be positive, got {}",
                self.tolerance_px
            )));
        }
        if self.query_timeout_ms == Some(0) {
            return Err(ChartError::Config("query timeout must be non-zero".to_string()));
        }
        Ok(())
    }
}

impl Default for PickConfig {
    fn default() -> Self {
        Self {
            tolerance_px: TAP_TOLERANCE_PX,
            scoped_queries: false,
            query_timeout_ms: None,
        }
    }
}
