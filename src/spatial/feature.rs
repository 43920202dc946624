use super::classification::ObjectClass;
use geo_types::Geometry;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A feature as returned by the map engine's rendered-feature query
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedFeature {
    pub geometry: Geometry<f64>,
    pub classification_code: u32,
    pub properties: Map<String, Value>,
    /// Chart pack the feature was rendered from, when the engine reports it
    pub source: Option<String>,
}

impl RenderedFeature {
    pub fn new(geometry: impl Into<Geometry<f64>>, classification_code: u32) -> Self {
        Self {
            geometry: geometry.into(),
            classification_code,
            properties: Map::new(),
            source: None,
        }
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    pub fn with_source(mut self, pack_id: impl Into<String>) -> Self {
        self.source = Some(pack_id.into());
        self
    }

    pub fn class(&self) -> ObjectClass {
        ObjectClass::from_code(self.classification_code)
    }

    pub fn geometry_kind(&self) -> GeometryKind {
        GeometryKind::of(&self.geometry)
    }
}

/// Coarse geometry family used for the representative tie-break
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GeometryKind {
    Point,
    Line,
    Polygon,
    Other,
}

impl GeometryKind {
    pub fn of(geometry: &Geometry<f64>) -> Self {
        match geometry {
            Geometry::Point(_) | Geometry::MultiPoint(_) => GeometryKind::Point,
            Geometry::Line(_) | Geometry::LineString(_) | Geometry::MultiLineString(_) => {
                GeometryKind::Line
            }
            Geometry::Polygon(_)
            | Geometry::MultiPolygon(_)
            | Geometry::Rect(_)
            | Geometry::Triangle(_) => GeometryKind::Polygon,
            Geometry::GeometryCollection(_) => GeometryKind::Other,
        }
    }
}

/// Which rendered features a query should consider
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum QueryTarget {
    /// Unfiltered query; filtering happens client-side
    #[default]
    AllLayers,
    /// Only features rendered from these chart packs
    Packs(Vec<String>),
}

impl QueryTarget {
    pub fn includes(&self, source: Option<&str>) -> bool {
        match self {
            QueryTarget::AllLayers => true,
            QueryTarget::Packs(ids) => source.is_some_and(|s| ids.iter().any(|id| id == s)),
        }
    }
}

/// One entry of a tap result, ready for an inspector panel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedFeature {
    pub classification_code: u32,
    pub display_type: String,
    pub properties: Map<String, Value>,
    pub geometry_kind: GeometryKind,
}

impl ResolvedFeature {
    pub fn class(&self) -> ObjectClass {
        ObjectClass::from_code(self.classification_code)
    }

    pub fn priority(&self) -> u32 {
        self.class().priority()
    }
}

impl From<&RenderedFeature> for ResolvedFeature {
    fn from(feature: &RenderedFeature) -> Self {
        Self {
            classification_code: feature.classification_code,
            display_type: feature.class().display_name(),
            properties: feature.properties.clone(),
            geometry_kind: feature.geometry_kind(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo_types::{line_string, point, polygon};

    #[test]
    fn test_geometry_kind() {
        assert_eq!(
            GeometryKind::of(&point!(x: 1.0, y: 2.0).into()),
            GeometryKind::Point
        );
        assert_eq!(
            GeometryKind::of(&line_string![(x: 0.0, y: 0.0), (x: 1.0, y: 1.0)].into()),
            GeometryKind::Line
        );
        assert_eq!(
            GeometryKind::of(
                &polygon![(x: 0.0, y: 0.0), (x: 1.0, y: 0.0), (x: 1.0, y: 1.0)].into()
            ),
            GeometryKind::Polygon
        );
    }

    #[test]
    fn test_resolved_feature_carries_display_type_and_properties() {
        let feature = RenderedFeature::new(point!(x: 0.0, y: 0.0), 75)
            .with_property("LITCHR", 2)
            .with_source("US5MA1");
        let resolved = ResolvedFeature::from(&feature);

        assert_eq!(resolved.display_type, "Light");
        assert_eq!(resolved.properties.get("LITCHR"), Some(&Value::from(2)));
        assert_eq!(resolved.geometry_kind, GeometryKind::Point);
        assert_eq!(resolved.priority(), 100);
    }

    #[test]
    fn test_query_target_includes() {
        assert!(QueryTarget::AllLayers.includes(None));
        let scoped = QueryTarget::Packs(vec!["US4A".to_string()]);
        assert!(scoped.includes(Some("US4A")));
        assert!(!scoped.includes(Some("US5A")));
        assert!(!scoped.includes(None));
    }
}
