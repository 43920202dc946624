//! S-57 object classes and the two static tables keyed on them
//!
//! Every classification code maps to a display priority and to the layer
//! toggle that hides it. Codes outside the table become
//! [`ObjectClass::Unknown`]: always visible, lowest priority.

use crate::core::constants::UNKNOWN_CLASS_PRIORITY;
use crate::prelude::HashMap;
use crate::Result;
use serde::{Deserialize, Serialize};
use std::fmt;

/// User-facing layer toggles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayerKey {
    Lights,
    Buoys,
    Beacons,
    Hazards,
    Landmarks,
    Soundings,
    DepthContours,
    DepthAreas,
    Land,
    Coastline,
    RestrictedAreas,
    Anchorages,
    Cables,
    SeaAreas,
    Facilities,
}

impl LayerKey {
    pub const ALL: [LayerKey; 15] = [
        LayerKey::Lights,
        LayerKey::Buoys,
        LayerKey::Beacons,
        LayerKey::Hazards,
        LayerKey::Landmarks,
        LayerKey::Soundings,
        LayerKey::DepthContours,
        LayerKey::DepthAreas,
        LayerKey::Land,
        LayerKey::Coastline,
        LayerKey::RestrictedAreas,
        LayerKey::Anchorages,
        LayerKey::Cables,
        LayerKey::SeaAreas,
        LayerKey::Facilities,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LayerKey::Lights => "lights",
            LayerKey::Buoys => "buoys",
            LayerKey::Beacons => "beacons",
            LayerKey::Hazards => "hazards",
            LayerKey::Landmarks => "landmarks",
            LayerKey::Soundings => "soundings",
            LayerKey::DepthContours => "depth_contours",
            LayerKey::DepthAreas => "depth_areas",
            LayerKey::Land => "land",
            LayerKey::Coastline => "coastline",
            LayerKey::RestrictedAreas => "restricted_areas",
            LayerKey::Anchorages => "anchorages",
            LayerKey::Cables => "cables",
            LayerKey::SeaAreas => "sea_areas",
            LayerKey::Facilities => "facilities",
        }
    }

    pub fn parse(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|layer| layer.as_str() == key)
    }
}

impl fmt::Display for LayerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

macro_rules! object_classes {
    ($( $variant:ident = $code:literal, $acronym:literal, $name:literal, $priority:literal, $layer:ident; )*) => {
        /// Nautical object classes this viewer knows how to rank and filter
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum ObjectClass {
            $( $variant, )*
            /// Any code missing from the table
            Unknown(u32),
        }

        impl ObjectClass {
            pub fn from_code(code: u32) -> Self {
                match code {
                    $( $code => ObjectClass::$variant, )*
                    other => ObjectClass::Unknown(other),
                }
            }

            pub fn code(&self) -> u32 {
                match self {
                    $( ObjectClass::$variant => $code, )*
                    ObjectClass::Unknown(code) => *code,
                }
            }

            /// Six-letter S-57 acronym, `None` for unknown codes
            pub fn acronym(&self) -> Option<&'static str> {
                match self {
                    $( ObjectClass::$variant => Some($acronym), )*
                    ObjectClass::Unknown(_) => None,
                }
            }

            pub fn display_name(&self) -> String {
                match self {
                    $( ObjectClass::$variant => $name.to_string(), )*
                    ObjectClass::Unknown(code) => format!("Feature {}", code),
                }
            }

            /// Higher ranks first in a disambiguation list
            pub fn priority(&self) -> u32 {
                match self {
                    $( ObjectClass::$variant => $priority, )*
                    ObjectClass::Unknown(_) => UNKNOWN_CLASS_PRIORITY,
                }
            }

            /// Layer toggle that hides this class; unknown codes have none
            pub fn layer(&self) -> Option<LayerKey> {
                match self {
                    $( ObjectClass::$variant => Some(LayerKey::$layer), )*
                    ObjectClass::Unknown(_) => None,
                }
            }

            pub fn is_known(&self) -> bool {
                !matches!(self, ObjectClass::Unknown(_))
            }
        }
    };
}

object_classes! {
    Light = 75, "LIGHTS", "Light", 100, Lights;
    LateralBuoy = 17, "BOYLAT", "Lateral buoy", 90, Buoys;
    CardinalBuoy = 14, "BOYCAR", "Cardinal buoy", 90, Buoys;
    IsolatedDangerBuoy = 16, "BOYISD", "Isolated danger buoy", 90, Buoys;
    SafeWaterBuoy = 18, "BOYSAW", "Safe water buoy", 90, Buoys;
    SpecialPurposeBuoy = 19, "BOYSPP", "Special purpose buoy", 90, Buoys;
    CardinalBeacon = 5, "BCNCAR", "Cardinal beacon", 88, Beacons;
    IsolatedDangerBeacon = 6, "BCNISD", "Isolated danger beacon", 88, Beacons;
    LateralBeacon = 7, "BCNLAT", "Lateral beacon", 88, Beacons;
    SafeWaterBeacon = 8, "BCNSAW", "Safe water beacon", 88, Beacons;
    SpecialPurposeBeacon = 9, "BCNSPP", "Special purpose beacon", 88, Beacons;
    Wreck = 159, "WRECKS", "Wreck", 80, Hazards;
    UnderwaterRock = 153, "UWTROC", "Underwater rock", 78, Hazards;
    Obstruction = 86, "OBSTRN", "Obstruction", 75, Hazards;
    Landmark = 74, "LNDMRK", "Landmark", 70, Landmarks;
    FogSignal = 58, "FOGSIG", "Fog signal", 65, Lights;
    MooringFacility = 84, "MORFAC", "Mooring facility", 60, Facilities;
    Sounding = 129, "SOUNDG", "Sounding", 50, Soundings;
    DepthContour = 43, "DEPCNT", "Depth contour", 45, DepthContours;
    SubmarineCable = 22, "CBLSUB", "Submarine cable", 40, Cables;
    Pipeline = 94, "PIPSOL", "Pipeline", 40, Cables;
    RestrictedArea = 112, "RESARE", "Restricted area", 35, RestrictedAreas;
    AnchorageArea = 4, "ACHARE", "Anchorage area", 35, Anchorages;
    DredgedArea = 46, "DRGARE", "Dredged area", 30, DepthAreas;
    DepthArea = 42, "DEPARE", "Depth area", 20, DepthAreas;
    Coastline = 30, "COALNE", "Coastline", 15, Coastline;
    LandArea = 71, "LNDARE", "Land area", 10, Land;
    SeaArea = 119, "SEAARE", "Sea area", 5, SeaAreas;
}

impl fmt::Display for ObjectClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.acronym() {
            Some(acronym) => write!(f, "{} ({})", acronym, self.code()),
            None => write!(f, "unknown ({})", self.code()),
        }
    }
}

/// Externally owned layer toggles, read once per resolve.
///
/// A layer without an entry counts as visible.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LayerVisibilityFlags {
    flags: HashMap<LayerKey, bool>,
}

impl LayerVisibilityFlags {
    pub fn all_visible() -> Self {
        Self::default()
    }

    pub fn all_hidden() -> Self {
        LayerKey::ALL.into_iter().map(|layer| (layer, false)).collect()
    }

    pub fn set(&mut self, layer: LayerKey, visible: bool) -> &mut Self {
        self.flags.insert(layer, visible);
        self
    }

    pub fn with(mut self, layer: LayerKey, visible: bool) -> Self {
        self.set(layer, visible);
        self
    }

    pub fn is_visible(&self, layer: LayerKey) -> bool {
        self.flags.get(&layer).copied().unwrap_or(true)
    }

    /// Whether features of `class` survive the visibility filter
    pub fn allows(&self, class: ObjectClass) -> bool {
        class.layer().map_or(true, |layer| self.is_visible(layer))
    }

    /// Reads the host's flat `{ "layer_key": bool }` map.
    ///
    /// Keys this crate does not know are skipped with a debug log.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let raw: std::collections::HashMap<String, bool> = serde_json::from_str(json)?;
        let mut flags = Self::default();
        for (key, visible) in raw {
            match LayerKey::parse(&key) {
                Some(layer) => {
                    flags.set(layer, visible);
                }
                None => log::debug!("ignoring unknown layer flag '{}'", key),
            }
        }
        Ok(flags)
    }
}

impl FromIterator<(LayerKey, bool)> for LayerVisibilityFlags {
    fn from_iter<I: IntoIterator<Item = (LayerKey, bool)>>(iter: I) -> Self {
        Self {
            flags: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_round_trip_through_table() {
        for code in [75, 17, 14, 5, 159, 129, 42, 119] {
            let class = ObjectClass::from_code(code);
            assert!(class.is_known());
            assert_eq!(class.code(), code);
        }
    }

    #[test]
    fn test_unknown_code_fails_open() {
        let class = ObjectClass::from_code(9_999);
        assert_eq!(class, ObjectClass::Unknown(9_999));
        assert_eq!(class.priority(), 0);
        assert_eq!(class.layer(), None);
        assert!(LayerVisibilityFlags::all_hidden().allows(class));
        assert_eq!(class.display_name(), "Feature 9999");
    }

    #[test]
    fn test_priority_ordering_of_common_classes() {
        let light = ObjectClass::from_code(75);
        let buoy = ObjectClass::from_code(17);
        let sounding = ObjectClass::from_code(129);
        let sea = ObjectClass::from_code(119);
        assert!(light.priority() > buoy.priority());
        assert!(buoy.priority() > sounding.priority());
        assert!(sounding.priority() > sea.priority());
        assert!(sea.priority() > ObjectClass::Unknown(1).priority());
    }

    #[test]
    fn test_flags_default_to_visible() {
        let flags = LayerVisibilityFlags::default().with(LayerKey::Buoys, false);
        assert!(!flags.allows(ObjectClass::LateralBuoy));
        assert!(flags.allows(ObjectClass::Light));
        assert!(flags.is_visible(LayerKey::Soundings));
    }

    #[test]
    fn test_flags_from_json_skips_unknown_keys() {
        let flags =
            LayerVisibilityFlags::from_json_str(r#"{ "soundings": false, "weather": false }"#)
                .unwrap();
        assert!(!flags.is_visible(LayerKey::Soundings));
        assert!(flags.is_visible(LayerKey::Lights));
    }

    #[test]
    fn test_layer_key_parse_matches_as_str() {
        for layer in LayerKey::ALL {
            assert_eq!(LayerKey::parse(layer.as_str()), Some(layer));
        }
        assert_eq!(LayerKey::parse("Lights"), None);
    }
}
