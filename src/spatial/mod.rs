pub mod classification;
pub mod feature;
pub mod index;
pub mod resolver;

pub use classification::{LayerKey, LayerVisibilityFlags, ObjectClass};
pub use feature::{GeometryKind, QueryTarget, RenderedFeature, ResolvedFeature};
pub use index::RenderedFeatureIndex;
pub use resolver::{resolve_features, FeatureResolver, Resolution, TapOutcome};
