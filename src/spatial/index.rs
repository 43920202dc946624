use crate::{
    core::geo::ScreenRect,
    spatial::feature::{QueryTarget, RenderedFeature},
    traits::FeatureQuery,
    Result,
};
use async_trait::async_trait;
use geo::BoundingRect;
use rstar::{RTree, RTreeObject, AABB};

/// A rendered feature stored with its screen-space envelope
#[derive(Debug, Clone)]
struct IndexedFeature {
    /// Insertion sequence; query results come back in this order
    seq: u64,
    envelope: AABB<[f64; 2]>,
    feature: RenderedFeature,
}

// --- rstar integration -------------------------------------------------------------------------

impl RTreeObject for IndexedFeature {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.envelope
    }
}

/// In-memory rendered-feature surface backed by an R-tree.
///
/// Geometries are in screen pixels. A feature matches a query when its
/// bounding box intersects the query rectangle, which is how map engines
/// answer rendered-feature queries too. Results keep insertion order so
/// identical queries return identical sequences.
#[derive(Debug, Default)]
pub struct RenderedFeatureIndex {
    rtree: RTree<IndexedFeature>,
    next_seq: u64,
}

impl RenderedFeatureIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index `feature`. Empty geometries have no envelope and are skipped.
    pub fn insert(&mut self, feature: RenderedFeature) -> bool {
        let Some(rect) = feature.geometry.bounding_rect() else {
            log::debug!(
                "skipping feature {} with empty geometry",
                feature.classification_code
            );
            return false;
        };
        let envelope = AABB::from_corners(
            [rect.min().x, rect.min().y],
            [rect.max().x, rect.max().y],
        );
        self.rtree.insert(IndexedFeature {
            seq: self.next_seq,
            envelope,
            feature,
        });
        self.next_seq += 1;
        true
    }

    pub fn extend(&mut self, features: impl IntoIterator<Item = RenderedFeature>) -> usize {
        features
            .into_iter()
            .map(|feature| self.insert(feature))
            .filter(|inserted| *inserted)
            .count()
    }

    /// Features intersecting `rect`, restricted to `target`, in insertion order
    pub fn query(&self, rect: &ScreenRect, target: &QueryTarget) -> Vec<&RenderedFeature> {
        let envelope = AABB::from_corners([rect.min.x, rect.min.y], [rect.max.x, rect.max.y]);
        let mut hits: Vec<&IndexedFeature> = self
            .rtree
            .locate_in_envelope_intersecting(&envelope)
            .filter(|item| target.includes(item.feature.source.as_deref()))
            .collect();
        hits.sort_by_key(|item| item.seq);
        hits.into_iter().map(|item| &item.feature).collect()
    }

    /// Drop every feature rendered from `pack_id`. Returns how many were removed.
    pub fn remove_source(&mut self, pack_id: &str) -> usize {
        let before = self.rtree.size();
        let kept: Vec<IndexedFeature> = self
            .rtree
            .iter()
            .filter(|item| item.feature.source.as_deref() != Some(pack_id))
            .cloned()
            .collect();
        self.rtree = RTree::bulk_load(kept);
        before - self.rtree.size()
    }

    pub fn len(&self) -> usize {
        self.rtree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.rtree.size() == 0
    }

    pub fn clear(&mut self) {
        self.rtree = RTree::new();
    }
}

#[async_trait]
impl FeatureQuery for RenderedFeatureIndex {
    async fn query_features_in_screen_rect(
        &self,
        rect: &ScreenRect,
        target: &QueryTarget,
    ) -> Result<Vec<RenderedFeature>> {
        Ok(self.query(rect, target).into_iter().cloned().collect())
    }
}
