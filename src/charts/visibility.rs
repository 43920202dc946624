//! Zoom visibility gate.
//!
//! The loader's zoom filter and the resolver's query scope both go through
//! [`is_visible_at_zoom`], so "what renders" and "what is queryable" never
//! disagree.

use super::pack::ScaleBand;
use super::render_set::RenderSet;
use crate::core::constants::ZOOM_VISIBILITY_BUFFER;

/// True iff the pack is meaningfully rendered at `zoom`.
///
/// Packs without a recognizable scale band are always visible, as is any
/// pack when `zoom` is not a finite number.
pub fn is_visible_at_zoom(pack_id: &str, zoom: f64) -> bool {
    match ScaleBand::parse(pack_id) {
        Some(band) if zoom.is_finite() => {
            let (min, max) = buffered_zoom_range(band);
            zoom >= min && zoom <= max
        }
        _ => true,
    }
}

/// Design range widened by the over/underzoom buffer on both ends.
pub fn buffered_zoom_range(band: ScaleBand) -> (f64, f64) {
    let (min, max) = band.design_zoom_range();
    (min - ZOOM_VISIBILITY_BUFFER, max + ZOOM_VISIBILITY_BUFFER)
}

/// Ids from the render set that are visible at `zoom`, in render-set order.
pub fn query_scope(render_set: &RenderSet, zoom: f64) -> Vec<String> {
    render_set
        .iter()
        .filter(|id| is_visible_at_zoom(id, zoom))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_harbour_band_boundaries() {
        // Harbour design range is 13..=18, buffered to 11..=20
        assert!(!is_visible_at_zoom("US5MA12M", 10.9));
        assert!(is_visible_at_zoom("US5MA12M", 11.0));
        assert!(is_visible_at_zoom("US5MA12M", 16.0));
        assert!(is_visible_at_zoom("US5MA12M", 20.0));
        assert!(!is_visible_at_zoom("US5MA12M", 20.1));
    }

    #[test]
    fn test_unknown_ids_fail_open() {
        assert!(is_visible_at_zoom("bathymetry", 0.0));
        assert!(is_visible_at_zoom("satellite", 22.0));
        assert!(is_visible_at_zoom("", 5.0));
    }

    #[test]
    fn test_non_finite_zoom_fails_open() {
        assert!(is_visible_at_zoom("US6X01NE", f64::NAN));
    }

    #[test]
    fn test_query_scope_keeps_order_and_drops_invisible() {
        let mut set = RenderSet::new();
        set.extend(["US1EEZ1M", "sat", "US5MA12M", "US2EC02M"].iter().map(|s| s.to_string()));

        assert_eq!(query_scope(&set, 5.0), vec!["US1EEZ1M", "sat", "US2EC02M"]);
        assert_eq!(query_scope(&set, 15.0), vec!["sat", "US5MA12M"]);
    }

    proptest! {
        #[test]
        fn prop_visible_exactly_within_buffered_range(band_no in 1u8..=6, zoom in -5.0f64..30.0) {
            let band = ScaleBand::from_number(band_no).unwrap();
            let id = format!("US{}TEST01", band_no);
            let (min, max) = buffered_zoom_range(band);
            prop_assert_eq!(is_visible_at_zoom(&id, zoom), zoom >= min && zoom <= max);
        }

        #[test]
        fn prop_false_just_outside_buffer(band_no in 1u8..=6, eps in 0.001f64..3.0) {
            let band = ScaleBand::from_number(band_no).unwrap();
            let id = format!("{}chart", band_no);
            let (min, max) = buffered_zoom_range(band);
            prop_assert!(!is_visible_at_zoom(&id, max + eps));
            prop_assert!(!is_visible_at_zoom(&id, min - eps));
        }

        #[test]
        fn prop_visible_interval_is_convex(band_no in 1u8..=6, a in 0.0f64..24.0, b in 0.0f64..24.0, t in 0.0f64..=1.0) {
            let id = format!("CA{}X", band_no);
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            let mid = lo + (hi - lo) * t;
            if is_visible_at_zoom(&id, lo) && is_visible_at_zoom(&id, hi) {
                prop_assert!(is_visible_at_zoom(&id, mid));
            }
        }
    }
}
