use serde::{Deserialize, Serialize};

/// Web Mercator latitude limit
const MAX_LATITUDE: f64 = 85.0511287798;

/// Represents a geographical coordinate with latitude and longitude
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    /// Creates a new LatLng coordinate
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Creates a coordinate from the `[lon, lat]` ordering map engines use
    pub fn from_lon_lat(lon_lat: [f64; 2]) -> Self {
        Self::new(lon_lat[1], lon_lat[0])
    }

    /// Returns the coordinate in `[lon, lat]` order
    pub fn to_lon_lat(&self) -> [f64; 2] {
        [self.lng, self.lat]
    }

    pub fn is_finite(&self) -> bool {
        self.lat.is_finite() && self.lng.is_finite()
    }

    /// Wraps longitude to [-180, 180] range
    pub fn wrap_lng(lng: f64) -> f64 {
        let wrapped = lng % 360.0;
        if wrapped > 180.0 {
            wrapped - 360.0
        } else if wrapped < -180.0 {
            wrapped + 360.0
        } else {
            wrapped
        }
    }

    /// Clamps latitude to the Web Mercator range
    pub fn clamp_lat(lat: f64) -> f64 {
        lat.clamp(-MAX_LATITUDE, MAX_LATITUDE)
    }

    /// Wrapped and clamped copy of this coordinate
    pub fn normalized(&self) -> Self {
        Self::new(Self::clamp_lat(self.lat), Self::wrap_lng(self.lng))
    }
}

impl Default for LatLng {
    fn default() -> Self {
        Self::new(0.0, 0.0)
    }
}

/// Represents a point in screen coordinates (pixels, origin top-left)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl Default for Point {
    fn default() -> Self {
        Self::new(0.0, 0.0)
    }
}

/// Axis-aligned rectangle in screen pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScreenRect {
    pub min: Point,
    pub max: Point,
}

impl ScreenRect {
    /// Creates a rectangle from two corners, in any order
    pub fn new(a: Point, b: Point) -> Self {
        Self {
            min: Point::new(a.x.min(b.x), a.y.min(b.y)),
            max: Point::new(a.x.max(b.x), a.y.max(b.y)),
        }
    }

    pub fn from_coords(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self::new(Point::new(min_x, min_y), Point::new(max_x, max_y))
    }

    /// Square extending `half_extent` pixels from `center` on each side
    pub fn around(center: Point, half_extent: f64) -> Self {
        let h = half_extent.abs();
        Self::from_coords(center.x - h, center.y - h, center.x + h, center.y + h)
    }

    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    pub fn center(&self) -> Point {
        Point::new(
            (self.min.x + self.max.x) / 2.0,
            (self.min.y + self.max.y) / 2.0,
        )
    }

    /// Checks if the rectangle contains a point (edges inclusive)
    pub fn contains(&self, point: &Point) -> bool {
        point.x >= self.min.x
            && point.x <= self.max.x
            && point.y >= self.min.y
            && point.y <= self.max.y
    }

    /// Checks if the rectangle intersects another (touching edges count)
    pub fn intersects(&self, other: &ScreenRect) -> bool {
        !(other.max.x < self.min.x
            || other.min.x > self.max.x
            || other.max.y < self.min.y
            || other.min.y > self.max.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_lng() {
        assert_eq!(LatLng::wrap_lng(190.0), -170.0);
        assert_eq!(LatLng::wrap_lng(-190.0), 170.0);
        assert_eq!(LatLng::wrap_lng(45.0), 45.0);
    }

    #[test]
    fn test_lon_lat_round_trip_order() {
        let c = LatLng::from_lon_lat([-70.9, 42.3]);
        assert_eq!(c.lat, 42.3);
        assert_eq!(c.lng, -70.9);
        assert_eq!(c.to_lon_lat(), [-70.9, 42.3]);
    }

    #[test]
    fn test_normalized_clamps_polar_latitude() {
        let c = LatLng::new(89.9, 370.0).normalized();
        assert!(c.lat < 85.06);
        assert!((c.lng - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_screen_rect_around_tap() {
        let rect = ScreenRect::around(Point::new(100.0, 50.0), 22.0);
        assert_eq!(rect.width(), 44.0);
        assert_eq!(rect.height(), 44.0);
        assert_eq!(rect.center(), Point::new(100.0, 50.0));
        assert!(rect.contains(&Point::new(122.0, 72.0)));
        assert!(!rect.contains(&Point::new(122.5, 50.0)));
    }

    #[test]
    fn test_screen_rect_intersects() {
        let a = ScreenRect::from_coords(0.0, 0.0, 10.0, 10.0);
        let b = ScreenRect::from_coords(10.0, 10.0, 20.0, 20.0);
        let c = ScreenRect::from_coords(10.5, 0.0, 20.0, 5.0);
        assert!(a.intersects(&b));
        assert!(!a.intersects(&c));
    }

    #[test]
    fn test_screen_rect_normalizes_corner_order() {
        let rect = ScreenRect::new(Point::new(10.0, 0.0), Point::new(0.0, 10.0));
        assert_eq!(rect.min, Point::new(0.0, 0.0));
        assert_eq!(rect.max, Point::new(10.0, 10.0));
    }
}
