//! Spherical-Earth geometry used by every backend.
//!
//! All functions take (latitude, longitude) values. Accuracy is bounded by
//! the spherical approximation; the anti-meridian is not handled.

use geopoi_types::{GeoLocation, GeoPolygon};

/// Mean Earth radius used for every distance, in meters.
pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// Decimal places kept in reported distances.
pub const DISTANCE_DECIMALS: i32 = 4;

/// Great-circle distance in meters, rounded to [`DISTANCE_DECIMALS`] places.
///
/// Symmetric, and zero for identical points. Precision degrades (but stays
/// finite) for exactly antipodal points.
///
/// # Examples
///
/// ```
/// use geopoi::compute::spatial::haversine_distance;
/// use geopoi_types::GeoLocation;
///
/// let paris = GeoLocation::new(48.8566, 2.3522).unwrap();
/// let london = GeoLocation::new(51.5074, -0.1278).unwrap();
/// let d = haversine_distance(&paris, &london);
/// assert!((d - 343_556.0).abs() < 200.0);
/// ```
pub fn haversine_distance(a: &GeoLocation, b: &GeoLocation) -> f64 {
    round_distance(haversine_meters(a.lat(), a.lng(), b.lat(), b.lng()))
}

/// Unrounded haversine distance, for filtering.
pub(crate) fn haversine_meters(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lng = (lng2 - lng1).to_radians();

    let half_lat = (d_lat / 2.0).sin();
    let half_lng = (d_lng / 2.0).sin();

    let h = half_lat * half_lat
        + lat1.to_radians().cos() * lat2.to_radians().cos() * half_lng * half_lng;

    // Rounding can push h marginally above 1 near antipodes.
    2.0 * EARTH_RADIUS_METERS * h.clamp(0.0, 1.0).sqrt().asin()
}

pub fn round_distance(meters: f64) -> f64 {
    let scale = 10f64.powi(DISTANCE_DECIMALS);
    (meters * scale).round() / scale
}

/// Ray-casting containment test against a polygon's vertex ring.
///
/// A point exactly on an edge or vertex has implementation-defined
/// inclusion.
///
/// # Examples
///
/// ```
/// use geopoi::compute::spatial::is_point_in_polygon;
/// use geopoi_types::{GeoLocation, GeoPolygon};
///
/// let square = GeoPolygon::from_lat_lng(&[
///     (0.0, 0.0), (0.0, 10.0), (10.0, 10.0), (10.0, 0.0), (0.0, 0.0),
/// ]).unwrap();
///
/// assert!(is_point_in_polygon(&GeoLocation::new(5.0, 5.0).unwrap(), &square));
/// assert!(!is_point_in_polygon(&GeoLocation::new(50.0, 50.0).unwrap(), &square));
/// ```
pub fn is_point_in_polygon(point: &GeoLocation, polygon: &GeoPolygon) -> bool {
    is_point_in_ring(point, polygon.vertices())
}

/// Ray casting over a raw vertex slice. O(n), no allocation.
///
/// A horizontal ray is cast east from `point`; each edge whose latitude span
/// strictly straddles the point's latitude and which lies east of the point
/// toggles the result.
pub fn is_point_in_ring(point: &GeoLocation, ring: &[GeoLocation]) -> bool {
    let (px, py) = (point.lng(), point.lat());
    let mut inside = false;

    let Some(mut prev) = ring.last() else {
        return false;
    };

    for current in ring {
        let (xi, yi) = (current.lng(), current.lat());
        let (xj, yj) = (prev.lng(), prev.lat());

        // (yi > py) != (yj > py) also rules out horizontal edges, so the
        // division below never sees yj == yi.
        if (yi > py) != (yj > py) && px < (xj - xi) * (py - yi) / (yj - yi) + xi {
            inside = !inside;
        }

        prev = current;
    }

    inside
}

/// Arc length along a meridian between two latitudes, in meters.
pub(crate) fn meridian_distance(lat1: f64, lat2: f64) -> f64 {
    EARTH_RADIUS_METERS * (lat2 - lat1).abs().to_radians()
}

/// Arc length along the parallel at `lat` between two longitudes, in meters.
pub(crate) fn parallel_distance(lat: f64, lng1: f64, lng2: f64) -> f64 {
    EARTH_RADIUS_METERS * lat.to_radians().cos().abs() * (lng2 - lng1).abs().to_radians()
}

/// Degrees of latitude spanned by `meters` along a meridian.
pub(crate) fn meters_to_lat_degrees(meters: f64) -> f64 {
    (meters / EARTH_RADIUS_METERS).to_degrees()
}

/// Degrees of longitude spanned by `meters` along the parallel at `lat`.
///
/// Returns a full turn (360) when the parallel degenerates near a pole.
pub(crate) fn meters_to_lng_degrees(meters: f64, lat: f64) -> f64 {
    let cos_lat = lat.to_radians().cos().abs();
    if cos_lat < 1e-12 {
        return 360.0;
    }
    (meters / (EARTH_RADIUS_METERS * cos_lat)).to_degrees().min(360.0)
}

/// Width and height in meters of the box centered on `center` that encloses
/// every corner.
///
/// Heights are measured along the meridian and widths along the center's
/// parallel, matching how box searches convert meters back to degrees.
pub fn enclosing_box(center: &GeoLocation, corners: &[GeoLocation]) -> (f64, f64) {
    let (half_width, half_height) =
        corners
            .iter()
            .fold((0.0_f64, 0.0_f64), |(width, height), corner| {
                (
                    width.max(parallel_distance(center.lat(), center.lng(), corner.lng())),
                    height.max(meridian_distance(center.lat(), corner.lat())),
                )
            });

    (2.0 * half_width, 2.0 * half_height)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loc(lat: f64, lng: f64) -> GeoLocation {
        GeoLocation::new(lat, lng).unwrap()
    }

    fn square() -> GeoPolygon {
        GeoPolygon::from_lat_lng(&[
            (0.0, 0.0),
            (0.0, 10.0),
            (10.0, 10.0),
            (10.0, 0.0),
            (0.0, 0.0),
        ])
        .unwrap()
    }

    #[test]
    fn test_paris_london() {
        let paris = loc(48.8566, 2.3522);
        let london = loc(51.5074, -0.1278);
        let d = haversine_distance(&paris, &london);
        assert!((d - 343_556.0).abs() < 200.0, "got {}", d);
    }

    #[test]
    fn test_distance_is_symmetric() {
        let pairs = [
            (loc(48.8566, 2.3522), loc(51.5074, -0.1278)),
            (loc(-33.8688, 151.2093), loc(40.7128, -74.0060)),
            (loc(0.0, 0.0), loc(0.0, 179.9)),
            (loc(89.9, 10.0), loc(-89.9, -170.0)),
        ];
        for (a, b) in pairs {
            assert_eq!(haversine_distance(&a, &b), haversine_distance(&b, &a));
        }
    }

    #[test]
    fn test_distance_to_self_is_zero() {
        for p in [loc(0.0, 0.0), loc(5.0, 5.0), loc(-90.0, 180.0), loc(45.5, -73.6)] {
            assert_eq!(haversine_distance(&p, &p), 0.0);
        }
    }

    #[test]
    fn test_distance_is_monotonic() {
        let origin = loc(0.0, 0.0);
        let near = haversine_distance(&origin, &loc(0.0, 1.0));
        let far = haversine_distance(&origin, &loc(0.0, 2.0));
        assert!(near > 0.0);
        assert!(far > near);
    }

    #[test]
    fn test_antipodes_are_finite() {
        let d = haversine_distance(&loc(0.0, 0.0), &loc(0.0, 180.0));
        assert!(d.is_finite());
        assert!((d - std::f64::consts::PI * EARTH_RADIUS_METERS).abs() < 1.0);
    }

    #[test]
    fn test_distance_rounded_to_four_places() {
        let d = haversine_distance(&loc(0.0, 0.0), &loc(0.0, 1.0));
        assert_eq!(d, round_distance(d));
        assert!((d - 111_194.9266).abs() < 1e-6);
    }

    #[test]
    fn test_square_containment() {
        let polygon = square();
        assert!(is_point_in_polygon(&loc(5.0, 5.0), &polygon));
        assert!(is_point_in_polygon(&loc(0.5, 9.5), &polygon));
        assert!(!is_point_in_polygon(&loc(50.0, 50.0), &polygon));
        assert!(!is_point_in_polygon(&loc(5.0, -1.0), &polygon));
        assert!(!is_point_in_polygon(&loc(-1.0, 5.0), &polygon));
    }

    #[test]
    fn test_concave_polygon() {
        // U shape opening north; the notch is outside.
        let u = GeoPolygon::from_lat_lng(&[
            (0.0, 0.0),
            (0.0, 3.0),
            (3.0, 3.0),
            (3.0, 2.0),
            (1.0, 2.0),
            (1.0, 1.0),
            (3.0, 1.0),
            (3.0, 0.0),
            (0.0, 0.0),
        ])
        .unwrap();

        assert!(is_point_in_polygon(&loc(2.0, 0.5), &u));
        assert!(is_point_in_polygon(&loc(2.0, 2.5), &u));
        assert!(is_point_in_polygon(&loc(0.5, 1.5), &u));
        assert!(!is_point_in_polygon(&loc(2.0, 1.5), &u));
    }

    #[test]
    fn test_empty_ring() {
        assert!(!is_point_in_ring(&loc(0.0, 0.0), &[]));
    }

    #[test]
    fn test_enclosing_box_covers_corners() {
        let center = loc(45.0, 5.0);
        let corners = [loc(46.0, 4.0), loc(44.0, 4.0), loc(44.0, 6.5), loc(46.0, 6.5)];
        let (width, height) = enclosing_box(&center, &corners);

        let half_lat = meters_to_lat_degrees(height / 2.0);
        let half_lng = meters_to_lng_degrees(width / 2.0, center.lat());
        assert!((half_lat - 1.0).abs() < 1e-9);
        assert!((half_lng - 1.5).abs() < 1e-9);
    }

    #[test]
    fn test_lng_degrees_near_pole() {
        assert_eq!(meters_to_lng_degrees(1000.0, 90.0), 360.0);
        assert!(meters_to_lng_degrees(1000.0, 0.0) < 0.01);
    }
}
