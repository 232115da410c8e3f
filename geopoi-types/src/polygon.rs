use crate::error::GeometryError;
use crate::point::GeoLocation;
use serde::{Deserialize, Serialize};

/// An explicitly closed ring of geographic vertices.
///
/// Invariant: at least three vertices and the last vertex equals the first.
/// Closure is never inferred; callers must repeat the first vertex.
///
/// # Examples
///
/// ```
/// use geopoi_types::{GeoLocation, GeoPolygon};
///
/// let open = vec![
///     GeoLocation::new(0.0, 0.0).unwrap(),
///     GeoLocation::new(0.0, 1.0).unwrap(),
///     GeoLocation::new(1.0, 1.0).unwrap(),
///     GeoLocation::new(1.0, 0.0).unwrap(),
/// ];
/// assert!(GeoPolygon::new(open).is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<GeoLocation>", into = "Vec<GeoLocation>")]
pub struct GeoPolygon {
    vertices: Vec<GeoLocation>,
}

impl GeoPolygon {
    pub const MIN_VERTICES: usize = 3;

    /// Build a polygon from a closed ring.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::InvalidPolygon`] when the ring has fewer than
    /// three vertices or its first and last vertices differ.
    pub fn new(vertices: Vec<GeoLocation>) -> Result<Self, GeometryError> {
        if vertices.len() < Self::MIN_VERTICES {
            return Err(GeometryError::InvalidPolygon(format!(
                "a polygon must have at least {} points, got {}",
                Self::MIN_VERTICES,
                vertices.len()
            )));
        }

        if vertices.first() != vertices.last() {
            return Err(GeometryError::InvalidPolygon(
                "the first and last (closing) points of the polygon must be the same".into(),
            ));
        }

        Ok(Self { vertices })
    }

    /// Build a polygon from raw (latitude, longitude) pairs.
    pub fn from_lat_lng(pairs: &[(f64, f64)]) -> Result<Self, GeometryError> {
        let vertices = pairs
            .iter()
            .map(|&(lat, lng)| GeoLocation::new(lat, lng))
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(vertices)
    }

    #[inline]
    pub fn vertices(&self) -> &[GeoLocation] {
        &self.vertices
    }

    /// Number of stored vertices, closing vertex included.
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Latitude/longitude extent as `(min_lat, min_lng, max_lat, max_lng)`.
    pub fn extent(&self) -> (f64, f64, f64, f64) {
        self.vertices.iter().fold(
            (f64::INFINITY, f64::INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY),
            |(min_lat, min_lng, max_lat, max_lng), v| {
                (
                    min_lat.min(v.lat()),
                    min_lng.min(v.lng()),
                    max_lat.max(v.lat()),
                    max_lng.max(v.lng()),
                )
            },
        )
    }

    /// Convert into a `geo::Polygon` with no interior rings.
    pub fn to_geo(&self) -> geo::Polygon<f64> {
        let ring: Vec<geo::Coord<f64>> = self.vertices.iter().map(|v| (*v).into()).collect();
        geo::Polygon::new(geo::LineString::from(ring), Vec::new())
    }
}

impl TryFrom<Vec<GeoLocation>> for GeoPolygon {
    type Error = GeometryError;

    fn try_from(vertices: Vec<GeoLocation>) -> Result<Self, Self::Error> {
        Self::new(vertices)
    }
}

impl From<GeoPolygon> for Vec<GeoLocation> {
    fn from(polygon: GeoPolygon) -> Self {
        polygon.vertices
    }
}

/// Four corners of an arbitrary query shape, named as a map viewport names them.
///
/// The ring is built in the order NW, SW, SE, NE and closed by repeating NW.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quadrilateral {
    pub north_west: GeoLocation,
    pub south_west: GeoLocation,
    pub south_east: GeoLocation,
    pub north_east: GeoLocation,
}

impl Quadrilateral {
    pub fn new(
        north_west: GeoLocation,
        south_west: GeoLocation,
        south_east: GeoLocation,
        north_east: GeoLocation,
    ) -> Self {
        Self {
            north_west,
            south_west,
            south_east,
            north_east,
        }
    }

    pub fn corners(&self) -> [GeoLocation; 4] {
        [
            self.north_west,
            self.south_west,
            self.south_east,
            self.north_east,
        ]
    }

    /// The closed five-vertex ring.
    pub fn to_polygon(&self) -> GeoPolygon {
        let mut vertices = self.corners().to_vec();
        vertices.push(self.north_west);
        GeoPolygon { vertices }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loc(lat: f64, lng: f64) -> GeoLocation {
        GeoLocation::new(lat, lng).unwrap()
    }

    #[test]
    fn test_closed_square_is_valid() {
        let square = GeoPolygon::from_lat_lng(&[
            (0.0, 0.0),
            (0.0, 10.0),
            (10.0, 10.0),
            (10.0, 0.0),
            (0.0, 0.0),
        ])
        .unwrap();
        assert_eq!(square.vertex_count(), 5);
        assert_eq!(square.extent(), (0.0, 0.0, 10.0, 10.0));
    }

    #[test]
    fn test_two_points_rejected() {
        let err = GeoPolygon::new(vec![loc(0.0, 0.0), loc(0.0, 0.0)]).unwrap_err();
        assert!(matches!(err, GeometryError::InvalidPolygon(_)));
    }

    #[test]
    fn test_unclosed_ring_rejected() {
        let err = GeoPolygon::new(vec![
            loc(0.0, 0.0),
            loc(0.0, 1.0),
            loc(1.0, 1.0),
            loc(1.0, 0.0),
        ])
        .unwrap_err();
        assert!(matches!(err, GeometryError::InvalidPolygon(_)));
    }

    #[test]
    fn test_quadrilateral_ring_is_closed() {
        let quad = Quadrilateral::new(loc(1.0, 0.0), loc(0.0, 0.0), loc(0.0, 1.0), loc(1.0, 1.0));
        let ring = quad.to_polygon();
        assert_eq!(ring.vertex_count(), 5);
        assert_eq!(ring.vertices().first(), ring.vertices().last());
        assert!(GeoPolygon::new(ring.vertices().to_vec()).is_ok());
    }

    #[test]
    fn test_geo_conversion() {
        let square =
            GeoPolygon::from_lat_lng(&[(0.0, 0.0), (0.0, 2.0), (1.0, 2.0), (0.0, 0.0)]).unwrap();
        let poly = square.to_geo();
        assert_eq!(poly.exterior().0.len(), 4);
        assert_eq!(poly.exterior().0[1].x, 2.0);
    }

    #[test]
    fn test_deserialize_rejects_open_ring() {
        let json = r#"[{"lat":0.0,"lng":0.0},{"lat":0.0,"lng":1.0},{"lat":1.0,"lng":1.0}]"#;
        assert!(serde_json::from_str::<GeoPolygon>(json).is_err());
    }
}
