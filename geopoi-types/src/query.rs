use crate::point::GeoLocation;
use crate::polygon::Quadrilateral;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A per-request proximity filter. Never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProximityQuery {
    /// POIs no further than `max_distance_meters` from `center`.
    Radius {
        center: GeoLocation,
        max_distance_meters: f64,
    },
    /// POIs inside the closed quadrilateral. `center` resolves the country
    /// and is the reference for the reported distance; it does not filter.
    Polygon {
        center: GeoLocation,
        corners: Quadrilateral,
    },
}

impl ProximityQuery {
    /// The point used for country resolution and distance annotation.
    pub fn reference_point(&self) -> GeoLocation {
        match self {
            Self::Radius { center, .. } | Self::Polygon { center, .. } => *center,
        }
    }
}

/// One POI matching a proximity query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProximityResult {
    pub id: Uuid,
    pub name: String,
    pub category: String,
    pub location: GeoLocation,
    /// Haversine distance from the query's reference point, in meters.
    pub distance_meters: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_point() {
        let center = GeoLocation::new(5.0, 5.0).unwrap();
        let radius = ProximityQuery::Radius {
            center,
            max_distance_meters: 10.0,
        };
        assert_eq!(radius.reference_point(), center);

        let corner = GeoLocation::new(6.0, 6.0).unwrap();
        let polygon = ProximityQuery::Polygon {
            center,
            corners: Quadrilateral::new(corner, corner, corner, corner),
        };
        assert_eq!(polygon.reference_point(), center);
    }
}
