//! Transport request and response shapes, camelCase on the wire.

use crate::compute::validation;
use crate::error::Result;
use geopoi_types::{ProximityQuery, ProximityResult};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Radius search around a point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoiRequest {
    pub lat: f64,
    pub lng: f64,
    pub distance_meters: f64,
}

impl PoiRequest {
    pub fn to_query(&self) -> Result<ProximityQuery> {
        let center = validation::location("center", self.lat, self.lng)?;
        validation::validate_radius(self.distance_meters)?;
        Ok(ProximityQuery::Radius {
            center,
            max_distance_meters: self.distance_meters,
        })
    }
}

/// Search inside a quadrilateral given by its four corners.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoiRequestWithin {
    pub center_lat: f64,
    pub center_lng: f64,
    pub nw_lat: f64,
    pub nw_lng: f64,
    pub sw_lat: f64,
    pub sw_lng: f64,
    pub se_lat: f64,
    pub se_lng: f64,
    pub ne_lat: f64,
    pub ne_lng: f64,
}

impl PoiRequestWithin {
    pub fn to_query(&self) -> Result<ProximityQuery> {
        let center = validation::location("center", self.center_lat, self.center_lng)?;
        let corners = validation::quadrilateral([
            (self.nw_lat, self.nw_lng),
            (self.sw_lat, self.sw_lng),
            (self.se_lat, self.se_lng),
            (self.ne_lat, self.ne_lng),
        ])?;
        Ok(ProximityQuery::Polygon { center, corners })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoiResponse {
    pub id: Uuid,
    pub name: String,
    pub category: String,
    pub lat: f64,
    pub lng: f64,
    /// Meters from the query's reference point.
    pub distance_meters: f64,
}

impl From<ProximityResult> for PoiResponse {
    fn from(result: ProximityResult) -> Self {
        Self {
            id: result.id,
            name: result.name,
            category: result.category,
            lat: result.location.lat(),
            lng: result.location.lng(),
            distance_meters: result.distance_meters,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_wire_names() {
        let request: PoiRequestWithin = serde_json::from_str(
            r#"{"centerLat":5,"centerLng":5,"nwLat":6,"nwLng":4,"swLat":4,"swLng":4,
                "seLat":4,"seLng":6,"neLat":6,"neLng":6}"#,
        )
        .unwrap();
        match request.to_query().unwrap() {
            ProximityQuery::Polygon { center, corners } => {
                assert_eq!(center.lat(), 5.0);
                assert_eq!(corners.north_west.lng(), 4.0);
                assert_eq!(corners.south_east.lat(), 4.0);
            }
            other => panic!("unexpected query {:?}", other),
        }
    }

    #[test]
    fn test_radius_request_validation() {
        let ok = PoiRequest {
            lat: 5.0,
            lng: 5.0,
            distance_meters: 1.0,
        };
        assert!(ok.to_query().is_ok());

        let negative = PoiRequest {
            distance_meters: -1.0,
            ..ok
        };
        assert!(negative.to_query().is_err());

        let off_globe = PoiRequest { lat: 91.0, ..ok };
        assert!(off_globe.to_query().is_err());
    }

    #[test]
    fn test_response_wire_names() {
        let response = PoiResponse {
            id: Uuid::nil(),
            name: "Cafe".into(),
            category: "Food".into(),
            lat: 5.0,
            lng: 5.0,
            distance_meters: 0.0,
        };
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["category"], "Food");
        assert_eq!(json["distanceMeters"], 0.0);
        assert!(json.get("distance_meters").is_none());
    }
}
