use crate::point::GeoLocation;
use crate::polygon::GeoPolygon;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A country and its boundary ("geofence").
///
/// Created once during seeding and read-only afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Country {
    pub id: Uuid,
    pub name: String,
    pub geofence: GeoPolygon,
}

impl Country {
    /// Create a country with a fresh random id.
    pub fn new(name: impl Into<String>, geofence: GeoPolygon) -> Self {
        Self::with_id(Uuid::new_v4(), name, geofence)
    }

    pub fn with_id(id: Uuid, name: impl Into<String>, geofence: GeoPolygon) -> Self {
        Self {
            id,
            name: name.into(),
            geofence,
        }
    }
}

/// A point of interest, associated with exactly one country by name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointOfInterest {
    pub id: Uuid,
    pub name: String,
    pub category: String,
    pub location: GeoLocation,
    pub country: String,
}

impl PointOfInterest {
    /// Create a POI with a fresh random id.
    pub fn new(
        country: impl Into<String>,
        name: impl Into<String>,
        category: impl Into<String>,
        location: GeoLocation,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            category: category.into(),
            location,
            country: country.into(),
        }
    }
}
