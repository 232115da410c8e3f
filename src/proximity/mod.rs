//! Proximity stores: POIs of one country filtered by radius or polygon.
//!
//! Results are produced lazily. A [`ResultStream`] is finite, pull-based
//! and single-use; it checks its cancellation token on every pull and
//! stops paging the store as soon as the token fires.

use crate::error::{GeoPoiError, Result};
use futures::stream::BoxStream;
use geopoi_types::{
    GeoLocation, GeoPolygon, PointOfInterest, ProximityQuery, ProximityResult, Quadrilateral,
};
use tokio_util::sync::CancellationToken;

mod geo_indexed;
mod native;

pub use geo_indexed::GeoIndexedProximityStore;
pub use native::NativeProximityStore;

/// Results of one proximity query.
pub type ResultStream = BoxStream<'static, Result<ProximityResult>>;

pub trait ProximityStore: Send + Sync {
    /// POIs of `country` within `max_distance_meters` of `center`,
    /// nearest first.
    fn find_by_radius(
        &self,
        country: &str,
        center: GeoLocation,
        max_distance_meters: f64,
        cancel: CancellationToken,
    ) -> ResultStream;

    /// POIs of `country` inside `corners`, with distances from `center`.
    fn find_within_polygon(
        &self,
        country: &str,
        center: GeoLocation,
        corners: Quadrilateral,
        cancel: CancellationToken,
    ) -> ResultStream;

    fn find(
        &self,
        country: &str,
        query: &ProximityQuery,
        cancel: CancellationToken,
    ) -> ResultStream {
        match *query {
            ProximityQuery::Radius {
                center,
                max_distance_meters,
            } => self.find_by_radius(country, center, max_distance_meters, cancel),
            ProximityQuery::Polygon { center, corners } => {
                self.find_within_polygon(country, center, corners, cancel)
            }
        }
    }
}

/// What a query asks the index for.
#[derive(Debug, Clone)]
pub(crate) enum Lookup {
    Radius { center: GeoLocation, meters: f64 },
    /// `quad` is the closed ring built from the four corners.
    Polygon { center: GeoLocation, quad: GeoPolygon },
}

impl Lookup {
    pub(crate) fn radius(center: GeoLocation, meters: f64) -> Self {
        Self::Radius { center, meters }
    }

    pub(crate) fn polygon(center: GeoLocation, corners: &Quadrilateral) -> Self {
        Self::Polygon {
            center,
            quad: corners.to_polygon(),
        }
    }
}

pub(crate) fn ensure_active(cancel: &CancellationToken) -> Result<()> {
    if cancel.is_cancelled() {
        Err(GeoPoiError::Cancelled)
    } else {
        Ok(())
    }
}

pub(crate) fn to_result(poi: PointOfInterest, distance_meters: f64) -> ProximityResult {
    ProximityResult {
        id: poi.id,
        name: poi.name,
        category: poi.category,
        location: poi.location,
        distance_meters,
    }
}
