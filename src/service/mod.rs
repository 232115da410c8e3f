//! Query façade.
//!
//! Resolves the country of a query's reference point, then hands the query
//! to that country's proximity store. A point outside every country is a
//! normal outcome and yields an empty stream.

use crate::backend::Backend;
use crate::compute::validation;
use crate::error::{GeoPoiError, Result};
use crate::proximity::ResultStream;
use futures::stream::{self, BoxStream, StreamExt, TryStreamExt};
use geopoi_types::{GeoLocation, ProximityQuery};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

mod dto;

pub use dto::{PoiRequest, PoiRequestWithin, PoiResponse};

/// Transport-shaped results.
pub type ResponseStream = BoxStream<'static, Result<PoiResponse>>;

/// Cheap to clone; clones share the backend.
#[derive(Clone)]
pub struct PoiService {
    backend: Arc<Backend>,
}

impl PoiService {
    pub fn new(backend: Backend) -> Self {
        Self {
            backend: Arc::new(backend),
        }
    }

    pub fn backend(&self) -> &Backend {
        &self.backend
    }

    /// Name of the country containing `point`, if any.
    pub async fn find_country_name(
        &self,
        point: GeoLocation,
        cancel: &CancellationToken,
    ) -> Result<Option<String>> {
        let country = self.backend.country_index().resolve(point, cancel).await?;
        log::debug!("Point {} resolved to {:?}", point, country);
        Ok(country)
    }

    /// Run `query` in the country containing its reference point.
    ///
    /// Nothing happens until the stream is first polled.
    pub fn find(&self, query: ProximityQuery, cancel: CancellationToken) -> ResultStream {
        if let ProximityQuery::Radius {
            max_distance_meters,
            ..
        } = query
        {
            if let Err(e) = validation::validate_radius(max_distance_meters) {
                return stream::once(async move { Err(e) }).boxed();
            }
        }

        let service = self.clone();
        stream::once(async move {
            let reference = query.reference_point();
            let country = service.find_country_name(reference, &cancel).await?;

            Ok::<_, GeoPoiError>(match country {
                Some(country) => service.backend.proximity().find(&country, &query, cancel),
                None => stream::empty().boxed(),
            })
        })
        .try_flatten()
        .boxed()
    }

    pub fn find_pois_by_radius(
        &self,
        request: &PoiRequest,
        cancel: CancellationToken,
    ) -> Result<ResponseStream> {
        let query = request.to_query()?;
        Ok(self.find(query, cancel).map_ok(PoiResponse::from).boxed())
    }

    pub fn find_pois_within_polygon(
        &self,
        request: &PoiRequestWithin,
        cancel: CancellationToken,
    ) -> Result<ResponseStream> {
        let query = request.to_query()?;
        Ok(self.find(query, cancel).map_ok(PoiResponse::from).boxed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::NativeBackend;
    use crate::keys::KeySpace;
    use crate::seed::SeedData;
    use geopoi_types::{Country, GeoPolygon, PointOfInterest};

    fn service() -> PoiService {
        let fence = GeoPolygon::from_lat_lng(&[
            (0.0, 0.0),
            (0.0, 10.0),
            (10.0, 10.0),
            (10.0, 0.0),
            (0.0, 0.0),
        ])
        .unwrap();
        let data = SeedData::new(
            vec![Country::new("Atlantis", fence)],
            vec![PointOfInterest::new(
                "Atlantis",
                "Cafe",
                "Food",
                GeoLocation::new(5.0, 5.0).unwrap(),
            )],
        );
        let backend = NativeBackend::seeded(&data, &KeySpace::default()).unwrap();
        PoiService::new(Backend::Native(backend))
    }

    #[tokio::test]
    async fn test_find_country_name() {
        let service = service();
        let cancel = CancellationToken::new();
        let inside = GeoLocation::new(5.0, 5.0).unwrap();
        let outside = GeoLocation::new(50.0, 50.0).unwrap();

        assert_eq!(
            service.find_country_name(inside, &cancel).await.unwrap().as_deref(),
            Some("Atlantis")
        );
        assert_eq!(service.find_country_name(outside, &cancel).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_invalid_radius_fails_first_pull() {
        let query = ProximityQuery::Radius {
            center: GeoLocation::new(5.0, 5.0).unwrap(),
            max_distance_meters: f64::NAN,
        };
        let err = service()
            .find(query, CancellationToken::new())
            .try_collect::<Vec<_>>()
            .await
            .unwrap_err();
        assert!(matches!(err, GeoPoiError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_radius_request() {
        let request = PoiRequest {
            lat: 5.0,
            lng: 5.0,
            distance_meters: 1.0,
        };
        let responses: Vec<_> = service()
            .find_pois_by_radius(&request, CancellationToken::new())
            .unwrap()
            .try_collect()
            .await
            .unwrap();
        assert_eq!(responses.len(), 1);
        assert_eq!(responses[0].name, "Cafe");
        assert_eq!(responses[0].distance_meters, 0.0);
    }
}
