//! Proximity over an in-process spatial index with a native polygon
//! predicate.

use super::{Lookup, ProximityStore, ResultStream, ensure_active, to_result};
use crate::error::{GeoPoiError, Result};
use crate::storage::GeoSet;
use futures::stream::{self, StreamExt};
use geopoi_types::{GeoLocation, PointOfInterest, ProximityResult, Quadrilateral};
use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

#[derive(Default)]
struct CountryPois {
    index: GeoSet,
    records: FxHashMap<String, PointOfInterest>,
}

/// Per-country R*-tree plus records, shared between clones.
///
/// A POI is written to the index and the record map under one lock, so a
/// reader never sees one without the other.
#[derive(Clone, Default)]
pub struct NativeProximityStore {
    countries: Arc<RwLock<FxHashMap<String, CountryPois>>>,
}

impl NativeProximityStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a POI under its own country.
    pub fn insert(&self, poi: PointOfInterest) {
        let id = poi.id.to_string();
        let mut countries = self.countries.write();
        let entry = countries.entry(poi.country.clone()).or_default();
        entry.index.add(id.clone(), poi.location);
        entry.records.insert(id, poi);
    }

    pub fn remove(&self, country: &str, id: &str) -> bool {
        let mut countries = self.countries.write();
        let Some(entry) = countries.get_mut(country) else {
            return false;
        };
        entry.index.remove(id);
        entry.records.remove(id).is_some()
    }

    pub fn poi_count(&self, country: &str) -> usize {
        self.countries
            .read()
            .get(country)
            .map_or(0, |entry| entry.records.len())
    }

    /// Evaluate `lookup` against one consistent view of `country`.
    fn snapshot(&self, country: &str, lookup: &Lookup) -> Result<Vec<ProximityResult>> {
        let countries = self.countries.read();
        let Some(entry) = countries.get(country) else {
            return Ok(Vec::new());
        };

        let hits = match lookup {
            Lookup::Radius { center, meters } => entry.index.radius(center, *meters),
            Lookup::Polygon { center, quad } => entry.index.within_polygon(quad, center),
        };

        hits.into_iter()
            .map(|hit| {
                let poi = entry.records.get(&hit.member).cloned().ok_or_else(|| {
                    GeoPoiError::MissingRecord {
                        key: format!("{}:{}", country, hit.member),
                    }
                })?;
                Ok(to_result(poi, hit.distance_meters))
            })
            .collect()
    }

    fn stream(&self, country: &str, lookup: Lookup, cancel: CancellationToken) -> ResultStream {
        let store = self.clone();
        let country = country.to_string();

        stream::try_unfold(None, move |pending: Option<std::vec::IntoIter<ProximityResult>>| {
            let store = store.clone();
            let country = country.clone();
            let lookup = lookup.clone();
            let cancel = cancel.clone();
            async move {
                ensure_active(&cancel)?;
                let mut pending = match pending {
                    Some(pending) => pending,
                    None => store.snapshot(&country, &lookup)?.into_iter(),
                };
                Ok::<_, GeoPoiError>(pending.next().map(|result| (result, Some(pending))))
            }
        })
        .boxed()
    }
}

impl ProximityStore for NativeProximityStore {
    fn find_by_radius(
        &self,
        country: &str,
        center: GeoLocation,
        max_distance_meters: f64,
        cancel: CancellationToken,
    ) -> ResultStream {
        self.stream(country, Lookup::radius(center, max_distance_meters), cancel)
    }

    fn find_within_polygon(
        &self,
        country: &str,
        center: GeoLocation,
        corners: Quadrilateral,
        cancel: CancellationToken,
    ) -> ResultStream {
        self.stream(country, Lookup::polygon(center, &corners), cancel)
    }
}
