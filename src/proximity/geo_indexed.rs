//! Proximity over a store whose only spatial primitive is a geo-indexed set.
//!
//! Each country owns one geo set (member = POI id) plus one JSON record per
//! POI. A query looks up matching ids in the set, then fetches records in
//! batches by explicit key.
//!
//! The store has no polygon predicate. Polygon queries pull every member of
//! the box around the center that encloses the four corners, then drop
//! candidates outside the quadrilateral on this side. That path reads far
//! more than it returns and does not scale to dense countries.

use super::{Lookup, ProximityStore, ResultStream, ensure_active, to_result};
use crate::compute::spatial::{enclosing_box, is_point_in_polygon};
use crate::error::{GeoPoiError, Result};
use crate::keys::KeySpace;
use crate::storage::{GeoHit, GeoStore};
use futures::stream::{self, StreamExt};
use geopoi_types::{GeoLocation, PointOfInterest, ProximityResult, Quadrilateral};
use rustc_hash::FxHashMap;
use std::collections::VecDeque;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

#[derive(Clone)]
pub struct GeoIndexedProximityStore {
    store: Arc<dyn GeoStore>,
    keys: KeySpace,
    batch_size: usize,
}

impl GeoIndexedProximityStore {
    pub fn new(store: Arc<dyn GeoStore>, keys: KeySpace, batch_size: usize) -> Self {
        Self {
            store,
            keys,
            batch_size: batch_size.max(1),
        }
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    fn stream(&self, country: &str, lookup: Lookup, cancel: CancellationToken) -> ResultStream {
        let state = QueryState {
            store: self.clone(),
            country: country.to_string(),
            lookup,
            cancel,
            pending: None,
            ready: VecDeque::new(),
        };

        stream::try_unfold(state, QueryState::next).boxed()
    }
}

impl ProximityStore for GeoIndexedProximityStore {
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

struct QueryState {
    store: GeoIndexedProximityStore,
    country: String,
    lookup: Lookup,
    cancel: CancellationToken,
    /// Index hits not yet fetched; `None` until the index lookup ran.
    pending: Option<VecDeque<GeoHit>>,
    ready: VecDeque<ProximityResult>,
}

impl QueryState {
    async fn next(mut self) -> Result<Option<(ProximityResult, Self)>> {
        loop {
            ensure_active(&self.cancel)?;

            if let Some(result) = self.ready.pop_front() {
                return Ok(Some((result, self)));
            }

            let Some(pending) = self.pending.as_mut() else {
                let hits = self.lookup().await?;
                self.pending = Some(hits.into());
                continue;
            };

            if pending.is_empty() {
                return Ok(None);
            }

            let take = self.store.batch_size.min(pending.len());
            let batch: Vec<GeoHit> = pending.drain(..take).collect();
            self.ready = self.fetch(batch).await?;
        }
    }

    async fn lookup(&self) -> Result<Vec<GeoHit>> {
        let set_key = self.store.keys.geo_pois_key(&self.country);
        let store = &self.store.store;

        let search = async {
            match &self.lookup {
                Lookup::Radius { center, meters } => {
                    store.geo_radius(&set_key, *center, *meters).await
                }
                Lookup::Polygon { center, quad } => {
                    let (width, height) = enclosing_box(center, quad.vertices());
                    log::warn!(
                        "Polygon query on '{}' falls back to a {:.0}m x {:.0}m box scan",
                        self.country,
                        width,
                        height
                    );
                    store.geo_search_box(&set_key, *center, width, height).await
                }
            }
        };

        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(GeoPoiError::Cancelled),
            hits = search => hits,
        }
    }

    /// Fetch one batch of records and turn the matching ones into results.
    async fn fetch(&self, batch: Vec<GeoHit>) -> Result<VecDeque<ProximityResult>> {
        let record_keys: Vec<String> = batch
            .iter()
            .map(|hit| self.store.keys.poi_key(&self.country, &hit.member))
            .collect();

        let fetched = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => return Err(GeoPoiError::Cancelled),
            fetched = self.store.store.get_many(&record_keys) => fetched?,
        };
        // A cancelled query reports `Cancelled`, never a half-read batch.
        ensure_active(&self.cancel)?;

        log::trace!(
            "Fetched {} records for '{}'",
            fetched.len(),
            self.country
        );
        let mut by_key: FxHashMap<String, _> = fetched.into_iter().collect();

        let mut results = VecDeque::with_capacity(batch.len());
        for (hit, key) in batch.into_iter().zip(record_keys) {
            let raw = by_key
                .remove(&key)
                .flatten()
                .ok_or_else(|| GeoPoiError::MissingRecord { key: key.clone() })?;
            let poi: PointOfInterest = serde_json::from_slice(&raw)?;

            if let Lookup::Polygon { quad, .. } = &self.lookup {
                if !is_point_in_polygon(&poi.location, quad) {
                    continue;
                }
            }

            results.push_back(to_result(poi, hit.distance_meters));
        }

        Ok(results)
    }
}
