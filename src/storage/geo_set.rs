//! Geo-indexed member sets.
//!
//! A [`GeoSet`] maps member names to locations and answers radius and box
//! searches natively through an R*-tree. Polygon containment is *not* part
//! of what the emulated store exposes; [`GeoSet::within_polygon`] exists
//! for the native backend only.

use crate::compute::spatial::algorithms::{
    DISTANCE_DECIMALS, haversine_meters, meters_to_lat_degrees, meters_to_lng_degrees,
    round_distance,
};
use geo::Contains;
use geopoi_types::{GeoLocation, GeoPolygon};
use rstar::{AABB, RTree, RTreeObject};
use rustc_hash::FxHashMap;
use std::cmp::Ordering;

/// One member as stored in the R*-tree (x = longitude, y = latitude).
#[derive(Debug, Clone, PartialEq)]
pub struct GeoMember {
    pub member: String,
    pub location: GeoLocation,
}

impl RTreeObject for GeoMember {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point([self.location.lng(), self.location.lat()])
    }
}

/// A member matched by a search, with its distance from the search center.
#[derive(Debug, Clone, PartialEq)]
pub struct GeoHit {
    pub member: String,
    pub location: GeoLocation,
    /// Meters, rounded like every reported distance.
    pub distance_meters: f64,
}

#[derive(Default)]
pub struct GeoSet {
    tree: RTree<GeoMember>,
    members: FxHashMap<String, GeoLocation>,
}

impl std::fmt::Debug for GeoSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeoSet")
            .field("members", &self.members.len())
            .finish()
    }
}

impl GeoSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Insert or move a member. Returns `true` if the member is new.
    pub fn add(&mut self, member: impl Into<String>, location: GeoLocation) -> bool {
        let member = member.into();
        let previous = self.members.insert(member.clone(), location);

        if let Some(old) = previous {
            self.tree.remove(&GeoMember {
                member: member.clone(),
                location: old,
            });
        }

        self.tree.insert(GeoMember { member, location });
        previous.is_none()
    }

    pub fn remove(&mut self, member: &str) -> bool {
        match self.members.remove(member) {
            Some(location) => {
                self.tree.remove(&GeoMember {
                    member: member.to_string(),
                    location,
                });
                true
            }
            None => false,
        }
    }

    pub fn position(&self, member: &str) -> Option<GeoLocation> {
        self.members.get(member).copied()
    }

    /// Members within `meters` of `center`, nearest first.
    ///
    /// The limit applies to the reported (rounded) distance, so a member
    /// reported at exactly `meters` is included.
    pub fn radius(&self, center: &GeoLocation, meters: f64) -> Vec<GeoHit> {
        // Raw distances up to half a rounding step past the limit still qualify.
        let reach = meters + 0.5 / 10f64.powi(DISTANCE_DECIMALS);
        let d_lat = meters_to_lat_degrees(reach);
        let min_lat = (center.lat() - d_lat).max(GeoLocation::MIN_LAT);
        let max_lat = (center.lat() + d_lat).min(GeoLocation::MAX_LAT);

        // A band touching a pole covers every longitude.
        let d_lng = if min_lat <= GeoLocation::MIN_LAT || max_lat >= GeoLocation::MAX_LAT {
            360.0
        } else {
            meters_to_lng_degrees(reach, min_lat.abs().max(max_lat.abs()))
        };

        let envelope = AABB::from_corners(
            [center.lng() - d_lng, min_lat],
            [center.lng() + d_lng, max_lat],
        );

        let hits = self
            .tree
            .locate_in_envelope(&envelope)
            .filter_map(|candidate| {
                let distance = haversine_meters(
                    center.lat(),
                    center.lng(),
                    candidate.location.lat(),
                    candidate.location.lng(),
                );
                (round_distance(distance) <= meters).then(|| hit(candidate, distance))
            })
            .collect();

        sorted(hits)
    }

    /// Members inside the `width` x `height` meter box centered on `center`,
    /// nearest first.
    pub fn search_box(&self, center: &GeoLocation, width: f64, height: f64) -> Vec<GeoHit> {
        let d_lat = meters_to_lat_degrees(height / 2.0);
        let d_lng = meters_to_lng_degrees(width / 2.0, center.lat());

        let envelope = AABB::from_corners(
            [center.lng() - d_lng, center.lat() - d_lat],
            [center.lng() + d_lng, center.lat() + d_lat],
        );

        let hits = self
            .tree
            .locate_in_envelope(&envelope)
            .map(|candidate| hit(candidate, distance_from(center, &candidate.location)))
            .collect();

        sorted(hits)
    }

    /// Members strictly inside `polygon`, with distances from `reference`.
    pub fn within_polygon(&self, polygon: &GeoPolygon, reference: &GeoLocation) -> Vec<GeoHit> {
        let (min_lat, min_lng, max_lat, max_lng) = polygon.extent();
        let envelope = AABB::from_corners([min_lng, min_lat], [max_lng, max_lat]);
        let shape = polygon.to_geo();

        let hits = self
            .tree
            .locate_in_envelope(&envelope)
            .filter(|candidate| shape.contains(&candidate.location.to_geo()))
            .map(|candidate| hit(candidate, distance_from(reference, &candidate.location)))
            .collect();

        sorted(hits)
    }
}

fn distance_from(a: &GeoLocation, b: &GeoLocation) -> f64 {
    haversine_meters(a.lat(), a.lng(), b.lat(), b.lng())
}

fn hit(member: &GeoMember, distance: f64) -> GeoHit {
    GeoHit {
        member: member.member.clone(),
        location: member.location,
        distance_meters: round_distance(distance),
    }
}

fn sorted(mut hits: Vec<GeoHit>) -> Vec<GeoHit> {
    hits.sort_by(|a, b| {
        a.distance_meters
            .partial_cmp(&b.distance_meters)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.member.cmp(&b.member))
    });
    hits
}
