use futures::TryStreamExt;
use geopoi::prelude::*;
use geopoi::{BackendKind, CountryIndexStrategy, ProximityQuery};
use tokio_util::sync::CancellationToken;

fn configs() -> Vec<Config> {
    vec![
        Config::default().with_backend(BackendKind::Native),
        Config::default().with_country_index(CountryIndexStrategy::Scripted),
        Config::default().with_country_index(CountryIndexStrategy::InMemory),
    ]
}

fn loc(lat: f64, lng: f64) -> GeoLocation {
    GeoLocation::new(lat, lng).unwrap()
}

/// A U-shaped country open to the north: the notch between the arms is
/// outside it.
fn horseshoe() -> Country {
    let fence = GeoPolygon::from_lat_lng(&[
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
    Country::new("Horseshoe", fence)
}

/// A 24-gon: enough vertices that field names sort differently as text.
fn round_country() -> Country {
    let mut ring: Vec<(f64, f64)> = (0..24)
        .map(|i| {
            let angle = f64::from(i) * std::f64::consts::TAU / 24.0;
            (-20.0 + 2.0 * angle.sin(), 40.0 + 2.0 * angle.cos())
        })
        .collect();
    ring.push(ring[0]);
    Country::new("Roundland", GeoPolygon::from_lat_lng(&ring).unwrap())
}

async fn build(config: Config) -> PoiService {
    ServiceBuilder::new()
        .config(config)
        .seed_data(SeedData::new(vec![horseshoe(), round_country()], Vec::new()))
        .build()
        .await
        .unwrap()
}

#[tokio::test]
async fn test_concave_geofence() {
    for config in configs() {
        let service = build(config.clone()).await;
        let cancel = CancellationToken::new();

        let arm = service.find_country_name(loc(2.0, 0.5), &cancel).await.unwrap();
        assert_eq!(arm.as_deref(), Some("Horseshoe"), "{:?}", config);

        let notch = service.find_country_name(loc(2.0, 1.5), &cancel).await.unwrap();
        assert_eq!(notch, None, "{:?}", config);
    }
}

#[tokio::test]
async fn test_many_vertex_geofence() {
    for config in configs() {
        let service = build(config.clone()).await;
        let cancel = CancellationToken::new();

        let center = service.find_country_name(loc(-20.0, 40.0), &cancel).await.unwrap();
        assert_eq!(center.as_deref(), Some("Roundland"), "{:?}", config);

        let beyond = service.find_country_name(loc(-20.0, 42.5), &cancel).await.unwrap();
        assert_eq!(beyond, None, "{:?}", config);
    }
}

#[tokio::test]
async fn test_country_without_pois() {
    for config in configs() {
        let service = build(config.clone()).await;
        let found: Vec<_> = service
            .find(
                ProximityQuery::Radius {
                    center: loc(-20.0, 40.0),
                    max_distance_meters: 100_000.0,
                },
                CancellationToken::new(),
            )
            .try_collect()
            .await
            .unwrap();
        assert!(found.is_empty(), "{:?}", config);
    }
}

#[tokio::test]
async fn test_zero_radius_matches_exact_point() {
    for config in configs() {
        let poi = PointOfInterest::new("Roundland", "Well", "Water", loc(-20.0, 40.0));
        let service = ServiceBuilder::new()
            .config(config.clone())
            .seed_data(SeedData::new(vec![round_country()], vec![poi]))
            .build()
            .await
            .unwrap();

        let found: Vec<_> = service
            .find(
                ProximityQuery::Radius {
                    center: loc(-20.0, 40.0),
                    max_distance_meters: 0.0,
                },
                CancellationToken::new(),
            )
            .try_collect()
            .await
            .unwrap();
        assert_eq!(found.len(), 1, "{:?}", config);
    }
}

#[tokio::test]
async fn test_radius_limit_matches_reported_distance() {
    for config in configs() {
        let poi = PointOfInterest::new("Roundland", "Kiosk", "Shop", loc(-20.0, 40.0000003));
        let service = ServiceBuilder::new()
            .config(config.clone())
            .seed_data(SeedData::new(vec![round_country()], vec![poi]))
            .build()
            .await
            .unwrap();

        for (limit, expected) in [(0.0313, 1), (0.0312, 0)] {
            let found: Vec<_> = service
                .find(
                    ProximityQuery::Radius {
                        center: loc(-20.0, 40.0),
                        max_distance_meters: limit,
                    },
                    CancellationToken::new(),
                )
                .try_collect()
                .await
                .unwrap();
            assert_eq!(found.len(), expected, "{:?} at {}", config, limit);
            if let Some(hit) = found.first() {
                assert_eq!(hit.distance_meters, 0.0313, "{:?}", config);
            }
        }
    }
}

#[test]
fn test_haversine_reference_values() {
    let paris = loc(48.8566, 2.3522);
    let london = loc(51.5074, -0.1278);
    let d = haversine_distance(&paris, &london);
    assert!((d - 343_556.0).abs() < 200.0);
    assert_eq!(d, haversine_distance(&london, &paris));
    assert_eq!(d, (d * 10_000.0).round() / 10_000.0);
}
