//! Binary packing of geofence vertices.
//!
//! A geofence is stored as one hash per country. Field names are 1-based
//! vertex indexes; each value is 16 bytes: latitude then longitude, both
//! little-endian IEEE-754 `f64`.

use crate::error::{GeoPoiError, Result};
use bytes::{Buf, BufMut, Bytes, BytesMut};
use geopoi_types::{GeoLocation, GeoPolygon};

pub const VERTEX_BYTES: usize = 16;

pub fn encode_vertex(vertex: &GeoLocation) -> Bytes {
    let mut buf = BytesMut::with_capacity(VERTEX_BYTES);
    buf.put_f64_le(vertex.lat());
    buf.put_f64_le(vertex.lng());
    buf.freeze()
}

/// Decodes one vertex; `key` and `field` only label errors.
pub fn decode_vertex(key: &str, field: &str, mut raw: &[u8]) -> Result<GeoLocation> {
    if raw.len() != VERTEX_BYTES {
        return Err(GeoPoiError::CorruptVertex {
            key: key.to_string(),
            field: field.to_string(),
            reason: format!("expected {} bytes, got {}", VERTEX_BYTES, raw.len()),
        });
    }

    let lat = raw.get_f64_le();
    let lng = raw.get_f64_le();

    GeoLocation::new(lat, lng).map_err(|e| GeoPoiError::CorruptVertex {
        key: key.to_string(),
        field: field.to_string(),
        reason: e.to_string(),
    })
}

/// Hash fields for every vertex of `polygon`, closing vertex included.
pub fn encode_polygon(polygon: &GeoPolygon) -> Vec<(String, Bytes)> {
    polygon
        .vertices()
        .iter()
        .enumerate()
        .map(|(idx, vertex)| ((idx + 1).to_string(), encode_vertex(vertex)))
        .collect()
}

/// Rebuilds vertices in index order, whatever order the fields arrive in.
pub fn decode_vertices(key: &str, fields: &[(String, Bytes)]) -> Result<Vec<GeoLocation>> {
    let mut indexed = fields
        .iter()
        .map(|(field, raw)| {
            let idx: usize = field.parse().map_err(|_| GeoPoiError::CorruptVertex {
                key: key.to_string(),
                field: field.clone(),
                reason: "field is not a vertex index".into(),
            })?;
            Ok((idx, decode_vertex(key, field, raw)?))
        })
        .collect::<Result<Vec<_>>>()?;

    indexed.sort_by_key(|(idx, _)| *idx);
    Ok(indexed.into_iter().map(|(_, vertex)| vertex).collect())
}

pub fn decode_polygon(key: &str, fields: &[(String, Bytes)]) -> Result<GeoPolygon> {
    Ok(GeoPolygon::new(decode_vertices(key, fields)?)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vertex_layout() {
        let vertex = GeoLocation::new(48.5, -2.25).unwrap();
        let raw = encode_vertex(&vertex);
        assert_eq!(raw.len(), VERTEX_BYTES);
        assert_eq!(&raw[..8], &48.5f64.to_le_bytes());
        assert_eq!(&raw[8..], &(-2.25f64).to_le_bytes());
    }

    #[test]
    fn test_fields_are_one_based() {
        let square =
            GeoPolygon::from_lat_lng(&[(0.0, 0.0), (0.0, 1.0), (1.0, 1.0), (0.0, 0.0)]).unwrap();
        let fields = encode_polygon(&square);
        let names: Vec<_> = fields.iter().map(|(f, _)| f.as_str()).collect();
        assert_eq!(names, vec!["1", "2", "3", "4"]);
    }

    #[test]
    fn test_decode_sorts_numerically() {
        let ring: Vec<(f64, f64)> = (0..11).map(|i| (f64::from(i), 0.5)).chain([(0.0, 0.5)]).collect();
        let mut fields: Vec<_> = ring
            .iter()
            .enumerate()
            .map(|(idx, &(lat, lng))| {
                (
                    (idx + 1).to_string(),
                    encode_vertex(&GeoLocation::new(lat, lng).unwrap()),
                )
            })
            .collect();
        // Lexical order would put "10", "11", "12" before "2".
        fields.sort_by(|a, b| a.0.cmp(&b.0));

        let vertices = decode_vertices("k", &fields).unwrap();
        let lats: Vec<f64> = vertices.iter().map(GeoLocation::lat).collect();
        assert_eq!(lats, ring.iter().map(|p| p.0).collect::<Vec<_>>());
    }

    #[test]
    fn test_corrupt_vertex_length() {
        let err = decode_vertex("k", "1", &[0u8; 8]).unwrap_err();
        assert!(matches!(err, GeoPoiError::CorruptVertex { .. }));
    }

    #[test]
    fn test_corrupt_vertex_range() {
        let mut raw = Vec::new();
        raw.extend_from_slice(&200.0f64.to_le_bytes());
        raw.extend_from_slice(&0.0f64.to_le_bytes());
        assert!(decode_vertex("k", "1", &raw).is_err());
    }

    #[test]
    fn test_non_numeric_field() {
        let fields = vec![(
            "first".to_string(),
            encode_vertex(&GeoLocation::new(0.0, 0.0).unwrap()),
        )];
        assert!(decode_vertices("k", &fields).is_err());
    }
}
