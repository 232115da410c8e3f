//! Persisted key layout for the index-emulating store.
//!
//! Every stored structure is addressed by a prefixed key:
//!
//! | structure            | key                              |
//! |----------------------|----------------------------------|
//! | geofence vertex hash | `GeoFencePolygon:{country}`      |
//! | POI geo-index        | `GeoPois:{country}`              |
//! | POI record           | `POIs:{country}:{id}`            |
//! | country record       | `Countries:{id}`                 |

use crate::error::{GeoPoiError, Result};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Key prefixes and separator. Serializable so deployments can isolate
/// several datasets inside one store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct KeyLayout {
    #[serde(default = "KeyLayout::default_geofence_prefix")]
    pub geofence_prefix: String,
    #[serde(default = "KeyLayout::default_geo_pois_prefix")]
    pub geo_pois_prefix: String,
    #[serde(default = "KeyLayout::default_poi_prefix")]
    pub poi_prefix: String,
    #[serde(default = "KeyLayout::default_country_prefix")]
    pub country_prefix: String,
    #[serde(default = "KeyLayout::default_separator")]
    pub separator: String,
}

impl KeyLayout {
    fn default_geofence_prefix() -> String {
        "GeoFencePolygon".into()
    }

    fn default_geo_pois_prefix() -> String {
        "GeoPois".into()
    }

    fn default_poi_prefix() -> String {
        "POIs".into()
    }

    fn default_country_prefix() -> String {
        "Countries".into()
    }

    fn default_separator() -> String {
        ":".into()
    }

    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.separator.is_empty() {
            return Err("Key separator cannot be empty".into());
        }

        let prefixes = [
            &self.geofence_prefix,
            &self.geo_pois_prefix,
            &self.poi_prefix,
            &self.country_prefix,
        ];
        for prefix in prefixes {
            if prefix.is_empty() {
                return Err("Key prefixes cannot be empty".into());
            }
            if prefix.contains(self.separator.as_str()) {
                return Err(format!(
                    "Key prefix '{}' cannot contain separator '{}'",
                    prefix, self.separator
                ));
            }
        }

        // Prefixes never contain the separator, so distinct prefixes never
        // share a scan range.
        for (i, prefix) in prefixes.iter().enumerate() {
            if prefixes[i + 1..].contains(prefix) {
                return Err(format!("Key prefix '{}' is used twice", prefix));
            }
        }

        Ok(())
    }
}

impl Default for KeyLayout {
    fn default() -> Self {
        Self {
            geofence_prefix: Self::default_geofence_prefix(),
            geo_pois_prefix: Self::default_geo_pois_prefix(),
            poi_prefix: Self::default_poi_prefix(),
            country_prefix: Self::default_country_prefix(),
            separator: Self::default_separator(),
        }
    }
}

/// Builds and parses keys according to a [`KeyLayout`].
///
/// # Examples
///
/// ```rust
/// use geopoi::keys::KeySpace;
///
/// let keys = KeySpace::default();
/// assert_eq!(keys.geofence_key("France"), "GeoFencePolygon:France");
/// assert_eq!(keys.country_from_geofence_key("GeoFencePolygon:France"), Some("France"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeySpace {
    layout: KeyLayout,
}

impl KeySpace {
    pub fn new(layout: KeyLayout) -> Result<Self> {
        layout.validate().map_err(GeoPoiError::Config)?;
        Ok(Self { layout })
    }

    pub fn layout(&self) -> &KeyLayout {
        &self.layout
    }

    /// Checks that a country name can be embedded in a key.
    pub fn validate_country_name(&self, name: &str) -> Result<()> {
        if name.is_empty() {
            return Err(GeoPoiError::InvalidInput(
                "Country name cannot be empty".into(),
            ));
        }

        if name.contains(self.layout.separator.as_str()) {
            return Err(GeoPoiError::InvalidInput(format!(
                "Country name '{}' cannot contain separator '{}'",
                name, self.layout.separator
            )));
        }

        if name.contains('\0') {
            return Err(GeoPoiError::InvalidInput(
                "Country name cannot contain null bytes".into(),
            ));
        }

        Ok(())
    }

    fn join(&self, parts: &[&str]) -> String {
        parts.join(self.layout.separator.as_str())
    }

    pub fn geofence_key(&self, country: &str) -> String {
        self.join(&[&self.layout.geofence_prefix, country])
    }

    /// Prefix shared by every geofence key; what the containment script scans.
    pub fn geofence_scan_prefix(&self) -> String {
        format!("{}{}", self.layout.geofence_prefix, self.layout.separator)
    }

    pub fn country_from_geofence_key<'a>(&self, key: &'a str) -> Option<&'a str> {
        key.strip_prefix(self.layout.geofence_prefix.as_str())
            .and_then(|rest| rest.strip_prefix(self.layout.separator.as_str()))
            .filter(|name| !name.is_empty())
    }

    pub fn geo_pois_key(&self, country: &str) -> String {
        self.join(&[&self.layout.geo_pois_prefix, country])
    }

    pub fn poi_key(&self, country: &str, id: &str) -> String {
        self.join(&[&self.layout.poi_prefix, country, id])
    }

    pub fn country_key(&self, id: &Uuid) -> String {
        self.join(&[&self.layout.country_prefix, &id.to_string()])
    }
}
