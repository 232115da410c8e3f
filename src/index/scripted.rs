use super::{CountryIndex, codec};
use crate::compute::spatial::is_point_in_ring;
use crate::error::{GeoPoiError, Result};
use crate::keys::KeySpace;
use crate::storage::{
    GeoStore, ScanCursor, ScriptArgs, ScriptContext, ScriptDigest, ScriptValue, StoreScript,
};
use async_trait::async_trait;
use geopoi_types::GeoLocation;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

const KEY_PREFIX: &str = "keyPrefix";
const POINT_LAT: &str = "pointLat";
const POINT_LNG: &str = "pointLng";

/// Store-side ray casting over every stored geofence.
///
/// Walks geofence keys page by page, decodes each polygon only when it is
/// reached and stops at the first one containing the point. Returns the
/// matching key, or nil.
#[derive(Debug, Clone)]
pub struct RayCastingScript {
    page_size: usize,
}

impl RayCastingScript {
    pub fn new(page_size: usize) -> Self {
        Self {
            page_size: page_size.max(1),
        }
    }

    pub fn args(prefix: &str, point: &GeoLocation) -> ScriptArgs {
        ScriptArgs::new()
            .with(KEY_PREFIX, prefix)
            .with(POINT_LAT, point.lat())
            .with(POINT_LNG, point.lng())
    }
}

impl StoreScript for RayCastingScript {
    fn name(&self) -> &str {
        "geofence_ray_cast"
    }

    fn parameters(&self) -> &[&'static str] {
        &[KEY_PREFIX, POINT_LAT, POINT_LNG]
    }

    fn settings(&self) -> String {
        format!("page_size={}", self.page_size)
    }

    fn run(&self, ctx: &dyn ScriptContext, args: &ScriptArgs) -> Result<ScriptValue> {
        let prefix = args.require_str(KEY_PREFIX)?;
        let point = GeoLocation::new(args.require_f64(POINT_LAT)?, args.require_f64(POINT_LNG)?)?;

        let mut cursor = ScanCursor::Start;
        loop {
            let page = ctx.scan(&cursor, prefix, self.page_size)?;
            for key in &page.keys {
                let fields = ctx.hash_get_all(key)?;
                let ring = codec::decode_vertices(key, &fields)?;
                if is_point_in_ring(&point, &ring) {
                    return Ok(ScriptValue::Str(key.clone()));
                }
            }
            if page.is_last() {
                return Ok(ScriptValue::Nil);
            }
            cursor = page.next;
        }
    }
}

/// Country index that ray-casts inside the store.
///
/// The script is loaded once at registration; each lookup is a single
/// evaluation by digest.
pub struct ScriptedCountryIndex {
    store: Arc<dyn GeoStore>,
    keys: KeySpace,
    digest: ScriptDigest,
}

impl ScriptedCountryIndex {
    /// Load the ray-casting script. Failure here is a startup error.
    pub async fn register(
        store: Arc<dyn GeoStore>,
        keys: KeySpace,
        page_size: usize,
    ) -> Result<Self> {
        let digest = store
            .script_load(Arc::new(RayCastingScript::new(page_size)))
            .await?;
        log::debug!("Country index script registered as {}", digest);
        Ok(Self {
            store,
            keys,
            digest,
        })
    }

    pub fn digest(&self) -> &ScriptDigest {
        &self.digest
    }
}

#[async_trait]
impl CountryIndex for ScriptedCountryIndex {
    async fn resolve(
        &self,
        point: GeoLocation,
        cancel: &CancellationToken,
    ) -> Result<Option<String>> {
        if cancel.is_cancelled() {
            return Err(GeoPoiError::Cancelled);
        }

        let args = RayCastingScript::args(&self.keys.geofence_scan_prefix(), &point);
        let value = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(GeoPoiError::Cancelled),
            value = self.store.eval(&self.digest, &args) => value?,
        };

        match value {
            ScriptValue::Nil => Ok(None),
            ScriptValue::Str(key) => match self.keys.country_from_geofence_key(&key) {
                Some(country) => Ok(Some(country.to_string())),
                None => Err(GeoPoiError::Store(format!(
                    "country index returned unexpected key '{}'",
                    key
                ))),
            },
            other => Err(GeoPoiError::Store(format!(
                "country index returned {:?}",
                other
            ))),
        }
    }
}
