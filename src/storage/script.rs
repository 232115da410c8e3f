//! Server-side scripts.
//!
//! Scripts follow a two-phase protocol: [`ScriptRegistry::load`] compiles
//! and registers a script once (idempotently) and hands back its
//! [`ScriptDigest`]; each query then evaluates the script by digest with
//! named arguments. The script runs next to the data through a
//! [`ScriptContext`], so nothing but its result crosses back to the caller.

use super::{ScanCursor, ScanPage};
use crate::error::{GeoPoiError, Result};
use bytes::Bytes;
use parking_lot::RwLock;
use rustc_hash::{FxHashMap, FxHasher};
use std::collections::BTreeMap;
use std::fmt;
use std::hash::Hasher;
use std::sync::Arc;

/// Argument or return value of a script.
#[derive(Debug, Clone, PartialEq)]
pub enum ScriptValue {
    Nil,
    Int(i64),
    Float(f64),
    Str(String),
}

impl ScriptValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Numeric view; strings are parsed the way a script's `tonumber` would.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(i) => Some(*i as f64),
            Self::Float(f) => Some(*f),
            Self::Str(s) => s.trim().parse().ok(),
            Self::Nil => None,
        }
    }

    pub fn is_nil(&self) -> bool {
        matches!(self, Self::Nil)
    }
}

impl From<&str> for ScriptValue {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for ScriptValue {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<f64> for ScriptValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

/// Named script arguments.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScriptArgs {
    values: BTreeMap<String, ScriptValue>,
}

impl ScriptArgs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<ScriptValue>) -> Self {
        self.values.insert(name.into(), value.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<&ScriptValue> {
        self.values.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn require_str(&self, name: &str) -> Result<&str> {
        self.get(name).and_then(ScriptValue::as_str).ok_or_else(|| {
            GeoPoiError::InvalidInput(format!("script argument '{}' must be a string", name))
        })
    }

    pub fn require_f64(&self, name: &str) -> Result<f64> {
        self.get(name).and_then(ScriptValue::as_f64).ok_or_else(|| {
            GeoPoiError::InvalidInput(format!("script argument '{}' must be a number", name))
        })
    }
}

/// Identity of a loaded script.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ScriptDigest(String);

impl ScriptDigest {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ScriptDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Read-only view of the store handed to running scripts.
pub trait ScriptContext {
    fn scan(&self, cursor: &ScanCursor, prefix: &str, count: usize) -> Result<ScanPage>;

    fn hash_get_all(&self, key: &str) -> Result<Vec<(String, Bytes)>>;
}

/// A script executed inside the store.
pub trait StoreScript: Send + Sync {
    fn name(&self) -> &str;

    /// Bumped whenever behavior changes, so the digest changes with it.
    fn version(&self) -> u32 {
        1
    }

    /// Argument names every evaluation must supply.
    fn parameters(&self) -> &[&'static str];

    /// Construction-time settings that change behavior. Scripts differing
    /// only here get different digests.
    fn settings(&self) -> String {
        String::new()
    }

    fn run(&self, ctx: &dyn ScriptContext, args: &ScriptArgs) -> Result<ScriptValue>;
}

/// Loaded scripts, keyed by digest.
#[derive(Default)]
pub struct ScriptRegistry {
    scripts: RwLock<FxHashMap<ScriptDigest, Arc<dyn StoreScript>>>,
}

impl ScriptRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn digest_of(script: &dyn StoreScript) -> ScriptDigest {
        let mut hasher = FxHasher::default();
        hasher.write(script.name().as_bytes());
        hasher.write_u32(script.version());
        for param in script.parameters() {
            hasher.write_u8(0);
            hasher.write(param.as_bytes());
        }
        hasher.write_u8(0xff);
        hasher.write(script.settings().as_bytes());
        ScriptDigest(format!("{:016x}", hasher.finish()))
    }

    fn compile(script: &dyn StoreScript) -> Result<()> {
        let fail = |reason: &str| GeoPoiError::ScriptCompilation {
            name: script.name().to_string(),
            reason: reason.to_string(),
        };

        if script.name().trim().is_empty() {
            return Err(fail("script name cannot be empty"));
        }

        let params = script.parameters();
        if params.iter().any(|p| p.trim().is_empty()) {
            return Err(fail("parameter names cannot be empty"));
        }

        for (idx, param) in params.iter().enumerate() {
            if params.iter().skip(idx + 1).any(|other| other == param) {
                return Err(fail(&format!("parameter '{}' is declared twice", param)));
            }
        }

        Ok(())
    }

    /// Compile and register. Loading an already-loaded script is a no-op.
    pub fn load(&self, script: Arc<dyn StoreScript>) -> Result<ScriptDigest> {
        Self::compile(script.as_ref())?;
        let digest = Self::digest_of(script.as_ref());

        let mut scripts = self.scripts.write();
        if scripts.contains_key(&digest) {
            log::debug!("Script '{}' already loaded as {}", script.name(), digest);
        } else {
            log::info!("Loaded script '{}' as {}", script.name(), digest);
            scripts.insert(digest.clone(), script);
        }

        Ok(digest)
    }

    pub fn is_loaded(&self, digest: &ScriptDigest) -> bool {
        self.scripts.read().contains_key(digest)
    }

    /// Drop every loaded script.
    pub fn flush(&self) {
        self.scripts.write().clear();
    }

    pub fn eval(
        &self,
        digest: &ScriptDigest,
        ctx: &dyn ScriptContext,
        args: &ScriptArgs,
    ) -> Result<ScriptValue> {
        let script = self
            .scripts
            .read()
            .get(digest)
            .cloned()
            .ok_or_else(|| GeoPoiError::UnknownScript(digest.to_string()))?;

        if let Some(missing) = script.parameters().iter().find(|p| !args.contains(p)) {
            return Err(GeoPoiError::InvalidInput(format!(
                "script '{}' requires argument '{}'",
                script.name(),
                missing
            )));
        }

        script.run(ctx, args)
    }
}
