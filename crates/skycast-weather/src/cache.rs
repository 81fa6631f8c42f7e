//! Single-slot forecast cache keyed by geographic proximity and age.
//!
//! One entry at a time, persisted as JSON in the config directory (the
//! per-device slot the app survives restarts with). A stored result is
//! reused only when the requesting coordinate is within `proximity_km`
//! of the stored one AND the entry is younger than the freshness window
//! AND the recorded schema version matches. Both comparisons are strict
//! (`<`): exactly 5 km or exactly 30 minutes is a miss.
//!
//! There is no eviction beyond overwrite-on-store; stale entries are
//! simply never matched. A corrupt or unreadable slot degrades to an
//! empty cache, never to an error.

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::geo::haversine_km;
use crate::types::Coordinate;

/// Bump whenever the shape of the cached payload changes; entries written
/// under a different version are never served.
pub const CACHE_SCHEMA_VERSION: u32 = 1;

const CACHE_FILE_NAME: &str = "forecast_cache.json";

/// Reuse thresholds for the cache guard.
#[derive(Debug, Clone, Copy)]
pub struct CachePolicy {
    /// Strict upper bound on distance (km) between stored and requested coordinates.
    pub proximity_km: f64,
    /// Strict upper bound on entry age.
    pub freshness: Duration,
}

impl Default for CachePolicy {
    fn default() -> Self {
        Self {
            proximity_km: 5.0,
            freshness: Duration::minutes(30),
        }
    }
}

/// Why a lookup did not produce a hit. Callers treat every variant as the
/// same miss; the reasons exist for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheMiss {
    /// No entry stored (or the slot was unreadable).
    Empty,
    /// Entry written under a different payload schema version.
    SchemaMismatch,
    /// Entry outside the proximity radius.
    TooFar,
    /// Entry older than the freshness window.
    Stale,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredEntry<P> {
    schema_version: u32,
    coordinate: Coordinate,
    captured_at: DateTime<Utc>,
    payload: P,
}

/// Single-slot cache over an opaque payload.
///
/// The payload is stored and returned verbatim; the guard never inspects it.
#[derive(Debug)]
pub struct ForecastCache<P> {
    path: PathBuf,
    policy: CachePolicy,
    schema_version: u32,
    entry: Option<StoredEntry<P>>,
}

impl<P> ForecastCache<P>
where
    P: Serialize + DeserializeOwned + Clone,
{
    /// Open the cache slot under `config_dir`, loading any persisted entry.
    /// An unreadable or unparsable slot is treated as empty.
    pub fn open(config_dir: &Path, policy: CachePolicy) -> Self {
        Self::open_versioned(config_dir, policy, CACHE_SCHEMA_VERSION)
    }

    /// Like [`ForecastCache::open`] with an explicit schema version. Used by
    /// tests to simulate schema bumps.
    pub fn open_versioned(config_dir: &Path, policy: CachePolicy, schema_version: u32) -> Self {
        let path = config_dir.join(CACHE_FILE_NAME);
        let entry = Self::read_slot(&path);
        Self {
            path,
            policy,
            schema_version,
            entry,
        }
    }

    fn read_slot(path: &Path) -> Option<StoredEntry<P>> {
        if !path.exists() {
            return None;
        }
        let contents = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) => {
                tracing::warn!("Failed to read cache slot {}: {}", path.display(), e);
                return None;
            }
        };
        match serde_json::from_str(&contents) {
            Ok(entry) => Some(entry),
            Err(e) => {
                tracing::warn!("Discarding corrupt cache slot {}: {}", path.display(), e);
                None
            }
        }
    }

    /// Return the stored payload iff the entry is close enough, fresh
    /// enough, and written under the current schema version.
    pub fn lookup(&self, request: Coordinate, now: DateTime<Utc>) -> Result<&P, CacheMiss> {
        let entry = self.entry.as_ref().ok_or(CacheMiss::Empty)?;

        if entry.schema_version != self.schema_version {
            return Err(CacheMiss::SchemaMismatch);
        }

        let distance_km = haversine_km(request, entry.coordinate);
        if distance_km >= self.policy.proximity_km {
            tracing::debug!("Cache miss: {:.2} km from stored coordinate", distance_km);
            return Err(CacheMiss::TooFar);
        }

        let age = now - entry.captured_at;
        if age >= self.policy.freshness {
            tracing::debug!("Cache miss: entry is {} min old", age.num_minutes());
            return Err(CacheMiss::Stale);
        }

        Ok(&entry.payload)
    }

    /// Unconditionally overwrite the slot. Last write wins.
    pub fn store(&mut self, coordinate: Coordinate, now: DateTime<Utc>, payload: P) -> Result<()> {
        let entry = StoredEntry {
            schema_version: self.schema_version,
            coordinate,
            captured_at: now,
            payload,
        };

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create cache directory")?;
        }
        let contents =
            serde_json::to_string(&entry).context("Failed to serialize cache entry")?;
        std::fs::write(&self.path, contents).context("Failed to write cache slot")?;

        self.entry = Some(entry);
        Ok(())
    }
}
