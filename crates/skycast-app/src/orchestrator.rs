//! Sequences one weather request: cache lookup, core weather fetch,
//! reverse geocode, commentary generation, cache store.
//!
//! Request lifecycle: `Idle -> FetchingCore -> { CoreReady ->
//! FetchingCommentary -> { Complete -> Cached, CorePartial } } | Failed`.
//! A core-fetch failure is terminal. A commentary failure is not: the
//! core weather is still returned, just without commentary and without
//! caching, so the next miss retries generation instead of serving a
//! permanently commentary-less slot.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use skycast_commentary::{
    CommentaryClient, CommentaryError, CommentarySet, DayBrief, PersonaScope, WeatherBrief,
};
use skycast_weather::{
    CachePolicy, Coordinate, ForecastCache, ReverseGeocoder, WeatherError, WeatherProvider,
    WeatherSnapshot,
};

/// The payload cached and rendered: a weather snapshot, the resolved
/// place name, and (when generation succeeded) persona commentary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherReport {
    pub snapshot: WeatherSnapshot,
    pub location_name: String,
    pub commentary: Option<CommentarySet>,
    pub fetched_at: DateTime<Utc>,
}

/// Terminal states of one request. A failed core fetch is an `Err` at the
/// `fetch` call site instead.
#[derive(Debug)]
pub enum FetchOutcome {
    /// Full report, served from cache or freshly fetched and cached.
    Complete(WeatherReport),
    /// Core weather fetched, commentary failed. Not cached.
    Partial {
        report: WeatherReport,
        commentary_error: CommentaryError,
    },
}

impl FetchOutcome {
    pub fn report(&self) -> &WeatherReport {
        match self {
            FetchOutcome::Complete(report) => report,
            FetchOutcome::Partial { report, .. } => report,
        }
    }
}

pub struct Orchestrator {
    provider: WeatherProvider,
    geocoder: ReverseGeocoder,
    commentary: CommentaryClient,
    cache: Mutex<ForecastCache<WeatherReport>>,
    /// Monotonic dispatch counter; a `store()` from a superseded request
    /// is skipped so a late completion can't overwrite a newer result.
    latest_seq: AtomicU64,
}

impl Orchestrator {
    pub fn new(
        provider: WeatherProvider,
        geocoder: ReverseGeocoder,
        commentary: CommentaryClient,
        cache: ForecastCache<WeatherReport>,
    ) -> Self {
        Self {
            provider,
            geocoder,
            commentary,
            cache: Mutex::new(cache),
            latest_seq: AtomicU64::new(0),
        }
    }

    pub fn with_default_cache(
        provider: WeatherProvider,
        geocoder: ReverseGeocoder,
        commentary: CommentaryClient,
        config_dir: &std::path::Path,
        policy: CachePolicy,
    ) -> Self {
        Self::new(
            provider,
            geocoder,
            commentary,
            ForecastCache::open(config_dir, policy),
        )
    }

    /// Produce a report for `coordinate`, from cache when the guard allows
    /// it, otherwise by fetching. `now` is injected so callers and tests
    /// control time.
    pub async fn fetch(
        &self,
        coordinate: Coordinate,
        language: &str,
        scope: PersonaScope,
        now: DateTime<Utc>,
    ) -> Result<FetchOutcome, WeatherError> {
        let seq = self.latest_seq.fetch_add(1, Ordering::SeqCst) + 1;

        {
            let cache = self.cache.lock();
            match cache.lookup(coordinate, now) {
                Ok(report) => {
                    tracing::debug!("Serving report from cache");
                    return Ok(FetchOutcome::Complete(report.clone()));
                }
                Err(miss) => tracing::debug!("Cache miss: {:?}", miss),
            }
        }

        // FetchingCore: terminal on failure.
        let snapshot = self.provider.fetch(coordinate).await?;

        // Geocoding never fails the request; it falls back to a placeholder.
        let location_name = self.geocoder.place_name(coordinate, language).await;

        // FetchingCommentary: failure downgrades to a partial report.
        let brief = Self::brief_for(&snapshot);
        match self.commentary.generate(&brief, language, scope).await {
            Ok(set) => {
                let report = WeatherReport {
                    snapshot,
                    location_name,
                    commentary: Some(set),
                    fetched_at: now,
                };
                self.store_if_current(seq, coordinate, now, &report);
                Ok(FetchOutcome::Complete(report))
            }
            Err(commentary_error) => {
                tracing::warn!("Commentary generation failed: {}", commentary_error);
                let report = WeatherReport {
                    snapshot,
                    location_name,
                    commentary: None,
                    fetched_at: now,
                };
                Ok(FetchOutcome::Partial {
                    report,
                    commentary_error,
                })
            }
        }
    }

    /// Last write wins, except that a request superseded by a newer
    /// dispatch skips its store entirely.
    fn store_if_current(
        &self,
        seq: u64,
        coordinate: Coordinate,
        now: DateTime<Utc>,
        report: &WeatherReport,
    ) {
        if self.latest_seq.load(Ordering::SeqCst) != seq {
            tracing::debug!("Skipping cache store from superseded request {}", seq);
            return;
        }
        let mut cache = self.cache.lock();
        if let Err(e) = cache.store(coordinate, now, report.clone()) {
            // A failed store must not fail an otherwise successful fetch.
            tracing::warn!("Failed to persist cache slot: {}", e);
        }
    }

    fn brief_for(snapshot: &WeatherSnapshot) -> WeatherBrief {
        WeatherBrief {
            description: snapshot.condition().description().to_string(),
            temperature: snapshot.temperature,
            apparent_temperature: snapshot.apparent_temperature,
            humidity: snapshot.humidity,
            wind_speed: snapshot.wind_speed,
            is_day: snapshot.is_day,
            timeline: snapshot
                .intraday
                .iter()
                .map(|s| (s.daypart.label().to_string(), s.temperature))
                .collect(),
            tomorrow: snapshot.tomorrow.map(|d| DayBrief {
                description: d.condition().description().to_string(),
                min_temp: d.min_temp,
                max_temp: d.max_temp,
            }),
            after_tomorrow: snapshot.after_tomorrow.map(|d| DayBrief {
                description: d.condition().description().to_string(),
                min_temp: d.min_temp,
                max_temp: d.max_temp,
            }),
        }
    }
}
