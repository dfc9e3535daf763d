//! Memoization of pipeline runs keyed by input fingerprint.
//!
//! A [`Fingerprint`] hashes every source file's identity and contents
//! together with the configuration values that change results. The bytes
//! that are hashed are the same bytes the pipeline parses, so a stored run
//! always matches its key. Each fingerprint owns its own slot lock, so
//! concurrent callers asking for the same inputs wait for one computation
//! while callers with different inputs proceed independently.
//!
//! Only the newest run per set of source paths is kept: when a file changes
//! and its new contents are computed, the run for the old contents is
//! dropped. Failed runs are never stored.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, LazyLock, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use ev_map_geography::CityCountyMap;
use ev_map_source::{SourceError, SourceSnapshot};
use ev_map_source_models::{SourceConfig, SourceKind, SourcePaths};
use sha2::{Digest, Sha256};

use crate::{PipelineError, PipelineOutput, run_snapshot};

static GLOBAL: LazyLock<PipelineCache> = LazyLock::new(PipelineCache::new);

/// SHA-256 over the source files and result-affecting configuration.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Reads the sources in `config` and fingerprints them with its options.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Io`] if any source file cannot be read.
    pub fn of(config: &SourceConfig) -> Result<Self, SourceError> {
        let snapshot = SourceSnapshot::read(&config.paths)?;
        Ok(Self::of_snapshot(config, &snapshot))
    }

    /// Fingerprints already-read source contents with the options in
    /// `config`.
    #[must_use]
    pub fn of_snapshot(config: &SourceConfig, snapshot: &SourceSnapshot) -> Self {
        let mut hasher = Sha256::new();

        for kind in SourceKind::all() {
            let file = snapshot.get(*kind);
            let contents = file.bytes();

            hasher.update(kind.as_ref().as_bytes());
            hasher.update([0]);
            hasher.update(file.path().to_string_lossy().as_bytes());
            hasher.update([0]);
            hasher.update((contents.len() as u64).to_le_bytes());
            hasher.update(contents);
        }

        let columns = config.population_columns;
        hasher.update(config.target_state.as_bytes());
        hasher.update([0, u8::from(config.drop_unparsable_income)]);
        for value in [
            config.income_skip_rows,
            columns.state,
            columns.place,
            columns.county,
            columns.population,
        ] {
            hasher.update((value as u64).to_le_bytes());
        }

        Self(hex::encode(hasher.finalize()))
    }

    /// The hex digest.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A completed, cached pipeline run.
#[derive(Debug)]
pub struct CachedRun {
    /// Inputs this run was computed from.
    pub fingerprint: Fingerprint,
    /// When the run finished.
    pub computed_at: DateTime<Utc>,
    /// The finished tables.
    pub output: PipelineOutput,
}

type Slot = Arc<Mutex<Option<Arc<CachedRun>>>>;

/// Process-lifetime cache of pipeline runs.
#[derive(Debug, Default)]
pub struct PipelineCache {
    slots: Mutex<BTreeMap<Fingerprint, Slot>>,
    latest: Mutex<BTreeMap<SourcePaths, Fingerprint>>,
}

impl PipelineCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the process-wide cache.
    #[must_use]
    pub fn global() -> &'static Self {
        &GLOBAL
    }

    /// Returns the cached run for `config`, running the pipeline if the
    /// inputs have not been seen.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError`] if the inputs cannot be read or the
    /// pipeline fails.
    pub fn get_or_run(&self, config: &SourceConfig) -> Result<Arc<CachedRun>, PipelineError> {
        self.get_or_compute(config, |config, snapshot| {
            run_snapshot(config, snapshot, CityCountyMap::global())
        })
    }

    /// Returns the cached run for `config`, calling `compute` at most once
    /// per fingerprint across all threads.
    ///
    /// The sources are read once; `compute` receives the exact contents the
    /// fingerprint was taken over. A failed computation is not cached, so
    /// the next caller retries it.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError`] if the inputs cannot be read or `compute`
    /// fails.
    pub fn get_or_compute<F>(
        &self,
        config: &SourceConfig,
        compute: F,
    ) -> Result<Arc<CachedRun>, PipelineError>
    where
        F: FnOnce(&SourceConfig, &SourceSnapshot) -> Result<PipelineOutput, PipelineError>,
    {
        let snapshot = SourceSnapshot::read(&config.paths)?;
        let fingerprint = Fingerprint::of_snapshot(config, &snapshot);
        let slot = self.slot(&fingerprint);
        let mut cached = slot.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some(run) = cached.as_ref() {
            log::info!(
                "Pipeline cache hit for {fingerprint} (computed {})",
                run.computed_at
            );
            return Ok(Arc::clone(run));
        }

        log::info!("Pipeline cache miss for {fingerprint}; running pipeline");
        let output = match compute(config, &snapshot) {
            Ok(output) => output,
            Err(e) => {
                self.discard(&fingerprint, &slot);
                return Err(e);
            }
        };

        let run = Arc::new(CachedRun {
            fingerprint: fingerprint.clone(),
            computed_at: Utc::now(),
            output,
        });
        *cached = Some(Arc::clone(&run));
        drop(cached);

        self.record(&config.paths, fingerprint, &slot);

        Ok(run)
    }

    /// Drops the cached run for `fingerprint`. Returns `true` if one existed.
    pub fn invalidate(&self, fingerprint: &Fingerprint) -> bool {
        let removed = self.lock_slots().remove(fingerprint).is_some();
        if removed {
            log::debug!("Invalidated pipeline cache entry {fingerprint}");
        }
        removed
    }

    /// Drops every cached run.
    pub fn clear(&self) {
        {
            let mut slots = self.lock_slots();
            log::debug!("Clearing {} pipeline cache entries", slots.len());
            slots.clear();
        }
        self.lock_latest().clear();
    }

    /// Number of fingerprints with a slot, including ones still computing.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock_slots().len()
    }

    /// Returns `true` if the cache holds no slots.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns `true` if a finished run is stored for `fingerprint`.
    #[must_use]
    pub fn contains(&self, fingerprint: &Fingerprint) -> bool {
        let slot = self.lock_slots().get(fingerprint).cloned();
        slot.is_some_and(|slot| slot.lock().unwrap_or_else(PoisonError::into_inner).is_some())
    }

    fn slot(&self, fingerprint: &Fingerprint) -> Slot {
        Arc::clone(self.lock_slots().entry(fingerprint.clone()).or_default())
    }

    /// Removes the slot for a failed computation, unless another caller has
    /// already replaced it.
    fn discard(&self, fingerprint: &Fingerprint, slot: &Slot) {
        let mut slots = self.lock_slots();
        if slots.get(fingerprint).is_some_and(|current| Arc::ptr_eq(current, slot)) {
            slots.remove(fingerprint);
        }
    }

    /// Marks `fingerprint` as the newest run for `paths` and drops the run
    /// it supersedes.
    fn record(&self, paths: &SourcePaths, fingerprint: Fingerprint, slot: &Slot) {
        let previous = self.lock_latest().insert(paths.clone(), fingerprint.clone());

        let mut slots = self.lock_slots();
        slots
            .entry(fingerprint.clone())
            .or_insert_with(|| Arc::clone(slot));
        if let Some(previous) = previous
            && previous != fingerprint
            && slots.remove(&previous).is_some()
        {
            log::debug!("Dropped superseded pipeline cache entry {previous}");
        }
    }

    fn lock_slots(&self) -> MutexGuard<'_, BTreeMap<Fingerprint, Slot>> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_latest(&self) -> MutexGuard<'_, BTreeMap<SourcePaths, Fingerprint>> {
        self.latest.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
