//! Runs one calculation at a time on a background task.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::Utc;
use futures::FutureExt;
use sitedist_core::{
    classify_match, sort_by_distance, AppConfig, Coordinates, DistanceResult, LocationMatch,
    ResultTag, SiteRecord, CACHED_LABEL, NOT_FOUND_LABEL,
};
use sitedist_geo::{
    CacheStore, GeocodeProvider, GeocodeResolver, Resolution, RouteDistanceService, RouteProvider,
};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::Instrument;
use uuid::Uuid;

use crate::error::PipelineError;
use crate::events::{RunEvent, SiteUpdate};
use crate::state::RunState;
use crate::summary::RunSummary;

/// Bound on undelivered events. The run waits for the consumer when full.
pub const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Progress reported once the reference address is resolved.
const REFERENCE_PROGRESS: f64 = 0.05;

/// Message of the [`RunEvent::Error`] sent when the reference cannot be
/// geocoded.
pub const REFERENCE_NOT_FOUND: &str = "reference address not found";

/// Throttling applied to a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pacing {
    /// Pause after each site.
    pub site_delay: Duration,
    /// Cap on geocoding queries per address.
    pub max_attempts: usize,
}

impl Pacing {
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            site_delay: Duration::from_millis(config.site_delay_ms),
            max_attempts: config.geocode_max_attempts,
        }
    }
}

/// Consumer side of a started run.
pub struct RunHandle {
    run_id: Uuid,
    events: mpsc::Receiver<RunEvent>,
    cancel: Arc<AtomicBool>,
    task: JoinHandle<()>,
}

impl RunHandle {
    #[must_use]
    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    /// Asks the run to stop before its next site. The site in progress is
    /// finished first.
    pub fn cancel(&self) {
        self.cancel.store(true, Ordering::SeqCst);
    }

    /// Shared flag behind [`RunHandle::cancel`], for signal handlers.
    #[must_use]
    pub fn cancel_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancel)
    }

    /// Next event if one is queued. Never waits.
    pub fn try_next(&mut self) -> Option<RunEvent> {
        self.events.try_recv().ok()
    }

    /// Every event queued right now, in order.
    pub fn drain(&mut self) -> Vec<RunEvent> {
        std::iter::from_fn(|| self.try_next()).collect()
    }

    /// Waits for the next event; `None` once the run has ended and every
    /// event has been taken.
    pub async fn next(&mut self) -> Option<RunEvent> {
        self.events.recv().await
    }

    /// The background task has exited.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Collects every remaining event until the run ends, then waits for
    /// the background task to exit.
    pub async fn collect(mut self) -> Vec<RunEvent> {
        let mut events = Vec::new();
        while let Some(event) = self.events.recv().await {
            events.push(event);
        }
        if let Err(e) = self.task.await {
            tracing::warn!(error = %e, "calculation task did not exit cleanly");
        }
        events
    }
}

/// Coordinates calculation runs against a shared coordinate cache.
///
/// Only one run is active at a time; `start` is refused while another run
/// holds the lock. The cache is mutated only by the active run.
pub struct Orchestrator<G, R> {
    resolver: Arc<GeocodeResolver<G>>,
    router: Arc<RouteDistanceService<R>>,
    cache: Arc<Mutex<CacheStore>>,
    pacing: Pacing,
    running: Arc<AtomicBool>,
    state: Arc<Mutex<RunState>>,
}

impl<G, R> Orchestrator<G, R>
where
    G: GeocodeProvider + 'static,
    R: RouteProvider + 'static,
{
    pub fn new(
        resolver: GeocodeResolver<G>,
        router: RouteDistanceService<R>,
        cache: Arc<Mutex<CacheStore>>,
        pacing: Pacing,
    ) -> Self {
        Self {
            resolver: Arc::new(resolver),
            router: Arc::new(router),
            cache,
            pacing,
            running: Arc::new(AtomicBool::new(false)),
            state: Arc::new(Mutex::new(RunState::Idle)),
        }
    }

    #[must_use]
    pub fn state(&self) -> RunState {
        *lock(&self.state)
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn cache(&self) -> &Arc<Mutex<CacheStore>> {
        &self.cache
    }

    /// Validates the input and spawns a run on the current tokio runtime.
    ///
    /// # Errors
    ///
    /// - [`PipelineError::BlankReference`] if `reference` is blank.
    /// - [`PipelineError::NoSites`] if `sites` is empty.
    /// - [`PipelineError::InvalidSite`] if a site lacks locality or region.
    /// - [`PipelineError::RunActive`] if a run is already in progress.
    ///
    /// Nothing is spawned and the state is unchanged on error.
    pub fn start(&self, reference: &str, sites: Vec<SiteRecord>) -> Result<RunHandle, PipelineError> {
        let reference = reference.trim();
        if reference.is_empty() {
            return Err(PipelineError::BlankReference);
        }
        if sites.is_empty() {
            return Err(PipelineError::NoSites);
        }
        for (index, site) in sites.iter().enumerate() {
            site.address
                .validate()
                .map_err(|source| PipelineError::InvalidSite { index, source })?;
        }
        if self
            .running
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(PipelineError::RunActive);
        }

        let run_id = Uuid::new_v4();
        let (tx, rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        let cancel = Arc::new(AtomicBool::new(false));

        let run = Run {
            run_id,
            resolver: Arc::clone(&self.resolver),
            router: Arc::clone(&self.router),
            cache: Arc::clone(&self.cache),
            pacing: self.pacing,
            state: Arc::clone(&self.state),
            cancel: Arc::clone(&cancel),
            events: tx,
            lock: Arc::new(RunLock::new(Arc::clone(&self.running))),
        };
        let reference = reference.to_owned();
        let span = tracing::info_span!("calculation_run", %run_id);

        let task = tokio::spawn(
            async move {
                let run_lock = Arc::clone(&run.lock);
                let events = run.events.clone();
                let state = Arc::clone(&run.state);
                if let Err(panic) = AssertUnwindSafe(run.execute(reference, sites))
                    .catch_unwind()
                    .await
                {
                    let message = panic_message(panic.as_ref());
                    tracing::error!(%message, "calculation run panicked");
                    *lock(&state) = RunState::Error;
                    run_lock.release();
                    let _ = events
                        .send(RunEvent::Error(format!("internal error: {message}")))
                        .await;
                }
            }
            .instrument(span),
        );

        Ok(RunHandle {
            run_id,
            events: rx,
            cancel,
            task,
        })
    }
}

/// The single-run lock held by one background run.
///
/// Released explicitly right before the terminal event is sent, so a caller
/// that has seen the terminal event can start the next run. Dropping releases
/// it too if the task exits any other way. Releasing is idempotent and never
/// touches the flag after the first release, so a late drop cannot clear a
/// lock that a newer run has since taken.
struct RunLock {
    flag: Arc<AtomicBool>,
    released: AtomicBool,
}

impl RunLock {
    fn new(flag: Arc<AtomicBool>) -> Self {
        Self {
            flag,
            released: AtomicBool::new(false),
        }
    }

    fn release(&self) {
        if !self.released.swap(true, Ordering::SeqCst) {
            self.flag.store(false, Ordering::SeqCst);
        }
    }
}

impl Drop for RunLock {
    fn drop(&mut self) {
        self.release();
    }
}

/// Everything one background run needs.
struct Run<G, R> {
    run_id: Uuid,
    resolver: Arc<GeocodeResolver<G>>,
    router: Arc<RouteDistanceService<R>>,
    cache: Arc<Mutex<CacheStore>>,
    pacing: Pacing,
    state: Arc<Mutex<RunState>>,
    cancel: Arc<AtomicBool>,
    events: mpsc::Sender<RunEvent>,
    lock: Arc<RunLock>,
}

impl<G: GeocodeProvider, R: RouteProvider> Run<G, R> {
    async fn execute(self, reference: String, mut sites: Vec<SiteRecord>) {
        let started_at = Utc::now();
        tracing::info!(sites = sites.len(), "calculation started");

        self.set_state(RunState::ResolvingReference);
        self.emit(RunEvent::Status("Geocoding reference address...".to_owned()))
            .await;

        let origin = match self
            .resolver
            .resolve(&reference, self.pacing.max_attempts)
            .await
        {
            Resolution::Found(location) => location.coordinates,
            Resolution::NotFound => {
                tracing::warn!(%reference, "reference address not found");
                self.set_state(RunState::Error);
                self.lock.release();
                self.emit(RunEvent::Error(REFERENCE_NOT_FOUND.to_owned())).await;
                return;
            }
        };
        self.emit(RunEvent::Progress(REFERENCE_PROGRESS)).await;

        self.set_state(RunState::ResolvingSites);
        let total = sites.len();
        let mut results = Vec::with_capacity(total);

        for (index, site) in sites.iter_mut().enumerate() {
            if self.cancel.load(Ordering::SeqCst) {
                tracing::info!(processed = index, "calculation cancelled");
                self.save_cache().await;
                self.set_state(RunState::Cancelled);
                self.emit(RunEvent::Status("Calculation cancelled".to_owned()))
                    .await;
                self.lock.release();
                self.emit(RunEvent::Cancelled).await;
                return;
            }

            let (result, update) = self.process_site(index, site, origin).await;
            results.push(result);
            self.emit(RunEvent::SiteUpdate(update)).await;

            #[allow(clippy::cast_precision_loss)]
            let fraction = REFERENCE_PROGRESS
                + (index + 1) as f64 / total as f64 * (1.0 - REFERENCE_PROGRESS);
            self.emit(RunEvent::Progress(fraction)).await;

            if !self.pacing.site_delay.is_zero() {
                tokio::time::sleep(self.pacing.site_delay).await;
            }
        }

        self.set_state(RunState::Finalizing);
        sort_by_distance(&mut results);
        self.save_cache().await;

        let summary = RunSummary::new(self.run_id, &results, started_at);
        tracing::info!(
            %summary,
            elapsed_ms = summary.elapsed().num_milliseconds(),
            "calculation complete"
        );

        self.emit(RunEvent::Results(results)).await;
        self.emit(RunEvent::Status(format!("Complete: {summary}"))).await;
        self.set_state(RunState::Complete);
        self.lock.release();
        self.emit(RunEvent::Complete(summary)).await;
    }

    async fn process_site(
        &self,
        index: usize,
        site: &mut SiteRecord,
        origin: Coordinates,
    ) -> (DistanceResult, SiteUpdate) {
        let cached = site
            .location
            .clone()
            .or_else(|| lock(&self.cache).get(&site.address));

        if let Some(location) = cached {
            self.emit(RunEvent::Status(format!(
                "Using cached data: {}",
                site.address.locality
            )))
            .await;
            site.mark_cached(location.clone());
            let result = self
                .routed(site, origin, &location, ResultTag::Cached, CACHED_LABEL.to_owned())
                .await;
            return (result, update(index, ResultTag::Cached, CACHED_LABEL, Some(location)));
        }

        self.emit(RunEvent::Status(format!("Geocoding: {}", site.address.locality)))
            .await;

        match self
            .resolver
            .resolve(&site.address.query_text(), self.pacing.max_attempts)
            .await
        {
            Resolution::Found(location) => {
                lock(&self.cache).insert(&site.address, &location);
                site.mark_resolved(location.clone());
                let (tag, label) = classify_match(location.match_level, &location.match_description);
                let result = self.routed(site, origin, &location, tag, label.clone()).await;
                (result, update(index, tag, &label, Some(location)))
            }
            Resolution::NotFound => {
                site.mark_unresolved();
                (
                    DistanceResult::not_found(site.address.clone()),
                    update(index, ResultTag::Error, NOT_FOUND_LABEL, None),
                )
            }
        }
    }

    async fn routed(
        &self,
        site: &SiteRecord,
        origin: Coordinates,
        location: &LocationMatch,
        tag: ResultTag,
        status_label: String,
    ) -> DistanceResult {
        let estimate = self.router.route(origin, location.coordinates).await;
        tracing::debug!(
            site = %site.address,
            distance_km = estimate.distance_km,
            source = ?estimate.source,
            "routed site"
        );
        DistanceResult {
            address: site.address.clone(),
            distance_km: estimate.distance_km,
            duration_min: estimate.duration_min,
            status_label,
            tag,
            match_level: Some(location.match_level),
            match_description: Some(location.match_description.clone()),
        }
    }

    /// Persists the cache. A failure is logged and reported as a status
    /// message; the run carries on.
    async fn save_cache(&self) {
        let saved = lock(&self.cache).save();
        if let Err(e) = saved {
            tracing::warn!(error = %e, "failed to save coordinate cache");
            self.emit(RunEvent::Status(format!("Could not save cache: {e}")))
                .await;
        }
    }

    fn set_state(&self, state: RunState) {
        *lock(&self.state) = state;
    }

    async fn emit(&self, event: RunEvent) {
        if self.events.send(event).await.is_err() {
            tracing::debug!("event receiver dropped");
        }
    }
}

fn update(index: usize, tag: ResultTag, label: &str, location: Option<LocationMatch>) -> SiteUpdate {
    SiteUpdate {
        index,
        status_label: label.to_owned(),
        tag,
        location,
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_owned()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_owned()
    }
}
