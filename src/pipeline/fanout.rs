// src/pipeline/fanout.rs
//! EnrichmentFanOut: one job per photo per source.
//!
//! Each source gets a dispatcher task holding one registration of the
//! source's counting group while it spawns jobs, so the group cannot reach
//! zero before the last job is registered. Every job owns its own guard.

use metrics::counter;
use rand::Rng;
use std::sync::Arc;
use std::time::Duration;

use super::channels::ChannelBundle;
use super::tracker::{CompletionGroup, CompletionTracker};
use super::SharedRng;
use crate::enrich::Enrichers;
use crate::photo::{PhotoRecord, SourceKind};

/// Uniform pause in `[min_ms, min_ms + span_ms)` before each location job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchDelay {
    pub min_ms: u64,
    pub span_ms: u64,
}

impl DispatchDelay {
    pub const NONE: DispatchDelay = DispatchDelay {
        min_ms: 0,
        span_ms: 0,
    };

    pub fn new(min_ms: u64, span_ms: u64) -> Self {
        Self { min_ms, span_ms }
    }

    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Duration {
        let jitter = if self.span_ms == 0 {
            0
        } else {
            rng.random_range(0..self.span_ms)
        };
        Duration::from_millis(self.min_ms + jitter)
    }

    pub fn is_none(&self) -> bool {
        self.min_ms == 0 && self.span_ms == 0
    }
}

impl Default for DispatchDelay {
    /// Staggers calls to the rate-limited geocoder.
    fn default() -> Self {
        Self::new(100, 190)
    }
}

pub struct EnrichmentFanOut {
    enrichers: Enrichers,
    location_delay: DispatchDelay,
    rng: SharedRng,
}

impl EnrichmentFanOut {
    pub fn new(enrichers: Enrichers, location_delay: DispatchDelay, rng: SharedRng) -> Self {
        Self {
            enrichers,
            location_delay,
            rng,
        }
    }

    /// Start all three sources for one article. Registration with each
    /// source group happens before this returns.
    pub fn dispatch(
        &self,
        photos: Arc<[PhotoRecord]>,
        bundle: &Arc<ChannelBundle>,
        tracker: &CompletionTracker,
    ) {
        for kind in SourceKind::ALL {
            let delay = match kind {
                SourceKind::Location => Some(self.location_delay),
                // Simulated sources have no upstream to protect.
                SourceKind::Weather | SourceKind::Poi => None,
            };
            self.dispatch_source(kind, photos.clone(), bundle, tracker.group(kind), delay);
        }
    }

    fn dispatch_source(
        &self,
        kind: SourceKind,
        photos: Arc<[PhotoRecord]>,
        bundle: &Arc<ChannelBundle>,
        group: &CompletionGroup,
        delay: Option<DispatchDelay>,
    ) {
        let dispatcher_guard = group.register();
        let group = group.clone();
        let bundle = bundle.clone();
        let enrichers = self.enrichers.clone();
        let rng = self.rng.clone();

        tokio::spawn(async move {
            let _dispatcher_guard = dispatcher_guard;
            let shutdown = bundle.shutdown().clone();

            for photo in photos.iter() {
                if let Some(d) = delay.filter(|d| !d.is_none()) {
                    let pause = {
                        let mut rng = rng.lock().unwrap_or_else(|p| p.into_inner());
                        d.sample(&mut *rng)
                    };
                    tokio::select! {
                        _ = shutdown.cancelled() => break,
                        _ = tokio::time::sleep(pause) => {}
                    }
                }
                if shutdown.is_cancelled() {
                    break;
                }

                let job_guard = group.register();
                let photo = photo.clone();
                let bundle = bundle.clone();
                let enrichers = enrichers.clone();
                counter!("enrichment_jobs_total", "source" => kind.as_str()).increment(1);

                tokio::spawn(async move {
                    let _job_guard = job_guard;
                    tokio::select! {
                        _ = bundle.shutdown().cancelled() => {
                            tracing::debug!(article = %bundle.article(), photo = photo.index, source = %kind, "job cancelled");
                        }
                        _ = invoke(&enrichers, kind, &photo, &bundle) => {}
                    }
                });
            }
            tracing::debug!(article = %bundle.article(), source = %kind, "all jobs dispatched");
        });
    }
}

async fn invoke(enrichers: &Enrichers, kind: SourceKind, photo: &PhotoRecord, bundle: &ChannelBundle) {
    match kind {
        SourceKind::Location => enrichers.location.enhance_with_location(photo, bundle).await,
        SourceKind::Weather => enrichers.weather.enhance_with_weather(photo, bundle).await,
        SourceKind::Poi => {
            enrichers
                .poi
                .enhance_with_places_of_interest(photo, bundle)
                .await
        }
    }
}
